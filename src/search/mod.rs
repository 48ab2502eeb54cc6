//! Picks the computer move: a synchronous, depth-bounded [Minimax] search over
//! the legal moves with the material evaluation at the leaves.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax

use tracing::debug;

use crate::chess::board::Board;
use crate::chess::core::Move;
use crate::error::Result;
use crate::evaluation::{self, Score};

mod minimax;

/// Search depth in plies.
pub type Depth = u8;

/// Upper bound of positions visited by a single search. Once it is exceeded,
/// the remaining positions are evaluated statically and the search unwinds.
pub const DEFAULT_NODE_BUDGET: u64 = 5_000_000;

/// Search settings.
///
/// ```
/// use chessmaster::search::{Limits, DEFAULT_NODE_BUDGET};
///
/// assert_eq!(Limits::default().depth, 2);
/// assert_eq!(Limits::depth(4).nodes, DEFAULT_NODE_BUDGET);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Plies to look ahead. 0 is treated as 1: a move is always chosen.
    pub depth: Depth,
    /// Hard limit of positions visited.
    pub nodes: u64,
}

impl Limits {
    /// Searches `depth` plies with the default node budget.
    #[must_use]
    pub const fn depth(depth: Depth) -> Self {
        Self {
            depth,
            nodes: DEFAULT_NODE_BUDGET,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::depth(2)
    }
}

/// Outcome of [`best_move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// [`None`] only if the side to move has no legal moves.
    pub best_move: Option<Move>,
    /// Score of the best line from the perspective of the side to move.
    pub score: Score,
    /// Positions visited.
    pub nodes: u64,
}

/// Finds the best move for the side to move of `board`. The board itself is
/// never modified: every line is explored on copies.
///
/// Ties are broken in favor of the move generated first, so the result is
/// fully deterministic.
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if a king is missing from the board.
pub fn best_move(board: &Board, limits: Limits) -> Result<SearchResult> {
    let depth = limits.depth.max(1);
    let mut state = minimax::SearchState::new(limits.nodes);
    let (score, best_move) = minimax::negamax(board, depth, 0, &mut state, &evaluation::evaluate)?;
    debug!(
        depth,
        nodes = state.nodes,
        %score,
        best_move = ?best_move.map(|next_move| next_move.to_string()),
        "search finished"
    );
    Ok(SearchResult {
        best_move,
        score,
        nodes: state.nodes,
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn takes_free_queen() {
        let board: Board = "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1".parse().unwrap();
        let result = best_move(&board, Limits::depth(1)).unwrap();
        assert_eq!(result.best_move.unwrap().to_string(), "d2d5");
        assert_eq!(result.score, Score::cp(500));
    }

    #[test]
    fn depth_zero_still_moves() {
        let result = best_move(&Board::starting(), Limits::depth(0)).unwrap();
        assert!(result.best_move.is_some());
        assert_eq!(result.score, Score::cp(0));
    }

    #[test]
    fn stalemate_has_no_move() {
        let board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let result = best_move(&board, Limits::default()).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, Score::cp(0));
    }

    #[test]
    fn node_budget_is_respected() {
        let limits = Limits {
            depth: 6,
            nodes: 1000,
        };
        let result = best_move(&Board::starting(), limits).unwrap();
        assert!(result.best_move.is_some());
        // Siblings on the current line are still visited (and evaluated
        // statically) after the budget is spent.
        assert!(result.nodes < 2 * 1000);
    }
}
