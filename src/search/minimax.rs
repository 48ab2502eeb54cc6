//! Implementation of [Minimax] algorithm in its [Negamax] formulation: scores
//! are relative to the side to move and negated between plies.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Negamax]: https://en.wikipedia.org/wiki/Negamax
// TODO: Alpha-beta pruning would allow deeper searches with the same node
// budget and the same results.

use tracing::trace;

use crate::chess::board::Board;
use crate::chess::core::Move;
use crate::chess::movegen;
use crate::error::Result;
use crate::evaluation::Score;
use crate::search::Depth;

pub(super) struct SearchState {
    pub(super) nodes: u64,
    budget: u64,
}

impl SearchState {
    pub(super) const fn new(budget: u64) -> Self {
        Self { nodes: 0, budget }
    }

    const fn exhausted(&self) -> bool {
        self.nodes >= self.budget
    }
}

/// Returns the score of `board` for the side to move and the move that
/// achieves it. `ply` is the distance from the root and makes shorter mates
/// score higher.
pub(super) fn negamax(
    board: &Board,
    depth: Depth,
    ply: u8,
    state: &mut SearchState,
    static_evaluator: &dyn Fn(&Board) -> Score,
) -> Result<(Score, Option<Move>)> {
    state.nodes += 1;
    let moves = movegen::generate_moves(board)?;
    if moves.is_empty() {
        let score = if board.is_in_check(board.turn())? {
            Score::mated_in_plies(ply)
        } else {
            // Stalemate.
            Score::cp(0)
        };
        return Ok((score, None));
    }
    // The root is always expanded so that a move is chosen.
    if depth == 0 || (ply > 0 && state.exhausted()) {
        return Ok((static_evaluator(board), None));
    }
    let mut best_score = -Score::INFINITY;
    let mut best_move = None;
    for next_move in moves {
        let mut next = board.clone();
        next.make_move(&next_move);
        let (score, _) = negamax(
            &next,
            depth - 1,
            ply.saturating_add(1),
            state,
            static_evaluator,
        )?;
        let score = -score;
        if ply == 0 {
            trace!(%next_move, %score, "root move");
        }
        // Update the best score and move that achieves it if the explored move
        // leads to the best result so far.
        if score > best_score {
            best_score = score;
            best_move = Some(next_move);
        }
    }
    Ok((best_score, best_move))
}
