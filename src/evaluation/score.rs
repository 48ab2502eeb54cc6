use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::Neg;

use crate::evaluation::Value;

/// The score represents the relative value of the position (in centipawns) or
/// checkmate in N plies (if one is found), always from the perspective of the
/// side to move.
///
/// A compact i32 representation is used to store the score in both cases.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    value: i32,
}

impl Score {
    pub(crate) const INFINITY: Self = Self {
        value: 2_000_000_000,
    };

    /// `[-INFINITY, -INFINITY + MATE_RANGE)` and `(INFINITY - MATE_RANGE,
    /// INFINITY]` are reserved for mate scores.
    /// `[-INFINITY + MATE_RANGE, INFINITY - MATE_RANGE]` is for centipawn
    /// evaluations.
    const MATE_RANGE: i32 = 1000;

    /// Creates a new score in centipawn units.
    ///
    /// The value must be in the range `[-INFINITY + MATE_RANGE, INFINITY -
    /// MATE_RANGE]`.
    #[must_use]
    pub fn cp(value: Value) -> Self {
        debug_assert!(value.abs() < Self::INFINITY.value - Self::MATE_RANGE);
        Self { value }
    }

    /// The side to move delivers mate in `plies` half-moves. Shorter mates
    /// score higher.
    #[must_use]
    pub const fn mate_in_plies(plies: u8) -> Self {
        Self {
            value: Self::INFINITY.value - plies as i32,
        }
    }

    /// The side to move gets mated in `plies` half-moves.
    #[must_use]
    pub const fn mated_in_plies(plies: u8) -> Self {
        Self {
            value: -Self::INFINITY.value + plies as i32,
        }
    }

    /// Returns the number of *full* moves until mate: positive if the side to
    /// move wins, negative if it loses, [`None`] for centipawn evaluations.
    #[must_use]
    pub fn mate_in(&self) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let plies = Self::INFINITY.value - self.value.abs();
        let moves = (plies + 1) / 2;
        match self.value.cmp(&0) {
            Ordering::Greater => Some(moves),
            _ => Some(-moves),
        }
    }

    /// Returns `true` if the score represents a mate, not centipawn evaluation.
    #[must_use]
    pub const fn is_mate(&self) -> bool {
        self.value.abs() > Self::INFINITY.value - Self::MATE_RANGE
    }

    /// Centipawn evaluation, [`None`] for mate scores.
    #[must_use]
    pub const fn centipawns(&self) -> Option<Value> {
        if self.is_mate() {
            None
        } else {
            Some(self.value)
        }
    }
}

impl Neg for Score {
    type Output = Self;

    /// Mirrors evaluation to other player's perspective.
    fn neg(self) -> Self::Output {
        Self { value: -self.value }
    }
}

impl Display for Score {
    /// Formats the score the way UCI reports it.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mate_in() {
            Some(moves) => write!(f, "mate {moves}"),
            None => write!(f, "cp {}", self.value),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mate() {
        assert!(Score::mate_in_plies(3).is_mate());
        assert_eq!(Score::mate_in_plies(1).mate_in(), Some(1));
        assert_eq!(Score::mate_in_plies(3).mate_in(), Some(2));
        assert_eq!(Score::mated_in_plies(2).mate_in(), Some(-1));
        assert_eq!(Score::mate_in_plies(3).centipawns(), None);
    }

    #[test]
    fn cp() {
        let cp = Score::cp(42);
        assert_eq!(cp, Score { value: 42 });
        assert!(!cp.is_mate());
        assert_eq!(cp.mate_in(), None);
        assert_eq!(cp.centipawns(), Some(42));

        assert!(Score::cp(42) < Score::cp(43));
        assert!(Score::cp(0) > Score::cp(-42));
    }

    #[test]
    fn neg() {
        let cp = Score::cp(42);
        assert_eq!(-cp, Score { value: -42 });
        assert_eq!(-Score::mate_in_plies(5), Score::mated_in_plies(5));
    }

    #[test]
    fn display() {
        assert_eq!(Score::cp(123).to_string(), "cp 123");
        assert_eq!(Score::mate_in_plies(5).to_string(), "mate 3");
        assert_eq!(Score::mated_in_plies(4).to_string(), "mate -2");
    }

    #[test]
    fn ordering() {
        assert!(Score::mate_in_plies(1) > Score::mate_in_plies(3));
        assert!(Score::mate_in_plies(42) > Score::cp(42));
        assert!(Score::mated_in_plies(1) < Score::cp(-42));
        assert!(Score::mated_in_plies(1) < Score::mated_in_plies(3));
        assert!(-Score::INFINITY < Score::mated_in_plies(1));
    }
}
