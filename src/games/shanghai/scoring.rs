//! Per-turn Shanghai scoring.

use crate::engine::dart::{Dart, Multiplier};

/// Tally of one turn against the round's target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnTally {
    pub score: u32,
    pub single: bool,
    pub double: bool,
    pub triple: bool,
}

impl TurnTally {
    /// Single, double and triple of the target in the same turn.
    pub fn is_shanghai(&self) -> bool {
        self.single && self.double && self.triple
    }
}

/// Only darts on `target` score; everything else counts zero.
pub fn tally_turn(target: u8, darts: &[Dart]) -> TurnTally {
    let mut tally = TurnTally::default();
    for dart in darts {
        let Dart::Hit { segment, multiplier } = *dart else {
            continue;
        };
        if segment != target {
            continue;
        }
        tally.score += dart.score();
        match multiplier {
            Multiplier::Single => tally.single = true,
            Multiplier::Double => tally.double = true,
            Multiplier::Triple => tally.triple = true,
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_target_scores_zero() {
        for dart in [Dart::single(6), Dart::double(6), Dart::triple(6), Dart::Miss] {
            assert_eq!(tally_turn(5, &[dart]).score, 0);
        }
    }

    #[test]
    fn test_target_scores_face_times_multiplier() {
        let tally = tally_turn(5, &[Dart::triple(5), Dart::single(5), Dart::double(4)]);
        assert_eq!(tally.score, 20);
        assert!(tally.single && tally.triple && !tally.double);
        assert!(!tally.is_shanghai());
    }

    #[test]
    fn test_shanghai_in_any_order() {
        let tally = tally_turn(3, &[Dart::triple(3), Dart::single(3), Dart::double(3)]);
        assert!(tally.is_shanghai());
        assert_eq!(tally.score, 18);
    }
}
