//! Cricket domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::dart::BULL;
use crate::engine::models::PlayerId;

/// Target numbers in board-call order.
pub const CRICKET_NUMBERS: [u8; 7] = [20, 19, 18, 17, 16, 15, BULL];
pub const MARKS_TO_CLOSE: u8 = 3;

/// How simultaneous qualification for the win is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CricketTiePolicy {
    /// The win check runs for the acting player only, right after their turn.
    /// If two players would both satisfy "all closed and points >= everyone"
    /// with equal points, the one whose turn is evaluated first wins and the
    /// match ends before the other is ever checked. The outcome therefore
    /// depends on throwing order.
    FirstToQualify,
}

pub const CRICKET_TIE_POLICY: CricketTiePolicy = CricketTiePolicy::FirstToQualify;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CricketPlayerState {
    /// Target number -> marks in 0..=3. Absent means 0.
    pub marks: BTreeMap<u8, u8>,
    pub points: u32,
}

impl CricketPlayerState {
    pub fn marks_on(&self, number: u8) -> u8 {
        self.marks.get(&number).copied().unwrap_or(0)
    }

    pub fn is_closed(&self, number: u8) -> bool {
        self.marks_on(number) >= MARKS_TO_CLOSE
    }

    pub fn all_closed(&self) -> bool {
        CRICKET_NUMBERS.iter().all(|&n| self.is_closed(n))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CricketState {
    pub players: BTreeMap<PlayerId, CricketPlayerState>,
}

impl CricketState {
    /// True if any player other than `player_id` still has `number` open.
    pub fn open_for_others(&self, player_id: &str, number: u8) -> bool {
        self.players
            .iter()
            .any(|(pid, p)| pid != player_id && !p.is_closed(number))
    }

    pub fn best_opponent_points(&self, player_id: &str) -> Option<u32> {
        self.players
            .iter()
            .filter(|(pid, _)| pid.as_str() != player_id)
            .map(|(_, p)| p.points)
            .max()
    }
}
