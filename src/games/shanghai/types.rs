//! Shanghai domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::error::DartsError;
use crate::engine::models::PlayerId;

/// How a final-round tie on total score is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The tied player with the lowest roster `order` wins.
    RosterOrder,
    /// Every tied player is declared a winner.
    SharedVictory,
}

/// Tie-break used unless configuration says otherwise.
pub const SHANGHAI_TIE_BREAK: TieBreak = TieBreak::RosterOrder;

impl Default for TieBreak {
    fn default() -> Self {
        SHANGHAI_TIE_BREAK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShanghaiConfig {
    pub start_number: u8,
    pub round_count: u32,
    pub tie_break: TieBreak,
}

impl Default for ShanghaiConfig {
    fn default() -> Self {
        Self {
            start_number: 1,
            round_count: 7,
            tie_break: SHANGHAI_TIE_BREAK,
        }
    }
}

impl ShanghaiConfig {
    /// Every round's target must be a numbered segment (1..=20).
    pub fn validate(&self) -> Result<(), DartsError> {
        if self.start_number == 0 || self.round_count == 0 {
            return Err(DartsError::InvalidSetup(
                "shanghai needs start_number >= 1 and round_count >= 1".into(),
            ));
        }
        match (self.start_number as u32).checked_add(self.round_count - 1) {
            Some(last) if last <= 20 => Ok(()),
            _ => Err(DartsError::InvalidSetup(format!(
                "shanghai from {} over {} rounds would target past 20",
                self.start_number, self.round_count
            ))),
        }
    }

    pub fn target_for_round(&self, round: u32) -> Option<u8> {
        if round >= self.round_count {
            return None;
        }
        u8::try_from(round)
            .ok()
            .and_then(|r| self.start_number.checked_add(r))
    }

    pub fn target_list(&self) -> Vec<u8> {
        (0..self.round_count).filter_map(|r| self.target_for_round(r)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShanghaiPlayerState {
    pub total_score: u32,
    /// Round index -> points scored that round. Kept for display and audit.
    pub round_scores: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShanghaiState {
    pub players: BTreeMap<PlayerId, ShanghaiPlayerState>,
    /// Set by the turn that threw single, double and triple on the target.
    #[serde(default)]
    pub shanghai_by: Option<PlayerId>,
}
