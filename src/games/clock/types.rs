//! Around-the-Clock domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::dart::BULL;
use crate::engine::models::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub include_bull: bool,
    pub include_doubles: bool,
    pub include_triples: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            include_bull: true,
            include_doubles: false,
            include_triples: false,
        }
    }
}

impl ClockConfig {
    /// 1..=20 in order, then the bull when enabled.
    pub fn target_list(&self) -> Vec<u8> {
        let mut targets: Vec<u8> = (1..=20).collect();
        if self.include_bull {
            targets.push(BULL);
        }
        targets
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockPlayerState {
    /// Index of the next target; equals the target count once finished.
    pub progress_index: usize,
    pub darts_used: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub players: BTreeMap<PlayerId, ClockPlayerState>,
}
