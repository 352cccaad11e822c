//! ClockEngine — implements VariantEngine for Around-the-Clock.
//!
//! The first player to pass the last target during their own turn wins on the
//! spot. Players later in the rotation do not get a turn to draw level, unlike
//! the "equal turns" convention of other variants.

use crate::engine::dart::Dart;
use crate::engine::error::DartsError;
use crate::engine::models::*;
use crate::engine::plugin::{validate_darts, VariantEngine};

use super::scoring::is_hit;
use super::types::*;

#[derive(Debug, Clone)]
pub struct ClockEngine {
    config: ClockConfig,
    targets: Vec<u8>,
}

impl ClockEngine {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            targets: config.target_list(),
            config,
        }
    }

    pub fn targets(&self) -> &[u8] {
        &self.targets
    }

    /// Current target for a player, `None` once they have finished.
    pub fn current_target(&self, state: &ClockState, player_id: &str) -> Option<u8> {
        state
            .players
            .get(player_id)
            .and_then(|p| self.targets.get(p.progress_index).copied())
    }
}

impl VariantEngine for ClockEngine {
    type State = ClockState;

    fn variant_id(&self) -> &str {
        "clock"
    }
    fn display_name(&self) -> &str {
        "Around the Clock"
    }
    fn description(&self) -> &str {
        "Hit 1 through 20 in order, optionally finishing on the bull. \
         First to hit the last target wins immediately."
    }

    fn create_initial_state(&self, roster: &[MatchPlayer]) -> ClockState {
        ClockState {
            players: roster
                .iter()
                .map(|p| (p.id.clone(), ClockPlayerState::default()))
                .collect(),
        }
    }

    fn apply_turn(
        &self,
        state: &ClockState,
        ctx: &TurnContext,
        darts: &[Dart],
    ) -> Result<TurnTransition<ClockState>, DartsError> {
        validate_darts(darts)?;
        let mut next = state.clone();
        let player = next.players.get_mut(&ctx.player_id).ok_or_else(|| {
            DartsError::StateCorrupted(format!("player `{}` has no clock state", ctx.player_id))
        })?;
        if player.progress_index > self.targets.len() {
            return Err(DartsError::StateCorrupted(format!(
                "progress {} is beyond {} targets",
                player.progress_index,
                self.targets.len()
            )));
        }

        let mut events = Vec::new();
        for dart in darts {
            player.darts_used += 1;
            let Some(&target) = self.targets.get(player.progress_index) else {
                continue;
            };
            if !is_hit(&self.config, target, dart) {
                continue;
            }
            player.progress_index += 1;
            events.push(TurnEvent::TargetHit {
                player_id: ctx.player_id.clone(),
                target,
                score: dart.score(),
            });
            events.push(TurnEvent::TargetAdvanced {
                player_id: ctx.player_id.clone(),
                next_target: self.targets.get(player.progress_index).copied(),
            });
        }

        Ok(TurnTransition { state: next, events })
    }

    fn evaluate(&self, state: &ClockState, ctx: &TurnContext, _roster: &[MatchPlayer]) -> Verdict {
        match state.players.get(&ctx.player_id) {
            Some(p) if p.progress_index >= self.targets.len() => Verdict::Winner(ctx.player_id.clone()),
            _ => Verdict::Continue,
        }
    }

    fn score(&self, state: &ClockState, player_id: &str) -> i64 {
        state.players.get(player_id).map_or(0, |p| p.progress_index as i64)
    }
}
