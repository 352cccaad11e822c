//! CricketEngine — implements VariantEngine for Cricket.

use crate::engine::dart::Dart;
use crate::engine::error::DartsError;
use crate::engine::models::*;
use crate::engine::plugin::{validate_darts, VariantEngine};

use super::scoring::{is_cricket_number, point_value, split_marks};
use super::types::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct CricketEngine;

impl CricketEngine {
    pub fn new() -> Self {
        Self
    }
}

fn check_state(state: &CricketState, player_id: &str) -> Result<(), DartsError> {
    if !state.players.contains_key(player_id) {
        return Err(DartsError::StateCorrupted(format!(
            "player `{player_id}` has no cricket state"
        )));
    }
    for (pid, p) in &state.players {
        for (&number, &marks) in &p.marks {
            if !is_cricket_number(number) || marks > MARKS_TO_CLOSE {
                return Err(DartsError::StateCorrupted(format!(
                    "player `{pid}` has {marks} marks on {number}"
                )));
            }
        }
    }
    Ok(())
}

impl VariantEngine for CricketEngine {
    type State = CricketState;

    fn variant_id(&self) -> &str {
        "cricket"
    }
    fn display_name(&self) -> &str {
        "Cricket"
    }
    fn description(&self) -> &str {
        "Close 15 through 20 and the bull with three marks each. Extra marks on a \
         number you own score points while an opponent still has it open."
    }

    fn create_initial_state(&self, roster: &[MatchPlayer]) -> CricketState {
        CricketState {
            players: roster
                .iter()
                .map(|p| (p.id.clone(), CricketPlayerState::default()))
                .collect(),
        }
    }

    fn apply_turn(
        &self,
        state: &CricketState,
        ctx: &TurnContext,
        darts: &[Dart],
    ) -> Result<TurnTransition<CricketState>, DartsError> {
        validate_darts(darts)?;
        check_state(state, &ctx.player_id)?;

        let pid = ctx.player_id.as_str();
        let mut next = state.clone();
        let mut events = Vec::new();

        for dart in darts {
            let Dart::Hit { segment, multiplier } = *dart else {
                continue;
            };
            if !is_cricket_number(segment) {
                continue;
            }

            let scorable = next.open_for_others(pid, segment);
            let Some(player) = next.players.get_mut(pid) else {
                continue;
            };
            let current = player.marks_on(segment);
            let (applied, overflow) = split_marks(current, multiplier.value());

            if applied > 0 {
                player.marks.insert(segment, current + applied);
                events.push(TurnEvent::MarksAdded {
                    player_id: pid.to_string(),
                    number: segment,
                    marks: applied,
                });
                if current + applied == MARKS_TO_CLOSE {
                    events.push(TurnEvent::NumberClosed {
                        player_id: pid.to_string(),
                        number: segment,
                    });
                }
            }

            if overflow > 0 && scorable {
                let points = overflow as u32 * point_value(segment);
                player.points += points;
                events.push(TurnEvent::PointsScored {
                    player_id: pid.to_string(),
                    number: segment,
                    points,
                });
            }
        }

        Ok(TurnTransition { state: next, events })
    }

    /// See [`CricketTiePolicy::FirstToQualify`]: only the acting player is
    /// checked, so ties resolve in throwing order.
    fn evaluate(&self, state: &CricketState, ctx: &TurnContext, _roster: &[MatchPlayer]) -> Verdict {
        let Some(player) = state.players.get(&ctx.player_id) else {
            return Verdict::Continue;
        };
        if !player.all_closed() {
            return Verdict::Continue;
        }
        let leads = state
            .best_opponent_points(&ctx.player_id)
            .map_or(true, |best| player.points >= best);
        match CRICKET_TIE_POLICY {
            CricketTiePolicy::FirstToQualify if leads => Verdict::Winner(ctx.player_id.clone()),
            CricketTiePolicy::FirstToQualify => Verdict::Continue,
        }
    }

    fn score(&self, state: &CricketState, player_id: &str) -> i64 {
        state.players.get(player_id).map_or(0, |p| p.points as i64)
    }
}
