//! VariantEngine trait — the interface every scoring variant implements.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::dart::Dart;
use crate::engine::error::DartsError;
use crate::engine::models::*;

pub const DEFAULT_MIN_PLAYERS: usize = 1;
pub const DEFAULT_MAX_PLAYERS: usize = 8;

/// Pure rule engine for one game variant.
///
/// Implementations hold only their immutable configuration. `apply_turn` and
/// `evaluate` never read clocks, randomness or shared mutable state, so the
/// same inputs always produce the same outputs and a match can be replayed
/// from its turn log.
pub trait VariantEngine: Send + Sync {
    type State: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    fn variant_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;

    fn min_players(&self) -> usize {
        DEFAULT_MIN_PLAYERS
    }

    fn max_players(&self) -> usize {
        DEFAULT_MAX_PLAYERS
    }

    /// Zeroed per-player state for the given roster.
    fn create_initial_state(&self, roster: &[MatchPlayer]) -> Self::State;

    /// Apply a confirmed turn for `ctx.player_id`.
    ///
    /// Invalid darts yield `InvalidDart` and leave nothing applied; state that
    /// violates the variant's invariants yields `StateCorrupted`.
    fn apply_turn(
        &self,
        state: &Self::State,
        ctx: &TurnContext,
        darts: &[Dart],
    ) -> Result<TurnTransition<Self::State>, DartsError>;

    /// Win evaluator, run on the post-turn state.
    fn evaluate(&self, state: &Self::State, ctx: &TurnContext, roster: &[MatchPlayer]) -> Verdict;

    /// Headline score for summaries.
    fn score(&self, state: &Self::State, player_id: &str) -> i64;
}

/// Check every dart before any of them is applied, so a rejected turn never
/// half-applies.
pub fn validate_darts(darts: &[Dart]) -> Result<(), DartsError> {
    if darts.is_empty() {
        return Err(DartsError::EmptyTurn);
    }
    if darts.len() > crate::engine::dart::MAX_DARTS_PER_TURN {
        return Err(DartsError::TurnFull);
    }
    darts.iter().try_for_each(Dart::validate)
}
