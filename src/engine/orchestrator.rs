//! Turn orchestrator — owns roster rotation and round bookkeeping, and
//! sequences a variant engine with its win evaluator.
//!
//! Every confirmed turn is appended to a log and the pre-turn state is kept
//! in a snapshot arena indexed by turn number. Undo restores the snapshot;
//! nothing ever tries to invert engine arithmetic.

use std::collections::HashSet;
use std::mem;

use serde::Serialize;

use crate::engine::dart::{ConfirmedTurn, Dart, Turn};
use crate::engine::error::DartsError;
use crate::engine::models::*;
use crate::engine::plugin::VariantEngine;

/// One entry of the append-only turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedTurn {
    pub seat: usize,
    pub player_id: PlayerId,
    pub round: u32,
    pub turn: ConfirmedTurn,
}

#[derive(Debug, Clone)]
struct Checkpoint<S> {
    state: S,
    current: usize,
    round: u32,
}

pub struct TurnOrchestrator<V: VariantEngine> {
    engine: V,
    roster: Vec<MatchPlayer>,
    state: V::State,
    current: usize,
    round: u32,
    verdict: Verdict,
    history: Vec<LoggedTurn>,
    snapshots: Vec<Checkpoint<V::State>>,
    aborted: Option<String>,
}

impl<V: VariantEngine> TurnOrchestrator<V> {
    /// Start a match. The roster is sorted by `order`; ids and orders must be
    /// unique.
    pub fn new(engine: V, mut roster: Vec<MatchPlayer>) -> Result<Self, DartsError> {
        if roster.len() < engine.min_players() || roster.len() > engine.max_players() {
            return Err(DartsError::InvalidSetup(format!(
                "{} needs {}..={} players, got {}",
                engine.display_name(),
                engine.min_players(),
                engine.max_players(),
                roster.len()
            )));
        }
        let mut ids = HashSet::new();
        let mut orders = HashSet::new();
        for p in &roster {
            if p.id.is_empty() {
                return Err(DartsError::InvalidSetup("player id must not be empty".into()));
            }
            if !ids.insert(p.id.as_str()) {
                return Err(DartsError::InvalidSetup(format!("duplicate player id `{}`", p.id)));
            }
            if !orders.insert(p.order) {
                return Err(DartsError::InvalidSetup(format!("duplicate roster order {}", p.order)));
            }
        }
        roster.sort_by_key(|p| p.order);

        let state = engine.create_initial_state(&roster);
        tracing::debug!(
            variant = engine.variant_id(),
            players = roster.len(),
            "match started"
        );
        Ok(Self {
            engine,
            roster,
            state,
            current: 0,
            round: 0,
            verdict: Verdict::Continue,
            history: Vec::new(),
            snapshots: Vec::new(),
            aborted: None,
        })
    }

    /// Rebuild a match by replaying a turn log from the initial state.
    pub fn replay(
        engine: V,
        roster: Vec<MatchPlayer>,
        turns: &[ConfirmedTurn],
    ) -> Result<Self, DartsError> {
        let mut orchestrator = Self::new(engine, roster)?;
        for turn in turns {
            orchestrator.apply_confirmed(turn.clone())?;
        }
        Ok(orchestrator)
    }

    // --- Accessors ---

    pub fn engine(&self) -> &V {
        &self.engine
    }

    pub fn roster(&self) -> &[MatchPlayer] {
        &self.roster
    }

    pub fn state(&self) -> &V::State {
        &self.state
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_over(&self) -> bool {
        self.verdict.is_terminal()
    }

    pub fn aborted(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    /// Player expected to throw next, or `None` once the match is decided.
    pub fn current_player(&self) -> Option<&MatchPlayer> {
        if self.is_over() || self.aborted.is_some() {
            None
        } else {
            self.roster.get(self.current)
        }
    }

    pub fn history(&self) -> &[LoggedTurn] {
        &self.history
    }

    pub fn turn_log(&self) -> Vec<ConfirmedTurn> {
        self.history.iter().map(|t| t.turn.clone()).collect()
    }

    fn context(&self) -> TurnContext {
        TurnContext {
            player_id: self.roster[self.current].id.clone(),
            seat: self.current,
            round: self.round,
            closes_round: self.current + 1 == self.roster.len(),
        }
    }

    // --- Turn flow ---

    /// Confirm the capture layer's turn buffer and score it.
    pub fn confirm_turn(&mut self, turn: Turn) -> Result<TurnOutcome<V::State>, DartsError> {
        let confirmed = turn.confirm()?;
        self.apply_confirmed(confirmed)
    }

    /// Score raw darts submitted in one go, e.g. by a remote client.
    pub fn submit_darts(&mut self, darts: &[Dart]) -> Result<TurnOutcome<V::State>, DartsError> {
        let turn = Turn::from_darts(darts)?;
        self.confirm_turn(turn)
    }

    fn apply_confirmed(&mut self, turn: ConfirmedTurn) -> Result<TurnOutcome<V::State>, DartsError> {
        if let Some(reason) = &self.aborted {
            return Err(DartsError::StateCorrupted(reason.clone()));
        }
        if self.verdict.is_terminal() {
            return Err(DartsError::MatchOver);
        }

        let ctx = self.context();
        let transition = match self.engine.apply_turn(&self.state, &ctx, turn.darts()) {
            Ok(t) => t,
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(
                        variant = self.engine.variant_id(),
                        player = %ctx.player_id,
                        error = %e,
                        "match aborted"
                    );
                    self.aborted = Some(e.to_string());
                } else {
                    tracing::warn!(player = %ctx.player_id, error = %e, "turn rejected");
                }
                return Err(e);
            }
        };

        let verdict = self.engine.evaluate(&transition.state, &ctx, &self.roster);
        tracing::debug!(
            variant = self.engine.variant_id(),
            player = %ctx.player_id,
            round = ctx.round,
            darts = turn.len(),
            verdict = ?verdict,
            "turn confirmed"
        );

        let previous = mem::replace(&mut self.state, transition.state);
        self.snapshots.push(Checkpoint {
            state: previous,
            current: self.current,
            round: self.round,
        });
        self.history.push(LoggedTurn {
            seat: ctx.seat,
            player_id: ctx.player_id,
            round: ctx.round,
            turn,
        });

        if verdict.is_terminal() {
            tracing::info!(
                variant = self.engine.variant_id(),
                winners = ?verdict.winners(),
                reason = verdict.reason(),
                turns = self.history.len(),
                "match finished"
            );
        } else {
            self.current = (self.current + 1) % self.roster.len();
            if self.current == 0 {
                self.round += 1;
            }
        }
        self.verdict = verdict.clone();

        Ok(TurnOutcome {
            state: self.state.clone(),
            verdict,
            events: transition.events,
        })
    }

    /// Take back the most recently confirmed turn, including a winning one.
    pub fn undo_last_turn(&mut self) -> Result<ConfirmedTurn, DartsError> {
        if let Some(reason) = &self.aborted {
            return Err(DartsError::StateCorrupted(reason.clone()));
        }
        let (logged, checkpoint) = match (self.history.pop(), self.snapshots.pop()) {
            (Some(l), Some(c)) => (l, c),
            _ => return Err(DartsError::NothingToUndo),
        };
        self.state = checkpoint.state;
        self.current = checkpoint.current;
        self.round = checkpoint.round;
        self.verdict = Verdict::Continue;
        tracing::debug!(player = %logged.player_id, round = logged.round, "turn undone");
        Ok(logged.turn)
    }

    /// Terminal record for persistence; `None` while the match is running.
    pub fn result(&self) -> Option<MatchResult<V::State>> {
        if !self.verdict.is_terminal() {
            return None;
        }
        let players = self
            .roster
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let turns = self.history.iter().filter(|t| t.seat == seat);
                PlayerSummary {
                    player_id: p.id.clone(),
                    darts_thrown: turns.clone().map(|t| t.turn.len() as u32).sum(),
                    turns_taken: turns.count() as u32,
                    score: self.engine.score(&self.state, &p.id),
                }
            })
            .collect();
        Some(MatchResult {
            variant: self.engine.variant_id().to_string(),
            verdict: self.verdict.clone(),
            winners: self.verdict.winners(),
            reason: self.verdict.reason().to_string(),
            final_state: self.state.clone(),
            players,
            rounds_played: self.round + 1,
            turns_played: self.history.len() as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// Untyped adapter — lets the match host keep matches of any variant side by side
// ---------------------------------------------------------------------------

/// JSON view of a live match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub variant: String,
    pub players: Vec<MatchPlayer>,
    pub current_player: Option<PlayerId>,
    pub round: u32,
    pub turns_played: usize,
    pub verdict: Verdict,
    pub aborted: Option<String>,
    pub state: serde_json::Value,
}

/// JSON view of a scored turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub verdict: Verdict,
    pub events: Vec<TurnEvent>,
    pub next_player: Option<PlayerId>,
    pub round: u32,
    pub state: serde_json::Value,
    pub result: Option<MatchResult<serde_json::Value>>,
}

pub trait DynMatch: Send {
    fn variant_id(&self) -> &str;
    fn submit_darts(&mut self, darts: &[Dart]) -> Result<TurnReport, DartsError>;
    fn undo_last_turn(&mut self) -> Result<MatchSnapshot, DartsError>;
    fn snapshot(&self) -> Result<MatchSnapshot, DartsError>;
}

impl<V> DynMatch for TurnOrchestrator<V>
where
    V: VariantEngine + 'static,
{
    fn variant_id(&self) -> &str {
        self.engine.variant_id()
    }

    fn submit_darts(&mut self, darts: &[Dart]) -> Result<TurnReport, DartsError> {
        let outcome = TurnOrchestrator::submit_darts(self, darts)?;
        let result = match self.result() {
            Some(r) => Some(r.encode()?),
            None => None,
        };
        Ok(TurnReport {
            verdict: outcome.verdict,
            events: outcome.events,
            next_player: self.current_player().map(|p| p.id.clone()),
            round: self.round,
            state: serde_json::to_value(&outcome.state)?,
            result,
        })
    }

    fn undo_last_turn(&mut self) -> Result<MatchSnapshot, DartsError> {
        TurnOrchestrator::undo_last_turn(self)?;
        DynMatch::snapshot(self)
    }

    fn snapshot(&self) -> Result<MatchSnapshot, DartsError> {
        Ok(MatchSnapshot {
            variant: self.engine.variant_id().to_string(),
            players: self.roster.clone(),
            current_player: self.current_player().map(|p| p.id.clone()),
            round: self.round,
            turns_played: self.history.len(),
            verdict: self.verdict.clone(),
            aborted: self.aborted.clone(),
            state: serde_json::to_value(&self.state)?,
        })
    }
}
