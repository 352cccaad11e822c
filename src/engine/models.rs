//! Core engine data types shared by every variant.

use serde::{Deserialize, Serialize};

pub type PlayerId = String;

/// A roster entry. `order` defines rotation and tie-break precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

impl MatchPlayer {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }
}

/// What the orchestrator knows about the turn being scored. Engines and win
/// evaluators read it instead of keeping their own counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    pub player_id: PlayerId,
    /// Index of the acting player in the ordered roster.
    pub seat: usize,
    /// Zero-based round. Every player throws once per round.
    pub round: u32,
    /// True when the acting player is the last to throw in this round.
    pub closes_round: bool,
}

/// Outcome of the win evaluator after a confirmed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "players", rename_all = "snake_case")]
pub enum Verdict {
    Continue,
    Winner(PlayerId),
    ShanghaiInstantWin(PlayerId),
    /// Only produced when a variant is configured to share tied victories.
    SharedVictory(Vec<PlayerId>),
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Continue)
    }

    pub fn winners(&self) -> Vec<PlayerId> {
        match self {
            Verdict::Continue => vec![],
            Verdict::Winner(id) | Verdict::ShanghaiInstantWin(id) => vec![id.clone()],
            Verdict::SharedVictory(ids) => ids.clone(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Verdict::Continue => "in_progress",
            Verdict::Winner(_) => "normal",
            Verdict::ShanghaiInstantWin(_) => "shanghai",
            Verdict::SharedVictory(_) => "shared",
        }
    }
}

/// Notable things that happened while a turn was applied, in throw order.
/// Consumed by presentation and celebration layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TurnEvent {
    MarksAdded { player_id: PlayerId, number: u8, marks: u8 },
    NumberClosed { player_id: PlayerId, number: u8 },
    PointsScored { player_id: PlayerId, number: u8, points: u32 },
    TargetHit { player_id: PlayerId, target: u8, score: u32 },
    TargetAdvanced { player_id: PlayerId, next_target: Option<u8> },
    Shanghai { player_id: PlayerId, target: u8 },
}

/// Result of applying one confirmed turn to a variant state.
#[derive(Debug, Clone)]
pub struct TurnTransition<S> {
    pub state: S,
    pub events: Vec<TurnEvent>,
}

/// What the orchestrator hands back from `confirm_turn`.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome<S> {
    pub state: S,
    pub verdict: Verdict,
    pub events: Vec<TurnEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub darts_thrown: u32,
    pub turns_taken: u32,
    /// Variant score: cricket points, shanghai total, clock progress.
    pub score: i64,
}

/// Terminal record of a match, handed to persistence and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<S> {
    pub variant: String,
    pub verdict: Verdict,
    pub winners: Vec<PlayerId>,
    pub reason: String,
    pub final_state: S,
    pub players: Vec<PlayerSummary>,
    pub rounds_played: u32,
    pub turns_played: u32,
}

impl<S: Serialize> MatchResult<S> {
    /// Re-encode the variant state as JSON for untyped consumers.
    pub fn encode(&self) -> Result<MatchResult<serde_json::Value>, serde_json::Error> {
        Ok(MatchResult {
            variant: self.variant.clone(),
            verdict: self.verdict.clone(),
            winners: self.winners.clone(),
            reason: self.reason.clone(),
            final_state: serde_json::to_value(&self.final_state)?,
            players: self.players.clone(),
            rounds_played: self.rounds_played,
            turns_played: self.turns_played,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_winners() {
        assert!(Verdict::Continue.winners().is_empty());
        assert!(!Verdict::Continue.is_terminal());
        assert_eq!(Verdict::Winner("p1".into()).winners(), vec!["p1".to_string()]);
        assert_eq!(Verdict::ShanghaiInstantWin("p2".into()).reason(), "shanghai");
        let shared = Verdict::SharedVictory(vec!["a".into(), "b".into()]);
        assert!(shared.is_terminal());
        assert_eq!(shared.winners().len(), 2);
    }

    #[test]
    fn test_verdict_json_shape() {
        let json = serde_json::to_value(Verdict::ShanghaiInstantWin("p1".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "shanghai_instant_win", "players": "p1"}));
        let json = serde_json::to_value(Verdict::Continue).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "continue"}));
    }
}
