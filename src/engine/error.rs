//! Error taxonomy shared by the turn buffer, the variant engines, the
//! orchestrator and the match host.

use thiserror::Error;

use crate::engine::dart::MAX_DARTS_PER_TURN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DartsError {
    #[error("turn already holds {} darts", MAX_DARTS_PER_TURN)]
    TurnFull,

    #[error("cannot confirm a turn with no darts")]
    EmptyTurn,

    #[error("invalid dart: {0}")]
    InvalidDart(String),

    /// A precondition on engine state was violated. The match cannot continue.
    #[error("match state corrupted: {0}")]
    StateCorrupted(String),

    #[error("match is already over")]
    MatchOver,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("invalid match setup: {0}")]
    InvalidSetup(String),

    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("unknown match: {0}")]
    UnknownMatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to encode match data: {0}")]
    Encode(String),

    #[error("match host is not running")]
    HostUnavailable,
}

impl DartsError {
    /// Fatal errors poison the match; everything else is a rejected request
    /// that leaves the match untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DartsError::StateCorrupted(_))
    }
}

impl From<serde_json::Error> for DartsError {
    fn from(e: serde_json::Error) -> Self {
        DartsError::Encode(e.to_string())
    }
}
