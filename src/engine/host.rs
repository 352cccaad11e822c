//! Authoritative match host.
//!
//! A single tokio task owns every live match. Callers talk to it through a
//! cloneable [`HostHandle`] that sends [`HostCommand`]s over an mpsc channel
//! and waits on a oneshot reply, so submissions to a match are applied one at
//! a time no matter how many clients hold a handle.
//!
//! The second half of this module is the line protocol used by the
//! `darts-engine` binary: one JSON [`Request`] per input line, one JSON
//! [`Response`] per output line.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::engine::config::HostConfig;
use crate::engine::dart::Dart;
use crate::engine::error::DartsError;
use crate::engine::models::MatchPlayer;
use crate::engine::orchestrator::{DynMatch, MatchSnapshot, TurnReport};
use crate::games::{VariantInfo, VariantRegistry};

pub type MatchId = String;

type Reply<T> = oneshot::Sender<Result<T, DartsError>>;

pub enum HostCommand {
    CreateMatch {
        match_id: MatchId,
        variant: String,
        players: Vec<MatchPlayer>,
        options: serde_json::Value,
        reply: Reply<MatchSnapshot>,
    },
    SubmitTurn {
        match_id: MatchId,
        darts: Vec<Dart>,
        reply: Reply<TurnReport>,
    },
    UndoTurn {
        match_id: MatchId,
        reply: Reply<MatchSnapshot>,
    },
    Snapshot {
        match_id: MatchId,
        reply: Reply<MatchSnapshot>,
    },
    DropMatch {
        match_id: MatchId,
        reply: Reply<()>,
    },
    ListVariants {
        reply: oneshot::Sender<Vec<VariantInfo>>,
    },
}

/// Owns the variant registry and the live matches.
pub struct MatchHost {
    registry: VariantRegistry,
    matches: HashMap<MatchId, Box<dyn DynMatch>>,
    max_matches: usize,
}

impl MatchHost {
    pub fn new(registry: VariantRegistry, config: &HostConfig) -> Self {
        Self {
            registry,
            matches: HashMap::new(),
            max_matches: config.max_matches,
        }
    }

    /// Move the host onto its own task and return a handle to it. The task
    /// exits once every handle has been dropped.
    pub fn spawn(registry: VariantRegistry, config: &HostConfig) -> (HostHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(config.channel_capacity.max(1));
        let mut host = Self::new(registry, config);
        let task = tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                host.handle(cmd);
            }
            tracing::debug!(matches = host.matches.len(), "match host stopped");
        });
        (HostHandle { tx }, task)
    }

    pub fn live_matches(&self) -> usize {
        self.matches.len()
    }

    /// Apply one command. Replies are best-effort: a caller that gave up
    /// waiting does not affect the host.
    pub fn handle(&mut self, cmd: HostCommand) {
        match cmd {
            HostCommand::CreateMatch {
                match_id,
                variant,
                players,
                options,
                reply,
            } => {
                let _ = reply.send(self.create_match(match_id, &variant, players, &options));
            }
            HostCommand::SubmitTurn {
                match_id,
                darts,
                reply,
            } => {
                let result = self.get_mut(&match_id).and_then(|m| m.submit_darts(&darts));
                match &result {
                    Ok(report) if report.verdict.is_terminal() => {
                        tracing::info!(
                            match_id = %match_id,
                            winners = ?report.verdict.winners(),
                            reason = report.verdict.reason(),
                            "match finished"
                        );
                    }
                    Err(e) => {
                        tracing::debug!(match_id = %match_id, error = %e, "turn rejected");
                    }
                    _ => {}
                }
                let _ = reply.send(result);
            }
            HostCommand::UndoTurn { match_id, reply } => {
                let result = self.get_mut(&match_id).and_then(|m| m.undo_last_turn());
                let _ = reply.send(result);
            }
            HostCommand::Snapshot { match_id, reply } => {
                let result = self
                    .matches
                    .get(&match_id)
                    .ok_or_else(|| DartsError::UnknownMatch(match_id.clone()))
                    .and_then(|m| m.snapshot());
                let _ = reply.send(result);
            }
            HostCommand::DropMatch { match_id, reply } => {
                let result = match self.matches.remove(&match_id) {
                    Some(_) => {
                        tracing::info!(match_id = %match_id, "match dropped");
                        Ok(())
                    }
                    None => Err(DartsError::UnknownMatch(match_id)),
                };
                let _ = reply.send(result);
            }
            HostCommand::ListVariants { reply } => {
                let _ = reply.send(self.registry.list_variants());
            }
        }
    }

    fn get_mut(&mut self, match_id: &str) -> Result<&mut Box<dyn DynMatch>, DartsError> {
        self.matches
            .get_mut(match_id)
            .ok_or_else(|| DartsError::UnknownMatch(match_id.to_string()))
    }

    fn create_match(
        &mut self,
        match_id: MatchId,
        variant: &str,
        players: Vec<MatchPlayer>,
        options: &serde_json::Value,
    ) -> Result<MatchSnapshot, DartsError> {
        if match_id.is_empty() {
            return Err(DartsError::InvalidSetup("match id must not be empty".into()));
        }
        if self.matches.contains_key(&match_id) {
            return Err(DartsError::InvalidSetup(format!("match `{match_id}` already exists")));
        }
        if self.matches.len() >= self.max_matches {
            return Err(DartsError::InvalidSetup(format!(
                "host already holds {} matches",
                self.max_matches
            )));
        }
        let m = self.registry.create_match(variant, players, options)?;
        let snapshot = m.snapshot()?;
        tracing::info!(
            match_id = %match_id,
            variant = variant,
            players = snapshot.players.len(),
            "match created"
        );
        self.matches.insert(match_id, m);
        Ok(snapshot)
    }
}

/// Cloneable client side of a running [`MatchHost`].
#[derive(Clone)]
pub struct HostHandle {
    tx: mpsc::Sender<HostCommand>,
}

impl HostHandle {
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> HostCommand) -> Result<T, DartsError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| DartsError::HostUnavailable)?;
        rx.await.map_err(|_| DartsError::HostUnavailable)?
    }

    pub async fn create_match(
        &self,
        match_id: impl Into<MatchId>,
        variant: impl Into<String>,
        players: Vec<MatchPlayer>,
        options: serde_json::Value,
    ) -> Result<MatchSnapshot, DartsError> {
        let match_id = match_id.into();
        let variant = variant.into();
        self.call(|reply| HostCommand::CreateMatch {
            match_id,
            variant,
            players,
            options,
            reply,
        })
        .await
    }

    pub async fn submit_turn(
        &self,
        match_id: impl Into<MatchId>,
        darts: Vec<Dart>,
    ) -> Result<TurnReport, DartsError> {
        let match_id = match_id.into();
        self.call(|reply| HostCommand::SubmitTurn {
            match_id,
            darts,
            reply,
        })
        .await
    }

    pub async fn undo_turn(&self, match_id: impl Into<MatchId>) -> Result<MatchSnapshot, DartsError> {
        let match_id = match_id.into();
        self.call(|reply| HostCommand::UndoTurn { match_id, reply }).await
    }

    pub async fn snapshot(&self, match_id: impl Into<MatchId>) -> Result<MatchSnapshot, DartsError> {
        let match_id = match_id.into();
        self.call(|reply| HostCommand::Snapshot { match_id, reply }).await
    }

    pub async fn drop_match(&self, match_id: impl Into<MatchId>) -> Result<(), DartsError> {
        let match_id = match_id.into();
        self.call(|reply| HostCommand::DropMatch { match_id, reply }).await
    }

    pub async fn list_variants(&self) -> Result<Vec<VariantInfo>, DartsError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HostCommand::ListVariants { reply })
            .await
            .map_err(|_| DartsError::HostUnavailable)?;
        rx.await.map_err(|_| DartsError::HostUnavailable)
    }
}

// ---------------------------------------------------------------------------
// Line protocol
// ---------------------------------------------------------------------------

/// A dart as sent by a client: board notation (`"T20"`), raw numbers, or the
/// tagged form the engine itself serializes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDart {
    Notation(String),
    Parts { segment: u8, multiplier: u8 },
    Typed(Dart),
}

impl RawDart {
    pub fn into_dart(self) -> Result<Dart, DartsError> {
        let dart = match self {
            RawDart::Notation(s) => s.parse()?,
            RawDart::Parts {
                segment,
                multiplier,
            } => Dart::from_raw(segment, multiplier)?,
            RawDart::Typed(dart) => dart,
        };
        dart.validate()?;
        Ok(dart)
    }
}

/// Roster entry on the wire. A missing `order` falls back to list position.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    ListVariants,
    CreateMatch {
        match_id: MatchId,
        variant: String,
        players: Vec<PlayerSpec>,
        #[serde(default)]
        options: serde_json::Value,
    },
    SubmitTurn {
        match_id: MatchId,
        darts: Vec<RawDart>,
    },
    UndoTurn {
        match_id: MatchId,
    },
    Snapshot {
        match_id: MatchId,
    },
    DropMatch {
        match_id: MatchId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ok { ok: bool, data: serde_json::Value },
    Error { ok: bool, error: String, fatal: bool },
}

impl Response {
    pub fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Response::Ok { ok: true, data },
            Err(e) => Response::from(DartsError::from(e)),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}

impl From<DartsError> for Response {
    fn from(e: DartsError) -> Self {
        Response::Error {
            ok: false,
            fatal: e.is_fatal(),
            error: e.to_string(),
        }
    }
}

fn into_response<T: Serialize>(result: Result<T, DartsError>) -> Response {
    match result {
        Ok(data) => Response::ok(&data),
        Err(e) => Response::from(e),
    }
}

fn roster_from_specs(players: Vec<PlayerSpec>) -> Vec<MatchPlayer> {
    players
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let name = p.name.unwrap_or_else(|| p.id.clone());
            MatchPlayer::new(p.id, name, p.order.unwrap_or(i as u32))
        })
        .collect()
}

/// Parse one protocol line. Malformed input becomes an error response rather
/// than a failure of the session.
pub fn parse_request(line: &str) -> Result<Request, Response> {
    serde_json::from_str(line)
        .map_err(|e| Response::from(DartsError::Encode(format!("bad request: {e}"))))
}

pub async fn handle_request(host: &HostHandle, request: Request) -> Response {
    match request {
        Request::ListVariants => into_response(host.list_variants().await),
        Request::CreateMatch {
            match_id,
            variant,
            players,
            options,
        } => into_response(
            host.create_match(match_id, variant, roster_from_specs(players), options)
                .await,
        ),
        Request::SubmitTurn { match_id, darts } => {
            let darts: Result<Vec<Dart>, DartsError> =
                darts.into_iter().map(RawDart::into_dart).collect();
            match darts {
                Ok(darts) => into_response(host.submit_turn(match_id, darts).await),
                Err(e) => Response::from(e),
            }
        }
        Request::UndoTurn { match_id } => into_response(host.undo_turn(match_id).await),
        Request::Snapshot { match_id } => into_response(host.snapshot(match_id).await),
        Request::DropMatch { match_id } => {
            into_response(host.drop_match(match_id).await.map(|()| serde_json::json!({})))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::Verdict;

    fn roster() -> Vec<MatchPlayer> {
        vec![MatchPlayer::new("a", "Alice", 0), MatchPlayer::new("b", "Bob", 1)]
    }

    fn host(max_matches: usize) -> MatchHost {
        MatchHost::new(
            VariantRegistry::default(),
            &HostConfig {
                channel_capacity: 4,
                max_matches,
            },
        )
    }

    fn create(host: &mut MatchHost, id: &str) -> Result<MatchSnapshot, DartsError> {
        let (reply, mut rx) = oneshot::channel();
        host.handle(HostCommand::CreateMatch {
            match_id: id.into(),
            variant: "cricket".into(),
            players: roster(),
            options: serde_json::Value::Null,
            reply,
        });
        rx.try_recv().unwrap()
    }

    #[test]
    fn test_create_and_limits() {
        let mut h = host(1);
        let snapshot = create(&mut h, "m1").unwrap();
        assert_eq!(snapshot.current_player.as_deref(), Some("a"));
        assert_eq!(h.live_matches(), 1);
        assert!(matches!(create(&mut h, "m1"), Err(DartsError::InvalidSetup(_))));
        assert!(matches!(create(&mut h, "m2"), Err(DartsError::InvalidSetup(_))));
        assert!(matches!(create(&mut h, ""), Err(DartsError::InvalidSetup(_))));
    }

    #[test]
    fn test_unknown_match() {
        let mut h = host(4);
        let (reply, mut rx) = oneshot::channel();
        h.handle(HostCommand::SubmitTurn {
            match_id: "ghost".into(),
            darts: vec![Dart::Miss],
            reply,
        });
        assert_eq!(
            rx.try_recv().unwrap().unwrap_err(),
            DartsError::UnknownMatch("ghost".into())
        );
    }

    #[test]
    fn test_raw_dart_forms() {
        let parsed: Vec<RawDart> = serde_json::from_str(
            r#"["t20", {"segment": 25, "multiplier": 2}, {"kind": "miss"}, {"segment": 0, "multiplier": 0}]"#,
        )
        .unwrap();
        let darts: Vec<Dart> = parsed.into_iter().map(|d| d.into_dart().unwrap()).collect();
        assert_eq!(darts, vec![Dart::triple(20), Dart::double(25), Dart::Miss, Dart::Miss]);

        assert!(RawDart::Notation("T25".into()).into_dart().is_err());
        assert!(RawDart::Parts { segment: 21, multiplier: 1 }.into_dart().is_err());
    }

    #[test]
    fn test_parse_request() {
        let req = parse_request(
            r#"{"cmd": "create_match", "match_id": "m", "variant": "clock", "players": [{"id": "x"}, {"id": "y"}]}"#,
        )
        .unwrap();
        match req {
            Request::CreateMatch { players, options, .. } => {
                let roster = roster_from_specs(players);
                assert_eq!(roster[1], MatchPlayer::new("y", "y", 1));
                assert!(options.is_null());
            }
            other => panic!("unexpected request {other:?}"),
        }

        let bad = parse_request("{\"cmd\": \"launch\"}").unwrap_err();
        assert!(!bad.is_ok());
    }

    #[test]
    fn test_error_response_shape() {
        let resp = Response::from(DartsError::StateCorrupted("boom".into()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["fatal"], true);

        let ok = serde_json::to_value(Response::ok(&Verdict::Continue)).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["data"]["kind"], "continue");
    }
}
