//! Drive the match host over its handle and its JSON line protocol.
//!
//! Run with:
//!     cargo test --test host_roundtrip

use darts_engine::engine::config::{EngineConfig, HostConfig};
use darts_engine::engine::dart::Dart;
use darts_engine::engine::error::DartsError;
use darts_engine::engine::host::{handle_request, parse_request, HostHandle, MatchHost};
use darts_engine::engine::models::{MatchPlayer, Verdict};
use darts_engine::games::VariantRegistry;

fn spawn_host() -> HostHandle {
    let (handle, _task) = MatchHost::spawn(VariantRegistry::default(), &HostConfig::default());
    handle
}

fn make_players() -> Vec<MatchPlayer> {
    vec![
        MatchPlayer::new("alice", "Alice", 0),
        MatchPlayer::new("bob", "Bob", 1),
    ]
}

async fn send(host: &HostHandle, line: &str) -> serde_json::Value {
    let response = match parse_request(line) {
        Ok(request) => handle_request(host, request).await,
        Err(response) => response,
    };
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn test_handle_full_shanghai_match() {
    let host = spawn_host();
    let options = serde_json::json!({"start_number": 10, "round_count": 2});
    let snapshot = host
        .create_match("m1", "shanghai", make_players(), options)
        .await
        .unwrap();
    assert_eq!(snapshot.variant, "shanghai");
    assert_eq!(snapshot.current_player.as_deref(), Some("alice"));

    host.submit_turn("m1", vec![Dart::triple(10)]).await.unwrap();
    host.submit_turn("m1", vec![Dart::single(10)]).await.unwrap();
    host.submit_turn("m1", vec![Dart::Miss]).await.unwrap();
    let report = host.submit_turn("m1", vec![Dart::double(11)]).await.unwrap();

    assert_eq!(report.verdict, Verdict::Winner("bob".into()));
    assert!(report.next_player.is_none());
    let result = report.result.unwrap();
    assert_eq!(result.rounds_played, 2);
    assert_eq!(result.final_state["players"]["bob"]["total_score"], 32);

    // Finished matches stay queryable until dropped.
    let snapshot = host.snapshot("m1").await.unwrap();
    assert!(snapshot.verdict.is_terminal());
    assert_eq!(
        host.submit_turn("m1", vec![Dart::Miss]).await.unwrap_err(),
        DartsError::MatchOver
    );
    host.drop_match("m1").await.unwrap();
    assert_eq!(
        host.snapshot("m1").await.unwrap_err(),
        DartsError::UnknownMatch("m1".into())
    );
}

#[tokio::test]
async fn test_concurrent_clients_share_one_match() {
    let host = spawn_host();
    host.create_match("shared", "cricket", make_players(), serde_json::Value::Null)
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let h = host.clone();
        tasks.push(tokio::spawn(async move {
            h.submit_turn("shared", vec![Dart::single(20)]).await
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    let snapshot = host.snapshot("shared").await.unwrap();
    assert_eq!(snapshot.turns_played, 10);
    assert_eq!(snapshot.round, 5);
    assert_eq!(snapshot.state["players"]["alice"]["marks"]["20"], 3);
}

#[tokio::test]
async fn test_undo_through_handle() {
    let host = spawn_host();
    host.create_match("u", "clock", make_players(), serde_json::json!({"include_bull": false}))
        .await
        .unwrap();
    assert_eq!(host.undo_turn("u").await.unwrap_err(), DartsError::NothingToUndo);

    host.submit_turn("u", vec![Dart::single(1), Dart::single(2)]).await.unwrap();
    let snapshot = host.undo_turn("u").await.unwrap();
    assert_eq!(snapshot.turns_played, 0);
    assert_eq!(snapshot.current_player.as_deref(), Some("alice"));
    assert_eq!(snapshot.state["players"]["alice"]["progress_index"], 0);
}

#[tokio::test]
async fn test_line_protocol() {
    let host = spawn_host();

    let variants = send(&host, r#"{"cmd": "list_variants"}"#).await;
    assert_eq!(variants["ok"], true);
    assert_eq!(variants["data"].as_array().unwrap().len(), 3);

    let created = send(
        &host,
        r#"{"cmd": "create_match", "match_id": "p", "variant": "cricket",
            "players": [{"id": "x", "name": "Xavi"}, {"id": "y"}]}"#,
    )
    .await;
    assert_eq!(created["ok"], true);
    assert_eq!(created["data"]["current_player"], "x");

    let turn = send(
        &host,
        r#"{"cmd": "submit_turn", "match_id": "p", "darts": ["T20", {"segment": 20, "multiplier": 1}, "M"]}"#,
    )
    .await;
    assert_eq!(turn["ok"], true);
    assert_eq!(turn["data"]["next_player"], "y");
    assert_eq!(turn["data"]["state"]["players"]["x"]["points"], 20);

    let bad_dart = send(
        &host,
        r#"{"cmd": "submit_turn", "match_id": "p", "darts": ["T25"]}"#,
    )
    .await;
    assert_eq!(bad_dart["ok"], false);
    assert_eq!(bad_dart["fatal"], false);

    let too_many = send(
        &host,
        r#"{"cmd": "submit_turn", "match_id": "p", "darts": ["M", "M", "M", "M"]}"#,
    )
    .await;
    assert_eq!(too_many["ok"], false);

    let unknown = send(&host, r#"{"cmd": "snapshot", "match_id": "nope"}"#).await;
    assert_eq!(unknown["ok"], false);

    let garbage = send(&host, "not json").await;
    assert_eq!(garbage["ok"], false);
}

#[tokio::test]
async fn test_host_survives_oversized_shanghai_options() {
    let host = spawn_host();
    host.create_match("live", "cricket", make_players(), serde_json::Value::Null)
        .await
        .unwrap();

    let rejected = send(
        &host,
        r#"{"cmd": "create_match", "match_id": "big", "variant": "shanghai",
            "players": [{"id": "x"}], "options": {"start_number": 2, "round_count": 4294967295}}"#,
    )
    .await;
    assert_eq!(rejected["ok"], false);
    assert_eq!(rejected["fatal"], false);

    let variants = send(&host, r#"{"cmd": "list_variants"}"#).await;
    assert_eq!(variants["ok"], true);
    assert_eq!(
        host.snapshot("big").await.unwrap_err(),
        DartsError::UnknownMatch("big".into())
    );
    host.submit_turn("live", vec![Dart::single(20)]).await.unwrap();
}

#[tokio::test]
async fn test_config_limits_live_matches() {
    let mut config = EngineConfig::default();
    config.host.max_matches = 1;
    let (host, _task) = MatchHost::spawn(VariantRegistry::with_defaults(&config), &config.host);

    host.create_match("one", "cricket", make_players(), serde_json::Value::Null)
        .await
        .unwrap();
    let err = host
        .create_match("two", "cricket", make_players(), serde_json::Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, DartsError::InvalidSetup(_)));

    host.drop_match("one").await.unwrap();
    host.create_match("two", "cricket", make_players(), serde_json::Value::Null)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_closed_host_reports_unavailable() {
    let (host, task) = MatchHost::spawn(VariantRegistry::default(), &HostConfig::default());
    task.abort();
    let _ = task.await;
    assert_eq!(
        host.list_variants().await.unwrap_err(),
        DartsError::HostUnavailable
    );
}
