//! End-to-end command tests against a mock backend

use juke_cli::{run_once, Action, CliError};
use juke_client::{ClientConfig, JukeClient};
use juke_core::GatewayErrorKind;
use juke_playback::{PlaybackEngine, PlaybackError, SessionStore, SyncConfig};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATE_PATH: &str = "/api/v1/playback/state/";

fn state_body(track_id: &str, is_playing: bool) -> serde_json::Value {
    json!({
        "provider": "spotify",
        "is_playing": is_playing,
        "progress_ms": 30000,
        "track": {
            "id": track_id,
            "uri": format!("spotify:track:{}", track_id),
            "name": "Song",
            "duration_ms": 200000,
            "artists": [{"name": "Artist"}]
        },
        "device": {"id": "dev-1", "name": "Kitchen", "is_active": true}
    })
}

fn engine_for(server: &MockServer, session: SessionStore) -> PlaybackEngine {
    let client = JukeClient::new(ClientConfig::new(server.uri())).unwrap();
    let config = SyncConfig {
        settle_delay_ms: 50,
        ..SyncConfig::default()
    };
    PlaybackEngine::new(Arc::new(client), Arc::new(session), config)
}

fn signed_in() -> SessionStore {
    SessionStore::with_token("cli-token")
}

#[tokio::test]
async fn test_status_reports_remote_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .and(header("authorization", "Token cli-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body("abc", true)))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server, signed_in());
    let report = run_once(&engine, Action::Status).await.unwrap();

    assert!(report.is_playing);
    assert_eq!(report.provider, "spotify");
    assert_eq!(report.progress_ms, 30_000);
    assert_eq!(report.duration_ms, Some(200_000));
    assert_eq!(report.track.unwrap().name, "Song");
    assert!(report.can_control);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_status_surfaces_backend_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})))
        .mount(&server)
        .await;

    let engine = engine_for(&server, signed_in());
    let err = run_once(&engine, Action::Status).await.unwrap_err();

    match err {
        CliError::Playback(PlaybackError::Gateway { kind, message }) => {
            assert_eq!(kind, GatewayErrorKind::Unauthorized);
            assert_eq!(message, "Invalid token.");
        }
        other => panic!("Expected gateway error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_pause_targets_active_device_and_waits_for_settle() {
    let server = MockServer::start().await;

    // First read sees the session playing, the settle refresh sees it paused
    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body("abc", true)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body("abc", false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/playback/pause/"))
        .and(body_json(json!({"provider": "spotify", "device_id": "dev-1"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server, signed_in());
    let report = run_once(&engine, Action::Pause).await.unwrap();

    assert!(!report.is_playing);
    assert_eq!(report.device.unwrap().id.as_deref(), Some("dev-1"));
}

#[tokio::test]
async fn test_play_reports_the_confirmed_track() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body("xyz", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/playback/play/"))
        .and(body_json(json!({
            "provider": "spotify",
            "context_uri": "spotify:album:a1",
            "offset_uri": "spotify:track:xyz"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server, signed_in());
    let action = Action::Play {
        track: "xyz".into(),
        context_uri: Some("spotify:album:a1".into()),
        provider: None,
    };
    let report = run_once(&engine, action).await.unwrap();

    assert!(report.is_playing);
    assert_eq!(
        report.track.and_then(|t| t.uri).as_deref(),
        Some("spotify:track:xyz")
    );
}

#[tokio::test]
async fn test_failed_play_restores_previous_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body("abc", false)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/playback/play/"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"detail": "Provider unavailable"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server, signed_in());
    let action = Action::Play {
        track: "spotify:track:xyz".into(),
        context_uri: None,
        provider: None,
    };
    let err = run_once(&engine, action).await.unwrap_err();

    assert_eq!(err.to_string(), "Playback error: Provider unavailable");
    let snapshot = engine.snapshot();
    assert!(!snapshot.is_playing());
    assert_eq!(
        snapshot.active_track_uri().as_deref(),
        Some("spotify:track:abc")
    );
}

#[tokio::test]
async fn test_signed_out_controls_never_reach_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server, SessionStore::new());
    let err = run_once(&engine, Action::Next).await.unwrap_err();

    assert!(matches!(
        err,
        CliError::Playback(PlaybackError::Unauthenticated)
    ));
}
