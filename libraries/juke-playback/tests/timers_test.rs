//! Ticker, poll cadence and session lifecycle tests on a paused clock

mod common;

use common::*;
use juke_playback::{PlaybackEvent, StateOrigin};

// ===== Local Progress Ticker =====

#[tokio::test(start_paused = true)]
async fn ticker_advances_progress_once_per_second_while_playing() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 10_000, true)));
    h.engine.refresh().await.unwrap();

    advance_ms(1_001).await;
    assert_eq!(h.engine.state().unwrap().progress_ms, 1_000);

    advance_ms(3_000).await;
    assert_eq!(h.engine.state().unwrap().progress_ms, 4_000);
}

#[tokio::test(start_paused = true)]
async fn ticker_never_passes_duration() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 2_500, true)));
    h.engine.refresh().await.unwrap();

    advance_ms(5_001).await;

    let state = h.engine.state().unwrap();
    assert_eq!(state.progress_ms, 2_500);
    assert!(state.is_playing);
}

#[tokio::test(start_paused = true)]
async fn ticker_stops_when_paused() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 10_000, true)));
    h.engine.refresh().await.unwrap();
    advance_ms(2_001).await;

    h.gateway.set_remote(Some(remote_state("x:1", 2_100, 10_000, false)));
    h.engine.refresh().await.unwrap();
    advance_ms(5_000).await;

    assert_eq!(h.engine.state().unwrap().progress_ms, 2_100);
}

#[tokio::test(start_paused = true)]
async fn ticker_builds_on_reconciled_progress() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, true)));
    h.engine.refresh().await.unwrap();
    advance_ms(1_500).await;
    assert_eq!(h.engine.state().unwrap().progress_ms, 1_000);

    // A reconciliation lands between ticks
    h.gateway.set_remote(Some(remote_state("x:1", 50_000, 100_000, true)));
    h.engine.refresh().await.unwrap();
    advance_ms(501).await;

    assert_eq!(h.engine.state().unwrap().progress_ms, 51_000);
}

#[tokio::test(start_paused = true)]
async fn ticks_publish_position_updates() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 10_000, true)));
    h.engine.refresh().await.unwrap();
    let mut events = h.engine.events();

    advance_ms(1_001).await;

    assert_eq!(
        events.try_recv().unwrap(),
        PlaybackEvent::PositionUpdate {
            progress_ms: 1_000,
            duration_ms: Some(10_000),
        }
    );
}

// ===== Reconciliation Poller =====

#[tokio::test(start_paused = true)]
async fn poll_cadence_follows_playing_flag() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 10_000, 200_000, false)));

    h.engine.start().await.unwrap();
    assert_eq!(h.gateway.fetch_count(), 1);

    // Idle cadence
    advance_ms(11_999).await;
    assert_eq!(h.gateway.fetch_count(), 1);
    advance_ms(2).await;
    assert_eq!(h.gateway.fetch_count(), 2);

    // Another device starts playback
    h.gateway.set_remote(Some(remote_state("x:1", 10_000, 200_000, true)));
    h.engine.refresh().await.unwrap();
    assert_eq!(h.gateway.fetch_count(), 3);

    // Ticker resumes right away
    advance_ms(1_001).await;
    assert_eq!(h.engine.state().unwrap().progress_ms, 11_000);

    // Playing cadence, counted from the flip
    advance_ms(4_998).await;
    assert_eq!(h.gateway.fetch_count(), 3);
    advance_ms(2).await;
    assert_eq!(h.gateway.fetch_count(), 4);

    advance_ms(6_000).await;
    assert_eq!(h.gateway.fetch_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn start_while_playing_polls_every_six_seconds() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 600_000, true)));

    h.engine.start().await.unwrap();
    advance_ms(18_001).await;

    assert_eq!(h.gateway.fetch_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn poll_failure_keeps_polling() {
    let h = signed_in();
    h.engine.start().await.unwrap();

    h.gateway
        .fail_fetches(Some(juke_core::GatewayError::network("offline")));
    advance_ms(12_001).await;
    assert_eq!(h.gateway.fetch_count(), 2);
    assert!(h.engine.last_error().is_some());

    h.gateway.fail_fetches(None);
    advance_ms(12_000).await;
    assert_eq!(h.gateway.fetch_count(), 3);
    assert!(h.engine.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn start_twice_runs_one_poller() {
    let h = signed_in();
    h.engine.start().await.unwrap();
    h.engine.start().await.unwrap();
    assert_eq!(h.gateway.fetch_count(), 2);

    advance_ms(12_001).await;
    assert_eq!(h.gateway.fetch_count(), 3);
}

// ===== Session Lifecycle =====

#[tokio::test(start_paused = true)]
async fn start_signed_out_does_nothing() {
    let h = signed_out();
    h.engine.start().await.unwrap();

    advance_ms(60_000).await;

    assert_eq!(h.gateway.fetch_count(), 0);
    assert!(h.engine.state().is_none());
}

#[tokio::test(start_paused = true)]
async fn sign_out_tears_down_timers_and_state() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, true)));
    h.engine.start().await.unwrap();
    let mut events = h.engine.events();

    h.session.sign_out();
    h.engine.sync_session().await.unwrap();

    let snapshot = h.engine.snapshot();
    assert!(snapshot.state.is_none());
    assert!(snapshot.error.is_none());
    assert!(!snapshot.is_busy);
    assert!(!snapshot.can_control);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&PlaybackEvent::StateReplaced {
        origin: StateOrigin::SignedOut
    }));
    assert_eq!(seen.last(), Some(&PlaybackEvent::SessionEnded));

    // No ticks, no polls
    advance_ms(60_000).await;
    assert_eq!(h.gateway.fetch_count(), 1);
    assert!(h.engine.state().is_none());
}

#[tokio::test(start_paused = true)]
async fn sign_in_again_restarts_cleanly() {
    let h = signed_in();
    h.engine.start().await.unwrap();
    h.session.sign_out();
    h.engine.sync_session().await.unwrap();

    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, false)));
    h.session.sign_in("next-token");
    h.engine.sync_session().await.unwrap();
    assert_eq!(h.gateway.fetch_count(), 2);
    assert!(h.engine.state().is_some());

    advance_ms(12_001).await;
    assert_eq!(h.gateway.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn follow_session_reacts_to_sign_out_and_in() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, false)));
    h.engine.follow_session(&h.session);
    h.engine.start().await.unwrap();
    assert!(h.engine.state().is_some());

    h.session.sign_out();
    yield_to_tasks().await;
    assert!(h.engine.state().is_none());
    assert!(!h.engine.can_control());

    h.session.sign_in("fresh");
    yield_to_tasks().await;
    assert!(h.engine.state().is_some());
    assert_eq!(h.gateway.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn token_rotation_starts_a_new_session() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, false)));
    h.engine.start().await.unwrap();
    let mut events = h.engine.events();

    h.session.sign_in("rotated");
    h.engine.sync_session().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&PlaybackEvent::SessionEnded));
    assert!(h.engine.state().is_some());
    assert_eq!(h.gateway.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn response_from_ended_session_is_dropped() {
    let h = signed_in();
    h.engine.start().await.unwrap();

    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, true)));
    h.gateway.hold_fetches();
    let engine = h.engine.clone();
    let refresh = tokio::spawn(async move { engine.refresh().await });
    yield_to_tasks().await;

    h.session.sign_out();
    h.engine.sync_session().await.unwrap();
    h.gateway.release_fetches();
    refresh.await.unwrap().unwrap();

    assert!(h.engine.state().is_none());
}

#[tokio::test(start_paused = true)]
async fn sign_out_mid_control_clears_busy() {
    let h = signed_in();
    h.engine.start().await.unwrap();
    h.gateway.hold_controls();

    let engine = h.engine.clone();
    let pause = tokio::spawn(async move { engine.pause().await });
    yield_to_tasks().await;
    assert!(h.engine.is_busy());

    h.session.sign_out();
    h.engine.sync_session().await.unwrap();
    assert!(!h.engine.is_busy());

    h.gateway.release_controls();
    pause.await.unwrap().unwrap();
    assert!(!h.engine.is_busy());
    assert!(h.engine.state().is_none());

    // No settle refresh for the ended session
    advance_ms(2_000).await;
    assert_eq!(h.gateway.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_background_work() {
    let h = signed_in();
    h.gateway.set_remote(Some(remote_state("x:1", 0, 100_000, true)));
    h.engine.start().await.unwrap();

    h.engine.shutdown();
    advance_ms(30_001).await;

    assert_eq!(h.gateway.fetch_count(), 1);
    // State is kept
    assert_eq!(h.engine.state().unwrap().progress_ms, 0);
}
