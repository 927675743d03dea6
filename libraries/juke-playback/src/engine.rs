//! Playback synchronization engine
//!
//! Owns the single live `PlaybackState` and every writer of it. All writes go
//! through [`EngineCore::assign`], which also keeps the ticker and poll cadence
//! in step with the playing flag and publishes the new snapshot.

use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, StateOrigin};
use crate::optimistic::{self, IntentGuard, IntentTarget};
use crate::session::SessionStore;
use crate::snapshot::PlaybackSnapshot;
use crate::types::{LifecycleEvent, PlayContextOptions, PlayTrackOptions, SyncConfig};
use crate::{poller, ticker};
use juke_core::{
    ControlRequest, PlaybackState, ProviderName, RemoteControlGateway, SessionSource, Track,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Control verbs sent through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlVerb {
    Play,
    Resume,
    Pause,
    Next,
    Previous,
    Seek,
}

impl ControlVerb {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Resume => "resume",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Seek => "seek",
        }
    }

    pub(crate) async fn call(
        self,
        gateway: &dyn RemoteControlGateway,
        auth_token: &str,
        request: &ControlRequest,
    ) -> juke_core::Result<Option<PlaybackState>> {
        match self {
            Self::Play | Self::Resume => gateway.play(auth_token, request).await,
            Self::Pause => gateway.pause(auth_token, request).await,
            Self::Next => gateway.next(auth_token, request).await,
            Self::Previous => gateway.previous(auth_token, request).await,
            Self::Seek => gateway.seek(auth_token, request).await,
        }
    }
}

/// Mutable engine state, guarded by one mutex
pub(crate) struct EngineState {
    pub(crate) state: Option<PlaybackState>,
    /// Provider to use while no state names one
    pub(crate) active_provider: ProviderName,
    pub(crate) error: Option<PlaybackError>,
    /// User-blocking control calls in flight
    pub(crate) in_flight: usize,
    pub(crate) intent: IntentGuard,
    /// Bumped whenever a session starts or ends
    pub(crate) session_epoch: u64,
    pub(crate) session_token: Option<String>,
}

impl EngineState {
    pub(crate) fn current_provider(&self) -> ProviderName {
        self.state
            .as_ref()
            .map_or_else(|| self.active_provider.clone(), |s| s.provider.clone())
    }

    fn is_playing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_playing)
    }
}

#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
    settle: Vec<JoinHandle<()>>,
    session_listener: Option<JoinHandle<()>>,
}

impl Tasks {
    /// Abort everything tied to a session
    fn abort_timers(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
        for handle in self.settle.drain(..) {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_timers();
        if let Some(handle) = self.session_listener.take() {
            handle.abort();
        }
    }
}

pub(crate) struct EngineCore {
    self_ref: Weak<EngineCore>,
    pub(crate) gateway: Arc<dyn RemoteControlGateway>,
    pub(crate) session: Arc<dyn SessionSource>,
    pub(crate) config: SyncConfig,
    store: Mutex<EngineState>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
    tasks: Mutex<Tasks>,
    cadence: Arc<Notify>,
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawn onto the current tokio runtime, if there is one
pub(crate) fn spawn_task<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(future)),
        Err(_) => {
            warn!("No tokio runtime available; background task not started");
            None
        }
    }
}

impl EngineCore {
    pub(crate) fn lock_store(&self) -> MutexGuard<'_, EngineState> {
        lock(&self.store)
    }

    pub(crate) fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events_tx.send(event);
    }

    pub(crate) fn publish(&self, store: &EngineState) {
        self.snapshot_tx.send_replace(PlaybackSnapshot {
            state: store.state.clone(),
            provider: store.current_provider(),
            error: store.error.clone(),
            is_busy: store.in_flight > 0,
            can_control: self.session.is_authenticated(),
        });
    }

    pub(crate) fn current_provider(&self) -> ProviderName {
        self.lock_store().current_provider()
    }

    // ===== State Assignment =====

    /// The single point where the live state is replaced
    pub(crate) fn assign(
        &self,
        store: &mut EngineState,
        next: Option<PlaybackState>,
        origin: StateOrigin,
    ) {
        let next = next.map(PlaybackState::clamped);
        if let Some(state) = &next {
            store.active_provider = state.provider.clone();
        }

        let was_playing = store.is_playing();
        let previous_track_uri = store.state.as_ref().and_then(PlaybackState::track_uri);
        store.state = next;
        let is_playing = store.is_playing();
        let track_uri = store.state.as_ref().and_then(PlaybackState::track_uri);

        match (origin, &store.state) {
            (StateOrigin::Tick, Some(state)) => self.emit(PlaybackEvent::PositionUpdate {
                progress_ms: state.progress_ms,
                duration_ms: state.duration_ms(),
            }),
            _ => self.emit(PlaybackEvent::StateReplaced { origin }),
        }

        if previous_track_uri != track_uri {
            debug!(
                track_uri = ?track_uri,
                previous = ?previous_track_uri,
                ?origin,
                "Track changed"
            );
            self.emit(PlaybackEvent::TrackChanged {
                track_uri,
                previous_track_uri,
            });
        }

        if was_playing != is_playing {
            self.emit(PlaybackEvent::PlayingChanged { is_playing });
            // Poll interval depends on the playing flag
            self.cadence.notify_one();
        }

        self.sync_ticker(is_playing);
        self.publish(store);
    }

    /// Apply a fetched or returned state unless the identity guard rejects it.
    ///
    /// `generation` is the intent generation read when the request was sent.
    pub(crate) fn reconcile(
        &self,
        store: &mut EngineState,
        incoming: Option<PlaybackState>,
        generation: u64,
        origin: StateOrigin,
    ) -> bool {
        let window = self.config.intent_guard();
        if !store
            .intent
            .admit(incoming.as_ref(), generation, window, Instant::now())
        {
            debug!(
                ?origin,
                incoming_track = ?incoming.as_ref().and_then(PlaybackState::track_uri),
                generation,
                "Discarding response that does not match the latest play"
            );
            self.emit(PlaybackEvent::ResponseDiscarded { origin });
            return false;
        }

        self.assign(store, incoming, origin);
        true
    }

    pub(crate) fn surface_error(&self, store: &mut EngineState, error: PlaybackError) {
        self.emit(PlaybackEvent::ErrorRaised {
            kind: error.kind(),
            message: error.to_string(),
        });
        store.error = Some(error);
    }

    /// Record a precondition failure without touching state
    pub(crate) fn refuse(&self, error: PlaybackError) -> Result<()> {
        debug!(kind = %error.kind(), "Playback action refused");
        let mut store = self.lock_store();
        self.surface_error(&mut store, error.clone());
        self.publish(&store);
        Err(error)
    }

    pub(crate) fn begin_busy(&self, store: &mut EngineState) {
        store.in_flight += 1;
        if store.in_flight == 1 {
            self.emit(PlaybackEvent::BusyChanged { is_busy: true });
        }
    }

    pub(crate) fn end_busy(&self, store: &mut EngineState, session_epoch: u64) {
        // Teardown already reset the counter for calls from an ended session
        if store.session_epoch != session_epoch || store.in_flight == 0 {
            return;
        }
        store.in_flight -= 1;
        if store.in_flight == 0 {
            self.emit(PlaybackEvent::BusyChanged { is_busy: false });
        }
    }

    // ===== Background Tasks =====

    fn sync_ticker(&self, is_playing: bool) {
        let mut tasks = lock(&self.tasks);
        if is_playing {
            let running = tasks.ticker.as_ref().is_some_and(|h| !h.is_finished());
            if !running {
                tasks.ticker = ticker::spawn(self.self_ref.clone(), self.config.tick_interval());
            }
        } else if let Some(handle) = tasks.ticker.take() {
            handle.abort();
        }
    }

    fn ensure_poller(&self) {
        let mut tasks = lock(&self.tasks);
        let running = tasks.poller.as_ref().is_some_and(|h| !h.is_finished());
        if !running {
            debug!("Starting reconciliation poller");
            tasks.poller = poller::spawn(self.self_ref.clone(), Arc::clone(&self.cadence));
        }
    }

    pub(crate) fn poll_interval(&self) -> std::time::Duration {
        let is_playing = self.lock_store().is_playing();
        self.config.poll_interval(is_playing)
    }

    /// Advance the local position by one tick. Returns false once not playing.
    pub(crate) fn tick(&self) -> bool {
        let mut store = self.lock_store();
        let Some(state) = store.state.as_ref().filter(|s| s.is_playing) else {
            return false;
        };
        let next = state.advanced(self.config.tick_ms);
        self.assign(&mut store, Some(next), StateOrigin::Tick);
        true
    }

    /// One extra refresh after the provider has had time to settle
    pub(crate) fn schedule_settle_refresh(&self) {
        let core = self.self_ref.clone();
        let delay = self.config.settle_delay();
        let handle = spawn_task(async move {
            tokio::time::sleep(delay).await;
            let Some(core) = core.upgrade() else {
                return;
            };
            if let Err(err) = core.refresh().await {
                debug!(error = %err, "Settle refresh failed");
            }
        });

        if let Some(handle) = handle {
            let mut tasks = lock(&self.tasks);
            tasks.settle.retain(|h| !h.is_finished());
            tasks.settle.push(handle);
        }
    }

    // ===== Session =====

    pub(crate) async fn sync_session(&self) -> Result<()> {
        let Some(token) = self.session.auth_token() else {
            self.teardown();
            return Ok(());
        };

        let (changed, had_session) = {
            let store = self.lock_store();
            (
                store.session_token.as_deref() != Some(token.as_str()),
                store.session_token.is_some(),
            )
        };

        if changed {
            if had_session {
                self.teardown();
            }
            let mut store = self.lock_store();
            store.session_token = Some(token);
            store.session_epoch = store.session_epoch.wrapping_add(1);
            self.publish(&store);
            info!("Playback session started");
        }

        self.ensure_poller();
        self.refresh().await
    }

    /// Stop every timer and reset to the signed-out state
    pub(crate) fn teardown(&self) {
        lock(&self.tasks).abort_timers();

        let mut store = self.lock_store();
        let had_session = store.session_token.is_some()
            || store.state.is_some()
            || store.error.is_some()
            || store.in_flight > 0;

        store.session_token = None;
        store.session_epoch = store.session_epoch.wrapping_add(1);
        store.intent.clear();
        store.error = None;
        store.active_provider = self.config.default_provider.clone();
        if store.in_flight > 0 {
            store.in_flight = 0;
            self.emit(PlaybackEvent::BusyChanged { is_busy: false });
        }

        if had_session {
            self.assign(&mut store, None, StateOrigin::SignedOut);
            self.emit(PlaybackEvent::SessionEnded);
            info!("Playback session ended");
        }
        self.publish(&store);
    }

    // ===== Reconciliation =====

    pub(crate) async fn refresh(&self) -> Result<()> {
        let Some(token) = self.session.auth_token() else {
            self.teardown();
            return Ok(());
        };

        let (provider, session_epoch, generation) = {
            let store = self.lock_store();
            (
                store.current_provider(),
                store.session_epoch,
                store.intent.generation(),
            )
        };

        debug!(provider = %provider, "Refreshing playback state");
        let result = self.gateway.fetch_state(&token, &provider).await;

        let mut store = self.lock_store();
        if store.session_epoch != session_epoch {
            debug!("Dropping refresh that belongs to an ended session");
            return Ok(());
        }

        match result {
            Ok(state) => {
                store.error = None;
                self.reconcile(&mut store, state, generation, StateOrigin::Reconciled);
                self.publish(&store);
                Ok(())
            }
            Err(err) => {
                let error = PlaybackError::from(err);
                warn!(error = %error, "Playback refresh failed, keeping last known state");
                self.surface_error(&mut store, error.clone());
                self.publish(&store);
                Err(error)
            }
        }
    }

    // ===== Control =====

    /// Transport and seek calls. State only changes if the call returns a body.
    pub(crate) async fn run_control(
        &self,
        verb: ControlVerb,
        position_ms: Option<u64>,
    ) -> Result<()> {
        let Some(token) = self.session.auth_token() else {
            return self.refuse(PlaybackError::Unauthenticated);
        };

        let (request, session_epoch, generation) = {
            let mut store = self.lock_store();
            let provider = store.current_provider();
            let device_id = store
                .state
                .as_ref()
                .and_then(PlaybackState::device_id)
                .map(str::to_string);
            let request = match position_ms {
                Some(position_ms) => ControlRequest::seek(provider, device_id, position_ms),
                None => ControlRequest::transport(provider, device_id),
            };
            store.error = None;
            self.begin_busy(&mut store);
            self.publish(&store);
            (request, store.session_epoch, store.intent.generation())
        };

        info!(
            verb = verb.as_str(),
            provider = %request.provider(),
            device_id = ?request.device_id(),
            "Sending playback control"
        );
        let result = verb.call(self.gateway.as_ref(), &token, &request).await;

        let settle = {
            let mut store = self.lock_store();
            self.end_busy(&mut store, session_epoch);
            let current = store.session_epoch == session_epoch;

            let outcome = match result {
                Ok(body) => {
                    if let (true, Some(state)) = (current, body) {
                        self.reconcile(
                            &mut store,
                            Some(state),
                            generation,
                            StateOrigin::ControlResponse,
                        );
                    }
                    Ok(current)
                }
                Err(err) => {
                    let error = PlaybackError::from(err);
                    warn!(verb = verb.as_str(), error = %error, "Playback control failed");
                    if current {
                        self.surface_error(&mut store, error.clone());
                    }
                    Err(error)
                }
            };
            self.publish(&store);
            outcome?
        };

        if settle {
            self.schedule_settle_refresh();
        }
        Ok(())
    }
}

impl Drop for EngineCore {
    fn drop(&mut self) {
        self.tasks
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_all();
    }
}

/// Handle to the playback synchronization engine.
///
/// Cheap to clone; every clone drives the same state. Background tasks only
/// hold weak references, so dropping the last handle stops them.
///
/// # Example
///
/// ```rust,no_run
/// use juke_playback::{PlaybackEngine, SessionStore, SyncConfig};
/// # use juke_core::RemoteControlGateway;
/// # use std::sync::Arc;
/// # async fn demo(gateway: Arc<dyn RemoteControlGateway>) {
/// let session = Arc::new(SessionStore::with_token("token"));
/// let engine = PlaybackEngine::new(gateway, session.clone(), SyncConfig::default());
/// engine.follow_session(&session);
/// engine.start().await.ok();
///
/// let mut snapshots = engine.subscribe();
/// while snapshots.changed().await.is_ok() {
///     let snapshot = snapshots.borrow_and_update().clone();
///     println!("playing: {}", snapshot.is_playing());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct PlaybackEngine {
    core: Arc<EngineCore>,
}

impl PlaybackEngine {
    /// Create an engine. No timers run until [`PlaybackEngine::start`].
    pub fn new(
        gateway: Arc<dyn RemoteControlGateway>,
        session: Arc<dyn SessionSource>,
        config: SyncConfig,
    ) -> Self {
        let provider = config.default_provider.clone();
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot {
            can_control: session.is_authenticated(),
            ..PlaybackSnapshot::empty(provider.clone())
        });
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let core = Arc::new_cyclic(|self_ref| EngineCore {
            self_ref: self_ref.clone(),
            gateway,
            session,
            store: Mutex::new(EngineState {
                state: None,
                active_provider: provider,
                error: None,
                in_flight: 0,
                intent: IntentGuard::default(),
                session_epoch: 0,
                session_token: None,
            }),
            config,
            snapshot_tx,
            events_tx,
            tasks: Mutex::new(Tasks::default()),
            cadence: Arc::new(Notify::new()),
        });

        Self { core }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.core.config
    }

    // ===== State Queries =====

    /// Current snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let mut snapshot = self.core.snapshot_tx.borrow().clone();
        snapshot.can_control = self.core.session.is_authenticated();
        snapshot
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.core.snapshot_tx.subscribe()
    }

    /// Receiver for engine events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.core.events_tx.subscribe()
    }

    pub fn state(&self) -> Option<PlaybackState> {
        self.core.lock_store().state.clone()
    }

    pub fn last_error(&self) -> Option<PlaybackError> {
        self.core.lock_store().error.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.core.lock_store().in_flight > 0
    }

    pub fn is_playing(&self) -> bool {
        self.core.lock_store().is_playing()
    }

    /// True iff an authenticated session exists
    pub fn can_control(&self) -> bool {
        self.core.session.is_authenticated()
    }

    pub fn active_track_uri(&self) -> Option<String> {
        self.core
            .lock_store()
            .state
            .as_ref()
            .and_then(PlaybackState::track_uri)
    }

    // ===== Lifecycle =====

    /// Start polling and fetch the initial state, or tear down if signed out
    pub async fn start(&self) -> Result<()> {
        self.core.sync_session().await
    }

    /// Re-read the session source and start or tear down accordingly
    pub async fn sync_session(&self) -> Result<()> {
        self.core.sync_session().await
    }

    /// Follow sign-in/sign-out on `session` until shutdown
    pub fn follow_session(&self, session: &SessionStore) {
        let mut changes = session.subscribe();
        let core = Arc::downgrade(&self.core);
        let handle = spawn_task(async move {
            while changes.changed().await.is_ok() {
                let Some(core) = core.upgrade() else {
                    break;
                };
                if let Err(err) = core.sync_session().await {
                    debug!(error = %err, "Session sync refresh failed");
                }
            }
        });

        if let Some(handle) = handle {
            if let Some(previous) = lock(&self.core.tasks).session_listener.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Refresh when the host window regains focus or visibility
    pub async fn on_lifecycle(&self, event: LifecycleEvent) -> Result<()> {
        if !event.is_regain() || !self.core.session.is_authenticated() {
            return Ok(());
        }
        debug!(?event, "Host regained attention, refreshing");
        self.core.refresh().await
    }

    /// Stop every background task. State is kept.
    pub fn shutdown(&self) {
        lock(&self.core.tasks).abort_all();
        info!("Playback engine shut down");
    }

    // ===== Playback Control =====

    /// Play a track, optionally within a context.
    ///
    /// The track shows as playing from 0 immediately. If the call fails, the
    /// previous state comes back.
    pub async fn play_track(&self, track: &Track, options: PlayTrackOptions) -> Result<()> {
        let core = &self.core;
        let provider = options
            .provider
            .unwrap_or_else(|| core.current_provider());

        let Some(track_uri) = track.playable_uri(&provider) else {
            return core.refuse(PlaybackError::MissingPlayableReference);
        };
        let Some(token) = core.session.auth_token() else {
            return core.refuse(PlaybackError::Unauthenticated);
        };

        let request = ControlRequest::for_track(
            provider.clone(),
            track_uri.clone(),
            options.context_uri.as_deref(),
        );
        let optimistic_track = Track {
            uri: Some(track_uri.clone()),
            ..track.clone()
        };

        core.run_optimistic(
            &token,
            ControlVerb::Play,
            request,
            IntentTarget::Track(track_uri),
            optimistic::started_playing(provider, Some(optimistic_track)),
        )
        .await
    }

    /// Play an album/artist/playlist context from its start
    pub async fn play_context(&self, context_uri: &str, options: PlayContextOptions) -> Result<()> {
        let core = &self.core;
        let context_uri = context_uri.trim();
        if context_uri.is_empty() {
            return core.refuse(PlaybackError::MissingContext);
        }
        let Some(token) = core.session.auth_token() else {
            return core.refuse(PlaybackError::Unauthenticated);
        };

        let provider = options
            .provider
            .unwrap_or_else(|| core.current_provider());
        let request = ControlRequest::context(provider.clone(), context_uri);

        core.run_optimistic(
            &token,
            ControlVerb::Play,
            request,
            IntentTarget::Context,
            optimistic::started_playing(provider, None),
        )
        .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.core.run_control(ControlVerb::Pause, None).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.core.run_control(ControlVerb::Resume, None).await
    }

    pub async fn next(&self) -> Result<()> {
        self.core.run_control(ControlVerb::Next, None).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.core.run_control(ControlVerb::Previous, None).await
    }

    /// Seek to `position_ms`, rounded and floored at zero
    pub async fn seek(&self, position_ms: f64) -> Result<()> {
        let position_ms = normalize_position(position_ms);
        self.core.run_control(ControlVerb::Seek, Some(position_ms)).await
    }

    /// Fetch ground truth now. Never marks the engine busy.
    pub async fn refresh(&self) -> Result<()> {
        self.core.refresh().await
    }
}

/// Round to whole milliseconds, mapping negatives and non-finite input to 0
pub(crate) fn normalize_position(position_ms: f64) -> u64 {
    if !position_ms.is_finite() || position_ms <= 0.0 {
        0
    } else {
        position_ms.round() as u64
    }
}
