//! Session Controller
//!
//! Owns the session state machine and the engine handle. Every suspension
//! point in `start` is followed by a generation check: `stop`, a remote
//! disconnect, and an engine error all bump the generation, so a start
//! continuation that wakes up afterwards discards its result instead of
//! acting on it.
//!
//! State changes are made under the state lock and published (button render,
//! `StateChanged` event) after it is released, so a display surface may read
//! the controller from inside `render`.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use voice_concierge_audio::RingCue;
use voice_concierge_config::Settings;
use voice_concierge_core::{
    AgentMessage, AudioDevice, Clock, ContinuityFlag, ContinuityStore, DisplaySurface,
    EngineEvent, EngineLoader, EngineSession, Error, Microphone, Navigator, PersistentStore,
    Result, SessionRequest, SessionState, StartReason, Tool, ToolExecutor, TransportKind,
};
use voice_concierge_tools::{
    create_session_registry, GetCurrentTimeTool, NavigateToMenuTool, PendingNavigation,
    SessionLease, ToolRegistry,
};

use crate::{PageContext, UiProjector};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// External collaborators of the controller
#[derive(Clone)]
pub struct SessionDeps {
    pub loader: Arc<dyn EngineLoader>,
    pub microphone: Arc<dyn Microphone>,
    pub audio: Arc<dyn AudioDevice>,
    pub store: Arc<dyn PersistentStore>,
    pub navigator: Arc<dyn Navigator>,
    pub clock: Arc<dyn Clock>,
    pub display: Arc<dyn DisplaySurface>,
}

/// How a `start` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session was already connecting or live
    Ignored,
    /// Stopped or superseded while in flight; nothing was projected
    Cancelled,
    /// The engine accepted the session
    Opened,
    /// Permission, loading, or negotiation failed; state is `Error`
    Failed,
}

/// What a `toggle` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Started(StartOutcome),
    Stopped,
    /// Page cannot host a session; the autostart flag was written and the
    /// tab sent to the menu page
    Redirected,
    RedirectFailed,
}

/// Session events
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged {
        old: SessionState,
        new: SessionState,
    },
    AgentMessage(AgentMessage),
}

struct ControllerState {
    state: SessionState,
    /// Liveness token
    generation: u64,
    /// Generation most recently ended by `stop`
    user_stopped: Option<u64>,
    session_id: Option<Uuid>,
    /// Held by the built-in tools of the current session
    lease: Option<Arc<SessionLease>>,
    handle: Option<Arc<dyn EngineSession>>,
    revert: Option<JoinHandle<()>>,
    pump: Option<JoinHandle<()>>,
    /// Bumped on every state change
    seq: u64,
}

/// A state change to publish once the state lock is released
#[must_use]
struct Transition {
    old: SessionState,
    new: SessionState,
    seq: u64,
    generation: u64,
}

impl ControllerState {
    fn transition(&mut self, new: SessionState) -> Transition {
        let old = std::mem::replace(&mut self.state, new);
        self.seq += 1;
        Transition {
            old,
            new,
            seq: self.seq,
            generation: self.generation,
        }
    }

    /// End the current generation. Returns the handle, which the caller
    /// closes or drops.
    ///
    /// Revoking the lease waits for any tool side effect already in flight,
    /// so callers clean up flags and pending navigation after this returns.
    fn release(&mut self) -> Option<Arc<dyn EngineSession>> {
        self.generation += 1;
        self.session_id = None;
        if let Some(lease) = self.lease.take() {
            lease.revoke();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if let Some(revert) = self.revert.take() {
            revert.abort();
        }
        self.handle.take()
    }
}

struct Inner {
    settings: Settings,
    page: PageContext,
    deps: SessionDeps,
    ring: Option<RingCue>,
    continuity: ContinuityStore,
    pending: Arc<PendingNavigation>,
    projector: UiProjector,
    events: broadcast::Sender<SessionEvent>,
    state: Mutex<ControllerState>,
    /// Highest transition sequence rendered so far
    rendered: AtomicU64,
}

/// Single voice session controller for one page
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Create the controller and render the idle button
    pub fn new(settings: Settings, page: PageContext, deps: SessionDeps) -> Self {
        let continuity = ContinuityStore::new(deps.store.clone(), settings.continuity.keys());
        let pending = PendingNavigation::new(deps.navigator.clone());
        let ring = settings
            .ring
            .enabled
            .then(|| RingCue::from_settings(deps.audio.clone(), &settings.ring));
        let projector = UiProjector::new(deps.display.clone());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        projector.project(SessionState::Idle);

        Self {
            inner: Arc::new(Inner {
                settings,
                page,
                deps,
                ring,
                continuity,
                pending,
                projector,
                events,
                state: Mutex::new(ControllerState {
                    state: SessionState::Idle,
                    generation: 0,
                    user_stopped: None,
                    session_id: None,
                    lease: None,
                    handle: None,
                    revert: None,
                    pump: None,
                    seq: 0,
                }),
                rendered: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.lock().state
    }

    /// Whether an engine handle is currently held
    pub fn has_session(&self) -> bool {
        self.inner.state.lock().handle.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn pending_navigation(&self) -> &Arc<PendingNavigation> {
        &self.inner.pending
    }

    pub fn continuity(&self) -> &ContinuityStore {
        &self.inner.continuity
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Whether the current page can host a session
    pub fn can_host(&self) -> bool {
        let path = self.inner.deps.navigator.current_path();
        self.inner
            .page
            .can_host(&path, &self.inner.settings.navigation)
    }

    /// Open a session. A no-op unless the controller is `Idle`.
    ///
    /// The ring cue starts before the first suspension point so it runs
    /// inside the caller's turn. Failures never surface here; they drive the
    /// `Error` state and are reported as `StartOutcome::Failed`.
    pub async fn start(&self, reason: StartReason) -> StartOutcome {
        let inner = &self.inner;

        let (generation, session_id, lease, transition) = {
            let mut st = inner.state.lock();
            if st.state != SessionState::Idle {
                tracing::debug!(
                    state = %st.state,
                    reason = reason.as_str(),
                    "Start ignored, session busy"
                );
                return StartOutcome::Ignored;
            }
            st.generation += 1;
            let session_id = Uuid::new_v4();
            st.session_id = Some(session_id);
            let lease = SessionLease::new();
            st.lease = Some(lease.clone());
            let transition = st.transition(SessionState::Connecting);
            (st.generation, session_id, lease, transition)
        };
        inner.publish(transition);
        tracing::info!(%session_id, generation, reason = reason.as_str(), "Starting voice session");

        let ring = inner.ring.as_ref().map(RingCue::play);
        let prepared = tokio::try_join!(
            async move {
                if let Some(ring) = ring {
                    ring.await;
                }
                Ok::<(), Error>(())
            },
            inner.check_microphone(),
            inner.deps.loader.load(),
        );

        let engine = match prepared {
            Ok(((), (), engine)) => engine,
            Err(e) => return inner.fail_start(generation, e),
        };

        let tools: Arc<dyn ToolExecutor> = Arc::new(inner.session_tools(lease));
        let transport = TransportKind::for_user_agent(&inner.page.user_agent);
        let agent_id = inner
            .page
            .agent_id_or(&inner.settings.agent.default_agent_id)
            .to_string();
        let first_message = inner.opening_line(reason);
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut st = inner.state.lock();
            if st.generation != generation {
                tracing::debug!(%session_id, "Start cancelled before connecting");
                return StartOutcome::Cancelled;
            }
            st.pump = Some(tokio::spawn(pump_events(
                Arc::downgrade(inner),
                generation,
                rx,
            )));
        }

        tracing::info!(
            %session_id,
            agent_id = %agent_id,
            transport = %transport,
            tools = tools.list_tools().len(),
            "Opening engine session"
        );
        let request = SessionRequest {
            agent_id,
            transport,
            tools,
            first_message,
            events: tx,
        };
        let handle = match engine.start_session(request).await {
            Ok(handle) => handle,
            Err(e) => return inner.fail_start(generation, e),
        };

        let close_stale = {
            let mut st = inner.state.lock();
            if st.generation == generation {
                st.handle = Some(handle);
                metrics::counter!("voice_concierge_sessions_started_total").increment(1);
                tracing::info!(%session_id, "Voice session opened");
                return StartOutcome::Opened;
            }
            st.user_stopped == Some(generation)
        };

        if close_stale {
            // Stopped mid-connect: the transport is up, so close it
            if let Err(e) = handle.close().await {
                tracing::debug!(%session_id, error = %e, "Closing cancelled session failed");
            }
        } else {
            tracing::debug!(%session_id, "Session ended before start completed");
        }
        StartOutcome::Cancelled
    }

    /// User-initiated stop. Safe from any state.
    pub async fn stop(&self) {
        let inner = &self.inner;

        let (handle, transition) = {
            let mut st = inner.state.lock();
            st.user_stopped = Some(st.generation);
            let handle = st.release();
            (handle, st.transition(SessionState::Idle))
        };

        // The tools can no longer write, so this cleanup is final
        if inner.pending.cancel() {
            tracing::info!("Pending navigation cancelled by stop");
        }
        if let Err(e) = inner.continuity.clear() {
            tracing::warn!(error = %e, "Failed to clear continuity flags");
        }
        inner.publish(transition);

        if let Some(handle) = handle {
            match handle.close().await {
                Ok(()) => tracing::info!("Voice session closed"),
                // Transport may already be gone
                Err(e) => tracing::debug!(error = %e, "Session close failed, ignoring"),
            }
        }
    }

    /// The voice button
    pub async fn toggle(&self) -> ToggleAction {
        if !self.can_host() {
            return self.inner.redirect_to_menu();
        }

        match self.state() {
            SessionState::Idle => ToggleAction::Started(self.start(StartReason::UserRequest).await),
            SessionState::Error => {
                self.inner.dismiss_error();
                ToggleAction::Started(self.start(StartReason::UserRequest).await)
            },
            SessionState::Connecting | SessionState::Listening | SessionState::Speaking => {
                self.stop().await;
                ToggleAction::Stopped
            },
        }
    }

    /// Consume the continuity flag left by the previous page and, if one was
    /// set, start after the settle delay.
    ///
    /// Returns `None` when no automatic start was attempted.
    pub async fn on_page_load(&self) -> Option<StartOutcome> {
        let inner = &self.inner;

        let flag = match inner.continuity.consume() {
            Ok(flag) => flag,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read continuity flags");
                None
            },
        }?;

        if !self.can_host() {
            tracing::info!(flag = flag.as_str(), "Continuity flag dropped, page has no voice");
            return None;
        }

        let reason = match flag {
            ContinuityFlag::ReturnToConversation => StartReason::Resume,
            ContinuityFlag::Autostart => StartReason::Autostart,
        };

        let generation = inner.state.lock().generation;
        tokio::time::sleep(inner.settings.session.settle_delay()).await;
        let current = inner.state.lock().generation;
        if current != generation {
            tracing::debug!(
                reason = reason.as_str(),
                "User acted during settle delay, skipping auto start"
            );
            return Some(StartOutcome::Ignored);
        }

        Some(self.start(reason).await)
    }

    /// Page unload. Drops the session without closing it and without
    /// clearing continuity flags, so a navigation keeps its resume flag.
    pub fn teardown(&self) {
        let handle = {
            let mut st = self.inner.state.lock();
            let handle = st.release();
            st.state = SessionState::Idle;
            handle
        };
        self.inner.pending.cancel();
        tracing::info!(had_session = handle.is_some(), "Session controller torn down");
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.lock();
        f.debug_struct("SessionController")
            .field("state", &st.state)
            .field("generation", &st.generation)
            .field("has_session", &st.handle.is_some())
            .finish()
    }
}

impl Inner {
    /// Render and broadcast a transition. Must not be called with the state
    /// lock held.
    fn publish(&self, transition: Transition) {
        let Transition {
            old,
            new,
            seq,
            generation,
        } = transition;

        // A newer transition already rendered wins
        if self.rendered.fetch_max(seq, Ordering::AcqRel) < seq {
            self.projector.project(new);
        }
        if old != new {
            tracing::debug!(old = %old, new = %new, generation, "Session state changed");
            let _ = self.events.send(SessionEvent::StateChanged { old, new });
        }
    }

    async fn check_microphone(&self) -> Result<()> {
        let mut stream = self.deps.microphone.acquire().await?;
        // Release at once so the engine's own capture can open the device
        stream.stop_tracks();
        tracing::debug!("Microphone permission granted");
        Ok(())
    }

    fn session_tools(&self, lease: Arc<SessionLease>) -> ToolRegistry {
        let builtins: Vec<Arc<dyn Tool>> = vec![
            Arc::new(GetCurrentTimeTool::new(self.deps.clock.clone())),
            Arc::new(NavigateToMenuTool::new(
                self.deps.navigator.clone(),
                self.continuity.clone(),
                self.pending.clone(),
                self.settings.navigation.clone(),
                lease,
            )),
        ];
        create_session_registry(self.page.tools.iter().cloned(), builtins)
    }

    fn opening_line(&self, reason: StartReason) -> Option<String> {
        let session = &self.settings.session;
        match reason {
            StartReason::Resume => Some(session.handoff_line.clone()),
            StartReason::Autostart => None,
            StartReason::UserRequest if session.greet_on_start => {
                match self.deps.clock.local_time() {
                    Ok(now) => Some(format!(
                        "{}! {}",
                        now.greeting().as_str(),
                        session.introduction_line
                    )),
                    Err(e) => {
                        tracing::warn!(error = %e, "Clock unavailable, keeping agent's first message");
                        None
                    },
                }
            },
            StartReason::UserRequest => None,
        }
    }

    fn fail_start(self: &Arc<Self>, generation: u64, err: Error) -> StartOutcome {
        if self.fail(generation, &err) {
            StartOutcome::Failed
        } else {
            tracing::debug!(error = %err, "Start failed after cancellation, ignoring");
            StartOutcome::Cancelled
        }
    }

    /// Move generation `generation` into `Error` and schedule the revert.
    /// Returns false if that generation is no longer current.
    fn fail(self: &Arc<Self>, generation: u64, err: &Error) -> bool {
        let (session_id, transition) = {
            let mut st = self.state.lock();
            if st.generation != generation {
                return false;
            }
            let session_id = st.session_id;
            // Dropped, not closed: the engine tore the transport down
            drop(st.release());
            let transition = st.transition(SessionState::Error);
            st.revert = Some(self.schedule_revert(st.generation));
            (session_id, transition)
        };
        self.publish(transition);

        tracing::error!(session_id = ?session_id, kind = err.kind(), error = %err, "Voice session failed");
        metrics::counter!("voice_concierge_sessions_failed_total", "kind" => err.kind())
            .increment(1);
        true
    }

    fn schedule_revert(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let inner: Weak<Self> = Arc::downgrade(self);
        let delay = self.settings.session.error_revert();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let transition = {
                let mut st = inner.state.lock();
                if st.generation != generation || st.state != SessionState::Error {
                    return;
                }
                st.revert = None;
                st.transition(SessionState::Idle)
            };
            inner.publish(transition);
        })
    }

    fn dismiss_error(&self) {
        let transition = {
            let mut st = self.state.lock();
            if st.state != SessionState::Error {
                return;
            }
            if let Some(revert) = st.revert.take() {
                revert.abort();
            }
            st.transition(SessionState::Idle)
        };
        self.publish(transition);
    }

    fn redirect_to_menu(&self) -> ToggleAction {
        let target = &self.settings.navigation.menu_path;

        if let Err(e) = self.continuity.set(ContinuityFlag::Autostart) {
            tracing::warn!(error = %e, "Failed to persist autostart flag");
        }

        match self.deps.navigator.navigate(target) {
            Ok(()) => {
                tracing::info!(target = %target, "Page has no voice, redirecting to menu");
                ToggleAction::Redirected
            },
            Err(e) => {
                tracing::error!(target = %target, error = %e, "Redirect to menu failed");
                if let Err(e) = self.continuity.clear() {
                    tracing::debug!(error = %e, "Failed to clear continuity flags");
                }
                ToggleAction::RedirectFailed
            },
        }
    }

    /// Apply one engine callback. Returns false once `generation` is stale.
    fn handle_event(self: &Arc<Self>, generation: u64, event: EngineEvent) -> bool {
        match event {
            EngineEvent::Connected => {
                let transition = {
                    let mut st = self.state.lock();
                    if st.generation != generation {
                        return false;
                    }
                    if st.state != SessionState::Connecting {
                        return true;
                    }
                    tracing::info!(session_id = ?st.session_id, "Voice session connected");
                    st.transition(SessionState::Listening)
                };
                self.publish(transition);
                true
            },
            EngineEvent::ModeChanged(mode) => {
                let transition = {
                    let mut st = self.state.lock();
                    if st.generation != generation {
                        return false;
                    }
                    if !st.state.is_live() {
                        tracing::debug!(mode = ?mode, "Mode change before connect ignored");
                        return true;
                    }
                    st.transition(mode.session_state())
                };
                self.publish(transition);
                true
            },
            EngineEvent::Disconnected => {
                let (session_id, transition) = {
                    let mut st = self.state.lock();
                    if st.generation != generation {
                        return false;
                    }
                    let session_id = st.session_id;
                    // Transport is already gone; never close here
                    drop(st.release());
                    (session_id, st.transition(SessionState::Idle))
                };
                self.publish(transition);
                tracing::info!(session_id = ?session_id, "Voice session disconnected remotely");
                false
            },
            EngineEvent::Error(message) => {
                self.fail(generation, &Error::connection(message));
                false
            },
            EngineEvent::AgentMessage(message) => {
                if self.state.lock().generation != generation {
                    return false;
                }
                if let Some(handler) = &self.page.on_agent_message {
                    handler(&message);
                }
                let _ = self.events.send(SessionEvent::AgentMessage(message));
                true
            },
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let st = self.state.get_mut();
        if let Some(lease) = st.lease.take() {
            lease.revoke();
        }
        if let Some(pump) = st.pump.take() {
            pump.abort();
        }
        if let Some(revert) = st.revert.take() {
            revert.abort();
        }
    }
}

async fn pump_events(
    inner: Weak<Inner>,
    generation: u64,
    mut rx: mpsc::UnboundedReceiver<EngineEvent>,
) {
    while let Some(event) = rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !inner.handle_event(generation, event) {
            break;
        }
    }
}
