//! Hand-written collaborators for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use voice_concierge_config::Settings;
use voice_concierge_core::{
    AudioContext, AudioDevice, ButtonView, DisplaySurface, EngineEvent, EngineLoader,
    EngineSession, Error, FixedClock, InMemoryStore, Microphone, MicrophoneStream, Navigator,
    Result, SessionEngine, SessionRequest, SessionState,
};
use voice_concierge_session::{PageContext, SessionController, SessionDeps};

pub const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0";

/// Engine that records every request and counts closes
#[derive(Default)]
pub struct ScriptedEngine {
    requests: Mutex<Vec<SessionRequest>>,
    opened: AtomicUsize,
    closes: Arc<AtomicUsize>,
    /// Delay inside `start_session`
    connect_delay: Mutex<Duration>,
    /// Emit `Connected` before returning the handle
    auto_connect: Mutex<bool>,
    /// Fail negotiation with this message
    failure: Mutex<Option<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        let engine = Self::default();
        *engine.auto_connect.lock() = true;
        Arc::new(engine)
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock() = delay;
    }

    pub fn set_auto_connect(&self, auto_connect: bool) {
        *self.auto_connect.lock() = auto_connect;
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Inspect the most recent request
    pub fn with_last_request<R>(&self, f: impl FnOnce(&SessionRequest) -> R) -> R {
        let requests = self.requests.lock();
        f(requests.last().expect("no session requested"))
    }

    /// Deliver a callback on the most recent session
    pub fn emit(&self, event: EngineEvent) {
        let index = self.request_count().checked_sub(1).expect("no session requested");
        self.emit_to(index, event);
    }

    /// Deliver a callback on the `index`th requested session
    pub fn emit_to(&self, index: usize, event: EngineEvent) {
        let requests = self.requests.lock();
        let _ = requests[index].events.send(event);
    }
}

#[async_trait]
impl SessionEngine for ScriptedEngine {
    async fn start_session(&self, request: SessionRequest) -> Result<Arc<dyn EngineSession>> {
        let events = request.events.clone();
        self.requests.lock().push(request);

        let delay = *self.connect_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().clone();
        if let Some(message) = failure {
            return Err(Error::connection(message));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        if *self.auto_connect.lock() {
            let _ = events.send(EngineEvent::Connected);
        }
        Ok(Arc::new(ScriptedSession {
            closes: self.closes.clone(),
        }))
    }
}

struct ScriptedSession {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl EngineSession for ScriptedSession {
    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct StaticLoader {
    engine: Arc<ScriptedEngine>,
    failure: Mutex<Option<String>>,
}

impl StaticLoader {
    pub fn new(engine: Arc<ScriptedEngine>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            failure: Mutex::new(None),
        })
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }
}

#[async_trait]
impl EngineLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn SessionEngine>> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(Error::connection(message));
        }
        Ok(self.engine.clone())
    }
}

/// Microphone that grants or denies after an optional delay
#[derive(Default)]
pub struct MockMicrophone {
    deny: Mutex<bool>,
    delay: Mutex<Duration>,
    stopped: Arc<AtomicUsize>,
}

impl MockMicrophone {
    pub fn set_deny(&self, deny: bool) {
        *self.deny.lock() = deny;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Microphone for MockMicrophone {
    async fn acquire(&self) -> Result<Box<dyn MicrophoneStream>> {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.deny.lock() {
            return Err(Error::permission("NotAllowedError"));
        }
        Ok(Box::new(MockStream {
            stopped: self.stopped.clone(),
        }))
    }
}

struct MockStream {
    stopped: Arc<AtomicUsize>,
}

impl MicrophoneStream for MockStream {
    fn stop_tracks(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Audio device that accepts playback at 8 kHz
#[derive(Default)]
pub struct MockAudio {
    opened: AtomicUsize,
}

impl MockAudio {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl AudioDevice for MockAudio {
    fn open(&self) -> Result<Box<dyn AudioContext>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockContext))
    }
}

struct MockContext;

impl AudioContext for MockContext {
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        8_000
    }

    fn play(&mut self, _samples: Arc<[f32]>) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

pub struct RecordingNavigator {
    path: Mutex<String>,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: Mutex::new(path.to_string()),
            visits: Mutex::new(Vec::new()),
        })
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn navigate(&self, target: &str) -> Result<()> {
        self.visits.lock().push(target.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    views: Mutex<Vec<ButtonView>>,
    /// Read back from inside `render`, as a host page might
    watched: Mutex<Option<SessionController>>,
    observed: Mutex<Vec<SessionState>>,
}

impl RecordingDisplay {
    pub fn watch(&self, controller: SessionController) {
        *self.watched.lock() = Some(controller);
    }

    /// Controller state seen from each render while watching
    pub fn observed(&self) -> Vec<SessionState> {
        self.observed.lock().clone()
    }

    pub fn last(&self) -> Option<ButtonView> {
        self.views.lock().last().copied()
    }

    pub fn count(&self) -> usize {
        self.views.lock().len()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn render(&self, view: &ButtonView) {
        self.views.lock().push(*view);
        let watched = self.watched.lock().clone();
        if let Some(controller) = watched {
            self.observed.lock().push(controller.state());
        }
    }
}

/// A controller wired to mocks, plus handles to inspect them
pub struct Harness {
    pub controller: SessionController,
    pub engine: Arc<ScriptedEngine>,
    pub loader: Arc<StaticLoader>,
    pub microphone: Arc<MockMicrophone>,
    pub audio: Arc<MockAudio>,
    pub store: Arc<InMemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub clock: Arc<FixedClock>,
    pub display: Arc<RecordingDisplay>,
}

pub struct HarnessBuilder {
    path: String,
    page: PageContext,
    settings: Settings,
    store: Arc<InMemoryStore>,
}

impl HarnessBuilder {
    pub fn on_page(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn page(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Share a store with an earlier "page"
    pub fn store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> Harness {
        let engine = ScriptedEngine::new();
        let loader = StaticLoader::new(engine.clone());
        let microphone = Arc::new(MockMicrophone::default());
        let audio = Arc::new(MockAudio::default());
        let navigator = RecordingNavigator::at(&self.path);
        let clock = Arc::new(FixedClock::new(9, 5));
        let display = Arc::new(RecordingDisplay::default());

        let deps = SessionDeps {
            loader: loader.clone(),
            microphone: microphone.clone(),
            audio: audio.clone(),
            store: self.store.clone(),
            navigator: navigator.clone(),
            clock: clock.clone(),
            display: display.clone(),
        };
        let controller = SessionController::new(self.settings, self.page, deps);

        Harness {
            controller,
            engine,
            loader,
            microphone,
            audio,
            store: self.store,
            navigator,
            clock,
            display,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        path: "/catering.html".to_string(),
        page: PageContext::new().with_user_agent(DESKTOP_UA),
        settings: Settings::default(),
        store: Arc::new(InMemoryStore::new()),
    }
}

/// Let spawned tasks (event pump, timers) run
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
