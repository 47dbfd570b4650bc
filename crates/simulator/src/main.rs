//! Voice concierge simulator
//!
//! Renders the ring cue to a WAV file, or drives the session controller
//! through a scripted conversation with the browser and engine replaced by
//! logging stand-ins.

mod host;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_concierge_audio::{NullAudioDevice, RingCue, WavFileDevice};
use voice_concierge_config::{load_settings, Settings};
use voice_concierge_core::{
    AgentMessage, AudioDevice, CivilClock, ConversationMode, EngineEvent, InMemoryStore,
    Navigator, PersistentStore,
};
use voice_concierge_session::{PageContext, SessionController, SessionDeps};

use host::{GrantedMicrophone, LogDisplay, ScriptedEngine, ScriptedLoader, TabNavigator};

/// Pause between scripted agent actions
const BEAT: Duration = Duration::from_millis(400);

#[derive(Parser, Debug)]
#[command(name = "voice-concierge", version)]
#[command(about = "Ring cue renderer and scripted voice session simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the two-burst ring cue to a WAV file
    Ring {
        #[arg(long, default_value = "ring.wav")]
        out: PathBuf,
        /// Defaults to ring.sample_rate from the configuration
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Run a scripted session against stand-in collaborators
    Simulate {
        #[arg(long, value_enum, default_value_t = Scenario::Converse)]
        scenario: Scenario,
        /// Browser user agent, drives transport selection
        #[arg(long, default_value = "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0")]
        user_agent: String,
        /// Capture ring cues to this WAV file instead of playing silently
        #[arg(long)]
        ring_out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Start on the menu page, talk, stop
    Converse,
    /// Agent moves the user from the home page to the menu and resumes there
    Navigate,
    /// User presses the button on a page without voice
    Redirect,
    /// Engine rejects the session
    Failure,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Priority: env vars > config/{env}.* > config/default.* > defaults
    let env = std::env::var("VOICE_CONCIERGE_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&settings);
    tracing::info!("Voice concierge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Ring { out, sample_rate } => render_ring(settings, out, sample_rate).await,
        Command::Simulate {
            scenario,
            user_agent,
            ring_out,
        } => {
            let sim = Simulation::new(settings, user_agent, ring_out)?;
            sim.run(scenario).await
        },
    }
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("voice_concierge={}", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}

async fn render_ring(
    mut settings: Settings,
    out: PathBuf,
    sample_rate: Option<u32>,
) -> anyhow::Result<()> {
    if let Some(rate) = sample_rate {
        settings.ring.sample_rate = rate;
    }
    settings.validate().context("invalid ring settings")?;

    let device = Arc::new(WavFileDevice::new(&out, settings.ring.sample_rate));
    let cue = RingCue::from_settings(device, &settings.ring);

    let completion = cue.play();
    if completion.is_silent() {
        anyhow::bail!("ring cue could not be rendered");
    }
    completion.await;

    anyhow::ensure!(out.exists(), "ring cue was not written to {}", out.display());
    tracing::info!(
        path = %out.display(),
        sample_rate = settings.ring.sample_rate,
        "Ring cue written"
    );
    Ok(())
}

/// One browser tab: shared store, shared location, one engine
struct Simulation {
    settings: Settings,
    user_agent: String,
    engine: Arc<ScriptedEngine>,
    store: Arc<InMemoryStore>,
    audio: Arc<dyn AudioDevice>,
    clock: Arc<CivilClock>,
}

impl Simulation {
    fn new(
        settings: Settings,
        user_agent: String,
        ring_out: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let audio: Arc<dyn AudioDevice> = match ring_out {
            Some(path) => Arc::new(WavFileDevice::new(path, settings.ring.sample_rate)),
            None => Arc::new(NullAudioDevice),
        };
        let clock = Arc::new(
            CivilClock::from_name(&settings.session.timezone)
                .context("invalid session.timezone")?,
        );

        Ok(Self {
            settings,
            user_agent,
            engine: ScriptedEngine::new(),
            store: Arc::new(InMemoryStore::new()),
            audio,
            clock,
        })
    }

    /// Load a page in the tab and run its page-load bootstrap
    async fn open_page(
        &self,
        navigator: &Arc<TabNavigator>,
        page: PageContext,
    ) -> SessionController {
        let deps = SessionDeps {
            loader: ScriptedLoader::new(self.engine.clone()),
            microphone: Arc::new(GrantedMicrophone),
            audio: self.audio.clone(),
            store: self.store.clone(),
            navigator: navigator.clone(),
            clock: self.clock.clone(),
            display: Arc::new(LogDisplay),
        };
        let page = page.with_user_agent(self.user_agent.clone()).on_agent_message(|m| {
            tracing::info!(source = %m.source, message = %m.message, "Page saw agent message");
        });
        let controller = SessionController::new(self.settings.clone(), page, deps);

        tracing::info!(path = %navigator.current_path(), "Page loaded");
        if let Some(outcome) = controller.on_page_load().await {
            tracing::info!(?outcome, "Automatic start");
        }
        controller
    }

    async fn run(&self, scenario: Scenario) -> anyhow::Result<()> {
        tracing::info!(?scenario, "Running scenario");
        match scenario {
            Scenario::Converse => self.converse().await?,
            Scenario::Navigate => self.navigate().await?,
            Scenario::Redirect => self.redirect().await?,
            Scenario::Failure => self.failure().await,
        }
        tracing::info!(
            leftover_flags = !self.store_is_clear()?,
            "Scenario finished"
        );
        Ok(())
    }

    async fn converse(&self) -> anyhow::Result<()> {
        let tab = TabNavigator::at("/catering.html");
        let page = self.open_page(&tab, PageContext::new()).await;

        let action = page.toggle().await;
        tracing::info!(?action, "Button pressed");
        self.agent_turn("Hello! Would you like to hear today's specials?")
            .await?;

        self.engine
            .call_tool("get_current_time", json!({}))
            .await
            .context("get_current_time failed")?;

        let action = page.toggle().await;
        tracing::info!(?action, "Button pressed");
        Ok(())
    }

    async fn navigate(&self) -> anyhow::Result<()> {
        let tab = TabNavigator::at("/index.html");
        let home = self
            .open_page(&tab, PageContext::new().with_agent_id("agent_home"))
            .await;

        let action = home.toggle().await;
        tracing::info!(?action, "Button pressed");
        self.agent_turn("Let me show you the menu.").await?;

        self.engine
            .call_tool("navigate_to_menu", json!({}))
            .await
            .context("navigate_to_menu failed")?;
        tokio::time::sleep(self.settings.navigation.redirect_delay() + BEAT).await;
        home.teardown();

        let menu = self.open_page(&tab, PageContext::new()).await;
        self.agent_turn("Here we are. The jollof is a favourite.")
            .await?;
        menu.stop().await;
        Ok(())
    }

    async fn redirect(&self) -> anyhow::Result<()> {
        let tab = TabNavigator::at("/about.html");
        let about = self.open_page(&tab, PageContext::new()).await;

        let action = about.toggle().await;
        tracing::info!(?action, "Button pressed");
        about.teardown();

        let menu = self.open_page(&tab, PageContext::new()).await;
        self.agent_turn("Hi there, what can I get you?").await?;
        menu.stop().await;
        Ok(())
    }

    async fn failure(&self) {
        self.engine.fail_with("handshake rejected");
        let tab = TabNavigator::at("/catering.html");
        let page = self.open_page(&tab, PageContext::new()).await;

        let action = page.toggle().await;
        tracing::info!(?action, state = %page.state(), "Button pressed");

        tokio::time::sleep(self.settings.session.error_revert() + BEAT).await;
        tracing::info!(state = %page.state(), "After error grace period");
    }

    /// The agent says one line, then hands the turn back
    async fn agent_turn(&self, line: &str) -> anyhow::Result<()> {
        tokio::time::sleep(BEAT).await;
        self.engine
            .emit(EngineEvent::ModeChanged(ConversationMode::Speaking))?;
        self.engine
            .emit(EngineEvent::AgentMessage(AgentMessage::from_agent(line)))?;
        tokio::time::sleep(BEAT).await;
        self.engine
            .emit(EngineEvent::ModeChanged(ConversationMode::Listening))?;
        tokio::time::sleep(BEAT).await;
        Ok(())
    }

    fn store_is_clear(&self) -> anyhow::Result<bool> {
        let keys = self.settings.continuity.keys();
        Ok(self.store.get(&keys.return_key)?.is_none()
            && self.store.get(&keys.autostart_key)?.is_none())
    }
}
