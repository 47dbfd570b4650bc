//! Scripted stand-ins for the browser and the conversational engine
//!
//! Everything here logs what a real page would do, so a simulated run reads
//! as a timeline of button states, tool calls, and navigations.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

use voice_concierge_core::{
    ButtonView, DisplaySurface, EngineEvent, EngineLoader, EngineSession, Error, Microphone,
    MicrophoneStream, Navigator, Result, SessionEngine, SessionRequest, ToolError, ToolExecutor,
    ToolOutput,
};

struct LiveSession {
    events: mpsc::UnboundedSender<EngineEvent>,
    tools: Arc<dyn ToolExecutor>,
}

/// Engine that connects immediately and lets the script play the agent
#[derive(Default)]
pub struct ScriptedEngine {
    live: Mutex<Option<LiveSession>>,
    /// Reject negotiation with this message
    failure: Mutex<Option<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Deliver a callback as the engine would
    pub fn emit(&self, event: EngineEvent) -> Result<()> {
        let live = self.live.lock();
        let session = live
            .as_ref()
            .ok_or_else(|| Error::connection("no live session"))?;
        session
            .events
            .send(event)
            .map_err(|_| Error::connection("session receiver dropped"))
    }

    /// Invoke a client tool the way the agent would mid-conversation
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> std::result::Result<ToolOutput, ToolError> {
        let tools = self
            .live
            .lock()
            .as_ref()
            .map(|s| s.tools.clone())
            .ok_or_else(|| ToolError::internal("no live session"))?;
        tracing::info!(tool = name, "Agent calling client tool");
        let output = tools.execute(name, arguments).await?;
        tracing::info!(tool = name, output = %output.to_wire(), "Client tool returned");
        Ok(output)
    }
}

#[async_trait]
impl SessionEngine for ScriptedEngine {
    async fn start_session(&self, request: SessionRequest) -> Result<Arc<dyn EngineSession>> {
        let tool_names: Vec<String> = request
            .tools
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        tracing::info!(
            agent_id = %request.agent_id,
            transport = %request.transport,
            first_message = request.first_message.as_deref().unwrap_or("<agent default>"),
            tools = ?tool_names,
            "Engine negotiating session"
        );

        if let Some(message) = self.failure.lock().clone() {
            return Err(Error::connection(message));
        }

        let _ = request.events.send(EngineEvent::Connected);
        *self.live.lock() = Some(LiveSession {
            events: request.events,
            tools: request.tools,
        });
        Ok(Arc::new(ScriptedSession))
    }
}

struct ScriptedSession;

#[async_trait]
impl EngineSession for ScriptedSession {
    async fn close(&self) -> Result<()> {
        tracing::info!("Engine session closed by client");
        Ok(())
    }
}

/// Resolves the scripted engine, standing in for the SDK module download
pub struct ScriptedLoader {
    engine: Arc<ScriptedEngine>,
}

impl ScriptedLoader {
    pub fn new(engine: Arc<ScriptedEngine>) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}

#[async_trait]
impl EngineLoader for ScriptedLoader {
    async fn load(&self) -> Result<Arc<dyn SessionEngine>> {
        Ok(self.engine.clone())
    }
}

/// Always grants permission
pub struct GrantedMicrophone;

#[async_trait]
impl Microphone for GrantedMicrophone {
    async fn acquire(&self) -> Result<Box<dyn MicrophoneStream>> {
        tracing::debug!("Microphone permission granted");
        Ok(Box::new(PermissionStream))
    }
}

struct PermissionStream;

impl MicrophoneStream for PermissionStream {
    fn stop_tracks(&mut self) {
        tracing::debug!("Permission stream stopped");
    }
}

/// Logs every button render
pub struct LogDisplay;

impl DisplaySurface for LogDisplay {
    fn render(&self, view: &ButtonView) {
        tracing::info!(
            live_icon = view.live_icon_visible,
            glow = view.live_highlight,
            connecting = view.connecting,
            error = view.error,
            opacity = view.opacity(),
            "Button rendered"
        );
    }
}

/// Tab location; navigating only records the new path
pub struct TabNavigator {
    path: Mutex<String>,
}

impl TabNavigator {
    pub fn at(path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            path: Mutex::new(path.into()),
        })
    }
}

impl Navigator for TabNavigator {
    fn current_path(&self) -> String {
        self.path.lock().clone()
    }

    fn navigate(&self, target: &str) -> Result<()> {
        let path = if target.starts_with('/') {
            target.to_string()
        } else {
            format!("/{}", target)
        };
        let mut current = self.path.lock();
        tracing::info!(from = %*current, to = %path, "Tab navigating");
        *current = path;
        Ok(())
    }
}
