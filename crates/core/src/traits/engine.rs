//! Conversational session engine traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::ToolExecutor;
use crate::{ConversationMode, Result, TransportKind};

/// Message authored by the assistant (or echoed user transcript)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// "ai" or "user"
    pub source: String,
    pub message: String,
}

impl AgentMessage {
    pub fn from_agent(message: impl Into<String>) -> Self {
        Self {
            source: "ai".to_string(),
            message: message.into(),
        }
    }

    pub fn is_from_agent(&self) -> bool {
        self.source == "ai"
    }
}

/// Callbacks from the engine, delivered over a channel
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Negotiation finished, audio is flowing
    Connected,
    /// Closed by the server or the network; the transport is already gone
    Disconnected,
    /// Engine-side failure
    Error(String),
    /// Agent switched between listening and speaking
    ModeChanged(ConversationMode),
    /// Assistant-authored message
    AgentMessage(AgentMessage),
}

/// Everything the engine needs to open a session
pub struct SessionRequest {
    pub agent_id: String,
    pub transport: TransportKind,
    /// Client tools the agent may call
    pub tools: Arc<dyn ToolExecutor>,
    /// Opening-line override; `None` keeps the agent's configured first message
    pub first_message: Option<String>,
    /// Sink for engine callbacks
    pub events: mpsc::UnboundedSender<EngineEvent>,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRequest")
            .field("agent_id", &self.agent_id)
            .field("transport", &self.transport)
            .field("tools", &self.tools.list_tools().len())
            .field("first_message", &self.first_message)
            .finish()
    }
}

/// Entry point of the engine; opens live sessions
#[async_trait]
pub trait SessionEngine: Send + Sync {
    async fn start_session(&self, request: SessionRequest) -> Result<Arc<dyn EngineSession>>;
}

/// Handle to a live engine session
#[async_trait]
pub trait EngineSession: Send + Sync {
    /// Graceful close. Must not be called after a remote disconnect.
    async fn close(&self) -> Result<()>;
}

/// Resolves the engine module (for example a pinned SDK download)
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SessionEngine>>;
}
