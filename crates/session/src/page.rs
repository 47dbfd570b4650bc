//! Page-level extension points

use std::sync::Arc;

use voice_concierge_config::NavigationSettings;
use voice_concierge_core::{AgentMessage, Tool};

/// Called with each assistant-authored message of the live session
pub type AgentMessageHandler = Arc<dyn Fn(&AgentMessage) + Send + Sync>;

/// What the hosting page contributes to a session
#[derive(Clone, Default)]
pub struct PageContext {
    /// Overrides the configured agent; also marks the page voice-capable
    pub agent_id: Option<String>,
    /// Extra tools; these shadow built-ins of the same name
    pub tools: Vec<Arc<dyn Tool>>,
    pub on_agent_message: Option<AgentMessageHandler>,
    /// Browser user agent, used for transport selection
    pub user_agent: String,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn on_agent_message<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AgentMessage) + Send + Sync + 'static,
    {
        self.on_agent_message = Some(Arc::new(handler));
        self
    }

    /// A page can host a session if it is the menu page or brings its own agent
    pub fn can_host(&self, path: &str, navigation: &NavigationSettings) -> bool {
        self.agent_id.is_some() || navigation.is_menu_path(path)
    }

    pub fn agent_id_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.agent_id.as_deref().unwrap_or(default)
    }
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("agent_id", &self.agent_id)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("on_agent_message", &self.on_agent_message.is_some())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
