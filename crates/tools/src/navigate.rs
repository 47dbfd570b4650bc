//! `navigate_to_menu` tool
//!
//! Moves the user to the menu page mid-conversation. The resume flag is
//! written before the redirect is scheduled so the menu page picks the
//! conversation back up; the redirect waits long enough for the agent to
//! finish announcing it. Once the session's lease is revoked the tool has no
//! side effects and reports navigation as unavailable.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use voice_concierge_config::NavigationSettings;
use voice_concierge_core::{
    ContinuityFlag, ContinuityStore, Navigator, Result, Tool, ToolError, ToolOutput,
};

use crate::{PendingNavigation, SessionLease};

pub struct NavigateToMenuTool {
    navigator: Arc<dyn Navigator>,
    continuity: ContinuityStore,
    pending: Arc<PendingNavigation>,
    settings: NavigationSettings,
    lease: Arc<SessionLease>,
}

impl NavigateToMenuTool {
    pub const NAME: &'static str = "navigate_to_menu";

    pub fn new(
        navigator: Arc<dyn Navigator>,
        continuity: ContinuityStore,
        pending: Arc<PendingNavigation>,
        settings: NavigationSettings,
        lease: Arc<SessionLease>,
    ) -> Self {
        Self {
            navigator,
            continuity,
            pending,
            settings,
            lease,
        }
    }

    fn begin_navigation(&self) -> Result<()> {
        self.continuity.set(ContinuityFlag::ReturnToConversation)?;

        if let Err(e) = self
            .pending
            .schedule(self.settings.menu_path.clone(), self.settings.redirect_delay())
        {
            // No redirect, so the flag must not survive
            if let Err(clear_err) = self.continuity.clear() {
                tracing::debug!(error = %clear_err, "Failed to clear continuity flag");
            }
            return Err(e);
        }

        Ok(())
    }
}

#[async_trait]
impl Tool for NavigateToMenuTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Take the user to the menu page. The conversation continues there automatically."
    }

    async fn execute(&self, _input: Value) -> std::result::Result<ToolOutput, ToolError> {
        let path = self.navigator.current_path();
        if self.settings.is_menu_path(&path) {
            return Ok(ToolOutput::text(self.settings.already_here_message.clone()));
        }

        match self.lease.run(|| self.begin_navigation()) {
            None => {
                tracing::warn!(from = %path, "Menu navigation requested by an ended session");
                Ok(ToolOutput::text(self.settings.unavailable_message.clone()))
            },
            Some(Ok(())) => {
                tracing::info!(
                    from = %path,
                    to = %self.settings.menu_path,
                    delay_ms = self.settings.redirect_delay_ms,
                    "Menu navigation underway"
                );
                Ok(ToolOutput::text(self.settings.navigating_message.clone()))
            },
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Menu navigation unavailable");
                Ok(ToolOutput::text(self.settings.unavailable_message.clone()))
            },
        }
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}
