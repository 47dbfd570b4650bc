//! Cross-page continuity flags
//!
//! A page that navigates away mid-conversation writes a flag into the
//! tab-scoped store; the next page load consumes it. Consuming always deletes
//! both keys before returning, so a flag can never fire twice (for example
//! when the browser replays a page from history).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::traits::PersistentStore;
use crate::Result;

/// Value written for a set flag
const FLAG_SET: &str = "1";

/// One of the two persisted intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityFlag {
    /// The assistant navigated away; resume with the hand-off line
    ReturnToConversation,
    /// The user asked for a session on a page that cannot host one
    Autostart,
}

impl ContinuityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReturnToConversation => "return_to_conversation",
            Self::Autostart => "autostart",
        }
    }
}

/// Storage keys for the two flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityKeys {
    pub return_key: String,
    pub autostart_key: String,
}

impl Default for ContinuityKeys {
    fn default() -> Self {
        Self {
            return_key: "deosa_voice_return".to_string(),
            autostart_key: "deosa_voice_autostart".to_string(),
        }
    }
}

impl ContinuityKeys {
    fn key(&self, flag: ContinuityFlag) -> &str {
        match flag {
            ContinuityFlag::ReturnToConversation => &self.return_key,
            ContinuityFlag::Autostart => &self.autostart_key,
        }
    }

    fn other(&self, flag: ContinuityFlag) -> &str {
        match flag {
            ContinuityFlag::ReturnToConversation => &self.autostart_key,
            ContinuityFlag::Autostart => &self.return_key,
        }
    }
}

/// Read-once flag store on top of a page-scoped key/value store
#[derive(Clone)]
pub struct ContinuityStore {
    store: Arc<dyn PersistentStore>,
    keys: ContinuityKeys,
}

impl ContinuityStore {
    pub fn new(store: Arc<dyn PersistentStore>, keys: ContinuityKeys) -> Self {
        Self { store, keys }
    }

    pub fn with_default_keys(store: Arc<dyn PersistentStore>) -> Self {
        Self::new(store, ContinuityKeys::default())
    }

    /// Set `flag`, clearing the other one so at most one is ever set
    pub fn set(&self, flag: ContinuityFlag) -> Result<()> {
        self.store.remove(self.keys.other(flag))?;
        self.store.set(self.keys.key(flag), FLAG_SET)?;
        tracing::debug!(flag = flag.as_str(), "Continuity flag set");
        Ok(())
    }

    /// Whether `flag` is currently set, without consuming it
    pub fn is_set(&self, flag: ContinuityFlag) -> Result<bool> {
        Ok(self.store.get(self.keys.key(flag))?.as_deref() == Some(FLAG_SET))
    }

    /// Read-then-delete. Resume takes precedence over autostart.
    pub fn consume(&self) -> Result<Option<ContinuityFlag>> {
        let resume = self.is_set(ContinuityFlag::ReturnToConversation)?;
        let autostart = self.is_set(ContinuityFlag::Autostart)?;

        // Delete before acting on the value
        self.clear()?;

        let flag = if resume {
            Some(ContinuityFlag::ReturnToConversation)
        } else if autostart {
            Some(ContinuityFlag::Autostart)
        } else {
            None
        };

        if let Some(flag) = flag {
            tracing::info!(flag = flag.as_str(), "Consumed continuity flag");
        }
        Ok(flag)
    }

    /// Remove both flags
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.keys.return_key)?;
        self.store.remove(&self.keys.autostart_key)?;
        Ok(())
    }

    pub fn keys(&self) -> &ContinuityKeys {
        &self.keys
    }
}

impl std::fmt::Debug for ContinuityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuityStore")
            .field("keys", &self.keys)
            .finish()
    }
}
