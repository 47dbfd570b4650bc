//! Session state vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the single voice session on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session; the only state from which `start` proceeds
    #[default]
    Idle,
    /// Ring, permission, and connect in flight
    Connecting,
    /// Live, agent is listening
    Listening,
    /// Live, agent is speaking
    Speaking,
    /// Failed; reverts to `Idle` after the grace period
    Error,
}

impl SessionState {
    /// Connected to the engine (listening or speaking)
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Listening | Self::Speaking)
    }

    /// Connecting or live; a toggle in this state stops the session
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Connecting | Self::Listening | Self::Speaking)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode reported by the engine's mode-changed callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    Listening,
    Speaking,
}

impl ConversationMode {
    /// Parse the engine's mode string; anything other than "speaking" is listening
    pub fn from_engine(mode: &str) -> Self {
        if mode.eq_ignore_ascii_case("speaking") {
            Self::Speaking
        } else {
            Self::Listening
        }
    }

    pub fn session_state(&self) -> SessionState {
        match self {
            Self::Listening => SessionState::Listening,
            Self::Speaking => SessionState::Speaking,
        }
    }
}

/// Why a session is being started; decides the opening-line override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartReason {
    /// User pressed the button on this page
    UserRequest,
    /// Resuming a conversation interrupted by assistant-driven navigation
    Resume,
    /// Fresh start requested from a page that could not host the session
    Autostart,
}

impl StartReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRequest => "user_request",
            Self::Resume => "resume",
            Self::Autostart => "autostart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_and_busy() {
        assert!(!SessionState::Idle.is_busy());
        assert!(SessionState::Connecting.is_busy());
        assert!(!SessionState::Connecting.is_live());
        assert!(SessionState::Listening.is_live());
        assert!(SessionState::Speaking.is_live());
        assert!(!SessionState::Error.is_busy());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(ConversationMode::from_engine("speaking"), ConversationMode::Speaking);
        assert_eq!(ConversationMode::from_engine("listening"), ConversationMode::Listening);
        assert_eq!(ConversationMode::from_engine("thinking"), ConversationMode::Listening);
        assert_eq!(
            ConversationMode::Speaking.session_state(),
            SessionState::Speaking
        );
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&SessionState::Connecting).unwrap();
        assert_eq!(json, "\"connecting\"");
    }
}
