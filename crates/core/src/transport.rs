//! Transport selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Underlying real-time connection used to reach the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Peer-to-peer, lower latency
    WebRtc,
    /// Message-based fallback
    WebSocket,
}

/// User-agent markers for platforms where WebRTC raises a privacy prompt
/// (it exposes the local IP address)
const PRIVACY_PROMPT_PLATFORMS: &[&str] = &["iPad", "iPhone", "iPod"];

impl TransportKind {
    /// Prefer WebRTC, except on platforms where it triggers a privacy prompt
    pub fn for_user_agent(user_agent: &str) -> Self {
        if PRIVACY_PROMPT_PLATFORMS
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            Self::WebSocket
        } else {
            Self::WebRtc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebRtc => "webrtc",
            Self::WebSocket => "websocket",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
