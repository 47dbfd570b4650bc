//! Button projection
//!
//! Pure mapping from `SessionState` to what the voice button should show.
//! Recomputed in full on every transition.

use serde::{Deserialize, Serialize};

use crate::SessionState;

/// Declarative visual descriptor for the voice button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonView {
    pub idle_icon_visible: bool,
    pub live_icon_visible: bool,
    /// Glow highlight while listening or speaking
    pub live_highlight: bool,
    /// Spinning, dimmed affordance while connecting
    pub connecting: bool,
    /// Red error ring
    pub error: bool,
}

impl ButtonView {
    pub fn for_state(state: SessionState) -> Self {
        let live_icon = matches!(
            state,
            SessionState::Connecting | SessionState::Listening | SessionState::Speaking
        );
        Self {
            idle_icon_visible: !live_icon,
            live_icon_visible: live_icon,
            live_highlight: state.is_live(),
            connecting: state == SessionState::Connecting,
            error: state == SessionState::Error,
        }
    }

    /// Opacity of the button; dimmed while connecting
    pub fn opacity(&self) -> f32 {
        if self.connecting {
            0.6
        } else {
            1.0
        }
    }
}

impl From<SessionState> for ButtonView {
    fn from(state: SessionState) -> Self {
        Self::for_state(state)
    }
}
