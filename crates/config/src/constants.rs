//! Default values for every configurable setting
//!
//! Timing values are in milliseconds.

/// Engine agent used when the page does not supply one
pub mod agent {
    pub const DEFAULT_AGENT_ID: &str = "agent_2901kj45e7cnfszrrjfhfj4qdc8j";
}

/// Ring cue
pub mod ring {
    pub const SAMPLE_RATE: u32 = 44_100;
    pub const MIN_SAMPLE_RATE: u32 = 8_000;
    pub const MAX_SAMPLE_RATE: u32 = 192_000;

    /// Gain of each oscillator at the top of a burst
    pub const PEAK_GAIN: f32 = 0.22;

    /// Completion fires 100ms after the last ramp ends at 2400ms
    pub const COMPLETION_MS: u64 = 2_500;
    pub const LAST_RAMP_END_MS: u64 = 2_400;
    pub const MAX_COMPLETION_MS: u64 = 2_600;
}

/// Session lifecycle
pub mod session {
    /// How long the error ring stays up before reverting to idle
    pub const ERROR_REVERT_MS: u64 = 3_000;

    /// Delay before auto-starting on a freshly loaded page
    pub const SETTLE_DELAY_MS: u64 = 700;

    pub const TIMEZONE: &str = "Europe/London";

    pub const INTRODUCTION_LINE: &str =
        "You're through to De'Osa. I can tell you about our menu, catering, or help you place an order.";

    pub const HANDOFF_LINE: &str =
        "I'm back! We're on the menu page now. What would you like to know?";
}

/// `navigate_to_menu`
pub mod navigation {
    pub const MENU_PATH: &str = "catering.html";

    /// Substring of the path that identifies the menu page
    pub const MENU_MARKER: &str = "catering";

    /// Long enough for the agent to finish the sentence announcing the move
    pub const REDIRECT_DELAY_MS: u64 = 2_600;

    pub const ALREADY_HERE_MESSAGE: &str =
        "You're already on our menu page. Feel free to browse!";

    pub const NAVIGATING_MESSAGE: &str =
        "I'm taking you to our menu page right now. I'll be right with you there.";

    pub const UNAVAILABLE_MESSAGE: &str = "Navigation is not available right now.";
}
