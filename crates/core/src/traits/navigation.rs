//! Full-page navigation

use crate::Result;

/// Location of the current page and the ability to leave it
pub trait Navigator: Send + Sync {
    /// Path of the current page, e.g. `/catering.html`
    fn current_path(&self) -> String;

    /// Navigate the tab to `target`. The current page unloads afterwards.
    fn navigate(&self, target: &str) -> Result<()>;
}
