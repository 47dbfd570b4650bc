//! Projects session state onto the display surface

use std::sync::Arc;

use voice_concierge_core::{ButtonView, DisplaySurface, SessionState};

/// Stateless: every call renders the full view for `state`
pub struct UiProjector {
    surface: Arc<dyn DisplaySurface>,
}

impl UiProjector {
    pub fn new(surface: Arc<dyn DisplaySurface>) -> Self {
        Self { surface }
    }

    pub fn project(&self, state: SessionState) -> ButtonView {
        let view = ButtonView::for_state(state);
        self.surface.render(&view);
        view
    }
}
