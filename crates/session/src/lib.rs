//! Voice session controller
//!
//! Orchestrates one voice session per page:
//!
//! ```text
//!   toggle / page load
//!          │
//!          ▼
//!   ┌──────────────┐  ring ┐
//!   │  Connecting  │  mic  ├─ joined
//!   └──────┬───────┘  load ┘
//!          │ start_session
//!          ▼
//!   ┌──────────────┐ mode  ┌──────────────┐
//!   │  Listening   │◀─────▶│   Speaking   │
//!   └──────┬───────┘       └──────┬───────┘
//!          │ disconnect / stop    │
//!          ▼                      ▼
//!        Idle ◀── 3 s ── Error (engine or start failure)
//! ```
//!
//! Engine callbacks arrive on a channel and are applied only while the
//! session that produced them is still current.

pub mod controller;
pub mod page;
pub mod projector;

pub use controller::{SessionController, SessionDeps, SessionEvent, StartOutcome, ToggleAction};
pub use page::{AgentMessageHandler, PageContext};
pub use projector::UiProjector;
