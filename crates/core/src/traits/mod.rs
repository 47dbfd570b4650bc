//! Traits for the external collaborators of the session controller
//!
//! Everything the controller touches outside its own state goes through one
//! of these seams so hosts can plug in real implementations and tests can
//! plug in mocks.
//!
//! ```text
//! Engine:
//!   - EngineLoader: resolves the engine entry point
//!   - SessionEngine: opens a live session
//!   - EngineSession: handle to the live session (close)
//!
//! Page environment:
//!   - PersistentStore: tab-scoped key/value store
//!   - Navigator: current path and full-page navigation
//!   - Clock: civil time in the assistant's time zone
//!   - DisplaySurface: renders the button view
//!
//! Hardware:
//!   - AudioDevice / AudioContext: ring cue playback
//!   - Microphone / MicrophoneStream: permission pre-check
//!
//! Tools:
//!   - Tool: a capability the engine may call mid-conversation
//!   - ToolExecutor: name-based dispatch over a tool set
//! ```

mod audio;
mod clock;
mod display;
mod engine;
mod microphone;
mod navigation;
mod store;
mod tool;

pub use audio::{AudioContext, AudioDevice};
pub use clock::{CivilClock, Clock, FixedClock};
pub use display::DisplaySurface;
pub use engine::{AgentMessage, EngineEvent, EngineLoader, EngineSession, SessionEngine, SessionRequest};
pub use microphone::{Microphone, MicrophoneStream};
pub use navigation::Navigator;
pub use store::{InMemoryStore, PersistentStore};
pub use tool::{Tool, ToolError, ToolExecutor, ToolOutput, ToolSchema};
