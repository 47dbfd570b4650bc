//! Core traits and types for the voice concierge
//!
//! This crate provides the types shared by every other crate:
//! - Session state machine vocabulary (`SessionState`, `ConversationMode`)
//! - Cross-page continuity flags and the read-then-delete store wrapper
//! - Time-of-day greeting rule
//! - Button projection for the UI
//! - Traits for every external collaborator (engine, storage, navigation,
//!   clock, audio hardware, microphone, display, tools)
//! - Error types

pub mod continuity;
pub mod error;
pub mod greeting;
pub mod state;
pub mod traits;
pub mod transport;
pub mod ui;

pub use continuity::{ContinuityFlag, ContinuityKeys, ContinuityStore};
pub use error::{Error, Result};
pub use greeting::{Greeting, LocalTime};
pub use state::{ConversationMode, SessionState, StartReason};
pub use transport::TransportKind;
pub use ui::ButtonView;

pub use traits::{
    AgentMessage, AudioContext, AudioDevice, CivilClock, Clock, DisplaySurface, EngineEvent,
    EngineLoader, EngineSession, FixedClock, InMemoryStore, Microphone, MicrophoneStream,
    Navigator, PersistentStore, SessionEngine, SessionRequest, Tool, ToolError, ToolExecutor,
    ToolOutput, ToolSchema,
};
