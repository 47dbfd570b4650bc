//! Ring cue synthesis
//!
//! Procedurally generates the two-burst phone ring played before a session
//! connects, and signals completion once the audio hardware is released.
//!
//! ```text
//!  gain
//!   ^   burst 1                      burst 2
//!   |   ______________               ______________
//!   |  /              \    silence  /              \
//!   | /                \___________/                \____
//!   +--|--------------|--|--------|--|--------------|--|---> t (s)
//!     0 .03         .97 1.0     1.40 1.43         2.37 2.40   completion 2.5
//! ```

pub mod cadence;
pub mod device;
pub mod player;
pub mod synth;

pub use cadence::{Burst, RingCadence};
pub use device::{NullAudioDevice, WavFileDevice};
pub use player::{RingCompletion, RingCue};
pub use synth::render;
