//! Audio hardware used for the ring cue

use std::sync::Arc;

use crate::Result;

/// Creates playback contexts
pub trait AudioDevice: Send + Sync {
    /// Open a new context. Fails with `Error::AudioUnavailable` when there is
    /// no usable hardware.
    fn open(&self) -> Result<Box<dyn AudioContext>>;
}

/// One playback context; must be closed to release the hardware
pub trait AudioContext: Send {
    /// Some platforms create contexts suspended until a user gesture resumes them
    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<()>;

    fn sample_rate(&self) -> u32;

    /// Schedule mono samples starting now
    fn play(&mut self, samples: Arc<[f32]>) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
