//! Microphone permission pre-check

use async_trait::async_trait;

use crate::Result;

/// Grants access to an audio input stream
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Prompt for permission and open a stream.
    ///
    /// Fails with `Error::PermissionDenied` when the user refuses.
    async fn acquire(&self) -> Result<Box<dyn MicrophoneStream>>;
}

/// Open input stream; holds the device until stopped
pub trait MicrophoneStream: Send {
    fn stop_tracks(&mut self);
}
