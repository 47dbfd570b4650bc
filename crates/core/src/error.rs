//! Error types shared across the voice concierge crates

use thiserror::Error;

/// Errors raised by external collaborators
///
/// The controller maps `PermissionDenied` and `ConnectionFailure` onto the
/// `Error` UI state. A remote disconnect is not an error and has no variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Clock error: {0}")]
    Clock(String),
}

impl Error {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionFailure(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::AudioUnavailable(msg.into())
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permission_denied",
            Self::ConnectionFailure(_) => "connection_failure",
            Self::AudioUnavailable(_) => "audio_unavailable",
            Self::Store(_) => "store",
            Self::Navigation(_) => "navigation",
            Self::Clock(_) => "clock",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::permission("NotAllowedError");
        assert_eq!(err.to_string(), "Microphone permission denied: NotAllowedError");
        assert_eq!(err.kind(), "permission_denied");
    }

    #[test]
    fn test_connection_kind() {
        assert_eq!(Error::connection("timeout").kind(), "connection_failure");
    }
}
