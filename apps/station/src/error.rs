//! Error handling for the station
//!
//! Collaborator failures are represented by [`StoreError`]. The core never
//! propagates them to its callers: each command recovers locally, logs the
//! failure and publishes an [`ErrorNotice`] on the coordinator's error
//! channel for the UI to optionally display.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the backend collaborators (playback store, playlist
/// lookup, request status sink)
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis operation failed
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Stored payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend not reachable
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Referenced resource does not exist
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Subscription stream ended or could not be established
    #[error("subscription error: {0}")]
    Subscription(String),
}

impl StoreError {
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Severity level used when logging the failure
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Serialization(_) => ErrorSeverity::Error,
            Self::Redis(_) | Self::Unavailable(_) | Self::Subscription(_) => {
                ErrorSeverity::Warning
            }
            Self::NotFound { .. } => ErrorSeverity::Info,
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self, operation: &'static str) {
        match self.severity() {
            ErrorSeverity::Error => {
                tracing::error!(error = %self, operation, "Station backend error");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, operation, "Station backend failure");
            }
            ErrorSeverity::Info => {
                tracing::info!(error = %self, operation, "Station backend miss");
            }
        }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
}

/// Result type alias for collaborator operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Payload of the side-channel error observable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    /// Command that failed (e.g. `play_song_now`)
    pub operation: &'static str,

    /// Human-readable failure description
    pub message: String,

    /// Epoch ms at which the failure was observed
    pub at: i64,
}

impl ErrorNotice {
    pub fn new(operation: &'static str, error: &StoreError, at: i64) -> Self {
        Self {
            operation,
            message: error.to_string(),
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            StoreError::Unavailable("down".to_string()).severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            StoreError::not_found("playlist", "p1").severity(),
            ErrorSeverity::Info
        );

        let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(
            StoreError::from(serde_err).severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found("playlist", "p9");
        assert_eq!(err.to_string(), "playlist not found: p9");

        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "backend unavailable: connection refused");
    }

    #[test]
    fn test_notice_carries_message() {
        let err = StoreError::Unavailable("timeout".to_string());
        let notice = ErrorNotice::new("pause_playing", &err, 77);

        assert_eq!(notice.operation, "pause_playing");
        assert_eq!(notice.message, "backend unavailable: timeout");
        assert_eq!(notice.at, 77);
    }
}
