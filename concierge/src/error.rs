//! Unified error types for concierge.
//!
//! Each concern (completion, persistence, transcript parsing, configuration)
//! has its own error enum. All of them convert into [`ConciergeError`].
//!
//! Missing client fields are not errors: extraction returns `None`.

use std::fmt;

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for concierge operations.
#[derive(Debug, thiserror::Error)]
pub enum ConciergeError {
    /// Chat completion request failed.
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),

    /// Session persistence failed.
    #[error("sink: {0}")]
    Sink(#[from] SinkError),

    /// Transcript document could not be parsed.
    #[error("transcript: {0}")]
    Transcript(#[from] TranscriptError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Error wrapped with context by [`ErrorContext`].
    #[error("{0}")]
    Internal(String),
}

impl ConciergeError {
    /// Create a config error from a string.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(ConfigError::Invalid(msg.into()))
    }
}

/// Result type alias for concierge operations.
pub type Result<T> = std::result::Result<T, ConciergeError>;

// ============================================================================
// Completion Errors
// ============================================================================

/// Error returned by the chat-completion collaborator.
///
/// The session keeps its history when this happens; the user may resend.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The request never produced an HTTP response.
    #[error("network: {0}")]
    Network(String),

    /// The gateway answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Create a network error.
    #[inline]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Whether resending the same message could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

/// Result type for completion operations.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

// ============================================================================
// Sink Errors
// ============================================================================

/// Error type for session persistence sinks.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote backend rejected or failed the save.
    #[error("remote: {0}")]
    Remote(String),
}

impl SinkError {
    /// Create a remote error.
    #[inline]
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }
}

/// Result type for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;

// ============================================================================
// Transcript Errors
// ============================================================================

/// Error type for parsing a downloaded transcript document.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// The document does not start with the transcript banner.
    #[error("missing transcript banner")]
    MissingBanner,

    /// A required header line is absent.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// The transcript body separator was not found.
    #[error("missing transcript body")]
    MissingBody,
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Error Context Extension
// ============================================================================

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<ConciergeError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            ConciergeError::Internal(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            ConciergeError::Internal(format!("{}: {}", f(), err))
        })
    }
}

// ============================================================================
// Display Helpers
// ============================================================================

/// A wrapper that displays errors in a user-friendly format.
#[derive(Debug)]
pub struct DisplayError<'a>(pub &'a ConciergeError);

impl fmt::Display for DisplayError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ConciergeError::Completion(_) => {
                write!(f, "The assistant could not respond. Please try again.")
            }
            ConciergeError::Sink(e) => write!(f, "Could not save the session: {e}"),
            ConciergeError::Transcript(e) => write!(f, "Invalid transcript file: {e}"),
            ConciergeError::Config(e) => write!(f, "Configuration error: {e}"),
            ConciergeError::Io(e) => write!(f, "IO error: {e}"),
            ConciergeError::Json(e) => write!(f, "JSON error: {e}"),
            ConciergeError::Internal(e) => write!(f, "{e}"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: ConciergeError = CompletionError::network("refused").into();
        assert!(matches!(err, ConciergeError::Completion(_)));

        let err: ConciergeError = SinkError::remote("503").into();
        assert!(matches!(err, ConciergeError::Sink(_)));

        let err: ConciergeError = TranscriptError::MissingBody.into();
        assert!(matches!(err, ConciergeError::Transcript(_)));
    }

    #[test]
    fn test_completion_transience() {
        assert!(CompletionError::network("timeout").is_transient());
        assert!(
            CompletionError::Server {
                status: 502,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !CompletionError::Server {
                status: 400,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!CompletionError::Decode("bad".into()).is_transient());
    }

    #[test]
    fn test_context() {
        let res: std::result::Result<(), SinkError> = Err(SinkError::remote("down"));
        let err = res.context("saving chat").unwrap_err();
        assert_eq!(err.to_string(), "saving chat: sink: remote: down");
        assert_eq!(DisplayError(&err).to_string(), "saving chat: sink: remote: down");

        let res: std::result::Result<(), ConfigError> = Err(ConfigError::invalid("empty url"));
        let err = res
            .with_context(|| format!("failed to load config from {}", "/tmp/c.json"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to load config from /tmp/c.json: config: invalid: empty url"
        );
    }

    #[test]
    fn test_display_error_hides_completion_details() {
        let err = ConciergeError::from(CompletionError::network("dns failure"));
        let shown = DisplayError(&err).to_string();
        assert!(!shown.contains("dns"));
    }
}
