//! Outcome type for operations whose failure must not reach the caller.
//!
//! Saving a finished session is best effort: the user still gets the record
//! and may download it locally even when the backend is down. Wrapping the
//! outcome in [`BestEffort`] instead of `Result` keeps `?` from propagating it
//! by accident while still letting callers inspect what happened.

use std::fmt;
use tracing::warn;

/// Result of a best-effort operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum BestEffort<T> {
    /// The operation succeeded.
    Completed(T),
    /// The operation failed; the failure was logged and swallowed.
    Failed {
        /// Rendered error message.
        reason: String,
    },
}

impl<T> BestEffort<T> {
    /// Convert a `Result`, logging the error under the given operation name.
    pub fn from_result<E: fmt::Display>(operation: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(e) => {
                warn!(operation, error = %e, "best-effort operation failed");
                Self::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }

    /// Discard the failure and keep the value, if any.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

impl<T> fmt::Display for BestEffort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(_) => write!(f, "completed"),
            Self::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}
