//! Failure taxonomy for the API client.
//!
//! Callers need to distinguish "can't reach or trust the server"
//! (transport/shape problems) from "bad credentials" (authentication)
//! from "I passed garbage" (validation). Soft not-found is never an
//! error: operations return their documented empty value instead.

use thiserror::Error;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Every hard failure an operation can surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure: connect, timeout, TLS, request build.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {status}")]
    Http { status: reqwest::StatusCode },

    /// Login rejected, or the challenge response carried no salt
    /// (unknown username). The session is cleared before this is raised.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The server answered 2xx but the body is not the shape the API
    /// documents: missing field, wrong type, or unparseable JSON.
    #[error("malformed server response: {context}")]
    DataIntegrity { context: String },

    /// Caller-supplied parameters were missing or contradictory.
    /// Raised before any network traffic.
    #[error("invalid parameters: {0}")]
    Validation(String),
}

impl ApiError {
    pub(crate) fn auth(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(context: impl Into<String>) -> Self {
        Self::DataIntegrity {
            context: context.into(),
        }
    }

    /// True for failures that indicate a rejected or missing login.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure_class() {
        let err = ApiError::auth("wrong password");
        assert_eq!(err.to_string(), "authentication failed: wrong password");
        assert!(err.is_authentication());

        let err = ApiError::shape("status: missing field");
        assert_eq!(
            err.to_string(),
            "malformed server response: status: missing field"
        );
        assert!(!err.is_authentication());
    }
}
