//! Search client error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when querying the GitHub search API.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The endpoint rejected the credential.
    #[error("Authentication failed (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Non-success HTTP response.
    #[error("API error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The response carried a GraphQL `errors` array.
    #[error("GraphQL error: {}", .messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// The response body could not be understood.
    #[error("Response decode error: {0}")]
    Decode(String),

    /// The request could not be built from the given parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl QueryError {
    /// Whether the failure happened before any response was received.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the remote service answered with a failure.
    #[inline]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::RateLimited { .. }
                | Self::Remote { .. }
                | Self::Graphql { .. }
        )
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<HttpError> for QueryError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps multi-line API
/// bodies out of status lines and log fields.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_classification() {
        let err: QueryError = HttpError::Transport("connection refused".to_string()).into();
        assert!(err.is_transport());
        assert!(!err.is_remote());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_remote_error_classification() {
        let remote = QueryError::Remote {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(remote.is_remote());
        assert!(!remote.is_transport());
        assert_eq!(remote.to_string(), "API error (502): Bad Gateway");

        assert!(QueryError::Unauthorized { status: 401 }.is_remote());
        assert!(
            QueryError::Graphql {
                messages: vec!["bad".to_string()]
            }
            .is_remote()
        );
        assert!(!QueryError::Decode("eof".to_string()).is_remote());
    }

    #[test]
    fn test_rate_limited_classification() {
        let err = QueryError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(err.is_rate_limited());
        assert!(err.is_remote());
        assert!(err.to_string().contains("Rate limit"));
    }

    #[test]
    fn test_graphql_error_joins_messages() {
        let err = QueryError::Graphql {
            messages: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "GraphQL error: first; second");
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = QueryError::Remote {
            status: 500,
            message: "line one\nline two".to_string(),
        };
        assert_eq!(short_error_message(&err), "API error (500): line one");
    }
}
