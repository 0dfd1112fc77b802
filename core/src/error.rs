//! Error types for the HTTP client.
//!
//! # Design
//! Non-2xx responses get their own `BadStatusError` type so tests can build
//! the expected value by hand and compare it structurally. Everything that
//! goes wrong below HTTP (DNS, connect, TLS, cancellation, deadline) is a
//! transport error; see `Error::is_transport`.

use std::fmt;

use reqwest::StatusCode;

/// A response whose status was outside `[200, 300)`.
///
/// `body` holds whatever could be read from the response before failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadStatusError {
    pub code: u16,
    pub body: Vec<u8>,
}

impl BadStatusError {
    pub fn new(code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            body: body.into(),
        }
    }

    /// Canonical reason phrase for `code`, empty when unknown.
    pub fn status_text(&self) -> &'static str {
        StatusCode::from_u16(self.code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("")
    }
}

impl fmt::Display for BadStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "got HTTP {} ({}): {:?}",
            self.code,
            self.status_text(),
            String::from_utf8_lossy(&self.body)
        )
    }
}

impl std::error::Error for BadStatusError {}

/// Errors returned by `Client::get` and `Client::post`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request body could not be encoded as JSON. No I/O was attempted.
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The URL or a header could not be turned into a valid HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// DNS, connect, TLS or protocol failure reported by the transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The call's context was cancelled before the call finished.
    #[error("request canceled")]
    Canceled,

    /// The call's context deadline passed before the call finished.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    BadStatus(#[from] BadStatusError),

    /// Copying the response body into the caller's sink failed.
    #[error("failed to stream response body: {0}")]
    Stream(#[source] std::io::Error),

    /// The response body was not valid JSON for the requested target.
    #[error("failed to decode response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// TLS material could not be loaded or the transport could not be built.
    #[error("tls configuration: {0}")]
    Tls(#[source] reqwest::Error),

    /// Error produced by a mock handler.
    #[error(transparent)]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error, typically from a `MockClient` handler.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Handler(err.into())
    }

    pub fn bad_status(&self) -> Option<&BadStatusError> {
        match self {
            Error::BadStatus(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Canceled | Error::DeadlineExceeded
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_status_equality_is_structural() {
        let a = BadStatusError::new(404, "hello");
        let b = BadStatusError {
            code: 404,
            body: b"hello".to_vec(),
        };
        assert_eq!(a, b);
        assert_ne!(a, BadStatusError::new(404, "world"));
        assert_ne!(a, BadStatusError::new(500, "hello"));
    }

    #[test]
    fn bad_status_display_includes_reason_and_body() {
        let err = BadStatusError::new(418, "hello");
        assert_eq!(err.to_string(), r#"got HTTP 418 (I'm a teapot): "hello""#);
    }

    #[test]
    fn bad_status_display_with_unknown_code() {
        let err = BadStatusError::new(599, "");
        assert_eq!(err.to_string(), r#"got HTTP 599 (): """#);
    }

    #[test]
    fn bad_status_accessor() {
        let err = Error::from(BadStatusError::new(500, "boom"));
        assert_eq!(err.bad_status(), Some(&BadStatusError::new(500, "boom")));
        assert!(Error::Canceled.bad_status().is_none());
    }

    #[test]
    fn cancellation_counts_as_transport() {
        assert!(Error::Canceled.is_transport());
        assert!(Error::DeadlineExceeded.is_transport());
        assert!(!Error::InvalidRequest("x".to_string()).is_transport());
        assert!(!Error::from(BadStatusError::new(404, "")).is_transport());
    }

    #[test]
    fn handler_wraps_message() {
        let err = Error::handler("no such fixture");
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "no such fixture");
    }
}
