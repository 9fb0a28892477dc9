//! Error types for strata.
//!
//! The taxonomy distinguishes two failure families:
//!
//! - [`Error::Http`] - the backend responded, but with a status classified as
//!   exceptional. The full response (status, headers, body) rides along so
//!   middleware can still observe and act on it.
//! - [`Error::Connection`] / [`Error::Timeout`] / [`Error::Tls`] - no response
//!   exists; these always propagate untouched through the whole stack.

use std::collections::HashMap;

use bytes::Bytes;
use derive_more::{Display, Error, From};

use crate::Response;

/// Main error type for strata operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// HTTP-level errors (statuses the backend classifies as exceptional).
    ///
    /// Carries the complete response so this error remains convertible back
    /// into a [`Response`] for inspection by middleware.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response headers, wire-cased.
        headers: HashMap<String, String>,
        /// Response body.
        #[error(not(source))]
        body: Bytes,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from a full response.
    ///
    /// The standard way for backends to report an exceptional status without
    /// losing the response data.
    #[must_use]
    pub fn from_response(response: Response<Bytes>) -> Self {
        let (status, headers, body) = response.into_parts();
        Self::Http {
            status,
            message: canned_message(status).to_string(),
            headers,
            body,
        }
    }

    /// Create an HTTP error from status code and message, without a body.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Reconstitute the attached response, if this error carries one.
    ///
    /// Only [`Error::Http`] carries a response; connectivity failures return
    /// `None`.
    #[must_use]
    pub fn response(&self) -> Option<Response<Bytes>> {
        match self {
            Self::Http {
                status,
                headers,
                body,
                ..
            } => Some(Response::new(*status, headers.clone(), body.clone())),
            _ => None,
        }
    }

    /// Replace the attached response headers.
    ///
    /// No-op for errors without a response. Used by the compatibility bridge
    /// so headers added by middleware (e.g. cache status) stay visible when
    /// the error reaches the caller.
    pub fn set_response_headers(&mut self, new_headers: HashMap<String, String>) {
        if let Self::Http { headers, .. } = self {
            *headers = new_headers;
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns the response body if this is an HTTP error.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Reason phrase for common exceptional statuses.
fn canned_message(status: u16) -> &'static str {
    match status {
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "HTTP error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");
    }

    #[test]
    fn error_from_response_round_trip() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let response = Response::new(404, headers.clone(), Bytes::from("missing"));

        let err = Error::from_response(response.clone());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");
        assert_eq!(err.response(), Some(response));
    }

    #[test]
    fn error_set_response_headers() {
        let mut err = Error::from_response(Response::new(500, HashMap::new(), Bytes::new()));

        let mut decorated = HashMap::new();
        decorated.insert("X-Cache".to_string(), "miss".to_string());
        err.set_response_headers(decorated);

        let response = err.response().expect("response");
        assert_eq!(response.header("X-Cache"), Some("miss"));
    }

    #[test]
    fn error_status_classes() {
        let err = Error::http(404, "Not Found");
        assert!(err.is_client_error());
        assert!(err.is_not_found());
        assert!(!err.is_server_error());

        let err = Error::http(500, "Internal Server Error");
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
    }

    #[test]
    fn connectivity_errors_carry_no_response() {
        assert!(Error::connection("refused").response().is_none());
        assert!(Error::Timeout.response().is_none());
        assert!(Error::tls("handshake").response().is_none());
    }
}
