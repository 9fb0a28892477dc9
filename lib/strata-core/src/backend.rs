//! The terminal backend trait.
//!
//! [`HttpBackend`] is the request-execution primitive the middleware chain
//! wraps: given a request it either returns a response, or fails. The contract
//! is error-as-exception: implementations return [`crate::Error::Http`] (which
//! still carries the response) for statuses they classify as exceptional, and
//! [`crate::Error::Connection`] / [`crate::Error::Timeout`] when the server
//! never responded at all.
//!
//! Calls are synchronous and blocking; no retry, redirect-following, or
//! cancellation happens at this level.

use bytes::Bytes;

use crate::{Request, Response, Result};

/// A synchronous HTTP request executor.
pub trait HttpBackend: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Http`] when the server responded with an exceptional
    ///   status (the response rides along in the error)
    /// - [`crate::Error::Connection`] / [`crate::Error::Timeout`] /
    ///   [`crate::Error::Tls`] when no response exists
    fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>>;
}

impl<B: HttpBackend + ?Sized> HttpBackend for &B {
    fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        (**self).execute(request)
    }
}

impl<B: HttpBackend + ?Sized> HttpBackend for std::sync::Arc<B> {
    fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        (**self).execute(request)
    }
}

/// Extension trait for [`HttpBackend`] with convenience methods.
pub trait HttpBackendExt: HttpBackend {
    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the request fails.
    fn get(&self, url: &str) -> Result<Response<Bytes>> {
        let url = url::Url::parse(url)?;
        self.execute(Request::builder(crate::Method::Get, url).build())
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails.
    fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> Result<Response<Bytes>> {
        let url = url::Url::parse(url)?;
        let request = Request::builder(crate::Method::Post, url)
            .json(body)?
            .build();
        self.execute(request)
    }

    /// Execute a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the request fails.
    fn delete(&self, url: &str) -> Result<Response<Bytes>> {
        let url = url::Url::parse(url)?;
        self.execute(Request::builder(crate::Method::Delete, url).build())
    }
}

impl<B: HttpBackend> HttpBackendExt for B {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Canned;

    impl HttpBackend for Canned {
        fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
            Ok(Response::new(
                200,
                HashMap::new(),
                Bytes::from(request.url().path().to_string()),
            ))
        }
    }

    #[test]
    fn ext_get_builds_request() {
        let response = Canned.get("https://example.com/ping").expect("response");
        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"/ping");
    }

    #[test]
    fn ext_rejects_invalid_url() {
        let err = Canned.get("not a url").expect_err("invalid");
        assert!(matches!(err, crate::Error::InvalidUrl(_)));
    }

    #[test]
    fn backend_through_arc() {
        let backend = std::sync::Arc::new(Canned);
        let response = backend.get("https://example.com/arc").expect("response");
        assert_eq!(response.body().as_ref(), b"/arc");
    }
}
