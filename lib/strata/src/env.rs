//! Per-request environment record.
//!
//! [`Environment`] is the canonical key-value representation of one in-flight
//! request, handed down the middleware chain. It is built from a
//! [`Request`] by [`Environment::from_request`], owned exclusively for the
//! duration of that call, and discarded once the call returns.
//!
//! Headers live in a field map under their environment encoding
//! (`HTTP_ACCEPT`, `CONTENT_TYPE`, ...) so third-party components can inspect
//! and inject them without knowing about [`Request`] at all. The original
//! request, the rewindable body [`Input`], a shared diagnostic [`ErrorSink`],
//! and an optional response callback ride along out-of-band.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use crate::headers;
use strata_core::{Method, Request, Response};

/// Caller-supplied hook invoked by the compatibility bridge with the final
/// response; its return value becomes the call's result.
pub type ResponseCallback = Box<dyn FnOnce(Response<Bytes>) -> Response<Bytes> + Send>;

/// Rewindable, in-memory readable body stream.
///
/// Middleware that wants to rewrite the outgoing body reads the current
/// contents, transforms them, and installs a replacement with
/// [`Environment::set_input`]. The terminal wrapper rewinds and drains the
/// stream before executing the backend call.
#[derive(Debug, Clone, Default)]
pub struct Input {
    cursor: std::io::Cursor<Vec<u8>>,
}

impl Input {
    /// Creates an input stream over the given bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            cursor: std::io::Cursor::new(bytes.into()),
        }
    }

    /// Resets the read position to the start.
    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }

    /// Rewinds and returns the full contents.
    #[must_use]
    pub fn contents(&mut self) -> Bytes {
        self.rewind();
        Bytes::from(self.cursor.get_ref().clone())
    }

    /// Total length in bytes, independent of read position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Returns `true` if the stream holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// Shared append-only diagnostic sink.
///
/// The environment-level analog of a server's error stream: components write
/// non-fatal diagnostics here instead of failing the request. Clones share
/// the same buffer.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    buffer: Arc<Mutex<String>>,
}

impl ErrorSink {
    /// Appends one diagnostic line.
    pub fn report(&self, message: impl std::fmt::Display) {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(&message.to_string());
        buffer.push('\n');
    }

    /// Everything reported so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// Canonical per-request record passed through the middleware chain.
#[derive(derive_more::Debug)]
pub struct Environment {
    method: Method,
    script_name: String,
    path_info: String,
    query_string: String,
    server_name: String,
    server_port: u16,
    scheme: String,
    fields: HashMap<String, String>,
    input: Input,
    errors: ErrorSink,
    request: Request<Bytes>,
    #[debug(skip)]
    callback: Option<ResponseCallback>,
}

impl Environment {
    /// Builds the environment for one outgoing request.
    ///
    /// Never fails: the URL is already parsed, every header passes through
    /// the codec, and a missing body yields an empty [`Input`]. The request
    /// itself is retained untouched for the terminal wrapper.
    #[must_use]
    pub fn from_request(request: Request<Bytes>) -> Self {
        let url = request.url();
        let (script_name, path_info) = split_path(url.path());
        let query_string = url.query().unwrap_or_default().to_string();
        let server_name = url.host_str().unwrap_or_default().to_string();
        let server_port = url.port_or_known_default().unwrap_or(80);
        let scheme = url.scheme().to_string();

        let fields = request
            .headers()
            .iter()
            .map(|(name, value)| (headers::env_key(name), value.clone()))
            .collect();

        let input = request
            .body()
            .map(|body| Input::new(body.to_vec()))
            .unwrap_or_default();

        Self {
            method: request.method(),
            script_name,
            path_info,
            query_string,
            server_name,
            server_port,
            scheme,
            fields,
            input,
            errors: ErrorSink::default(),
            request,
            callback: None,
        }
    }

    /// Request method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path prefix up to the final segment.
    #[must_use]
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Final path segment, `/`-prefixed.
    #[must_use]
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Raw query string, empty when absent.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Target host.
    #[must_use]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Target port (scheme default when the URL carries none).
    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }

    /// URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Header field by environment key (`HTTP_ACCEPT`, `CONTENT_TYPE`, ...).
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Sets a header field by environment key.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Removes a header field; returns the previous value if any.
    pub fn remove_field(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    /// The full header field map, environment-keyed.
    #[must_use]
    pub fn header_fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// The body input stream.
    #[must_use]
    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    /// Replaces the body input stream (how middleware rewrite outgoing
    /// bodies).
    pub fn set_input(&mut self, input: Input) {
        self.input = input;
    }

    /// The shared diagnostic sink.
    #[must_use]
    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    /// The original request this environment was built from.
    #[must_use]
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Installs the caller's response callback.
    pub fn set_callback(&mut self, callback: ResponseCallback) {
        self.callback = Some(callback);
    }

    /// Takes the response callback, leaving the slot empty.
    #[must_use]
    pub fn take_callback(&mut self) -> Option<ResponseCallback> {
        self.callback.take()
    }
}

/// Splits a URL path into (script name, path info).
///
/// The path info is the `/`-prefixed final segment; the script name is
/// everything before it. A bare `/` path yields `("", "/")`.
fn split_path(path: &str) -> (String, String) {
    let path = if path.is_empty() { "/" } else { path };
    match path.rfind('/') {
        Some(idx) => (
            path.get(..idx).unwrap_or_default().to_string(),
            path.get(idx..).unwrap_or("/").to_string(),
        ),
        None => (String::new(), format!("/{path}")),
    }
}
