//! The middleware chain: handler/component contracts, the canonical result
//! tuple, and the terminal invocation wrapper.
//!
//! A chain is a stack of [`Handler`]s, each wrapping an inner one, with a
//! [`Terminal`] at the bottom performing the real backend call. Components
//! are folded into a chain by
//! [`Registry::assemble`](crate::Registry::assemble) on every request.
//!
//! Results are threaded explicitly as a tagged [`Outcome`] rather than a
//! mutable slot: a response-carrying failure travels as
//! [`Outcome::Faulted`] so middleware can still observe, decorate, or cache
//! it, while connectivity failures short-circuit as `Err` and are never
//! visible as a normal result.

use std::collections::HashMap;

use bytes::Bytes;

use crate::{Environment, headers};
use strata_core::{Error, HttpBackend, Response, Result};

/// One link in the chain.
///
/// Implementations may read and mutate the environment, delegate to their
/// inner handler, and transform the outcome on the way back out.
pub trait Handler: Send + Sync {
    /// Processes the environment and produces an outcome.
    ///
    /// # Errors
    ///
    /// Returns an error for connectivity failures and anything else that
    /// must abort the whole call without a usable response.
    fn call(&self, env: &mut Environment) -> Result<Outcome>;
}

/// Boxed chain link.
pub type BoxHandler = Box<dyn Handler>;

impl<F> Handler for F
where
    F: Fn(&mut Environment) -> Result<Outcome> + Send + Sync,
{
    fn call(&self, env: &mut Environment) -> Result<Outcome> {
        self(env)
    }
}

/// A registrable middleware component.
///
/// The component value itself carries its configuration (captured at
/// registration time); [`Component::wrap`] instantiates a handler around the
/// inner chain on each assembly. The component's type is its registration
/// identity: re-enabling the same type replaces the previous registration.
pub trait Component: Send + Sync + 'static {
    /// Wraps the inner chain with this component's handler.
    fn wrap(&self, inner: BoxHandler) -> BoxHandler;
}

/// Canonical result tuple: status, wire-cased single-value headers, and the
/// body as a sequence of byte chunks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header map with wire-case keys.
    pub headers: HashMap<String, String>,
    /// Body chunks; concatenated they form the full body.
    pub body: Vec<Bytes>,
}

impl RawResponse {
    /// Creates a tuple from its parts.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<Bytes>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header value by wire-case name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Concatenated body.
    #[must_use]
    pub fn body_bytes(&self) -> Bytes {
        match self.body.as_slice() {
            [single] => single.clone(),
            chunks => {
                let mut all = Vec::with_capacity(chunks.iter().map(Bytes::len).sum());
                for chunk in chunks {
                    all.extend_from_slice(chunk);
                }
                Bytes::from(all)
            }
        }
    }

    /// Replaces the body with a single chunk.
    pub fn set_body(&mut self, body: Bytes) {
        self.body = vec![body];
    }

    /// Overwrites `Content-Length`, when present, with the actual body
    /// length.
    pub fn refresh_content_length(&mut self) {
        if self.headers.contains_key("Content-Length") {
            let len = self.body.iter().map(Bytes::len).sum::<usize>();
            self.headers
                .insert("Content-Length".to_string(), len.to_string());
        }
    }

    /// Converts into a rich [`Response`], concatenating the body chunks.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let body = self.body_bytes();
        Response::new(self.status, self.headers, body)
    }
}

/// Tagged result threaded through the chain.
#[derive(Debug)]
pub enum Outcome {
    /// Normal result tuple.
    Raw(RawResponse),
    /// The backend responded with an exceptional status: the error is kept
    /// for re-raising at the compatibility boundary, the tuple for
    /// middleware to observe and decorate.
    Faulted {
        /// The captured response-carrying error.
        error: Error,
        /// The normalized tuple built from the error's response.
        response: RawResponse,
    },
    /// A rich response, produced only by the compatibility bridge at the
    /// outermost position.
    Response(Response<Bytes>),
}

impl Outcome {
    /// The result tuple, for both normal and faulted outcomes.
    #[must_use]
    pub fn raw(&self) -> Option<&RawResponse> {
        match self {
            Self::Raw(raw) | Self::Faulted { response: raw, .. } => Some(raw),
            Self::Response(_) => None,
        }
    }

    /// Mutable access to the result tuple, for both normal and faulted
    /// outcomes.
    #[must_use]
    pub fn raw_mut(&mut self) -> Option<&mut RawResponse> {
        match self {
            Self::Raw(raw) | Self::Faulted { response: raw, .. } => Some(raw),
            Self::Response(_) => None,
        }
    }

    /// Status code of whatever this outcome holds.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Raw(raw) | Self::Faulted { response: raw, .. } => raw.status,
            Self::Response(response) => response.status(),
        }
    }

    /// Converts into a rich response.
    ///
    /// # Errors
    ///
    /// A faulted outcome yields its captured error, with headers replaced by
    /// the (possibly middleware-decorated) tuple headers.
    pub fn into_response(self) -> Result<Response<Bytes>> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Raw(raw) => Ok(raw.into_response()),
            Self::Faulted {
                mut error,
                response,
            } => {
                error.set_response_headers(response.headers);
                Err(error)
            }
        }
    }
}

/// The innermost chain link: adapts the environment back into a real request,
/// executes it, and normalizes the result into the canonical tuple.
pub struct Terminal<B> {
    backend: B,
}

impl<B> Terminal<B> {
    /// Creates a terminal over the given backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: HttpBackend> Handler for Terminal<B> {
    fn call(&self, env: &mut Environment) -> Result<Outcome> {
        let request = reassemble_request(env);

        match self.backend.execute(request) {
            Ok(response) => Ok(Outcome::Raw(normalize(response))),
            Err(error) => match error.response() {
                // The backend did respond; keep the error AND expose its
                // response as data so outer middleware can observe it.
                Some(response) => Ok(Outcome::Faulted {
                    error,
                    response: normalize(response),
                }),
                // Pure connectivity failure: nothing to observe, re-raise.
                None => Err(error),
            },
        }
    }
}

/// Rebuilds the outgoing request from the environment: headers reconstructed
/// from the field map override the originally-constructed ones, and a
/// non-empty input stream replaces the original body.
fn reassemble_request(env: &mut Environment) -> strata_core::Request<Bytes> {
    let mut request = env.request().clone();

    let original: Vec<(String, String)> = request
        .headers()
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let merged = request.headers_mut();
    merged.clear();
    for (name, value) in original {
        merged.insert(headers::canonical(&name), value);
    }
    for (key, value) in env.header_fields() {
        merged.insert(headers::wire_key(key), value.clone());
    }

    let body = env.input_mut().contents();
    if !body.is_empty() {
        request.set_body(body);
    }

    request
}

/// Normalizes a backend response into the canonical tuple: wire-case header
/// keys, no `Status` pseudo-header, a single body chunk, and a
/// `Content-Length` that matches the actual body.
fn normalize(response: Response<Bytes>) -> RawResponse {
    let (status, headers, body) = response.into_parts();

    let headers = headers
        .into_iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("status"))
        .map(|(name, value)| (headers::canonical(&name), value))
        .collect();

    let mut raw = RawResponse::new(status, headers, vec![body]);
    raw.refresh_content_length();
    raw
}
