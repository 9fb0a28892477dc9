//! Composable request/response middleware for synchronous HTTP clients.
//!
//! Strata lets independently-authored middleware (caching, logging,
//! decompression, fault injection) transparently wrap every outgoing call a
//! client makes, while the caller keeps receiving rich responses and
//! raised errors exactly as if no middleware were installed.
//!
//! Each request is translated into a canonical per-request [`Environment`],
//! handed through a chain of [`Component`]s assembled from the client's
//! [`Registry`], executed by the terminal wrapper against an
//! [`HttpBackend`], and normalized into a `(status, headers, body-chunks)`
//! tuple on the way back out. The [`Compatibility`] bridge at the outermost
//! position converts that tuple back into the caller's model - including
//! re-raising backend errors that middleware were still allowed to observe.
//!
//! # Example
//!
//! ```ignore
//! use strata::{Client, middleware::Logging};
//!
//! let client = Client::new(backend);
//! client.enable(Logging::default());
//!
//! let response = client.execute(request)?.into_response()?;
//! println!("{}", response.status());
//! ```
//!
//! # Writing a component
//!
//! ```ignore
//! use strata::{BoxHandler, Component, Environment, Handler, Outcome};
//!
//! struct CacheTag;
//!
//! impl Component for CacheTag {
//!     fn wrap(&self, inner: BoxHandler) -> BoxHandler {
//!         Box::new(move |env: &mut Environment| {
//!             let mut outcome = inner.call(env)?;
//!             if let Some(raw) = outcome.raw_mut() {
//!                 raw.headers.insert("X-Cache".into(), "miss".into());
//!             }
//!             Ok(outcome)
//!         })
//!     }
//! }
//! ```

mod bridge;
mod chain;
mod client;
mod env;
pub mod headers;
pub mod middleware;
pub mod prelude;
mod registry;

pub use bridge::Compatibility;
pub use chain::{BoxHandler, Component, Handler, Outcome, RawResponse, Terminal};
pub use client::Client;
pub use env::{Environment, ErrorSink, Input, ResponseCallback};
pub use registry::Registry;

// Re-export core types
pub use strata_core::{
    ContentType, Error, HttpBackend, HttpBackendExt, Method, Request, RequestBuilder, Response,
    Result, StatusCode, from_json, header, to_form, to_json,
};

// Re-export crates that appear in public signatures
pub use bytes;
pub use url;
