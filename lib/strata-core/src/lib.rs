//! Core types and traits for the strata HTTP middleware stack.
//!
//! This crate provides the foundational types used by strata:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpBackend`] - The terminal request-execution trait
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)
//!
//! The backend contract is error-as-exception: statuses the backend classifies
//! as exceptional surface as [`Error::Http`], which still carries the full
//! response so upper layers can observe it.

mod backend;
mod body;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;

pub use backend::{HttpBackend, HttpBackendExt};
pub use body::{ContentType, from_json, to_form, to_json};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
