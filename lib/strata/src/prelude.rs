//! Prelude module for convenient imports.
//!
//! ```ignore
//! use strata::prelude::*;
//! ```

pub use crate::{
    BoxHandler, Client, Compatibility, Component, Environment, Error, Handler, HttpBackend,
    HttpBackendExt, Method, Outcome, RawResponse, Registry, Request, RequestBuilder, Response,
    Result,
};
