//! Stock middleware components.
//!
//! Anything implementing [`Component`](crate::Component) can join the chain;
//! these are the components shipped in-tree:
//!
//! | Component | Feature | Description |
//! |-----------|---------|-------------|
//! | [`Logging`] | always | Request/response logging via `tracing` |
//! | [`Decompression`] | `middleware-decompression` | gzip/deflate response bodies |
//!
//! A component observes faulted outcomes too: a logger sees (and logs) a 404
//! exactly like a cache could store one.

#[cfg(feature = "middleware-decompression")]
mod decompression;
mod logging;

#[cfg(feature = "middleware-decompression")]
pub use decompression::Decompression;
pub use logging::{LogLevel, Logging};
