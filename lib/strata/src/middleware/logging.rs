//! Request/response logging middleware.
//!
//! Logs every traversal of the chain using the `tracing` crate, including
//! faulted outcomes (the backend responded with an exceptional status) and
//! connectivity failures.

use std::time::Instant;

use tracing::{Level, debug, info, span, warn};

use crate::chain::{BoxHandler, Component, Handler, Outcome};
use crate::Environment;
use strata_core::Result;

/// Log level for the logging component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (environment details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

/// Logging component.
///
/// ```ignore
/// client.enable(Logging::default());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging {
    level: LogLevel,
}

impl Logging {
    /// Logging at the default info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logging at debug level, including environment details.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl Component for Logging {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Box::new(LoggingHandler {
            level: self.level,
            inner,
        })
    }
}

struct LoggingHandler {
    level: LogLevel,
    inner: BoxHandler,
}

impl Handler for LoggingHandler {
    fn call(&self, env: &mut Environment) -> Result<Outcome> {
        let method = env.method();
        let path = format!("{}{}", env.script_name(), env.path_info());
        let span = span!(Level::INFO, "http_request", %method, %path);
        let _guard = span.enter();

        match self.level {
            LogLevel::Debug => {
                debug!(
                    method = %method,
                    path = %path,
                    query = env.query_string(),
                    host = env.server_name(),
                    "dispatching request"
                );
            }
            LogLevel::Info => {
                info!(method = %method, path = %path, "dispatching request");
            }
        }

        let start = Instant::now();
        let result = self.inner.call(env);
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(Outcome::Raw(raw)) => {
                let status = raw.status;
                if (200..400).contains(&status) {
                    info!(status, elapsed_ms, "request completed");
                } else {
                    warn!(status, elapsed_ms, "request completed with error status");
                }
            }
            Ok(Outcome::Faulted { response, .. }) => {
                warn!(status = response.status, elapsed_ms, "request failed with HTTP error");
            }
            Ok(Outcome::Response(response)) => {
                info!(status = response.status(), elapsed_ms, "request completed");
            }
            Err(err) => {
                warn!(error = %err, elapsed_ms, "request failed");
            }
        }

        result
    }
}
