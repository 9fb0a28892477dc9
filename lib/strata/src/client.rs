//! Middleware-aware HTTP client.
//!
//! [`Client`] owns a backend and a per-instance [`Registry`]; there is no
//! process-wide state. The chain is assembled from the registry on every
//! call, so enable/disable between calls is always observed. The registry is
//! mutex-guarded: concurrent reconfiguration while requests are in flight is
//! safe, though each request sees whichever registry state held when its
//! chain was assembled.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use crate::chain::{Component, Outcome, Terminal};
use crate::env::{Environment, ResponseCallback};
use crate::registry::Registry;
use strata_core::{HttpBackend, Request, Response, Result};

/// HTTP client that routes every request through its middleware chain.
///
/// # Example
///
/// ```ignore
/// use strata::{Client, middleware::Logging};
///
/// let client = Client::new(backend);
/// client.enable(Logging::default());
///
/// let response = client.execute(request)?.into_response()?;
/// ```
pub struct Client<B> {
    backend: Arc<B>,
    registry: Mutex<Registry>,
}

impl<B: HttpBackend + 'static> std::fmt::Debug for Client<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("registry", &self.lock_registry())
            .finish_non_exhaustive()
    }
}

impl<B: HttpBackend + 'static> Client<B> {
    /// Creates a client over the given backend, with the default registry
    /// (compatibility bridge enabled, nothing else).
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_registry(backend, Registry::new())
    }

    /// Creates a client with a pre-built registry.
    #[must_use]
    pub fn with_registry(backend: B, registry: Registry) -> Self {
        Self {
            backend: Arc::new(backend),
            registry: Mutex::new(registry),
        }
    }

    /// Enables a middleware component.
    pub fn enable<C: Component>(&self, component: C) {
        self.lock_registry().enable(component);
    }

    /// Disables a middleware component by type.
    pub fn disable<C: Component>(&self) {
        self.lock_registry().disable::<C>();
    }

    /// Returns `true` if a component of this type is enabled.
    #[must_use]
    pub fn enabled<C: Component>(&self) -> bool {
        self.lock_registry().enabled::<C>()
    }

    /// Resets the registry to its default state.
    pub fn reset(&self) {
        self.lock_registry().reset();
    }

    /// Number of enabled registrations.
    #[must_use]
    pub fn components(&self) -> usize {
        self.lock_registry().len()
    }

    /// Executes a request through the middleware chain.
    ///
    /// With the compatibility bridge enabled (the default) the outcome is
    /// [`Outcome::Response`], and exceptional statuses raise
    /// [`strata_core::Error::Http`]. With the bridge disabled the raw
    /// [`Outcome::Raw`] / [`Outcome::Faulted`] tuple comes back without
    /// raising.
    ///
    /// # Errors
    ///
    /// Connectivity failures always; response-carrying failures only while
    /// the compatibility bridge is enabled.
    pub fn execute(&self, request: Request<Bytes>) -> Result<Outcome> {
        let mut env = Environment::from_request(request);
        self.run(&mut env)
    }

    /// Executes a request, passing the final response through `callback`.
    ///
    /// The callback only runs while the compatibility bridge is enabled; its
    /// return value becomes the call's response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::execute`].
    pub fn execute_with(
        &self,
        request: Request<Bytes>,
        callback: impl FnOnce(Response<Bytes>) -> Response<Bytes> + Send + 'static,
    ) -> Result<Outcome> {
        let mut env = Environment::from_request(request);
        env.set_callback(Box::new(callback) as ResponseCallback);
        self.run(&mut env)
    }

    fn run(&self, env: &mut Environment) -> Result<Outcome> {
        // Assemble under the lock, call outside it: reconfiguration is
        // serialized, but the backend call never blocks other callers.
        let chain = {
            let registry = self.lock_registry();
            tracing::debug!(components = ?registry.names(), "assembling middleware chain");
            registry.assemble(Box::new(Terminal::new(Arc::clone(&self.backend))))
        };
        chain.call(env)
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::bridge::Compatibility;
    use strata_core::Method;

    struct Canned;

    impl HttpBackend for Canned {
        fn execute(&self, _request: Request<Bytes>) -> Result<Response<Bytes>> {
            Ok(Response::new(
                200,
                HashMap::new(),
                Bytes::from_static(b"ok"),
            ))
        }
    }

    fn request() -> Request<Bytes> {
        Request::builder(Method::Get, "http://example.com/r".parse().expect("url")).build()
    }

    #[test]
    fn default_client_bridges_to_response() {
        let client = Client::new(Canned);
        let outcome = client.execute(request()).expect("outcome");

        let response = outcome.into_response().expect("response");
        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"ok");
    }

    #[test]
    fn disabled_bridge_yields_raw_tuple() {
        let client = Client::new(Canned);
        client.disable::<Compatibility>();

        let outcome = client.execute(request()).expect("outcome");
        assert!(matches!(outcome, Outcome::Raw(_)));
    }

    #[test]
    fn registry_ops_delegate() {
        let client = Client::new(Canned);
        assert!(client.enabled::<Compatibility>());
        assert_eq!(client.components(), 1);

        client.disable::<Compatibility>();
        assert_eq!(client.components(), 0);

        client.reset();
        assert!(client.enabled::<Compatibility>());
    }
}
