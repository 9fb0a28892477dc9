//! Compatibility bridge between the chain's tuple model and the caller's
//! rich response/error model.
//!
//! While enabled (the default) this component is pinned at the outermost
//! position of the chain. It converts the canonical tuple into a
//! [`Response`], re-raises captured response-carrying errors, and runs the
//! caller's response callback. With it disabled the chain's raw outcome is
//! handed back untouched and nothing raises.

use bytes::Bytes;

use crate::chain::{BoxHandler, Component, Handler, Outcome};
use crate::Environment;
use strata_core::{Response, Result};

/// The response bridge component.
///
/// Disabling it opts the caller into the raw tuple contract:
///
/// ```ignore
/// client.disable::<Compatibility>();
/// let outcome = client.execute(request)?; // Outcome::Raw / Outcome::Faulted
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Compatibility;

impl Component for Compatibility {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Box::new(Bridge { inner })
    }
}

struct Bridge {
    inner: BoxHandler,
}

impl Handler for Bridge {
    fn call(&self, env: &mut Environment) -> Result<Outcome> {
        match self.inner.call(env)? {
            // The backend classified this status as exceptional: discard the
            // tuple shape and re-raise, but keep the post-chain headers so
            // anything middleware added (cache status, tracing ids) stays
            // visible to the caller.
            Outcome::Faulted {
                mut error,
                response,
            } => {
                error.set_response_headers(response.headers);
                Err(error)
            }
            Outcome::Raw(raw) => {
                let response = raw.into_response();
                let response = run_callback(env, response);
                Ok(Outcome::Response(response))
            }
            // Already bridged further in; nothing left to convert.
            bridged @ Outcome::Response(_) => Ok(bridged),
        }
    }
}

fn run_callback(env: &mut Environment, response: Response<Bytes>) -> Response<Bytes> {
    match env.take_callback() {
        Some(callback) => callback(response),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::chain::RawResponse;
    use strata_core::{Error, Method, Request};

    fn env() -> Environment {
        Environment::from_request(
            Request::builder(Method::Get, "http://example.com/r".parse().expect("url")).build(),
        )
    }

    fn bridged(inner: BoxHandler) -> BoxHandler {
        Compatibility.wrap(inner)
    }

    #[test]
    fn converts_tuple_to_response() {
        let chain = bridged(Box::new(|_: &mut Environment| -> Result<Outcome> {
            let mut headers = HashMap::new();
            headers.insert("Content-Type".to_string(), "text/plain".to_string());
            Ok(Outcome::Raw(RawResponse::new(
                200,
                headers,
                vec![Bytes::from_static(b"resp"), Bytes::from_static(b"onse")],
            )))
        }));

        let outcome = chain.call(&mut env()).expect("outcome");
        let Outcome::Response(response) = outcome else {
            panic!("expected a bridged response");
        };
        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"response");
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn reraises_faulted_with_post_chain_headers() {
        let chain = bridged(Box::new(|_: &mut Environment| -> Result<Outcome> {
            let error = Error::from_response(strata_core::Response::new(
                404,
                HashMap::new(),
                Bytes::from_static(b"missing"),
            ));
            let mut response = RawResponse::new(404, HashMap::new(), vec![Bytes::from_static(b"missing")]);
            response
                .headers
                .insert("X-Cache".to_string(), "hit".to_string());
            Ok(Outcome::Faulted { error, response })
        }));

        let err = chain.call(&mut env()).expect_err("should raise");
        assert_eq!(err.status(), Some(404));
        let attached = err.response().expect("attached response");
        assert_eq!(attached.header("X-Cache"), Some("hit"));
    }

    #[test]
    fn runs_response_callback() {
        let chain = bridged(Box::new(|_: &mut Environment| -> Result<Outcome> {
            Ok(Outcome::Raw(RawResponse::new(
                200,
                HashMap::new(),
                vec![Bytes::from_static(b"body")],
            )))
        }));

        let mut env = env();
        env.set_callback(Box::new(|mut response| {
            response
                .headers_mut()
                .insert("X-Seen-By-Callback".to_string(), "yes".to_string());
            response
        }));

        let outcome = chain.call(&mut env).expect("outcome");
        let Outcome::Response(response) = outcome else {
            panic!("expected a bridged response");
        };
        assert_eq!(response.header("X-Seen-By-Callback"), Some("yes"));
    }

    #[test]
    fn connectivity_errors_pass_straight_through() {
        let chain = bridged(Box::new(|_: &mut Environment| -> Result<Outcome> {
            Err(Error::connection("refused"))
        }));

        let err = chain.call(&mut env()).expect_err("should propagate");
        assert!(err.is_connection());
    }
}
