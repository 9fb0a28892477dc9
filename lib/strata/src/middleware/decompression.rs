//! Response decompression middleware.
//!
//! Advertises `Accept-Encoding: gzip, deflate` on the way in and, on the way
//! out, decodes bodies whose `Content-Encoding` says gzip or deflate. The
//! encoding header is removed after decoding and `Content-Length` is
//! rewritten to the decoded length, so the tuple leaving this component is
//! internally consistent. Faulted outcomes are decoded too: an error page is
//! still a body.

use std::io::Read;

use bytes::Bytes;

use crate::chain::{BoxHandler, Component, Handler, Outcome};
use crate::Environment;
use strata_core::{Error, Result};

/// Decompression component for gzip and deflate response bodies.
///
/// ```ignore
/// client.enable(Decompression::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompression {
    _private: (),
}

impl Decompression {
    /// Creates a new decompression component.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Component for Decompression {
    fn wrap(&self, inner: BoxHandler) -> BoxHandler {
        Box::new(DecompressionHandler { inner })
    }
}

struct DecompressionHandler {
    inner: BoxHandler,
}

impl Handler for DecompressionHandler {
    fn call(&self, env: &mut Environment) -> Result<Outcome> {
        if env.field("HTTP_ACCEPT_ENCODING").is_none() {
            env.set_field("HTTP_ACCEPT_ENCODING", "gzip, deflate");
        }

        let mut outcome = self.inner.call(env)?;

        if let Some(raw) = outcome.raw_mut() {
            let encoding = raw.header("Content-Encoding").unwrap_or("").to_string();
            if !(encoding.is_empty() || encoding == "identity") {
                let decoded = decompress(&encoding, &raw.body_bytes())?;
                raw.headers.remove("Content-Encoding");
                raw.headers
                    .insert("Content-Length".to_string(), decoded.len().to_string());
                raw.set_body(decoded);
            }
        }

        Ok(outcome)
    }
}

/// Decode a body according to its declared encoding.
fn decompress(encoding: &str, body: &Bytes) -> Result<Bytes> {
    let decoded = match encoding {
        "gzip" | "x-gzip" => {
            let mut decoder = flate2::read::GzDecoder::new(body.as_ref());
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| Error::invalid_request(format!("gzip decompression failed: {e}")))?;
            Bytes::from(out)
        }
        "deflate" => {
            let mut decoder = flate2::read::DeflateDecoder::new(body.as_ref());
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).map_err(|e| {
                Error::invalid_request(format!("deflate decompression failed: {e}"))
            })?;
            Bytes::from(out)
        }
        // Unknown encoding, leave the body alone
        _ => body.clone(),
    };

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder};

    use super::*;
    use crate::chain::RawResponse;
    use strata_core::{Method, Request};

    fn gzipped(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("write");
        encoder.finish().expect("finish")
    }

    fn env() -> Environment {
        Environment::from_request(
            Request::builder(Method::Get, "http://example.com/z".parse().expect("url")).build(),
        )
    }

    fn encoded_outcome(encoding: &'static str, body: Vec<u8>) -> BoxHandler {
        Box::new(move |_: &mut Environment| -> Result<Outcome> {
            let mut headers = HashMap::new();
            headers.insert("Content-Encoding".to_string(), encoding.to_string());
            headers.insert("Content-Length".to_string(), body.len().to_string());
            Ok(Outcome::Raw(RawResponse::new(
                200,
                headers,
                vec![Bytes::from(body.clone())],
            )))
        })
    }

    #[test]
    fn decompresses_gzip_and_fixes_content_length() {
        let compressed = gzipped(b"hello world");
        let chain = Decompression::new().wrap(encoded_outcome("gzip", compressed));

        let outcome = chain.call(&mut env()).expect("outcome");
        let raw = outcome.raw().expect("raw");

        assert_eq!(raw.body_bytes().as_ref(), b"hello world");
        assert_eq!(raw.header("Content-Encoding"), None);
        assert_eq!(raw.header("Content-Length"), Some("11"));
    }

    #[test]
    fn decompresses_deflate() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello deflate").expect("write");
        let compressed = encoder.finish().expect("finish");

        let chain = Decompression::new().wrap(encoded_outcome("deflate", compressed));
        let outcome = chain.call(&mut env()).expect("outcome");

        assert_eq!(
            outcome.raw().expect("raw").body_bytes().as_ref(),
            b"hello deflate"
        );
    }

    #[test]
    fn leaves_identity_untouched() {
        let chain = Decompression::new().wrap(Box::new(
            |_: &mut Environment| -> Result<Outcome> {
                let mut headers = HashMap::new();
                headers.insert("Content-Encoding".to_string(), "identity".to_string());
                Ok(Outcome::Raw(RawResponse::new(
                    200,
                    headers,
                    vec![Bytes::from_static(b"plain")],
                )))
            },
        ));

        let outcome = chain.call(&mut env()).expect("outcome");
        let raw = outcome.raw().expect("raw");
        assert_eq!(raw.body_bytes().as_ref(), b"plain");
        assert_eq!(raw.header("Content-Encoding"), Some("identity"));
    }

    #[test]
    fn advertises_accept_encoding() {
        let chain = Decompression::new().wrap(Box::new(
            |env: &mut Environment| -> Result<Outcome> {
                assert_eq!(env.field("HTTP_ACCEPT_ENCODING"), Some("gzip, deflate"));
                Ok(Outcome::Raw(RawResponse::default()))
            },
        ));

        chain.call(&mut env()).expect("outcome");
    }

    #[test]
    fn decodes_faulted_outcomes_too() {
        let compressed = gzipped(b"not found page");
        let chain = Decompression::new().wrap(Box::new(
            move |_: &mut Environment| -> Result<Outcome> {
                let mut headers = HashMap::new();
                headers.insert("Content-Encoding".to_string(), "gzip".to_string());
                let response =
                    RawResponse::new(404, headers, vec![Bytes::from(compressed.clone())]);
                Ok(Outcome::Faulted {
                    error: Error::http(404, "Not Found"),
                    response,
                })
            },
        ));

        let outcome = chain.call(&mut env()).expect("outcome");
        assert_eq!(
            outcome.raw().expect("raw").body_bytes().as_ref(),
            b"not found page"
        );
    }

    #[test]
    fn corrupt_gzip_is_an_error() {
        let chain = Decompression::new().wrap(encoded_outcome("gzip", b"not gzip".to_vec()));
        let err = chain.call(&mut env()).expect_err("should fail");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
