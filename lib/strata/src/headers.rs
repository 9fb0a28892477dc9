//! Header name codec.
//!
//! Translates between wire-case header names (`Content-Type`) and the
//! environment encoding (`HTTP_CONTENT_TYPE`) used by the per-request
//! [`Environment`](crate::Environment) field map. `Content-Type` and
//! `Content-Length` are conventionally stored without the `HTTP_` prefix.
//!
//! All functions are pure; `wire_key(env_key(h))` is the canonical wire
//! casing of `h` for any name made of letters, digits, and hyphens.

/// Environment encoding of a wire header name.
///
/// `Accept-Language` becomes `HTTP_ACCEPT_LANGUAGE`; the two content headers
/// lose the prefix: `Content-Type` becomes `CONTENT_TYPE`.
#[must_use]
pub fn env_key(name: &str) -> String {
    let upper = name.replace('-', "_").to_ascii_uppercase();
    match upper.as_str() {
        "CONTENT_TYPE" | "CONTENT_LENGTH" => upper,
        _ => format!("HTTP_{upper}"),
    }
}

/// Wire header name for an environment key.
///
/// Strips the `HTTP_` prefix when present, then capitalizes each
/// underscore-separated segment and joins with hyphens:
/// `HTTP_ACCEPT_LANGUAGE` becomes `Accept-Language`, `CONTENT_TYPE` becomes
/// `Content-Type`.
#[must_use]
pub fn wire_key(env_key: &str) -> String {
    let stripped = env_key.strip_prefix("HTTP_").unwrap_or(env_key);
    stripped
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical wire casing for an arbitrarily-cased header name.
///
/// `content-type`, `CONTENT-TYPE`, and `Content-Type` all normalize to
/// `Content-Type`.
#[must_use]
pub fn canonical(name: &str) -> String {
    name.split('-').map(capitalize).collect::<Vec<_>>().join("-")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_prefixes_and_upcases() {
        assert_eq!(env_key("Accept"), "HTTP_ACCEPT");
        assert_eq!(env_key("Accept-Language"), "HTTP_ACCEPT_LANGUAGE");
        assert_eq!(env_key("x-request-id"), "HTTP_X_REQUEST_ID");
    }

    #[test]
    fn content_headers_are_unprefixed() {
        assert_eq!(env_key("Content-Type"), "CONTENT_TYPE");
        assert_eq!(env_key("content-length"), "CONTENT_LENGTH");
    }

    #[test]
    fn wire_key_reverses() {
        assert_eq!(wire_key("HTTP_ACCEPT_LANGUAGE"), "Accept-Language");
        assert_eq!(wire_key("CONTENT_TYPE"), "Content-Type");
        assert_eq!(wire_key("CONTENT_LENGTH"), "Content-Length");
        assert_eq!(wire_key("HTTP_X_REQUEST_ID"), "X-Request-Id");
    }

    #[test]
    fn round_trip_is_canonical_case() {
        for name in ["Content-Type", "accept", "X-Cache", "ETag", "x-rate-limit-99"] {
            assert_eq!(wire_key(&env_key(name)), canonical(name), "name: {name}");
        }
    }

    #[test]
    fn round_trip_is_idempotent() {
        let once = wire_key(&env_key("x-forwarded-for"));
        let twice = wire_key(&env_key(&once));
        assert_eq!(once, twice);
        assert_eq!(once, "X-Forwarded-For");
    }
}
