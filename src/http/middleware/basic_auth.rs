//! HTTP Basic authentication middleware (RFC 7617).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::routing::{Middleware, Next};

/// Require credentials from `credentials` (user → password).
pub fn basic_auth(realm: impl Into<String>, credentials: HashMap<String, String>) -> Middleware {
    let challenge = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm.into()))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
    let credentials = Arc::new(credentials);

    Middleware::from_fn(move |req: Request, next: Next| {
        let authorized = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic)
            .is_some_and(|(user, password)| {
                credentials
                    .get(&user)
                    .is_some_and(|expected| constant_time_eq(password.as_bytes(), expected.as_bytes()))
            });
        let challenge = challenge.clone();

        async move {
            if authorized {
                next.run(req).await
            } else {
                unauthorized(challenge)
            }
        }
    })
}

fn unauthorized(challenge: HeaderValue) -> Response {
    (StatusCode::UNAUTHORIZED, [(header::WWW_AUTHENTICATE, challenge)]).into_response()
}

/// Decode `Basic <base64(user:password)>`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
