//! Request identity and request-scoped values.
//!
//! # Responsibilities
//! - Generate unique request IDs (`<host>/<random>-<counter>`)
//! - Propagate an upstream-issued ID instead of minting one
//! - Attach the ID to the request as a typed extension
//! - Extract path and query parameters
//!
//! # Design Decisions
//! - The generator is an explicit value shared via `Arc`, not a global
//! - The counter is a single `AtomicU64`; nothing else is shared
//! - A missing ID reads as `""`, never as an error

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{FromRequestParts, RawPathParams, Request};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Default header carrying an upstream request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Length of the random part of the process prefix.
const RANDOM_LEN: usize = 10;

// Chance that two 10-character base62 prefixes collide, by the birthday
// bound P ≈ 1 - e^(-m²/2n) with n = 62^10: for a process restarting every
// second for ten years (m ≈ 3.15e8) it is about 5.75%; for a handful of
// restarts a day over a century it is below one in a hundred million.

/// Generator of process-unique request IDs.
#[derive(Debug)]
pub struct RequestIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl RequestIdGenerator {
    /// Create a generator with a `<host>/<random>` prefix.
    pub fn new() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_LEN)
            .map(char::from)
            .collect();

        Self::with_prefix(format!("{}/{}", hostname(), token))
    }

    /// Create a generator with a fixed prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// The process prefix shared by every ID from this generator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Mint a new ID.
    pub fn next_id(&self) -> RequestId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        RequestId(format!("{}-{:06}", self.prefix, n))
    }

    /// Return `existing` unchanged when non-empty, otherwise mint a new ID.
    pub fn from_header_or_new(&self, existing: &str) -> RequestId {
        if existing.is_empty() {
            self.next_id()
        } else {
            RequestId(existing.to_string())
        }
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// A request ID attached to a request's extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Borrow the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access to the request ID stored on a request.
pub trait RequestIdExt {
    /// The request ID, or `""` if none was attached.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for axum::http::Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(RequestId::as_str)
            .unwrap_or("")
    }
}

/// Path parameters captured by the matched route, e.g. `{id}` in `/users/{id}`.
pub async fn url_params(req: &mut Request) -> HashMap<String, String> {
    let (mut parts, body) = std::mem::take(req).into_parts();
    let params = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .map(|raw| {
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();
    *req = Request::from_parts(parts, body);
    params
}

/// Query parameters, keeping every value of repeated keys.
///
/// `/?one=true&one=false&two=true` gives `{"one": ["true", "false"], "two": ["true"]}`.
pub fn query_params<B>(req: &axum::http::Request<B>) -> HashMap<String, Vec<String>> {
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(query) = req.uri().query() {
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(k.into_owned()).or_default().push(v.into_owned());
        }
    }
    params
}
