//! API-key gate for the HTTP transport.
//!
//! A deliberately permissive gate: requests presenting no key at all pass
//! through (deployment platforms and capability scanners probe the endpoint
//! unauthenticated), while requests presenting a wrong key get `401` with
//! `{"error": "Invalid API key"}`. Do not "fix" the pass-through-when-absent
//! behavior; it is the documented contract.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

/// Outcome of checking a request against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    /// Request may proceed (valid key, or none presented).
    Pass,
    /// Request presented a key that does not match.
    Reject,
}

/// The gate itself: one static secret, compared verbatim.
#[derive(Clone)]
pub struct ApiKeyGate {
    key: String,
}

impl ApiKeyGate {
    /// Create a gate accepting `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Check the headers of one request.
    pub fn check(&self, headers: &HeaderMap) -> KeyCheck {
        match presented_key(headers) {
            None => KeyCheck::Pass,
            Some(key) if key == self.key => KeyCheck::Pass,
            Some(_) => KeyCheck::Reject,
        }
    }
}

/// Extract the API key a request presents, if any.
///
/// Accepts `x-api-key` or `authorization`, stripping an optional `Bearer `
/// prefix. Empty values count as absent.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let raw = headers
        .get("x-api-key")
        .or_else(|| headers.get(header::AUTHORIZATION))?
        .to_str()
        .ok()?;

    let key = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if key.is_empty() { None } else { Some(key) }
}

/// Axum middleware applying the gate to every request.
pub async fn require_api_key(
    State(gate): State<ApiKeyGate>,
    request: Request,
    next: Next,
) -> Response {
    match gate.check(request.headers()) {
        KeyCheck::Pass => next.run(request).await,
        KeyCheck::Reject => {
            warn!("Rejected request with invalid API key");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid API key"})),
            )
                .into_response()
        }
    }
}
