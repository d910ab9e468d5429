//! Admin authorization gate.
//!
//! Every catalog mutation and the order-listing route require
//! `Authorization: Bearer <token>` where the token exactly matches the
//! single configured shared secret. There are no sessions, no expiry and
//! no lockout; a mismatch answers a bare 403 with no further detail.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

/// The configured shared secret, cheap to clone into middleware state.
#[derive(Clone)]
pub struct AdminToken(Arc<String>);

impl AdminToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(secret.into()))
    }

    /// Exact-equality check, constant-time with respect to early mismatch.
    /// The presented token is deliberately not trimmed: a correct token
    /// with trailing whitespace is a different token.
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_eq(self.0.as_str(), presented)
    }
}

/// Middleware gating admin-only routes on the shared bearer secret.
pub async fn admin_auth_middleware(
    State(token): State<AdminToken>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|presented| token.matches(presented))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        warn!(
            method = %request.method(),
            uri = %request.uri(),
            "Rejected admin request with missing or invalid token"
        );
        (StatusCode::FORBIDDEN, "Unauthorized").into_response()
    }
}

/// Extension methods for Router to gate routes behind the admin secret
pub trait AdminRouterExt {
    fn with_admin_auth(self, token: &AdminToken) -> Self;
}

impl<S> AdminRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_admin_auth(self, token: &AdminToken) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            token.clone(),
            admin_auth_middleware,
        ))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
