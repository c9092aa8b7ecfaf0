//! Cookie session middleware.
//!
//! `resolve_session` runs on every API route and never rejects; it only
//! injects `UserContext` for downstream handlers. `require_auth` sits on
//! routes that need a logged-in user.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth::session::token_from_cookies;

/// Session token carried in the `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(token_from_cookies)
        .map(str::to_string)
}

/// Resolve the session cookie into a `UserContext`.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn resolve_session(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let ctx = req.extensions().get::<ApiContext>().cloned();

    if let (Some(ctx), Some(token)) = (ctx, session_token(req.headers())) {
        // MutexGuard is !Send; dropped before .await by the block scope
        let user_id = match ctx.sessions.lock() {
            Ok(mut sessions) => sessions.resolve(&token),
            Err(_) => return ApiError::Internal("session lock".into()).into_response(),
        };
        if let Some(user_id) = user_id {
            req.extensions_mut().insert(UserContext { user_id });
        }
    }

    next.run(req).await
}

/// Reject requests without a live session.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    if req.extensions().get::<UserContext>().is_none() {
        return ApiError::Unauthorized.into_response();
    }
    next.run(req).await
}
