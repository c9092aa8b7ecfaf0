//! Per-client rate limiting for the AI assistant routes.
//!
//! Sliding-window limits per client:
//! - 60 requests per minute
//! - 600 requests per hour

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};

/// Bucket for requests with no known peer. Only reachable when the router
/// is driven without connection info.
const UNKNOWN_PEER: &str = "peer:unknown";

/// Extract a rate-limit key from the request: the logged-in user, else
/// the client IP. `X-Forwarded-For` is only consulted when the server
/// sits behind a trusted proxy; otherwise the TCP peer address is used.
fn rate_key(req: &Request<axum::body::Body>, trust_proxy: bool) -> String {
    if let Some(user) = req.extensions().get::<UserContext>() {
        return format!("user:{}", user.user_id);
    }
    let forwarded = trust_proxy.then(|| forwarded_ip(req)).flatten();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match forwarded.or(peer) {
        Some(ip) => format!("ip:{ip}"),
        None => UNKNOWN_PEER.to_string(),
    }
}

/// First `X-Forwarded-For` hop, if it is a well-formed address.
fn forwarded_ip(req: &Request<axum::body::Body>) -> Option<IpAddr> {
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse().ok())
}

/// Per-client rate limiting. Returns 429 if exceeded.
/// Accesses `ApiContext` from request extensions.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req, ctx.trust_proxy);

    // MutexGuard is !Send; dropped before .await by the block scope
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(client = %key, retry_after, "Rate limit exceeded");
            ApiError::RateLimited { retry_after }
        })?;
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn from_peer(peer: &str, forwarded: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder();
        if let Some(hops) = forwarded {
            builder = builder.header("X-Forwarded-For", hops);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[test]
    fn key_prefers_user() {
        let mut req = from_peer("10.0.0.1:5000", Some("10.0.0.2"));
        req.extensions_mut().insert(UserContext { user_id: 9 });
        assert_eq!(rate_key(&req, true), "user:9");
        assert_eq!(rate_key(&req, false), "user:9");
    }

    #[test]
    fn key_uses_peer_ip_and_ignores_port() {
        let a = from_peer("198.51.100.7:40000", None);
        let b = from_peer("198.51.100.7:40001", None);
        assert_eq!(rate_key(&a, false), "ip:198.51.100.7");
        assert_eq!(rate_key(&a, false), rate_key(&b, false));
    }

    #[test]
    fn forwarded_header_ignored_without_trusted_proxy() {
        let req = from_peer("198.51.100.7:40000", Some("203.0.113.5"));
        assert_eq!(rate_key(&req, false), "ip:198.51.100.7");
    }

    #[test]
    fn trusted_proxy_uses_first_forwarded_hop() {
        let req = from_peer("10.0.0.1:40000", Some(" 203.0.113.5 , 10.0.0.1"));
        assert_eq!(rate_key(&req, true), "ip:203.0.113.5");
    }

    #[test]
    fn malformed_forwarded_hop_falls_back_to_peer() {
        let req = from_peer("10.0.0.1:40000", Some("not-an-ip"));
        assert_eq!(rate_key(&req, true), "ip:10.0.0.1");
    }

    #[test]
    fn no_peer_info_uses_unknown_bucket() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(rate_key(&req, false), UNKNOWN_PEER);
    }
}
