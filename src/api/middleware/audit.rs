//! Access logging middleware.
//!
//! Logs every API request with a request id, method, path, status, user
//! and latency. Runs just inside the session resolver so `UserContext` is
//! visible, and outside the auth gate so rejected requests are logged too.

use std::time::Instant;

use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::api::types::UserContext;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user_id = req.extensions().get::<UserContext>().map(|u| u.user_id);
    let started = Instant::now();

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%request_id, %method, %path, status, ?user_id, elapsed_ms, "API request");
    } else {
        tracing::info!(%request_id, %method, %path, status, ?user_id, elapsed_ms, "API request");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
