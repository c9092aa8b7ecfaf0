//! Account and session endpoints.
//!
//! - `POST /api/users`   register
//! - `POST /api/login`   open a cookie session
//! - `POST /api/logout`  close it
//! - `GET  /api/user`    current account

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::blocking;
use crate::api::error::ApiError;
use crate::api::middleware::auth::session_token;
use crate::api::types::{ApiContext, UserContext};
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::auth::{self, Registration, SESSION_TTL};
use crate::db;
use crate::models::User;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/users`: create an account. Does not log in.
pub async fn register(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(registration) = payload?;
    let iterations = ctx.password_iterations;

    let user = blocking(move || {
        let conn = ctx.open_db()?;
        Ok(auth::register(&conn, &registration, iterations)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login`: check credentials and set the session cookie.
pub async fn login(
    State(ctx): State<ApiContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".into(),
        ));
    }

    let db_ctx = ctx.clone();
    let user = blocking(move || {
        let conn = db_ctx.open_db()?;
        Ok(auth::authenticate(&conn, &request.email, &request.password)?)
    })
    .await?;

    let token = ctx.lock_sessions()?.create(user.id);
    tracing::info!(user_id = user.id, "User logged in");

    let cookie = session_cookie(&token, SESSION_TTL, ctx.secure_cookies);
    Ok(([(SET_COOKIE, cookie)], Json(user)))
}

/// `POST /api/logout`: destroy the session, if any, and clear the cookie.
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        if ctx.lock_sessions()?.destroy(&token) {
            tracing::info!("User logged out");
        }
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie(ctx.secure_cookies))],
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

/// `GET /api/user`: the logged-in account. A session whose account has
/// disappeared is destroyed.
pub async fn current(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<UserContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    if let Some(user) = db::get_user(&conn, session.user_id)? {
        return Ok(Json(user).into_response());
    }

    if let Some(token) = session_token(&headers) {
        ctx.lock_sessions()?.destroy(&token);
    }
    tracing::warn!(user_id = session.user_id, "Session for missing user destroyed");

    Ok((
        [(SET_COOKIE, clear_session_cookie(ctx.secure_cookies))],
        ApiError::Unauthorized,
    )
        .into_response())
}
