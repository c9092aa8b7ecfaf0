//! HTTP router.
//!
//! All JSON endpoints live under `/api/`; everything else falls through
//! to the built frontend when a static directory is configured.
//!
//! Middleware stack (outermost → innermost):
//! Extension → no-store header → session resolver → audit logger →
//! {auth gate | AI rate limiter} → handler

use std::path::Path;

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::server::ServerError;
use crate::api::types::ApiContext;
use crate::models::*;

/// Build the `/api` router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/users", post(endpoints::auth::register))
        .route("/login", post(endpoints::auth::login))
        .route("/logout", post(endpoints::auth::logout))
        .route(
            "/predictions/diabetes",
            post(endpoints::predictions::submit::<DiabetesInput>),
        )
        .route(
            "/predictions/heart-disease",
            post(endpoints::predictions::submit::<HeartDiseaseInput>),
        )
        .route(
            "/predictions/kidney-disease",
            post(endpoints::predictions::submit::<KidneyDiseaseInput>),
        )
        .route(
            "/predictions/liver-disease",
            post(endpoints::predictions::submit::<LiverDiseaseInput>),
        )
        .route(
            "/predictions/:condition/:id",
            get(endpoints::predictions::detail),
        )
        .with_state(ctx.clone());

    let protected = Router::new()
        .route("/user", get(endpoints::auth::current))
        .route(
            "/users/:user_id/predictions/:condition",
            get(endpoints::predictions::history),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let assistant = Router::new()
        .route("/openai/chat", post(endpoints::assistant::chat))
        .route(
            "/openai/diet-recommendations",
            post(endpoints::assistant::diet),
        )
        .route("/openai/exercise-plan", post(endpoints::assistant::exercise))
        .route(
            "/openai/educational-content",
            post(endpoints::assistant::education),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit));

    let api = Router::new()
        .merge(public)
        .merge(protected)
        .merge(assistant)
        .fallback(api_not_found)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::resolve_session))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", api)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("No such API endpoint".into())
}

/// Full application: API plus optional static frontend and CORS.
pub fn app_router(
    ctx: ApiContext,
    static_dir: Option<&Path>,
    cors_origin: Option<&str>,
) -> Result<Router, ServerError> {
    let mut app = api_router(ctx);

    if let Some(dir) = static_dir {
        // Client-side routes resolve to index.html.
        let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(spa);
    }

    if let Some(origin) = cors_origin {
        let origin = HeaderValue::from_str(origin)
            .map_err(|_| ServerError::InvalidCorsOrigin(origin.to_string()))?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true),
        );
    }

    Ok(app)
}
