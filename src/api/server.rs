//! HTTP server lifecycle: bind, spawn axum, shut down on signal.
//!
//! bind → spawn background task → return handle with shutdown channel.
//! `serve` drives that handle until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::app_router;
use crate::api::types::ApiContext;
use crate::config::{AppConfig, ConfigError};
use crate::db::{self, DatabaseError};
use crate::llm::{LlmClient, LlmError, OpenAiClient};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Database unavailable: {0}")]
    Database(#[from] DatabaseError),
    #[error("AI assistant setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("Runtime error: {0}")]
    Runtime(std::io::Error),
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address (resolves port 0 to the real port).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Server task failed: {e}");
        }
    }
}

/// Bind `addr` and serve `app` in a background task.
pub async fn start_server_on(app: Router, addr: SocketAddr) -> Result<ServerHandle, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Server received shutdown signal");
        };

        tracing::info!(%addr, "HTTP server started");

        // Peer addresses feed the per-client rate limiter.
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("HTTP server error: {e}");
        }

        tracing::info!("HTTP server stopped");
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Build the provider client when an API key is configured.
///
/// The client is blocking, so call this outside the async runtime.
pub fn build_llm_client(config: &AppConfig) -> Result<Option<Arc<dyn LlmClient>>, ServerError> {
    match &config.llm {
        Some(llm) => {
            let client = OpenAiClient::new(llm)?;
            tracing::info!(model = %llm.model, base_url = %llm.base_url, "AI assistant enabled");
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set; AI assistant endpoints will answer 503");
            Ok(None)
        }
    }
}

/// Run the application until Ctrl-C.
pub async fn serve(
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
) -> Result<(), ServerError> {
    // Fail fast on an unusable database and apply migrations once.
    let conn = db::open_database(&config.db_path)?;
    drop(conn);
    tracing::info!(db = %config.db_path.display(), "Database ready");

    let ctx = ApiContext::new(&config, llm);
    let app = app_router(
        ctx,
        config.static_dir.as_deref(),
        config.cors_origin.as_deref(),
    )?;

    let mut handle = start_server_on(app, config.bind_addr).await?;
    tracing::info!(addr = %handle.addr(), "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    handle.shutdown();
    handle.wait().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router::api_router;

    fn test_app(tmp: &tempfile::TempDir) -> Router {
        let db_path = tmp.path().join("server.db");
        let config = AppConfig::from_lookup(|key| {
            (key == "HEALTHPREDICT_DB").then(|| db_path.display().to_string())
        })
        .unwrap();
        api_router(ApiContext::new(&config, None))
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut server = start_server_on(test_app(&tmp), "127.0.0.1:0".parse().unwrap())
            .await
            .expect("server should start");
        assert!(server.addr().port() > 0);

        let url = format!("http://{}/api/health", server.addr());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown();
        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn real_connections_are_limited_by_peer_address() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("server.db");
        let config = AppConfig::from_lookup(|key| {
            (key == "HEALTHPREDICT_DB").then(|| db_path.display().to_string())
        })
        .unwrap();
        let mut ctx = ApiContext::new(&config, None);
        ctx.rate_limiter = Arc::new(std::sync::Mutex::new(
            crate::api::types::RateLimiter::with_limits(1, 100),
        ));
        let mut server = start_server_on(api_router(ctx), "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let url = format!("http://{}/api/openai/chat", server.addr());
        let client = reqwest::Client::new();
        let mut statuses = Vec::new();
        for hop in 0..3 {
            let resp = client
                .post(&url)
                .header("X-Forwarded-For", format!("1.2.3.{hop}"))
                .json(&serde_json::json!({ "message": "hi" }))
                .send()
                .await
                .unwrap();
            statuses.push(resp.status().as_u16());
        }
        // First passes the limiter and meets the unconfigured provider.
        assert_eq!(statuses, vec![503, 429, 429]);

        server.shutdown();
        server.wait().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let mut first = start_server_on(test_app(&tmp), "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let err = start_server_on(test_app(&tmp), first.addr()).await.err();
        assert!(matches!(err, Some(ServerError::Bind { .. })));

        first.shutdown();
        first.wait().await;
    }

    #[test]
    fn no_api_key_means_no_client() {
        let config = AppConfig::from_lookup(|key| {
            (key == "HEALTHPREDICT_DB").then(|| "/tmp/unused.db".to_string())
        })
        .unwrap();
        assert!(build_llm_client(&config).unwrap().is_none());
    }
}
