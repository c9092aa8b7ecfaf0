pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod risk;

use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::AppConfig;

/// Process entry point: logging, configuration, runtime, server.
pub fn run() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let result = start();
    if let Err(e) = &result {
        tracing::error!("{} failed: {e}", config::APP_NAME);
    }
    result
}

fn start() -> Result<(), ServerError> {
    let config = AppConfig::from_env()?;
    // Built before the runtime: the provider client is blocking.
    let llm = api::server::build_llm_client(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;

    runtime.block_on(api::serve(config, llm))
}
