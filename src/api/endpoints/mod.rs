//! Route handlers.

pub mod assistant;
pub mod auth;
pub mod health;
pub mod predictions;

use crate::api::error::ApiError;

/// Run blocking work (password hashing, the LLM client) off the async
/// worker threads.
pub(crate) async fn blocking<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
