//! HTTP API.
//!
//! JSON endpoints are nested under `/api/` behind a middleware stack:
//! Session → Audit → {Auth | Rate Limit} → Handler. The same router can
//! also serve the built web client from a static directory.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::{api_router, app_router};
pub use server::{serve, start_server_on, ServerError, ServerHandle};
pub use types::ApiContext;
