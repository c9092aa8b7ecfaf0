//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session resolver: attaches `UserContext` when the cookie is live
//! 2. Audit logger: logs after session resolution, has user_id
//! 3. Auth gate: protected routes only
//! 4. Rate limiter: AI routes only, keyed by user or client address

pub mod audit;
pub mod auth;
pub mod rate;
