//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::{self, DatabaseError};
use crate::llm::{LlmClient, LlmError};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: PathBuf,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    /// `None` when no provider is configured.
    pub llm: Option<Arc<dyn LlmClient>>,
    pub secure_cookies: bool,
    pub trust_proxy: bool,
    pub password_iterations: u32,
}

impl ApiContext {
    pub fn new(config: &AppConfig, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self {
            db_path: config.db_path.clone(),
            sessions: Arc::new(Mutex::new(SessionStore::default())),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
            llm,
            secure_cookies: config.secure_cookies,
            trust_proxy: config.trust_proxy,
            password_iterations: config.password_iterations,
        }
    }

    /// Open a connection for one request. Migrations are idempotent.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    pub fn llm(&self) -> Result<Arc<dyn LlmClient>, LlmError> {
        self.llm.clone().ok_or(LlmError::NotConfigured)
    }

    pub fn lock_sessions(&self) -> Result<std::sync::MutexGuard<'_, SessionStore>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))
    }
}

// ═══════════════════════════════════════════════════════════
// User context: injected by session middleware
// ═══════════════════════════════════════════════════════════

/// Logged-in user, present in request extensions when the session
/// cookie resolved to a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: i64,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

pub const AI_REQUESTS_PER_MINUTE: u32 = 60;
pub const AI_REQUESTS_PER_HOUR: u32 = 600;

/// Checks between sweeps of idle clients.
const SWEEP_EVERY: u64 = 256;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Per-client rate limiter with per-minute and per-hour limits.
///
/// Clients with no request inside the last hour are dropped, so the map
/// only holds clients seen recently.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    checks: u64,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(AI_REQUESTS_PER_MINUTE, AI_REQUESTS_PER_HOUR)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
            checks: 0,
        }
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&mut self, client: &str, now: Instant) -> Result<(), u64> {
        self.checks += 1;
        if self.checks % SWEEP_EVERY == 0 {
            self.sweep(now);
        }

        let entries = self.windows.entry(client.to_string()).or_default();
        entries.retain(|ts| now.duration_since(*ts) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < MINUTE)
            .count() as u32;
        let verdict = if last_minute >= self.per_minute {
            Err(60)
        } else if entries.len() as u32 >= self.per_hour {
            Err(3600)
        } else {
            entries.push(now);
            Ok(())
        };

        // A rejected first request leaves nothing worth keeping.
        if entries.is_empty() {
            self.windows.remove(client);
        }
        verdict
    }

    /// Drop every client whose newest request is an hour old.
    fn sweep(&mut self, now: Instant) {
        self.windows.retain(|_, entries| {
            entries
                .last()
                .is_some_and(|ts| now.duration_since(*ts) < HOUR)
        });
    }

    /// Clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_allows_under_limit() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check("user:1").is_ok());
        assert!(limiter.check("user:1").is_ok());
    }

    #[test]
    fn rate_limiter_rejects_over_per_minute() {
        let mut limiter = RateLimiter::with_limits(2, 1000);
        assert!(limiter.check("user:1").is_ok());
        assert!(limiter.check("user:1").is_ok());
        assert_eq!(limiter.check("user:1"), Err(60));
    }

    #[test]
    fn rate_limiter_rejects_over_per_hour() {
        let mut limiter = RateLimiter::with_limits(100, 3);
        for _ in 0..3 {
            assert!(limiter.check("ip:10.0.0.1").is_ok());
        }
        assert_eq!(limiter.check("ip:10.0.0.1"), Err(3600));
    }

    #[test]
    fn rate_limiter_isolates_clients() {
        let mut limiter = RateLimiter::with_limits(1, 1000);
        assert!(limiter.check("user:1").is_ok());
        assert!(limiter.check("user:2").is_ok());
        assert_eq!(limiter.check("user:1"), Err(60));
    }

    #[test]
    fn idle_clients_are_swept() {
        let mut limiter = RateLimiter::with_limits(u32::MAX, u32::MAX);
        let start = Instant::now();
        limiter.check_at("ip:10.0.0.1", start).unwrap();
        limiter.check_at("ip:10.0.0.2", start).unwrap();
        assert_eq!(limiter.tracked_clients(), 2);

        // Busy client keeps checking until a sweep runs past the hour.
        let later = start + HOUR + Duration::from_secs(1);
        for _ in 0..SWEEP_EVERY {
            limiter.check_at("user:1", later).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn recent_clients_survive_sweep() {
        let mut limiter = RateLimiter::with_limits(u32::MAX, u32::MAX);
        let start = Instant::now();
        limiter.check_at("ip:10.0.0.1", start).unwrap();

        let soon = start + Duration::from_secs(120);
        for _ in 0..SWEEP_EVERY {
            limiter.check_at("user:1", soon).unwrap();
        }
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn zero_limit_does_not_track_client() {
        let mut limiter = RateLimiter::with_limits(0, 10);
        assert_eq!(limiter.check("ip:10.0.0.9"), Err(60));
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn missing_llm_is_not_configured() {
        let config = AppConfig::from_lookup(|k| {
            (k == "HEALTHPREDICT_DB").then(|| "/tmp/unused.db".to_string())
        })
        .unwrap();
        let ctx = ApiContext::new(&config, None);
        assert!(matches!(ctx.llm(), Err(LlmError::NotConfigured)));
    }
}
