//! Server-side login sessions.
//!
//! The client holds an opaque random token in a cookie. Only its SHA-256
//! digest is kept here, so a dump of the store cannot be replayed.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "hp_session";
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Hash a session token using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random session token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug)]
struct SessionEntry {
    user_id: i64,
    expires_at: Instant,
}

/// In-memory session table keyed by token digest.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Open a session for `user_id` and return the raw token for the cookie.
    pub fn create(&mut self, user_id: i64) -> String {
        self.purge_expired();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                user_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// User id behind a token, if the session exists and has not expired.
    pub fn resolve(&mut self, token: &str) -> Option<i64> {
        let key = hash_token(token);
        let entry = self.sessions.get(&key)?;
        if Instant::now() >= entry.expires_at {
            self.sessions.remove(&key);
            return None;
        }
        Some(entry.user_id)
    }

    /// Returns `true` if a session was removed.
    pub fn destroy(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn purge_expired(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, s| now < s.expires_at);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_TTL)
    }
}

// ── Cookie helpers ──────────────────────────────────────────

/// Pull the session token out of a `Cookie` request header value.
pub fn token_from_cookies(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that installs a session token.
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Duration::ZERO, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_resolve() {
        let mut store = SessionStore::default();
        let token = store.create(7);
        assert_eq!(store.resolve(&token), Some(7));
        assert_eq!(store.resolve("not-a-token"), None);
    }

    #[test]
    fn destroy_removes_session() {
        let mut store = SessionStore::default();
        let token = store.create(1);
        assert!(store.destroy(&token));
        assert!(!store.destroy(&token));
        assert_eq!(store.resolve(&token), None);
    }

    #[test]
    fn expired_session_is_dropped_on_resolve() {
        let mut store = SessionStore::new(Duration::ZERO);
        let token = store.create(3);
        assert_eq!(store.resolve(&token), None);
        assert!(store.is_empty());
    }

    #[test]
    fn create_purges_expired_sessions() {
        let mut store = SessionStore::new(Duration::ZERO);
        store.create(1);
        store.create(2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn raw_token_is_not_stored() {
        let mut store = SessionStore::default();
        let token = store.create(1);
        let raw: Vec<u8> = token.as_bytes().to_vec();
        assert!(store.sessions.keys().all(|k| k.as_slice() != raw.as_slice()));
        assert!(store.sessions.contains_key(&hash_token(&token)));
    }

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn cookie_header_parsing() {
        assert_eq!(
            token_from_cookies("theme=dark; hp_session=abc123; other=1"),
            Some("abc123")
        );
        assert_eq!(token_from_cookies("hp_session="), None);
        assert_eq!(token_from_cookies("theme=dark"), None);
        assert_eq!(token_from_cookies("hp_sessionx=abc"), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", SESSION_TTL, false);
        assert_eq!(
            cookie,
            "hp_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );
        assert!(session_cookie("tok", SESSION_TTL, true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
