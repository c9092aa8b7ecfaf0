use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. Never carries the password hash, so it is safe
/// to hand straight to a JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Account row as stored, including the encoded password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}
