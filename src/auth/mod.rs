//! Account registration, credential checks and login sessions.

pub mod password;
pub mod session;

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::User;
use crate::risk::{FieldError, ValidationErrors};

pub use password::{hash_password, verify_password, DEFAULT_ITERATIONS};
pub use session::{SessionStore, SESSION_COOKIE, SESSION_TTL};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Stored password hash is malformed")]
    MalformedHash,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Fields submitted to create an account.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        let username_len = self.username.trim().chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            errors.push(FieldError {
                field: "username",
                message: format!(
                    "must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
                ),
            });
        }
        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            errors.push(FieldError {
                field: "email",
                message: "must be a valid email address".into(),
            });
        }
        if self.password.chars().count() < PASSWORD_MIN {
            errors.push(FieldError {
                field: "password",
                message: format!("must be at least {PASSWORD_MIN} characters"),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Validate, reject duplicates, hash and store a new account.
pub fn register(
    conn: &Connection,
    registration: &Registration,
    iterations: u32,
) -> Result<User, AuthError> {
    registration.validate()?;

    let username = registration.username.trim();
    let email = registration.email.trim();

    if db::get_user_by_username(conn, username)?.is_some() {
        return Err(AuthError::UsernameTaken);
    }
    if db::get_user_by_email(conn, email)?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let encoded = hash_password(&registration.password, iterations);
    match db::insert_user(conn, username, email, &encoded) {
        Ok(user) => {
            tracing::info!(user_id = user.id, "Account registered");
            Ok(user)
        }
        // Lost a race against a concurrent registration.
        Err(DatabaseError::ConstraintViolation(msg)) if msg.contains("username") => {
            Err(AuthError::UsernameTaken)
        }
        Err(DatabaseError::ConstraintViolation(msg)) if msg.contains("email") => {
            Err(AuthError::EmailTaken)
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve e-mail + password to an account. Unknown e-mail and wrong
/// password are indistinguishable to the caller.
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<User, AuthError> {
    let Some(credentials) = db::get_credentials_by_email(conn, email.trim())? else {
        return Err(AuthError::InvalidCredentials);
    };
    if verify_password(password, &credentials.password_hash)? {
        Ok(credentials.user)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
