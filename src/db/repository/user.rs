use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::{User, UserCredentials};

const USER_COLUMNS: &str = "id, username, email, created_at, password_hash";

pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, DatabaseError> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, created_at],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        email: email.to_string(),
        created_at,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    Ok(find_credentials(conn, "id = ?1", params![id])?.map(|c| c.user))
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    Ok(find_credentials(conn, "username = ?1", params![username])?.map(|c| c.user))
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    Ok(get_credentials_by_email(conn, email)?.map(|c| c.user))
}

/// Account lookup for login. E-mail comparison is case-insensitive.
pub fn get_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<UserCredentials>, DatabaseError> {
    find_credentials(conn, "email = ?1 COLLATE NOCASE", params![email])
}

fn find_credentials(
    conn: &Connection,
    predicate: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Option<UserCredentials>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let found = conn.query_row(&sql, params, credentials_from_row).optional()?;
    Ok(found)
}

fn credentials_from_row(row: &Row<'_>) -> rusqlite::Result<UserCredentials> {
    Ok(UserCredentials {
        user: User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: row.get::<_, DateTime<Utc>>(3)?,
        },
        password_hash: row.get(4)?,
    })
}
