use std::path::Path;

use rusqlite::{params, Connection};

use super::DatabaseError;

/// One schema step. Versions are applied in ascending order and recorded
/// in `schema_version` in the same transaction as their SQL.
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("../../resources/migrations/001_initial.sql"),
}];

/// Latest schema version this build knows about.
pub fn schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Open (creating if needed) the database file and bring its schema up
/// to date. The parent directory is created on first use.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| DatabaseError::Location {
            path: dir.display().to_string(),
            source,
        })?;
    }
    prepare(Connection::open(path)?)
}

/// Fresh in-memory database with the full schema, for tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(mut conn: Connection) -> Result<Connection, DatabaseError> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    run_migrations(&mut conn)?;
    Ok(conn)
}

/// Apply every migration newer than the recorded version.
pub fn run_migrations(conn: &mut Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         );",
    )?;
    let current = applied_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let failed = |e: rusqlite::Error| DatabaseError::MigrationFailed {
            version: migration.version,
            reason: e.to_string(),
        };

        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![migration.version],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;

        tracing::info!(version = migration.version, "Applied database migration");
    }

    Ok(())
}

fn applied_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Number of user tables, `schema_version` included.
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_has_every_table() {
        let conn = open_memory_database().unwrap();
        // schema_version + users + 4 prediction tables
        assert_eq!(count_tables(&conn).unwrap(), 6);
        assert_eq!(applied_version(&conn).unwrap(), schema_version());
    }

    #[test]
    fn rerunning_migrations_is_a_no_op() {
        let mut conn = open_memory_database().unwrap();
        run_migrations(&mut conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, MIGRATIONS.len() as i64);
    }

    #[test]
    fn foreign_keys_enforced() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn file_database_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("healthpredict.db");
        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ('amy', 'amy@example.com', 'x', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        drop(conn);

        let conn = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 6);
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }
}
