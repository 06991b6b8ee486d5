//! Schema migrations for the local store.
//!
//! Migrations are versioned and applied when the store is opened.
//! The `schema_version` table holds the single current version row.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration statement fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )?;

    let current_version = schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

/// Returns 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: history, favorites and the key-value table.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS history (
            id             TEXT PRIMARY KEY,
            technique_id   TEXT NOT NULL,
            technique_name TEXT NOT NULL DEFAULT '',
            complaint      TEXT NOT NULL DEFAULT '',
            duration_secs  INTEGER NOT NULL,
            rating         INTEGER NOT NULL,
            completed_at   TEXT NOT NULL,
            synced         INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS favorites (
            technique_id TEXT PRIMARY KEY,
            added_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_history_completed_at ON history(completed_at);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// v2: keep the review comment so unsynced reviews can be resent.
/// NULL means the user skipped the rating prompt.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "ALTER TABLE history ADD COLUMN review_comment TEXT;
         CREATE INDEX IF NOT EXISTS idx_history_synced ON history(synced);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// v3: favorite changes the backend has not seen yet, one row per technique.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS favorite_changes (
            technique_id TEXT PRIMARY KEY,
            favorite     INTEGER NOT NULL,
            queued_at    TEXT NOT NULL
        );",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn v2_database_gains_favorite_changes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE schema_version (version INTEGER PRIMARY KEY);")
            .unwrap();
        migrate_v1(&conn).unwrap();
        migrate_v2(&conn).unwrap();
        assert_eq!(schema_version(&conn), 2);

        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn), 3);
        conn.execute(
            "INSERT INTO favorite_changes (technique_id, favorite, queued_at) VALUES ('4', 1, 'x')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    }
}
