//! SQLite-backed local store.
//!
//! Keeps the data the app needs when the backend is unreachable:
//! - Session history (with a `synced` flag for later upload)
//! - Favorite technique ids, plus favorite changes still owed to the backend
//! - Key-value store for application state

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::error::StoreError;
use crate::handoff::{CompletedSession, Rating, ReviewPayload, SessionHistoryPayload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub technique_id: String,
    pub technique_name: String,
    pub complaint: String,
    pub duration_secs: u32,
    pub rating: Rating,
    /// `Some` when the user rated the session (comment may be empty).
    pub review_comment: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub synced: bool,
}

impl HistoryEntry {
    /// Rebuild the payloads for re-submission.
    pub fn to_completed(&self) -> CompletedSession {
        CompletedSession {
            technique_name: self.technique_name.clone(),
            completed_at: self.completed_at,
            history: SessionHistoryPayload {
                technique_id: self.technique_id.clone(),
                complaint: self.complaint.clone(),
                duration: self.duration_secs,
                rating: self.rating,
            },
            review: self.review_comment.as_ref().map(|comment| ReviewPayload {
                technique_id: self.technique_id.clone(),
                rating: self.rating,
                comment: comment.clone(),
                session_duration: self.duration_secs,
            }),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stars: u8 = row.get("rating")?;
        let rating = Rating::new(stars).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Integer,
                Box::new(e),
            )
        })?;
        let completed_at: String = row.get("completed_at")?;
        let completed_at = DateTime::parse_from_rfc3339(&completed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?;
        Ok(Self {
            id: row.get("id")?,
            technique_id: row.get("technique_id")?,
            technique_name: row.get("technique_name")?,
            complaint: row.get("complaint")?,
            duration_secs: row.get("duration_secs")?,
            rating,
            review_comment: row.get("review_comment")?,
            completed_at,
            synced: row.get("synced")?,
        })
    }
}

/// A favorite add (`favorite = true`) or removal not yet pushed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteChange {
    pub technique_id: String,
    pub favorite: bool,
}

/// Local SQLite store.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open the store at `~/.config/acupress/acupress.db`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir().map_err(StoreError::DataDir)?.join("acupress.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (tests, dry runs).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    // ── History ──────────────────────────────────────────────────────

    /// Store a completed session. `synced` records whether the backend
    /// already has it.
    pub fn record_history(
        &self,
        session: &CompletedSession,
        synced: bool,
    ) -> Result<HistoryEntry, StoreError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            technique_id: session.history.technique_id.clone(),
            technique_name: session.technique_name.clone(),
            complaint: session.history.complaint.clone(),
            duration_secs: session.history.duration,
            rating: session.history.rating,
            review_comment: session.review.as_ref().map(|r| r.comment.clone()),
            completed_at: session.completed_at,
            synced,
        };
        self.conn.execute(
            "INSERT INTO history (id, technique_id, technique_name, complaint, duration_secs,
                                  rating, completed_at, synced, review_comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id,
                entry.technique_id,
                entry.technique_name,
                entry.complaint,
                entry.duration_secs,
                entry.rating.stars(),
                entry.completed_at.to_rfc3339(),
                entry.synced,
                entry.review_comment,
            ],
        )?;
        Ok(entry)
    }

    /// All history, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.query_history("SELECT * FROM history ORDER BY completed_at DESC")
    }

    /// Entries the backend has not acknowledged yet, oldest first.
    pub fn unsynced(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.query_history("SELECT * FROM history WHERE synced = 0 ORDER BY completed_at ASC")
    }

    pub fn mark_synced(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("UPDATE history SET synced = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn query_history(&self, sql: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], HistoryEntry::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Returns false if it was already a favorite.
    pub fn add_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO favorites (technique_id, added_at) VALUES (?1, ?2)",
            params![technique_id, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Returns false if it was not a favorite.
    pub fn remove_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "DELETE FROM favorites WHERE technique_id = ?1",
            params![technique_id],
        )?;
        Ok(changed > 0)
    }

    pub fn is_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM favorites WHERE technique_id = ?1",
                params![technique_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Favorite ids in the order they were added.
    pub fn favorites(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT technique_id FROM favorites ORDER BY added_at ASC, rowid ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Remember a favorite change for the backend. A newer change for the
    /// same technique replaces the older one.
    pub fn queue_favorite_change(
        &self,
        technique_id: &str,
        favorite: bool,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO favorite_changes (technique_id, favorite, queued_at)
             VALUES (?1, ?2, ?3)",
            params![technique_id, favorite, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn clear_favorite_change(&self, technique_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM favorite_changes WHERE technique_id = ?1",
            params![technique_id],
        )?;
        Ok(())
    }

    /// Queued favorite changes, oldest first.
    pub fn pending_favorite_changes(&self) -> Result<Vec<FavoriteChange>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT technique_id, favorite FROM favorite_changes
             ORDER BY queued_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FavoriteChange {
                technique_id: row.get(0)?,
                favorite: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Key-value ────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
