//! Caller-side policy around the backend.
//!
//! The timer never talks to the network. Once a session is rated, the
//! [`HistoryRecorder`] uploads it and keeps a local copy either way; rows the
//! backend did not accept are flagged and re-sent by [`HistoryRecorder::sync_pending`].
//! Favorite changes are queued and replayed the same way, and catalog and
//! favorites reads fall back to local data.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::catalog::{self, Category, Technique};
use crate::error::{ApiError, CoreError, StoreError, ValidationError};
use crate::handoff::CompletedSession;
use crate::storage::{HistoryEntry, LocalStore};

const LAST_SYNC_KEY: &str = "last_sync_at";

/// Result of one [`HistoryRecorder::sync_pending`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncReport {
    pub sent: usize,
    pub remaining: usize,
    pub favorites_sent: usize,
    pub favorites_remaining: usize,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0 && self.favorites_remaining == 0
    }
}

pub struct HistoryRecorder<B> {
    backend: B,
    store: LocalStore,
}

impl<B: Backend> HistoryRecorder<B> {
    pub fn new(backend: B, store: LocalStore) -> Self {
        Self { backend, store }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Upload a completed session and keep it locally.
    ///
    /// Backend failures are not errors here: the entry is stored with
    /// `synced = false` and picked up by the next [`sync_pending`](Self::sync_pending).
    pub async fn record(&self, session: CompletedSession) -> Result<HistoryEntry, StoreError> {
        let synced = match self.upload(&session).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    technique = %session.history.technique_id,
                    "backend rejected session, queued locally"
                );
                false
            }
        };
        let entry = self.store.record_history(&session, synced)?;
        info!(id = %entry.id, synced, "session recorded");
        Ok(entry)
    }

    /// Re-send every unsynced entry, oldest first, then replay queued
    /// favorite changes. Stops early once the backend looks unreachable.
    pub async fn sync_pending(&self) -> Result<SyncReport, StoreError> {
        let pending = self.store.unsynced()?;
        let mut report = SyncReport {
            remaining: pending.len(),
            ..SyncReport::default()
        };

        let mut reachable = true;
        for entry in pending {
            match self.upload(&entry.to_completed()).await {
                Ok(()) => {
                    self.store.mark_synced(&entry.id)?;
                    report.sent += 1;
                    report.remaining -= 1;
                }
                Err(e) if e.is_unreachable() => {
                    warn!(error = %e, "backend unreachable, sync aborted");
                    reachable = false;
                    break;
                }
                Err(e) => {
                    warn!(error = %e, id = %entry.id, "entry rejected, left pending");
                }
            }
        }

        if reachable {
            let (sent, remaining) = self.push_favorite_changes().await?;
            report.favorites_sent = sent;
            report.favorites_remaining = remaining;
        } else {
            report.favorites_remaining = self.store.pending_favorite_changes()?.len();
        }

        if report.is_complete() {
            self.store
                .kv_set(LAST_SYNC_KEY, &Utc::now().to_rfc3339())?;
        }
        debug!(
            sent = report.sent,
            remaining = report.remaining,
            favorites_sent = report.favorites_sent,
            favorites_remaining = report.favorites_remaining,
            "sync finished"
        );
        Ok(report)
    }

    /// When the queue was last fully drained.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .store
            .kv_get(LAST_SYNC_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// A review failing after its session was accepted is only logged:
    /// re-sending would duplicate the session on the backend.
    async fn upload(&self, session: &CompletedSession) -> Result<(), ApiError> {
        let remote = self.backend.create_session(&session.history).await?;
        debug!(remote_id = %remote.id, "session accepted");

        if let Some(review) = &session.review {
            if let Err(e) = self.backend.create_review(review).await {
                warn!(error = %e, session = %remote.id, "review not stored");
            }
        }
        Ok(())
    }

    // ── Catalog ──────────────────────────────────────────────────────

    /// Resolve a technique, preferring the backend's copy.
    pub async fn technique(&self, id: &str) -> Result<Technique, CoreError> {
        match self.backend.technique(id).await {
            Ok(technique) => Ok(technique),
            Err(e) => {
                debug!(error = %e, id, "falling back to builtin catalog");
                catalog::find(id)
                    .cloned()
                    .ok_or_else(|| ValidationError::UnknownTechnique(id.to_string()).into())
            }
        }
    }

    pub async fn techniques(&self, category: Option<Category>) -> Vec<Technique> {
        match self.backend.techniques(category).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "backend unavailable, using builtin catalog");
                catalog::by_category(category).into_iter().cloned().collect()
            }
        }
    }

    // ── Favorites ────────────────────────────────────────────────────

    /// Mark a technique as favorite locally and on the backend.
    /// Returns false if it already was one.
    pub async fn add_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        let added = self.store.add_favorite(technique_id)?;
        self.push_favorite(technique_id, true).await?;
        Ok(added)
    }

    /// Returns false if it was not a favorite.
    pub async fn remove_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        let removed = self.store.remove_favorite(technique_id)?;
        self.push_favorite(technique_id, false).await?;
        Ok(removed)
    }

    /// Send one favorite change, queueing it when the backend is unreachable.
    async fn push_favorite(&self, technique_id: &str, favorite: bool) -> Result<(), StoreError> {
        match self.send_favorite(technique_id, favorite).await {
            Ok(()) => self.store.clear_favorite_change(technique_id),
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, technique_id, favorite, "favorite change queued locally");
                self.store.queue_favorite_change(technique_id, favorite)
            }
            Err(e) => {
                warn!(error = %e, technique_id, favorite, "backend rejected favorite change");
                self.store.clear_favorite_change(technique_id)
            }
        }
    }

    /// Replay queued favorite changes, oldest first. Returns (sent, remaining).
    /// Changes the backend rejects outright are dropped.
    async fn push_favorite_changes(&self) -> Result<(usize, usize), StoreError> {
        let pending = self.store.pending_favorite_changes()?;
        let mut remaining = pending.len();
        let mut sent = 0;

        for change in pending {
            match self.send_favorite(&change.technique_id, change.favorite).await {
                Ok(()) => sent += 1,
                Err(e) if e.is_unreachable() => {
                    warn!(error = %e, "backend unreachable, favorite replay aborted");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, technique_id = %change.technique_id, "favorite change dropped");
                }
            }
            self.store.clear_favorite_change(&change.technique_id)?;
            remaining -= 1;
        }
        Ok((sent, remaining))
    }

    async fn send_favorite(&self, technique_id: &str, favorite: bool) -> Result<(), ApiError> {
        if favorite {
            self.backend.add_favorite(technique_id).await
        } else {
            self.backend.remove_favorite(technique_id).await
        }
    }

    /// Flip the favorite flag. Returns the new state.
    pub async fn toggle_favorite(&self, technique_id: &str) -> Result<bool, StoreError> {
        if self.store.is_favorite(technique_id)? {
            self.remove_favorite(technique_id).await?;
            Ok(false)
        } else {
            self.add_favorite(technique_id).await?;
            Ok(true)
        }
    }

    /// Favorite techniques, from the backend when reachable, otherwise from
    /// the local ids resolved against the builtin catalog.
    ///
    /// Queued changes are replayed first. Any that still could not be sent
    /// are applied on top of the backend's list.
    pub async fn favorites(&self) -> Result<Vec<Technique>, StoreError> {
        self.push_favorite_changes().await?;
        match self.backend.favorites().await {
            Ok(mut list) => {
                for change in self.store.pending_favorite_changes()? {
                    list.retain(|t| t.id != change.technique_id);
                    if change.favorite {
                        if let Some(t) = catalog::find(&change.technique_id) {
                            list.push(t.clone());
                        }
                    }
                }
                Ok(list)
            }
            Err(e) => {
                warn!(error = %e, "backend unavailable, using local favorites");
                let ids = self.store.favorites()?;
                Ok(ids
                    .iter()
                    .filter_map(|id| catalog::find(id).cloned())
                    .collect())
            }
        }
    }
}
