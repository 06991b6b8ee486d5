use std::future::Future;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Technique};
use crate::error::ApiError;
use crate::handoff::{ReviewPayload, SessionHistoryPayload};

/// A session as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    pub id: String,
    pub technique_id: String,
    #[serde(default)]
    pub technique_name: String,
    #[serde(default)]
    pub complaint: String,
    pub duration: u32,
    #[serde(default)]
    pub rating: Option<u8>,
    /// Server time, UTC without offset.
    pub date: NaiveDateTime,
}

/// A review as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReview {
    pub id: String,
    pub technique_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub session_duration: u32,
    pub created_at: NaiveDateTime,
}

/// Everything the app needs from the backend.
///
/// Implementations must not fall back to local data themselves; the
/// recorder decides what to do when a call fails.
pub trait Backend: Send + Sync {
    fn techniques(
        &self,
        category: Option<Category>,
    ) -> impl Future<Output = Result<Vec<Technique>, ApiError>> + Send;

    fn technique(&self, id: &str) -> impl Future<Output = Result<Technique, ApiError>> + Send;

    /// Techniques the user marked as favorite.
    fn favorites(&self) -> impl Future<Output = Result<Vec<Technique>, ApiError>> + Send;

    fn add_favorite(&self, technique_id: &str)
        -> impl Future<Output = Result<(), ApiError>> + Send;

    fn remove_favorite(
        &self,
        technique_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn create_session(
        &self,
        payload: &SessionHistoryPayload,
    ) -> impl Future<Output = Result<RemoteSession, ApiError>> + Send;

    fn sessions(&self) -> impl Future<Output = Result<Vec<RemoteSession>, ApiError>> + Send;

    fn create_review(
        &self,
        payload: &ReviewPayload,
    ) -> impl Future<Output = Result<RemoteReview, ApiError>> + Send;
}
