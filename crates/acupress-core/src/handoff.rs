//! Completion handoff: from a finished countdown to the payloads the backend
//! stores.
//!
//! A [`RatingPrompt`] is created by the timer exactly once per naturally
//! completed session. Submitting it consumes it, so one session can never
//! produce two history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Technique;
use crate::error::ValidationError;

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Rating recorded when the user skips the prompt.
    pub const DEFAULT: Rating = Rating(4);

    pub fn new(stars: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ValidationError::RatingOutOfRange(stars))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Body of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistoryPayload {
    pub technique_id: String,
    pub complaint: String,
    /// Seconds.
    pub duration: u32,
    pub rating: Rating,
}

/// Body of `POST /reviews/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub technique_id: String,
    pub rating: Rating,
    #[serde(default)]
    pub comment: String,
    /// Seconds.
    pub session_duration: u32,
}

/// Everything produced by one rated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub technique_name: String,
    pub completed_at: DateTime<Utc>,
    pub history: SessionHistoryPayload,
    /// Only present when the user actually chose a rating.
    pub review: Option<ReviewPayload>,
}

/// Pending request for a rating after a session ran to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPrompt {
    duration_secs: u32,
    completed_at: DateTime<Utc>,
}

impl RatingPrompt {
    pub(crate) fn new(duration_secs: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            duration_secs,
            completed_at,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// The user picked a rating.
    pub fn submit(
        self,
        technique: &Technique,
        rating: Rating,
        comment: Option<String>,
    ) -> CompletedSession {
        let review = ReviewPayload {
            technique_id: technique.id.clone(),
            rating,
            comment: comment.unwrap_or_default(),
            session_duration: self.duration_secs,
        };
        let mut session = self.build(technique, rating);
        session.review = Some(review);
        session
    }

    /// The user dismissed the prompt (or it timed out).
    pub fn skip(self, technique: &Technique) -> CompletedSession {
        self.build(technique, Rating::DEFAULT)
    }

    fn build(self, technique: &Technique, rating: Rating) -> CompletedSession {
        CompletedSession {
            technique_name: technique.name.clone(),
            completed_at: self.completed_at,
            history: SessionHistoryPayload {
                technique_id: technique.id.clone(),
                complaint: technique.condition.clone(),
                duration: self.duration_secs,
                rating,
            },
            review: None,
        }
    }
}
