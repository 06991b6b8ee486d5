//! # Acupress Core Library
//!
//! Core logic for guided acupressure sessions: a countdown timer paired with a
//! 4-7-8 breathing cycle, and the plumbing that records finished sessions.
//! The `acupress` CLI is a thin terminal layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a pure state machine ([`SessionTimer`]) advanced one second at
//!   a time, plus an async [`SessionDriver`] that owns the tick schedule
//! - **Handoff**: a completed session yields exactly one [`RatingPrompt`],
//!   which turns into the payloads the backend stores
//! - **Backend**: the [`Backend`] trait and its reqwest implementation
//! - **Storage**: SQLite history/favorites and TOML configuration
//! - **Recorder**: uploads sessions, falling back to the local store
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: countdown and breathing state machine
//! - [`HistoryRecorder`]: backend submission with offline queue
//! - [`LocalStore`]: local persistence
//! - [`Config`]: application configuration

pub mod api;
pub mod catalog;
pub mod error;
pub mod events;
pub mod handoff;
pub mod recorder;
pub mod stats;
pub mod storage;
pub mod timer;

pub use api::{ApiClient, Backend};
pub use catalog::{Category, Technique};
pub use error::{ApiError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use handoff::{CompletedSession, Rating, RatingPrompt};
pub use recorder::{HistoryRecorder, SyncReport};
pub use stats::UserStats;
pub use storage::{Config, HistoryEntry, LocalStore};
pub use timer::{BreathPhase, GuidePhase, SessionDriver, SessionTimer, TimerState};
