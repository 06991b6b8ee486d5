use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{BreathPhase, GuidePhase, TimerState};

/// Every state change of a session produces an Event.
/// The CLI prints them; a GUI would render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second of the session elapsed.
    Tick {
        remaining_secs: u32,
        phase: BreathPhase,
        phase_remaining_secs: u32,
        /// The breathing phase switched on this tick.
        phase_changed: bool,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted once per started session.
    SessionCompleted {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        total_secs: u32,
        remaining_secs: u32,
        guide_phase: GuidePhase,
        phase_remaining_secs: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
