//! Session timer engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read the clock - the caller delivers one `tick()` per elapsed
//! second (see [`super::SessionDriver`] for the async driver).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!       Completed
//! ```
//!
//! `reset()` returns any started state to `Idle`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionTimer::new();
//! engine.start(60)?;
//! // Once per second:
//! if let Some(event) = engine.tick() { /* render */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::breathing::{BreathingCycle, Guidance, GuidePhase};
use crate::error::ValidationError;
use crate::events::Event;
use crate::handoff::RatingPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Countdown for one technique session plus its breathing cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    /// Duration passed to the last `start`. `None` until the first start.
    total_secs: Option<u32>,
    remaining_secs: u32,
    state: TimerState,
    breathing: BreathingCycle,
    /// Set on natural completion, handed out once.
    #[serde(default)]
    pending_prompt: Option<RatingPrompt>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            total_secs: None,
            remaining_secs: 0,
            state: TimerState::Idle,
            breathing: BreathingCycle::new(),
            pending_prompt: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_completed(&self) -> bool {
        self.state == TimerState::Completed
    }

    pub fn has_started(&self) -> bool {
        self.total_secs.is_some()
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs.unwrap_or(0)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs() - self.remaining_secs
    }

    pub fn breathing(&self) -> &BreathingCycle {
        &self.breathing
    }

    /// Phase to display. Outside a running session this is `Prepare`.
    pub fn guide_phase(&self) -> GuidePhase {
        if self.is_running() {
            self.breathing.phase().into()
        } else {
            GuidePhase::Prepare
        }
    }

    pub fn guidance(&self) -> Guidance {
        if self.is_running() {
            Guidance::for_cycle(&self.breathing)
        } else {
            Guidance::prepare()
        }
    }

    /// 0.0 .. 1.0 progress through the session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_secs()) / f64::from(total)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            total_secs: self.total_secs(),
            remaining_secs: self.remaining_secs,
            guide_phase: self.guide_phase(),
            phase_remaining_secs: self.breathing.phase_remaining_secs(),
            progress_pct: self.progress() * 100.0,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new session, discarding whatever came before.
    pub fn start(&mut self, total_secs: u32) -> Result<Event, ValidationError> {
        if total_secs == 0 {
            return Err(ValidationError::InvalidDuration(total_secs));
        }
        self.total_secs = Some(total_secs);
        self.remaining_secs = total_secs;
        self.state = TimerState::Running;
        self.breathing.reset();
        self.pending_prompt = None;
        Ok(Event::SessionStarted {
            total_secs,
            at: Utc::now(),
        })
    }

    /// Pause a running session, or resume a paused or reset one.
    ///
    /// No-op before the first `start` and after completion.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::SessionPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            // A reset session picks up from its rewound countdown.
            TimerState::Paused | TimerState::Idle if self.has_started() => {
                self.state = TimerState::Running;
                Some(Event::SessionResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Paused | TimerState::Idle | TimerState::Completed => None,
        }
    }

    /// Return to the full duration of the last `start`, stopped.
    pub fn reset(&mut self) -> Option<Event> {
        let total_secs = self.total_secs?;
        self.state = TimerState::Idle;
        self.remaining_secs = total_secs;
        self.breathing.reset();
        self.pending_prompt = None;
        Some(Event::SessionReset {
            total_secs,
            at: Utc::now(),
        })
    }

    /// Apply one elapsed second.
    ///
    /// Returns `Tick` for an ordinary second and `SessionCompleted` for the
    /// second that brings the countdown to zero. Ignored unless running.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running || self.remaining_secs == 0 {
            return None;
        }

        self.remaining_secs -= 1;
        let changed = self.breathing.advance().is_some();

        if self.remaining_secs == 0 {
            let total_secs = self.total_secs();
            let at = Utc::now();
            self.state = TimerState::Completed;
            self.pending_prompt = Some(RatingPrompt::new(total_secs, at));
            return Some(Event::SessionCompleted { total_secs, at });
        }

        Some(Event::Tick {
            remaining_secs: self.remaining_secs,
            phase: self.breathing.phase(),
            phase_remaining_secs: self.breathing.phase_remaining_secs(),
            phase_changed: changed,
            at: Utc::now(),
        })
    }

    /// Hand out the rating prompt of the session that just completed.
    /// Returns `Some` at most once per completed session.
    pub fn take_rating_prompt(&mut self) -> Option<RatingPrompt> {
        self.pending_prompt.take()
    }
}
