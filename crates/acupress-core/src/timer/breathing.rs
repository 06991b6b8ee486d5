//! Guided 4-7-8 breathing cycle.
//!
//! The cycle is a fixed three-phase sequence driven by the same one-second
//! tick as the session countdown:
//!
//! ```text
//! Inspire (4s) -> Hold (7s) -> Exhale (8s) -> Inspire ...
//! ```
//!
//! The dwell table in [`BreathPhase::dwell_secs`] is the only place the phase
//! lengths are defined.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inspire,
    Hold,
    Exhale,
}

/// Length of one full inspire -> hold -> exhale traversal, in seconds.
pub const CYCLE_SECS: u32 = BreathPhase::Inspire.dwell_secs()
    + BreathPhase::Hold.dwell_secs()
    + BreathPhase::Exhale.dwell_secs();

impl BreathPhase {
    /// Seconds spent in this phase before moving on.
    pub const fn dwell_secs(self) -> u32 {
        match self {
            BreathPhase::Inspire => 4,
            BreathPhase::Hold => 7,
            BreathPhase::Exhale => 8,
        }
    }

    pub const fn next(self) -> BreathPhase {
        match self {
            BreathPhase::Inspire => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inspire,
        }
    }

    /// Cue tone played on the first second of the phase.
    pub const fn cue_hz(self) -> u32 {
        match self {
            BreathPhase::Inspire => 220,
            BreathPhase::Hold => 330,
            BreathPhase::Exhale => 440,
        }
    }
}

/// Position inside the breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingCycle {
    phase: BreathPhase,
    phase_remaining_secs: u32,
}

impl Default for BreathingCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingCycle {
    /// A fresh cycle at the start of the inspire phase.
    pub const fn new() -> Self {
        Self {
            phase: BreathPhase::Inspire,
            phase_remaining_secs: BreathPhase::Inspire.dwell_secs(),
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn phase_remaining_secs(&self) -> u32 {
        self.phase_remaining_secs
    }

    /// Whether this is the first second of the current phase.
    pub fn at_phase_start(&self) -> bool {
        self.phase_remaining_secs == self.phase.dwell_secs()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Consume one second. Returns the new phase when a transition happened.
    pub fn advance(&mut self) -> Option<BreathPhase> {
        self.phase_remaining_secs = self.phase_remaining_secs.saturating_sub(1);
        if self.phase_remaining_secs > 0 {
            return None;
        }
        self.phase = self.phase.next();
        self.phase_remaining_secs = self.phase.dwell_secs();
        Some(self.phase)
    }
}

/// Phase shown to the user. `Prepare` only exists while no session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidePhase {
    Prepare,
    Inspire,
    Hold,
    Exhale,
}

impl From<BreathPhase> for GuidePhase {
    fn from(phase: BreathPhase) -> Self {
        match phase {
            BreathPhase::Inspire => GuidePhase::Inspire,
            BreathPhase::Hold => GuidePhase::Hold,
            BreathPhase::Exhale => GuidePhase::Exhale,
        }
    }
}

/// What to tell the user for the current second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub phase: GuidePhase,
    pub headline: String,
    pub instruction: String,
    /// Tone to play this second, if any.
    pub cue_hz: Option<u32>,
}

impl Guidance {
    pub fn prepare() -> Self {
        Self {
            phase: GuidePhase::Prepare,
            headline: "Press start to begin guided breathing".into(),
            instruction: "4-7-8 technique: inspire 4s, hold 7s, exhale 8s".into(),
            cue_hz: None,
        }
    }

    pub fn for_cycle(cycle: &BreathingCycle) -> Self {
        let secs = cycle.phase_remaining_secs();
        let (headline, instruction) = match cycle.phase() {
            BreathPhase::Inspire => (
                format!("Inspire through the nose for {secs}s"),
                "Breathe in slowly through the nose for 4 seconds",
            ),
            BreathPhase::Hold => (
                format!("Hold your breath for {secs}s"),
                "Hold the breath for 7 seconds",
            ),
            BreathPhase::Exhale => (
                format!("Exhale through the mouth for {secs}s"),
                "Exhale completely through the mouth for 8 seconds",
            ),
        };
        Self {
            phase: cycle.phase().into(),
            headline,
            instruction: instruction.into(),
            cue_hz: cycle.at_phase_start().then(|| cycle.phase().cue_hz()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_nineteen_seconds() {
        assert_eq!(CYCLE_SECS, 19);
    }

    #[test]
    fn phases_rotate_in_order() {
        assert_eq!(BreathPhase::Inspire.next(), BreathPhase::Hold);
        assert_eq!(BreathPhase::Hold.next(), BreathPhase::Exhale);
        assert_eq!(BreathPhase::Exhale.next(), BreathPhase::Inspire);
    }

    #[test]
    fn advance_reports_transitions() {
        let mut cycle = BreathingCycle::new();
        assert_eq!(cycle.advance(), None);
        assert_eq!(cycle.advance(), None);
        assert_eq!(cycle.advance(), None);
        assert_eq!(cycle.advance(), Some(BreathPhase::Hold));
        assert_eq!(cycle.phase_remaining_secs(), 7);
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut cycle = BreathingCycle::new();
        for _ in 0..CYCLE_SECS {
            cycle.advance();
        }
        assert_eq!(cycle, BreathingCycle::new());
    }

    #[test]
    fn remaining_stays_within_dwell() {
        let mut cycle = BreathingCycle::new();
        for _ in 0..(CYCLE_SECS * 3) {
            cycle.advance();
            let max = cycle.phase().dwell_secs();
            assert!((1..=max).contains(&cycle.phase_remaining_secs()));
        }
    }

    #[test]
    fn guidance_cues_only_on_phase_start() {
        let mut cycle = BreathingCycle::new();
        assert_eq!(Guidance::for_cycle(&cycle).cue_hz, Some(220));
        cycle.advance();
        assert_eq!(Guidance::for_cycle(&cycle).cue_hz, None);
        for _ in 0..3 {
            cycle.advance();
        }
        let g = Guidance::for_cycle(&cycle);
        assert_eq!(g.phase, GuidePhase::Hold);
        assert_eq!(g.cue_hz, Some(330));
        assert!(g.headline.contains("7s"));
    }
}
