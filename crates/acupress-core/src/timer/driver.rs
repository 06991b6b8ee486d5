//! Async driver pairing a [`SessionTimer`] with its tick schedule.
//!
//! Invariant: a live [`TickHandle`] exists if and only if the timer is
//! running. Every command releases the current handle before it may arm a
//! new one, so an instance never has two schedules.

use std::time::Duration;

use tracing::{debug, info};

use super::engine::SessionTimer;
use super::ticker::TickHandle;
use crate::error::ValidationError;
use crate::events::Event;
use crate::handoff::RatingPrompt;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct SessionDriver {
    timer: SessionTimer,
    ticks: Option<TickHandle>,
    period: Duration,
}

impl Default for SessionDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl SessionDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            timer: SessionTimer::new(),
            ticks: None,
            period,
        }
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn is_ticking(&self) -> bool {
        self.ticks.is_some()
    }

    pub fn start(&mut self, total_secs: u32) -> Result<Event, ValidationError> {
        let event = self.timer.start(total_secs)?;
        self.disarm();
        self.arm();
        info!(total_secs, "session started");
        Ok(event)
    }

    pub fn toggle(&mut self) -> Option<Event> {
        let event = self.timer.toggle()?;
        self.disarm();
        if self.timer.is_running() {
            self.arm();
        }
        debug!(
            running = self.timer.is_running(),
            remaining_secs = self.timer.remaining_secs(),
            "session toggled"
        );
        Some(event)
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.disarm();
        let event = self.timer.reset()?;
        debug!(total_secs = self.timer.total_secs(), "session reset");
        Some(event)
    }

    /// Wait for the next second and apply it.
    ///
    /// Returns `None` at once when nothing is running. Safe to use inside
    /// `tokio::select!`: a dropped wait consumes no tick.
    pub async fn next_event(&mut self) -> Option<Event> {
        let handle = self.ticks.as_mut()?;
        if handle.next().await.is_none() {
            self.disarm();
            return None;
        }

        let event = self.timer.tick();
        if !self.timer.is_running() {
            self.disarm();
        }
        if let Some(Event::SessionCompleted { total_secs, .. }) = &event {
            info!(total_secs, "session completed");
        }
        event
    }

    pub fn take_rating_prompt(&mut self) -> Option<RatingPrompt> {
        self.timer.take_rating_prompt()
    }

    fn arm(&mut self) {
        debug_assert!(self.ticks.is_none(), "tick schedule already armed");
        self.ticks = Some(TickHandle::start(self.period));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.ticks.take() {
            handle.cancel();
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{BreathPhase, TimerState};
    use tokio::time::{self, Instant};

    async fn run_ticks(driver: &mut SessionDriver, n: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..n {
            match driver.next_event().await {
                Some(e) => events.push(e),
                None => break,
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let mut driver = SessionDriver::default();
        driver.start(60).unwrap();
        let started = Instant::now();
        run_ticks(&mut driver, 4).await;
        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert_eq!(driver.timer().remaining_secs(), 56);
        assert_eq!(driver.timer().breathing().phase(), BreathPhase::Hold);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_halts_logical_time() {
        let mut driver = SessionDriver::default();
        driver.start(60).unwrap();
        run_ticks(&mut driver, 10).await;

        driver.toggle();
        assert!(!driver.is_ticking());
        time::advance(Duration::from_secs(100)).await;
        assert!(driver.next_event().await.is_none());

        driver.toggle();
        run_ticks(&mut driver, 1).await;
        assert_eq!(driver.timer().remaining_secs(), 49);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_releases_schedule() {
        let mut driver = SessionDriver::default();
        driver.start(3).unwrap();
        let events = run_ticks(&mut driver, 10).await;
        assert_eq!(events.len(), 3);
        assert!(events[2].is_completion());
        assert!(!driver.is_ticking());
        assert_eq!(driver.timer().state(), TimerState::Completed);
        assert!(driver.take_rating_prompt().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_ticks() {
        let mut driver = SessionDriver::default();
        driver.start(60).unwrap();
        run_ticks(&mut driver, 5).await;
        driver.reset();
        assert!(!driver.is_ticking());
        time::advance(Duration::from_secs(10)).await;
        assert!(driver.next_event().await.is_none());
        assert_eq!(driver.timer().remaining_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_after_reset_rearms_schedule() {
        let mut driver = SessionDriver::default();
        driver.start(60).unwrap();
        run_ticks(&mut driver, 5).await;
        driver.reset();

        assert!(matches!(driver.toggle(), Some(Event::SessionResumed { .. })));
        assert!(driver.is_ticking());
        run_ticks(&mut driver, 1).await;
        assert_eq!(driver.timer().remaining_secs(), 59);
        assert_eq!(driver.timer().breathing().phase(), BreathPhase::Inspire);
        assert_eq!(driver.timer().breathing().phase_remaining_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_schedule() {
        let mut driver = SessionDriver::default();
        driver.start(60).unwrap();
        run_ticks(&mut driver, 7).await;
        driver.start(30).unwrap();
        assert!(driver.is_ticking());
        run_ticks(&mut driver, 1).await;
        assert_eq!(driver.timer().remaining_secs(), 29);
        assert_eq!(driver.timer().breathing().phase_remaining_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_start_leaves_driver_idle() {
        let mut driver = SessionDriver::default();
        assert!(driver.start(0).is_err());
        assert!(!driver.is_ticking());
        assert!(driver.toggle().is_none());
    }
}
