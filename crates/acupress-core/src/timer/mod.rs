mod breathing;
mod driver;
mod engine;
mod ticker;

pub use breathing::{BreathPhase, BreathingCycle, GuidePhase, Guidance, CYCLE_SECS};
pub use driver::{SessionDriver, DEFAULT_TICK_PERIOD};
pub use engine::{SessionTimer, TimerState};
pub use ticker::TickHandle;
