//! Property tests for the session timer state machine.
//!
//! Each case drives a fresh `SessionTimer` with a random mix of ticks,
//! toggles and resets and checks the invariants that must hold after every
//! single step.

use acupress_core::events::Event;
use acupress_core::timer::{BreathPhase, SessionTimer, TimerState, CYCLE_SECS};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Tick,
    Toggle,
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => Just(Op::Tick),
        2 => Just(Op::Toggle),
        1 => Just(Op::Reset),
    ]
}

fn apply(timer: &mut SessionTimer, op: Op) -> Option<Event> {
    match op {
        Op::Tick => timer.tick(),
        Op::Toggle => timer.toggle(),
        Op::Reset => timer.reset(),
    }
}

proptest! {
    #[test]
    fn remaining_never_grows_without_reset(
        total in 1u32..200,
        ops in prop::collection::vec(op(), 0..400),
    ) {
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();
        let mut last = timer.remaining_secs();

        for op in ops {
            apply(&mut timer, op);
            if matches!(op, Op::Reset) {
                prop_assert_eq!(timer.remaining_secs(), total);
            } else {
                prop_assert!(timer.remaining_secs() <= last);
            }
            prop_assert!(timer.remaining_secs() <= total);
            last = timer.remaining_secs();
        }
    }

    #[test]
    fn phase_countdown_stays_in_bounds(
        total in 1u32..200,
        ops in prop::collection::vec(op(), 0..400),
    ) {
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();

        for op in ops {
            apply(&mut timer, op);
            let breathing = timer.breathing();
            prop_assert!(breathing.phase_remaining_secs() >= 1);
            prop_assert!(breathing.phase_remaining_secs() <= breathing.phase().dwell_secs());
        }
    }

    #[test]
    fn completes_at_most_once_per_start(
        total in 1u32..120,
        ops in prop::collection::vec(prop_oneof![9 => Just(Op::Tick), 1 => Just(Op::Toggle)], 0..400),
    ) {
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();

        let mut completions = 0;
        let mut prompts = 0;
        for op in ops {
            if let Some(event) = apply(&mut timer, op) {
                if event.is_completion() {
                    completions += 1;
                }
            }
            if timer.take_rating_prompt().is_some() {
                prompts += 1;
            }
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(completions, prompts);
        prop_assert_eq!(completions == 1, timer.state() == TimerState::Completed);
        prop_assert_eq!(timer.state() == TimerState::Completed, timer.remaining_secs() == 0);
    }

    #[test]
    fn ticks_while_paused_change_nothing(
        total in 2u32..200,
        run_before in 0u32..50,
        paused_ticks in 1usize..100,
    ) {
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();
        for _ in 0..run_before.min(total - 1) {
            timer.tick();
        }
        timer.toggle();
        prop_assert_eq!(timer.state(), TimerState::Paused);

        let remaining = timer.remaining_secs();
        let breathing = *timer.breathing();
        for _ in 0..paused_ticks {
            prop_assert!(timer.tick().is_none());
        }
        prop_assert_eq!(timer.remaining_secs(), remaining);
        prop_assert_eq!(*timer.breathing(), breathing);
    }

    #[test]
    fn reset_always_lands_on_the_same_state(
        total in 1u32..200,
        ops in prop::collection::vec(op(), 0..300),
    ) {
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();
        for op in ops {
            apply(&mut timer, op);
        }

        prop_assert!(timer.reset().is_some());
        prop_assert_eq!(timer.state(), TimerState::Idle);
        prop_assert_eq!(timer.remaining_secs(), total);
        prop_assert_eq!(timer.breathing().phase(), BreathPhase::Inspire);
        prop_assert_eq!(timer.breathing().phase_remaining_secs(), BreathPhase::Inspire.dwell_secs());
        prop_assert!(timer.take_rating_prompt().is_none());
    }

    #[test]
    fn breathing_repeats_every_cycle(cycles in 1u32..6) {
        let total = CYCLE_SECS * cycles + 1;
        let mut timer = SessionTimer::new();
        timer.start(total).unwrap();
        let initial = *timer.breathing();

        for _ in 0..CYCLE_SECS * cycles {
            timer.tick();
        }
        prop_assert_eq!(timer.remaining_secs(), 1);
        prop_assert_eq!(*timer.breathing(), initial);
    }
}

#[test]
fn zero_duration_is_rejected() {
    let mut timer = SessionTimer::new();
    assert!(timer.start(0).is_err());
    assert_eq!(timer.state(), TimerState::Idle);
    assert!(timer.tick().is_none());
}
