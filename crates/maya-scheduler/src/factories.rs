//! Routine factories: small, commonly needed resumption patterns built
//! on top of the plain `Routine` body closure, so callers don't hand-roll
//! the same interval/sequence/ramp bookkeeping at every call site.
//!
//! Grounded on `original_source/src/MayaFlux/Vruta/Promise.hpp`'s
//! `metro`/`seq`/`line`/`pattern` free functions, which build a
//! `routine_promise` pre-wired with the same four dispatch shapes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use maya_core::tokens::TaskToken;

use crate::routine::{Routine, RoutineCx, RoutineState, RoutineValue};

/// A routine that calls `on_tick` every `interval` units, forever, until
/// terminated. The interval itself can be changed externally by setting
/// the `"interval"` parameter to a [`RoutineValue::F64`] (read once per
/// firing, not interpolated).
pub fn metro(token: TaskToken, interval: u64, mut on_tick: impl FnMut(&mut RoutineCx) + Send + 'static) -> Routine {
    Routine::new(token, move |cx| {
        on_tick(cx);
        let interval = cx
            .get("interval")
            .and_then(RoutineValue::as_f64)
            .map(|v| v.max(1.0) as u64)
            .unwrap_or(interval);
        RoutineState::Waiting(cx.current_position() + interval)
    })
}

/// A routine that fires `on_step` once per entry of `steps` (each paired
/// with the units to wait before the *next* step), then completes.
pub fn sequence(
    token: TaskToken,
    steps: Vec<(u64, RoutineValue)>,
    mut on_step: impl FnMut(&RoutineValue) + Send + 'static,
) -> Routine {
    let mut remaining = steps.into_iter();
    Routine::new(token, move |cx| match remaining.next() {
        Some((wait, value)) => {
            on_step(&value);
            RoutineState::Waiting(cx.current_position() + wait)
        }
        None => RoutineState::Done,
    })
}

/// A routine that linearly ramps a value from `from` to `to` over
/// `duration` units, calling `on_value` with the interpolated value each
/// time it is resumed, and completing once the ramp reaches `to`.
/// `step` is the unit granularity between resumptions.
pub fn line(
    token: TaskToken,
    from: f64,
    to: f64,
    duration: u64,
    step: u64,
    mut on_value: impl FnMut(f64) + Send + 'static,
) -> Routine {
    let step = step.max(1);
    let mut start_position: Option<u64> = None;
    Routine::new(token, move |cx| {
        let start = *start_position.get_or_insert(cx.current_position());
        let elapsed = cx.current_position().saturating_sub(start);
        if elapsed >= duration {
            on_value(to);
            return RoutineState::Done;
        }
        let t = elapsed as f64 / duration as f64;
        on_value(from + (to - from) * t);
        RoutineState::Waiting(cx.current_position() + step)
    })
}

/// A routine that cycles through `values` every `interval` units,
/// forever, calling `on_value` with the current entry each firing.
pub fn pattern(
    token: TaskToken,
    values: Vec<RoutineValue>,
    interval: u64,
    mut on_value: impl FnMut(&RoutineValue) + Send + 'static,
) -> Routine {
    let mut index = 0usize;
    Routine::new(token, move |cx| {
        if values.is_empty() {
            return RoutineState::Done;
        }
        on_value(&values[index % values.len()]);
        index = index.wrapping_add(1);
        RoutineState::Waiting(cx.current_position() + interval)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metro_waits_the_configured_interval() {
        let mut routine = metro(TaskToken::SampleAccurate, 100, |_| {});
        routine.resume(0);
        assert_eq!(routine.next_position(), 100);
        routine.resume(100);
        assert_eq!(routine.next_position(), 200);
    }

    #[test]
    fn sequence_completes_after_its_last_step() {
        let mut routine = sequence(
            TaskToken::OnDemand,
            vec![(10, RoutineValue::F64(1.0)), (20, RoutineValue::F64(2.0))],
            |_| {},
        );
        routine.resume(0);
        assert!(!routine.is_done());
        routine.resume(10);
        assert!(!routine.is_done());
        routine.resume(30);
        assert!(routine.is_done());
    }

    #[test]
    fn line_reaches_target_value_at_duration() {
        let last = std::rc::Rc::new(std::cell::RefCell::new(0.0f64));
        let l = last.clone();
        let mut routine = line(TaskToken::SampleAccurate, 0.0, 10.0, 100, 25, move |v| *l.borrow_mut() = v);
        routine.resume(0);
        routine.resume(25);
        routine.resume(50);
        routine.resume(75);
        routine.resume(100);
        assert_eq!(*last.borrow(), 10.0);
        assert!(routine.is_done());
    }

    #[test]
    fn pattern_cycles_back_to_the_first_value() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let s = seen.clone();
        let mut routine = pattern(
            TaskToken::SampleAccurate,
            vec![RoutineValue::I64(1), RoutineValue::I64(2)],
            10,
            move |v| s.borrow_mut().push(v.clone()),
        );
        for pos in [0, 10, 20] {
            routine.resume(pos);
        }
        assert_eq!(
            *seen.borrow(),
            vec![RoutineValue::I64(1), RoutineValue::I64(2), RoutineValue::I64(1)]
        );
    }
}
