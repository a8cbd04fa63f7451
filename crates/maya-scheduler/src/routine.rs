//! Routine (coroutine task) state and the typed external-update store.
//!
//! Grounded on `original_source/src/MayaFlux/Vruta/Promise.hpp`: the
//! `routine_promise`/`audio_promise` fields (`processing_token`,
//! `next_sample`/`next_frame`, `auto_resume`, `should_terminate`, the
//! `state` map) map directly onto [`Routine`]'s fields, with the
//! `std::any`-typed map replaced by a closed, enumerated [`RoutineValue`]
//! and the coroutine frame itself replaced by a plain `FnMut` body driven
//! by an explicit state machine instead of language coroutine support.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use maya_core::tokens::TaskToken;

/// The closed sum type standing in for the original's `std::any`-typed
/// state map: a small,
/// fixed set of value kinds a routine's external caller and its own body
/// exchange parameters through.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutineValue {
    F64(f64),
    I64(i64),
    Text(String),
    List(Vec<f64>),
}

impl RoutineValue {
    /// Convenience accessor for the common case of reading back a scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RoutineValue::F64(v) => Some(*v),
            RoutineValue::I64(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// What a routine body returns from one resumption, replacing the
/// language-level coroutine frame's suspend/resume/complete transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineState {
    /// Ready to run again the very next time its domain's clock is ticked
    /// (equivalent to `next_position` equal to the position just reached).
    Ready,
    /// Suspended until the domain clock reaches `position`.
    Waiting(u64),
    /// Finished; the scheduler releases the routine on its next cleanup
    /// pass.
    Done,
}

/// The view a routine body gets into its own bookkeeping each resumption:
/// the clock position it was resumed at, and read/write access to its
/// external-parameter store.
pub struct RoutineCx<'a> {
    pub(crate) current_position: u64,
    pub(crate) state: &'a mut BTreeMap<String, RoutineValue>,
}

impl RoutineCx<'_> {
    /// The domain clock position this resumption was triggered at.
    #[inline]
    pub fn current_position(&self) -> u64 {
        self.current_position
    }

    pub fn get(&self, key: &str) -> Option<&RoutineValue> {
        self.state.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: RoutineValue) {
        self.state.insert(key.into(), value);
    }
}

type RoutineBody = Box<dyn FnMut(&mut RoutineCx) -> RoutineState + Send>;

/// A resumable task bound to one processing-token domain.
///
/// Unlike the reference implementation's `std::coroutine_handle`-backed
/// promise, a `Routine` has no suspended call stack: its entire behavior
/// is the `body` closure, called once per resumption with a fresh
/// [`RoutineCx`] borrowing its own state store.
pub struct Routine {
    token: TaskToken,
    body: RoutineBody,
    next_position: u64,
    auto_resume: bool,
    should_terminate: bool,
    done: bool,
    state: BTreeMap<String, RoutineValue>,
}

impl Routine {
    /// Builds a routine bound to `token` whose `body` runs immediately on
    /// the first resumption (`next_position` starts at `0`).
    pub fn new(token: TaskToken, body: impl FnMut(&mut RoutineCx) -> RoutineState + Send + 'static) -> Self {
        Self {
            token,
            body: Box::new(body),
            next_position: 0,
            auto_resume: true,
            should_terminate: false,
            done: false,
            state: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn token(&self) -> TaskToken {
        self.token
    }

    #[inline]
    pub fn auto_resume(&self) -> bool {
        self.auto_resume
    }

    pub fn set_auto_resume(&mut self, auto_resume: bool) {
        self.auto_resume = auto_resume;
    }

    #[inline]
    pub fn should_terminate(&self) -> bool {
        self.should_terminate
    }

    /// Marks the routine for termination; it is skipped on every
    /// subsequent tick and released on the scheduler's next cleanup pass.
    pub fn terminate(&mut self) {
        self.should_terminate = true;
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done || self.should_terminate
    }

    #[inline]
    pub fn next_position(&self) -> u64 {
        self.next_position
    }

    /// True when `current_position` has reached this routine's wake
    /// position, it is not marked `should_terminate`, and `auto_resume` is
    /// set.
    #[inline]
    pub fn is_ready(&self, current_position: u64) -> bool {
        !self.done && !self.should_terminate && self.auto_resume && current_position >= self.next_position
    }

    /// Calls the body once, updating `next_position`/`done` from its
    /// returned [`RoutineState`]. Caller is responsible for checking
    /// [`Self::is_ready`] first; this does not re-check readiness.
    pub fn resume(&mut self, current_position: u64) {
        let mut cx = RoutineCx {
            current_position,
            state: &mut self.state,
        };
        match (self.body)(&mut cx) {
            RoutineState::Ready => self.next_position = current_position,
            RoutineState::Waiting(pos) => self.next_position = pos,
            RoutineState::Done => self.done = true,
        }
    }

    /// Writes a key/value pair into the routine's external-parameter
    /// store; the routine body reads it back via [`RoutineCx::get`] on its
    /// next resumption.
    pub fn set_param(&mut self, key: impl Into<String>, value: RoutineValue) {
        self.state.insert(key.into(), value);
    }

    pub fn get_param(&self, key: &str) -> Option<&RoutineValue> {
        self.state.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_is_ready_only_at_or_past_next_position() {
        let routine = Routine::new(TaskToken::SampleAccurate, |_| RoutineState::Waiting(100));
        assert!(routine.is_ready(0));
        let mut routine = routine;
        routine.resume(0);
        assert!(!routine.is_ready(50));
        assert!(routine.is_ready(100));
    }

    #[test]
    fn terminate_stops_future_readiness() {
        let mut routine = Routine::new(TaskToken::SampleAccurate, |_| RoutineState::Ready);
        routine.terminate();
        assert!(!routine.is_ready(0));
        assert!(routine.should_terminate());
    }

    #[test]
    fn state_store_round_trips_through_param_update() {
        let mut routine = Routine::new(TaskToken::OnDemand, |cx| {
            if let Some(v) = cx.get("gain").and_then(RoutineValue::as_f64) {
                cx.set("last_gain", RoutineValue::F64(v));
            }
            RoutineState::Done
        });
        routine.set_param("gain", RoutineValue::F64(0.75));
        routine.resume(0);
        assert_eq!(routine.get_param("last_gain"), Some(&RoutineValue::F64(0.75)));
        assert!(routine.is_done());
    }
}
