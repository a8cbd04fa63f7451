//! The token-domain scheduler: one [`maya_core::Clock`] per
//! [`TaskToken`] domain, dispatching every ready [`Routine`] bound to it
//! on each tick.
//!
//! Grounded on `reed-evans-hyasynth-engine/src/scheduler.rs` for the
//! "not real-time safe, never touched from the audio thread except to
//! resume" split between compiling/mutating scheduler state and the
//! actual per-tick dispatch, adapted from that engine's musical-event
//! compilation to a token-domain resume loop (there is no musical-time
//! transport here — `Clock` positions are raw sample/frame/custom units,
//! not beats).

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
use maya_core::{Clock, MayaError};

use crate::routine::Routine;

/// Either the routine's registration name or its opaque id, for
/// [`Scheduler::cancel_task`].
pub enum TaskRef<'a> {
    Id(u64),
    Name(&'a str),
}

struct RoutineSlot {
    id: u64,
    name: Option<String>,
    routine: Routine,
}

/// A custom per-domain advance algorithm installed via
/// [`Scheduler::register_token_processor`] — e.g. a graphics domain that
/// rounds `units` up to a whole frame before the clock advances, instead
/// of the default "advance by exactly `units`" behavior. Routine
/// dispatch itself always follows the same ready-check loop; only how
/// far the clock moves is customizable.
pub type TokenProcessor = Box<dyn FnMut(&Clock, u64) -> u64 + Send>;

/// Holds every live routine and the independent per-domain clocks that
/// drive them.
pub struct Scheduler {
    clocks: BTreeMap<TaskToken, Clock>,
    default_units: BTreeMap<TaskToken, u64>,
    routines: Vec<RoutineSlot>,
    next_id: u64,
    processors: BTreeMap<TaskToken, TokenProcessor>,
    cleanup_threshold: u32,
    ticks_since_cleanup: u32,
    event_counters: BTreeMap<TaskToken, u64>,
}

impl Scheduler {
    pub fn new(cleanup_threshold: u32) -> Self {
        Self {
            clocks: BTreeMap::new(),
            default_units: BTreeMap::new(),
            routines: Vec::new(),
            next_id: 0,
            processors: BTreeMap::new(),
            cleanup_threshold: cleanup_threshold.max(1),
            ticks_since_cleanup: 0,
            event_counters: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the clock driving `token`'s domain.
    pub fn set_clock(&mut self, token: TaskToken, clock: Clock) {
        self.clocks.insert(token, clock);
    }

    /// Sets the unit count [`Self::process_all_tokens`] advances `token`
    /// by each call.
    pub fn set_default_units(&mut self, token: TaskToken, units: u64) {
        self.default_units.insert(token, units);
    }

    pub fn get_clock(&self, token: TaskToken) -> Option<&Clock> {
        self.clocks.get(&token)
    }

    pub fn current_units(&self, token: TaskToken) -> Option<u64> {
        self.clocks.get(&token).map(Clock::position)
    }

    pub fn seconds_to_units(&self, token: TaskToken, seconds: f64) -> Option<u64> {
        self.clocks.get(&token).map(|c| c.seconds_to_units(seconds))
    }

    /// Installs a custom dispatch algorithm for `token`'s domain, replacing
    /// the default one-pass-in-registration-order loop.
    pub fn register_token_processor(&mut self, token: TaskToken, processor: TokenProcessor) {
        self.processors.insert(token, processor);
    }

    /// Attaches `routine`, optionally under `name`, and optionally resumes
    /// it immediately at position `0`.
    /// Returns the routine's opaque id.
    pub fn add_task(&mut self, mut routine: Routine, name: Option<String>, initialize: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if initialize {
            routine.resume(0);
        }
        self.routines.push(RoutineSlot { id, name, routine });
        id
    }

    /// Marks a routine `should_terminate`; it stops being resumed this
    /// tick onward and is swept on the next cleanup pass.
    pub fn cancel_task(&mut self, task: TaskRef<'_>) -> Result<(), MayaError> {
        let slot = match task {
            TaskRef::Id(id) => self.routines.iter_mut().find(|s| s.id == id),
            TaskRef::Name(name) => self.routines.iter_mut().find(|s| s.name.as_deref() == Some(name)),
        };
        match slot {
            Some(slot) => {
                slot.routine.terminate();
                Ok(())
            }
            None => Err(MayaError::argument("no such task to cancel")),
        }
    }

    /// Writes key/value pairs into a named routine's external-parameter
    /// store.
    pub fn update_task_params(
        &mut self,
        name: &str,
        updates: impl IntoIterator<Item = (String, crate::routine::RoutineValue)>,
    ) -> Result<(), MayaError> {
        let slot = self
            .routines
            .iter_mut()
            .find(|s| s.name.as_deref() == Some(name))
            .ok_or_else(|| MayaError::argument("no such named task"))?;
        for (key, value) in updates {
            slot.routine.set_param(key, value);
        }
        Ok(())
    }

    /// Advances `token`'s clock, resuming every ready routine bound to it
    /// first (so resumption checks the position the domain is about to
    /// reach: each routine is checked in registration order, *then* the
    /// clock moves). `units` is
    /// passed through [`Self::register_token_processor`]'s processor, if
    /// one is installed, to let a domain round or rescale the advance
    /// before it is applied.
    pub fn process_token(&mut self, token: TaskToken, units: u64) -> Result<(), MayaError> {
        let clock = self
            .clocks
            .get(&token)
            .ok_or_else(|| MayaError::lifecycle("no clock registered for token"))?;

        let actual_units = match self.processors.get_mut(&token) {
            Some(processor) => processor(clock, units),
            None => units,
        };
        let target_position = clock.position() + actual_units;

        for slot in self.routines.iter_mut().filter(|s| s.routine.token() == token) {
            if slot.routine.is_ready(target_position) {
                slot.routine.resume(target_position);
            }
        }

        let clock = self.clocks.get_mut(&token).expect("checked above");
        clock.tick(actual_units);

        self.ticks_since_cleanup += 1;
        if self.ticks_since_cleanup >= self.cleanup_threshold {
            self.cleanup();
            self.ticks_since_cleanup = 0;
        }
        Ok(())
    }

    /// Resumes every ready routine bound to `token` once, without a
    /// registered clock — the dispatch path for [`maya_core::tokens::TaskToken::EventDriven`]
    /// routines, which have no clock of their own and become ready when an
    /// external event arrives rather than at a clock position. Internally advances a private per-token event
    /// counter one tick so a routine can still `Waiting(n)` for its `n`th
    /// event rather than only ever the next one.
    pub fn dispatch_event(&mut self, token: TaskToken) {
        let counter = self.event_counters.entry(token).or_insert(0);
        *counter += 1;
        let target = *counter;

        for slot in self.routines.iter_mut().filter(|s| s.routine.token() == token) {
            if slot.routine.is_ready(target) {
                slot.routine.resume(target);
            }
        }

        self.ticks_since_cleanup += 1;
        if self.ticks_since_cleanup >= self.cleanup_threshold {
            self.cleanup();
            self.ticks_since_cleanup = 0;
        }
    }

    /// Advances every domain that has both a registered clock and a
    /// default unit count, in token order.
    pub fn process_all_tokens(&mut self) -> Result<(), MayaError> {
        let tokens: Vec<TaskToken> = self.default_units.keys().copied().collect();
        for token in tokens {
            let units = self.default_units[&token];
            self.process_token(token, units)?;
        }
        Ok(())
    }

    /// Drops every routine that is done or marked for termination. Run
    /// automatically every `cleanup_threshold` ticks; may also be called
    /// directly.
    pub fn cleanup(&mut self) {
        self.routines.retain(|s| !s.routine.is_done());
    }

    pub fn task_count(&self) -> usize {
        self.routines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::{Routine, RoutineState};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn ready_routine_resumes_at_target_position() {
        let mut scheduler = Scheduler::new(100);
        scheduler.set_clock(TaskToken::SampleAccurate, Clock::new(48_000.0));
        let fired = Rc::new(RefCell::new(0u32));
        let counter = fired.clone();
        let routine = Routine::new(TaskToken::SampleAccurate, move |_| {
            *counter.borrow_mut() += 1;
            RoutineState::Waiting(512)
        });
        scheduler.add_task(routine, None, true);
        assert_eq!(*fired.borrow(), 1);
        scheduler.process_token(TaskToken::SampleAccurate, 512).unwrap();
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn cancel_marks_terminate_and_cleanup_sweeps() {
        let mut scheduler = Scheduler::new(1);
        scheduler.set_clock(TaskToken::OnDemand, Clock::new(1.0));
        let routine = Routine::new(TaskToken::OnDemand, |_| RoutineState::Ready);
        let id = scheduler.add_task(routine, Some("r".into()), false);
        scheduler.cancel_task(TaskRef::Id(id)).unwrap();
        scheduler.process_token(TaskToken::OnDemand, 1).unwrap();
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn unknown_task_cancel_is_argument_error() {
        let mut scheduler = Scheduler::new(10);
        assert!(scheduler.cancel_task(TaskRef::Name("missing")).is_err());
    }

    #[test]
    fn dispatch_event_resumes_event_driven_routines_without_a_clock() {
        let mut scheduler = Scheduler::new(100);
        let fired = Rc::new(RefCell::new(0u32));
        let counter = fired.clone();
        let routine = Routine::new(TaskToken::EventDriven, move |_| {
            *counter.borrow_mut() += 1;
            RoutineState::Ready
        });
        scheduler.add_task(routine, None, false);
        scheduler.dispatch_event(TaskToken::EventDriven);
        scheduler.dispatch_event(TaskToken::EventDriven);
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn dispatch_event_waits_for_the_nth_event() {
        let mut scheduler = Scheduler::new(100);
        let fired = Rc::new(RefCell::new(0u32));
        let counter = fired.clone();
        let routine = Routine::new(TaskToken::EventDriven, move |_| {
            *counter.borrow_mut() += 1;
            RoutineState::Waiting(2)
        });
        scheduler.add_task(routine, None, true);
        assert_eq!(*fired.borrow(), 1);
        scheduler.dispatch_event(TaskToken::EventDriven);
        assert_eq!(*fired.borrow(), 1);
        scheduler.dispatch_event(TaskToken::EventDriven);
        assert_eq!(*fired.borrow(), 2);
    }

    #[test]
    fn metro_fires_every_interval() {
        let mut scheduler = Scheduler::new(1000);
        scheduler.set_clock(TaskToken::SampleAccurate, Clock::new(48_000.0));
        let count = Rc::new(RefCell::new(0u32));
        let c = count.clone();
        let routine = crate::factories::metro(TaskToken::SampleAccurate, 24_000, move |_| {
            *c.borrow_mut() += 1;
        });
        scheduler.add_task(routine, None, true);
        for _ in 0..3 {
            scheduler.process_token(TaskToken::SampleAccurate, 24_000).unwrap();
        }
        assert_eq!(*count.borrow(), 4);
    }
}
