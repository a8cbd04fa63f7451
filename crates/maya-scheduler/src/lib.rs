//! Token-domain routine scheduling.
//!
//! A [`scheduler::Scheduler`] owns one [`maya_core::Clock`] per
//! [`maya_core::tokens::TaskToken`] domain and a flat list of
//! [`routine::Routine`]s bound to those domains. Advancing a domain
//! (`process_token`/`process_all_tokens`) resumes every routine whose wake
//! position has been reached, in registration order, then ticks the
//! clock forward. [`factories`] packages the
//! common interval/sequence/ramp/pattern resumption shapes on top of the
//! raw closure-bodied [`routine::Routine`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod factories;
pub mod routine;
pub mod scheduler;

pub use factories::{line, metro, pattern, sequence};
pub use routine::{Routine, RoutineCx, RoutineState, RoutineValue};
pub use scheduler::{Scheduler, TaskRef, TokenProcessor};
