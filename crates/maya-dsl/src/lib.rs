//! Fluent construction API for wiring node graphs, buffer channels, and
//! scheduled tasks together.
//!
//! Grounded on `original_source/src/MayaFlux/API/Proxy/Creator.hpp`'s
//! `Creator`/`CreationProxy`/`CreationHandle` trio. Unlike the original,
//! this crate holds no process-global instance and has no `no_std`
//! variant: it is a construction-time layer, borrowed for the lifetime of
//! one setup session, and never touched from the real-time processing
//! path.

pub mod context;
pub mod creator;
pub mod handle;
pub mod temporal;

pub use context::CreationContext;
pub use creator::Creator;
pub use handle::{CreationHandle, CreationOutcome};
pub use temporal::{TemporalActivation, TemporalWrapper, Time};
