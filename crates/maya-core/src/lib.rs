//! Maya Core - processing tokens, domains, clocks, and the error taxonomy
//! shared by every subsystem of the MayaFlux engine.
//!
//! This crate is the bottom of the dependency graph: [`graph`](https://docs.rs/maya-graph),
//! [`buffers`](https://docs.rs/maya-buffers), and [`scheduler`](https://docs.rs/maya-scheduler)
//! all build on the [`Domain`], [`Clock`], and [`MayaError`] types defined here.
//!
//! # Core Abstractions
//!
//! - [`tokens`] - the three processing-token families (node/buffer/task rate)
//! - [`Domain`] - a mutually-compatible triple of tokens packed into a `u64`
//! - [`Clock`] - a monotonic per-domain position counter
//! - [`MayaError`] - the six-kind recoverable error taxonomy
//! - [`SmoothedParam`] / [`LinearSmoothedParam`] - click-free parameter transitions
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded or ultra-low-latency
//! targets. Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! maya-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations on the audio thread's hot path
//! - **No dependency on std** by default: pure `no_std` with `libm` for math
//! - **Recoverable errors only**: nothing in this crate panics or unwinds

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod clock;
pub mod domain;
pub mod error;
pub mod fast_math;
pub mod math;
pub mod param;
pub mod tokens;

pub use clock::Clock;
pub use domain::Domain;
pub use error::MayaError;
pub use fast_math::{cos_turns, sin_turns};
pub use math::{clamp, lerp, soft_knee_limit, wrap_phase, CEILING, SOFT_KNEE};
pub use param::{LinearSmoothedParam, SmoothedParam};
pub use tokens::{BufferToken, NodeToken, TaskToken};
