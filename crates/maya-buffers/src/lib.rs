//! Per-channel buffer aggregation, enforcement, and the soft-knee limiter.
//!
//! A [`manager::BufferManager`] owns one [`root::RootBuffer`] per output
//! channel. Each block, node output and every attached child buffer are
//! summed, averaged, and passed through [`maya_core::soft_knee_limit`] so
//! the final sample is always in `[-1.0, 1.0]`.
//! Input channels are a separate push path: the platform backend calls
//! [`manager::BufferManager::process_audio_input`], which fans out by copy
//! to every registered listener buffer — input buffers are never polled by
//! a root.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod manager;
pub mod root;
pub mod specialized;

pub use buffer::{Buffer, Processor};
pub use manager::BufferManager;
pub use root::{EnforcementStrategy, RootBuffer};
pub use specialized::{ContainerBuffer, FeedbackBuffer, NodeBuffer, PolynomialBuffer, SampleSource};
