//! Unified processing architecture: scoped handles bundling buffer, node,
//! and scheduler access behind a single token-domain boundary.
//!
//! A [`handles::SubsystemProcessingHandle`] borrows a [`maya_buffers::BufferManager`],
//! a [`maya_graph::NodeGraph`], and a [`maya_scheduler::Scheduler`] for its
//! lifetime and exposes exactly the operations valid for one
//! [`handles::SubsystemTokens`] triple, so a caller cannot accidentally mix
//! processing across domains.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod handles;

pub use handles::{
    BufferProcessingHandle, NodeProcessingHandle, SubsystemProcessingHandle, SubsystemTokens, TaskSchedulerHandle,
};
