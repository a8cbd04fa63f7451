//! Pull-model node graph with snapshot-safe concurrency.
//!
//! A [`graph::NodeGraph`] is an arena of [`node::Node`]s, each a small
//! transfer function ([`node::NodeKind`]) that may be modulated by other
//! nodes in the same graph. Nodes are evaluated lazily: a consumer pulls a
//! sample from one node, which recursively pulls its modulators, memoizing
//! results for the block via the `PROCESSED` flag so a modulator shared by
//! several nodes is only evaluated once.
//!
//! [`node::SnapshotContext`] gives an off-audio-thread reader (e.g. a UI
//! polling a node's last output) a lock-free claim mechanism instead of a
//! mutex on the hot path, grounded on the `CLAIMED`/`UNCLAIMED` handshake
//! of `original_source/src/MayaFlux/Vruta/Promise.hpp`'s state map.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod graph;
pub mod node;

pub use graph::NodeGraph;
pub use node::{
    Hooks, KindSnapshot, Node, NodeBehavior, NodeCore, NodeFlags, NodeId, NodeKind,
    NoiseDistribution, PolynomialHistory, PolynomialMode, SnapshotContext, SnapshotIdSource,
    Transition,
};
