//! The fluent entry point: `Creator` borrows a construction session's
//! subsystem handles and registries, and hands out [`crate::handle::CreationHandle`]s
//! for node construction.
//!
//! Grounded on `original_source/src/MayaFlux/API/Proxy/Creator.hpp`'s
//! `Creator` class and its process-global `inline Creator vega`, reworked
//! here with no process-global singleton: `Creator::new` instead borrows
//! the graph/buffer/scheduler
//! handles for the lifetime of one construction session (typically the
//! body of the facade engine's setup function), replacing
//! `ALL_NODE_REGISTRATIONS`/`ALL_BUFFER_REGISTRATION` macro-generated
//! methods with lookups into [`maya_registry::NodeKindRegistry`] /
//! [`maya_registry::BufferKindRegistry`].

use maya_buffers::{Buffer, BufferManager};
use maya_core::tokens::NodeToken;
use maya_core::MayaError;
use maya_graph::NodeGraph;
use maya_registry::{BufferKindRegistry, NodeKindParams, NodeKindRegistry};
use maya_scheduler::Scheduler;

use crate::handle::CreationHandle;

/// Borrows every subsystem a construction session needs, plus the
/// registries node/buffer kinds are looked up by name in.
pub struct Creator<'a> {
    pub(crate) graph: &'a mut NodeGraph,
    pub(crate) buffers: &'a mut BufferManager,
    #[allow(dead_code)]
    pub(crate) scheduler: &'a mut Scheduler,
    node_kinds: &'a NodeKindRegistry,
    buffer_kinds: &'a BufferKindRegistry,
    pub(crate) sample_rate: f64,
}

impl<'a> Creator<'a> {
    pub fn new(
        graph: &'a mut NodeGraph,
        buffers: &'a mut BufferManager,
        scheduler: &'a mut Scheduler,
        node_kinds: &'a NodeKindRegistry,
        buffer_kinds: &'a BufferKindRegistry,
        sample_rate: f64,
    ) -> Self {
        Self {
            graph,
            buffers,
            scheduler,
            node_kinds,
            buffer_kinds,
            sample_rate,
        }
    }

    /// Looks up `kind_id` in the node-kind registry and begins a
    /// [`CreationHandle`] for it. The node is not inserted into the graph
    /// until the handle's context is complete — its
    /// [`NodeToken`] comes from the eventual domain, so there is nothing to
    /// insert until then.
    pub fn node<'c>(&'c mut self, kind_id: &str, params: &NodeKindParams) -> Result<CreationHandle<'c, 'a>, MayaError> {
        let kind = self
            .node_kinds
            .create(kind_id, params)
            .ok_or_else(|| MayaError::argument("unknown node kind id"))?;
        Ok(CreationHandle::pending_node(self, kind))
    }

    /// Attaches a buffer-kind preset's token to a fresh [`Buffer`] and
    /// registers it as a child of `channel`'s root, immediately (buffers
    /// have no deferred-token concern the way nodes do, since their token
    /// comes from the kind preset rather than the eventual domain).
    pub fn buffer(&mut self, kind_id: &str, channel: usize, capacity: usize) -> Result<(), MayaError> {
        let descriptor = self
            .buffer_kinds
            .get(kind_id)
            .ok_or_else(|| MayaError::argument("unknown buffer kind id"))?
            .clone();
        let buffer = Buffer::new(channel as u32, capacity);
        self.buffers.create_specialized_buffer(channel, buffer, descriptor.token)
    }

    /// Inserts `kind` into the graph under `token` directly, bypassing the
    /// fluent context accumulation — the escape hatch for call sites that
    /// already know their domain and don't need the builder chain.
    pub fn node_now(&mut self, kind: maya_graph::NodeKind, token: NodeToken) -> maya_graph::NodeId {
        self.graph.create_node(kind, token)
    }
}
