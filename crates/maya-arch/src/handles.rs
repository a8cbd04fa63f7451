//! Scoped per-domain handles over the buffer, node, and scheduler
//! subsystems.
//!
//! Grounded on `original_source/src/MayaFlux/Core/ProcessingArchitecture.hpp`.
//! The original's `BufferProcessingHandle`/`NodeProcessingHandle` each hold
//! a `std::shared_ptr` to their manager plus a lock flag; here there is no
//! shared ownership, so each handle instead borrows its manager for the
//! handle's lifetime — the borrow checker enforces "exactly one domain's
//! worth of scoped access" in place of the runtime lock the original
//! acquired on first write.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use maya_buffers::BufferManager;
use maya_core::tokens::{BufferToken, NodeToken, TaskToken};
use maya_core::{Domain, MayaError};
use maya_graph::{NodeGraph, NodeId, NodeKind};
use maya_scheduler::{Routine, Scheduler, TaskRef};

/// The three tokens that together describe one processing domain,
/// mirroring the reference implementation's `SubsystemTokens` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubsystemTokens {
    pub buffer: BufferToken,
    pub node: NodeToken,
    pub task: TaskToken,
}

impl SubsystemTokens {
    pub fn new(node: NodeToken, buffer: BufferToken, task: TaskToken) -> Self {
        Self { buffer, node, task }
    }

    /// Packs the triple into a [`Domain`], failing if the combination is
    /// not one of the compatible triples `Domain::is_valid` recognizes.
    pub fn to_domain(self) -> Result<Domain, MayaError> {
        Domain::try_compose(self.node, self.buffer, self.task)
    }
}

/// Scoped access to one buffer token's channels.
pub struct BufferProcessingHandle<'a> {
    manager: &'a mut BufferManager,
    token: BufferToken,
}

impl<'a> BufferProcessingHandle<'a> {
    pub fn new(manager: &'a mut BufferManager, token: BufferToken) -> Self {
        Self { manager, token }
    }

    #[inline]
    pub fn token(&self) -> BufferToken {
        self.token
    }

    /// Processes every output channel, mixing in any connected node
    /// sources and running the aggregation/limiter pass.
    pub fn process(&mut self, graph: &mut NodeGraph) -> Result<(), MayaError> {
        self.manager.process_all_channels(graph)
    }

    pub fn process_channel(&mut self, channel: usize, graph: &mut NodeGraph) -> Result<(), MayaError> {
        self.manager.process_channel(channel, graph)
    }

    /// Read-only access to a channel's aggregated data.
    pub fn read_channel_data(&self, channel: usize) -> Option<&[f64]> {
        self.manager.root(channel).map(|r| r.data())
    }

    pub fn fill_interleaved(&self, out: &mut [f64], nframes: usize) {
        self.manager.fill_interleaved(out, nframes);
    }
}

/// Scoped access to one node token's graph operations.
pub struct NodeProcessingHandle<'a> {
    graph: &'a mut NodeGraph,
    token: NodeToken,
    sample_rate: f64,
}

impl<'a> NodeProcessingHandle<'a> {
    pub fn new(graph: &'a mut NodeGraph, token: NodeToken, sample_rate: f64) -> Self {
        Self { graph, token, sample_rate }
    }

    #[inline]
    pub fn token(&self) -> NodeToken {
        self.token
    }

    /// Creates a node stamped with this handle's token, replacing the
    /// reference implementation's `create_node<NodeType>(args...)`
    /// template with a plain constructor call — `NodeKind` is already the
    /// closed set of transfer functions, so no generic type parameter is
    /// needed to select one.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.graph.create_node(kind, self.token)
    }

    pub fn process_sample(&mut self, id: NodeId) -> Result<f64, MayaError> {
        self.graph.process_sample(id, self.sample_rate)
    }

    /// Clears every node's `PROCESSED` memoization flag, readying the
    /// graph for the next block's pulls.
    pub fn reset_processed_state(&mut self) {
        self.graph.reset_processed_state();
    }

    pub fn process_block(&mut self, id: NodeId, out: &mut [f64]) -> Result<(), MayaError> {
        self.graph.process_block(id, out, self.sample_rate)
    }
}

/// Scoped access to one task token's routines.
pub struct TaskSchedulerHandle<'a> {
    scheduler: &'a mut Scheduler,
    token: TaskToken,
}

impl<'a> TaskSchedulerHandle<'a> {
    pub fn new(scheduler: &'a mut Scheduler, token: TaskToken) -> Self {
        Self { scheduler, token }
    }

    #[inline]
    pub fn token(&self) -> TaskToken {
        self.token
    }

    pub fn process(&mut self, units: u64) -> Result<(), MayaError> {
        self.scheduler.process_token(self.token, units)
    }

    pub fn add_routine(&mut self, routine: Routine, name: Option<String>, initialize: bool) -> u64 {
        self.scheduler.add_task(routine, name, initialize)
    }

    pub fn cancel(&mut self, task: TaskRef<'_>) -> Result<(), MayaError> {
        self.scheduler.cancel_task(task)
    }
}

/// Bundles scoped buffer, node, and scheduler access behind one
/// `SubsystemTokens` triple, constructed only after validating the triple
/// composes into a legal [`Domain`] (the reference implementation
/// performs the same check implicitly through `ProcessingToken`
/// compatibility tables).
pub struct SubsystemProcessingHandle<'a> {
    pub buffers: BufferProcessingHandle<'a>,
    pub nodes: NodeProcessingHandle<'a>,
    pub tasks: TaskSchedulerHandle<'a>,
    tokens: SubsystemTokens,
}

impl<'a> SubsystemProcessingHandle<'a> {
    pub fn new(
        buffer_manager: &'a mut BufferManager,
        graph: &'a mut NodeGraph,
        scheduler: &'a mut Scheduler,
        sample_rate: f64,
        tokens: SubsystemTokens,
    ) -> Result<Self, MayaError> {
        tokens.to_domain()?;
        Ok(Self {
            buffers: BufferProcessingHandle::new(buffer_manager, tokens.buffer),
            nodes: NodeProcessingHandle::new(graph, tokens.node, sample_rate),
            tasks: TaskSchedulerHandle::new(scheduler, tokens.task),
            tokens,
        })
    }

    pub fn tokens(&self) -> SubsystemTokens {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maya_buffers::EnforcementStrategy;

    #[test]
    fn invalid_token_triple_is_rejected_at_construction() {
        let mut buffer_manager = BufferManager::new(1, 4, 48_000.0, EnforcementStrategy::Ignore);
        let mut graph = NodeGraph::new();
        let mut scheduler = Scheduler::new(64);
        let bad = SubsystemTokens::new(NodeToken::AudioRate, BufferToken::FRAME_RATE, TaskToken::SampleAccurate);
        let handle = SubsystemProcessingHandle::new(&mut buffer_manager, &mut graph, &mut scheduler, 48_000.0, bad);
        assert!(handle.is_err());
    }

    #[test]
    fn valid_token_triple_builds_a_working_handle() {
        let mut buffer_manager = BufferManager::new(1, 4, 48_000.0, EnforcementStrategy::Ignore);
        let mut graph = NodeGraph::new();
        let mut scheduler = Scheduler::new(64);
        let good = SubsystemTokens::new(NodeToken::AudioRate, BufferToken::AUDIO_BACKEND, TaskToken::SampleAccurate);
        let mut handle =
            SubsystemProcessingHandle::new(&mut buffer_manager, &mut graph, &mut scheduler, 48_000.0, good).unwrap();
        let node = handle.nodes.create_node(NodeKind::sine(440.0, 1.0));
        assert!(handle.nodes.process_sample(node).is_ok());
    }
}
