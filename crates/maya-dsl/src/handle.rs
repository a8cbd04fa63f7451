//! `CreationHandle`: the single builder type construction calls chain
//! against.
//!
//! Grounded on `original_source/src/MayaFlux/API/Proxy/Creator.hpp`'s
//! `CreationProxy` and `CreationHandle<T>`, which the original kept as two
//! separate types (a proxy returned by `Creator::domain()`/`channel()`,
//! and a `shared_ptr`-derived handle returned by the node/buffer creation
//! methods). Collapsed here into the one type below, applying itself the
//! moment its accumulated context becomes complete.

use maya_core::tokens::NodeToken;
use maya_core::{Domain, MayaError};
use maya_graph::{NodeId, NodeKind};

use crate::context::CreationContext;
use crate::creator::Creator;

enum Pending {
    Node(NodeKind),
    Taken,
}

/// The outcome of applying a handle's accumulated context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The node was inserted into the graph and attached to every
    /// requested channel.
    Applied(NodeId),
    /// The context is still incomplete (domain and/or channel missing).
    Pending,
}

/// A single in-progress construction: a not-yet-placed [`NodeKind`] plus
/// the [`CreationContext`] accumulated so far. Applying happens
/// automatically the moment the context becomes complete, mirroring the
/// original's `try_apply_context` called from every setter.
pub struct CreationHandle<'c, 'a> {
    creator: &'c mut Creator<'a>,
    pending: Pending,
    context: CreationContext,
    outcome: CreationOutcome,
}

impl<'c, 'a> CreationHandle<'c, 'a> {
    pub(crate) fn pending_node(creator: &'c mut Creator<'a>, kind: NodeKind) -> Self {
        Self {
            creator,
            pending: Pending::Node(kind),
            context: CreationContext::new(),
            outcome: CreationOutcome::Pending,
        }
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.context.domain = Some(domain);
        self.try_apply();
        self
    }

    pub fn channel(mut self, channel: u32) -> Self {
        self.context.channel = Some(channel);
        self.context.channels = None;
        self.try_apply();
        self
    }

    pub fn channels(mut self, channels: Vec<u32>) -> Self {
        self.context.channels = Some(channels);
        self.context.channel = None;
        self.try_apply();
        self
    }

    /// Attaches a piece of construction-time metadata. Metadata plays no
    /// role in applying the context; it is there purely for a caller to
    /// read back via [`Self::metadata`] (e.g. a UI label).
    pub fn with(mut self, key: &'static str, value: f64) -> Self {
        self.context.metadata.push((key, value));
        self
    }

    pub fn metadata(&self) -> &[(&'static str, f64)] {
        &self.context.metadata
    }

    pub fn outcome(&self) -> CreationOutcome {
        self.outcome
    }

    /// The node id, once applied. `None` while the context is still
    /// incomplete.
    pub fn node_id(&self) -> Option<NodeId> {
        match self.outcome {
            CreationOutcome::Applied(id) => Some(id),
            CreationOutcome::Pending => None,
        }
    }

    fn try_apply(&mut self) {
        if !self.context.is_complete() || !matches!(self.pending, Pending::Node(_)) {
            return;
        }
        let Pending::Node(kind) = core::mem::replace(&mut self.pending, Pending::Taken) else {
            unreachable!("checked above");
        };
        let domain = self.context.domain.expect("is_complete checked domain is set");
        let token = domain_node_token(domain);
        let id = self.creator.node_now(kind, token);
        for channel in self.context.target_channels() {
            // Attachment failures (e.g. an out-of-range channel) are
            // surfaced by leaving the handle's outcome `Pending` rather
            // than panicking; construction-time callers are expected to
            // check `outcome()`/`node_id()` rather than unwrap blindly.
            if self.creator.buffers.connect_node_to_channel(id, channel as usize, 1.0).is_err() {
                return;
            }
        }
        self.outcome = CreationOutcome::Applied(id);
    }

    /// Begins a temporal activation: wraps this handle's (already applied)
    /// node in a [`crate::temporal::TemporalWrapper`] bound to `time`.
    pub fn for_duration(self, time: crate::temporal::Time) -> Result<crate::temporal::TemporalWrapper<'c, 'a>, MayaError> {
        let node = self
            .node_id()
            .ok_or_else(|| MayaError::lifecycle("temporal activation requires an already-applied node"))?;
        Ok(crate::temporal::TemporalWrapper::new(self.creator, node, time))
    }
}

impl<'c, 'a> core::ops::BitOr<Domain> for CreationHandle<'c, 'a> {
    type Output = Self;
    fn bitor(self, domain: Domain) -> Self {
        self.domain(domain)
    }
}

fn domain_node_token(domain: Domain) -> NodeToken {
    domain.node_token()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maya_buffers::{BufferManager, EnforcementStrategy};
    use maya_core::tokens::{BufferToken, TaskToken};
    use maya_graph::NodeGraph;
    use maya_registry::{BufferKindRegistry, NodeKindParams, NodeKindRegistry};
    use maya_scheduler::Scheduler;

    #[test]
    fn handle_applies_once_domain_and_channel_are_both_set() {
        let mut graph = NodeGraph::new();
        let mut buffers = BufferManager::new(2, 8, 48_000.0, EnforcementStrategy::Ignore);
        let mut scheduler = Scheduler::new(64);
        let node_kinds = NodeKindRegistry::new();
        let buffer_kinds = BufferKindRegistry::new();
        let mut creator = Creator::new(&mut graph, &mut buffers, &mut scheduler, &node_kinds, &buffer_kinds, 48_000.0);

        let params = NodeKindParams { freq: 220.0, amp: 0.5, ..Default::default() };
        let handle = creator.node("sine", &params).unwrap();
        assert_eq!(handle.outcome(), CreationOutcome::Pending);

        let domain = Domain::try_compose(NodeToken::AudioRate, BufferToken::AUDIO_BACKEND, TaskToken::SampleAccurate).unwrap();
        let handle = (handle | domain).channel(0);
        assert!(matches!(handle.outcome(), CreationOutcome::Applied(_)));
    }

    #[test]
    fn with_accumulates_metadata_without_affecting_outcome() {
        let mut graph = NodeGraph::new();
        let mut buffers = BufferManager::new(1, 8, 48_000.0, EnforcementStrategy::Ignore);
        let mut scheduler = Scheduler::new(64);
        let node_kinds = NodeKindRegistry::new();
        let buffer_kinds = BufferKindRegistry::new();
        let mut creator = Creator::new(&mut graph, &mut buffers, &mut scheduler, &node_kinds, &buffer_kinds, 48_000.0);

        let params = NodeKindParams::default();
        let handle = creator.node("impulse", &params).unwrap().with("label", 1.0);
        assert_eq!(handle.metadata(), &[("label", 1.0)]);
        assert_eq!(handle.outcome(), CreationOutcome::Pending);
    }
}
