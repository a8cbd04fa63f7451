//! The arena-backed pull-model node graph.
//!
//! Grounded on `sonido-core/src/graph/engine.rs`'s `GraphEngine` for the
//! register/remove/process shape, generalized from a linear effect chain
//! to a pull-model graph where any node may be a modulator of any other.
//! Generation-tagged [`NodeId`]s replace the `shared_ptr`-cycle ownership
//! model the original C++ used (`original_source/src/MayaFlux/Vruta/Promise.hpp`
//! shows the same handle-lifetime problem from the coroutine side).

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use maya_core::tokens::NodeToken;
use maya_core::MayaError;

use crate::node::{Node, NodeId, NodeKind, SnapshotIdSource};

/// Number of claim-attempt rounds [`NodeGraph::snapshot_sample_range`]
/// spins through, each doubling its busy-wait length, before giving up
/// and reporting a timeout.
const SNAPSHOT_SPIN_ROUNDS: u32 = 11;
/// Busy-wait length cap per round, in `core::hint::spin_loop` iterations.
const SNAPSHOT_SPIN_CAP: u32 = 1024;

/// One arena slot: either free (holding the generation the next occupant
/// will get) or occupied by a live node at that generation.
enum Slot {
    Free { next_generation: u32 },
    Occupied { generation: u32, node: Node },
}

/// Pull-model node graph: an arena of nodes, each optionally modulated by
/// others, evaluated lazily and memoized per block via the `PROCESSED`
/// flag so a shared modulator is never evaluated twice in one pass.
pub struct NodeGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Registers a new node and returns its generational handle.
    pub fn create_node(&mut self, kind: NodeKind, token: NodeToken) -> NodeId {
        let node = Node::new(kind, token);
        if let Some(index) = self.free_list.pop() {
            let generation = match &self.slots[index as usize] {
                Slot::Free { next_generation } => *next_generation,
                Slot::Occupied { .. } => unreachable!("free list pointed at an occupied slot"),
            };
            self.slots[index as usize] = Slot::Occupied { generation, node };
            NodeId { index, generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied { generation: 0, node });
            NodeId { index, generation: 0 }
        }
    }

    /// Removes a node, invalidating its [`NodeId`] (a later lookup with the
    /// same index but the old generation fails).
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), MayaError> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or_else(|| MayaError::argument("node index out of range"))?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {
                *slot = Slot::Free {
                    next_generation: generation.wrapping_add(1),
                };
                self.free_list.push(id.index);
                Ok(())
            }
            Slot::Occupied { .. } => Err(MayaError::argument("stale node handle (generation mismatch)")),
            Slot::Free { .. } => Err(MayaError::argument("node already removed")),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied { generation, node } if *generation == id.generation => Some(node),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied { generation, node } if *generation == id.generation => Some(node),
            _ => None,
        }
    }

    /// Adds `modulator` to `target`'s modulator list.
    pub fn connect_modulator(&mut self, target: NodeId, modulator: NodeId) -> Result<(), MayaError> {
        if self.get(modulator).is_none() {
            return Err(MayaError::argument("modulator node handle is stale or missing"));
        }
        let node = self
            .get_mut(target)
            .ok_or_else(|| MayaError::argument("target node handle is stale or missing"))?;
        node.core.add_modulator(modulator);
        Ok(())
    }

    /// Marks every node's `PROCESSED` flag clear, readying the graph for
    /// the next block. Called once per block before any `process_*` call.
    pub fn reset_processed_state(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Occupied { node, .. } = slot {
                node.core.clear_flag(crate::node::NodeFlags::PROCESSED);
            }
        }
    }

    /// Pulls one sample from `id`, recursively pulling its modulators
    /// first (summed as the transfer function's input), and memoizes the
    /// result via the `PROCESSED` flag so re-pulling the same node later in
    /// the same block returns the cached `last_output` instead of
    /// re-invoking the transfer function and re-firing its hooks.
    pub fn process_sample(&mut self, id: NodeId, sample_rate: f64) -> Result<f64, MayaError> {
        {
            let node = self
                .get(id)
                .ok_or_else(|| MayaError::argument("node handle is stale or missing"))?;
            if node.core.is_processed() {
                return Ok(node.core.last_output());
            }
        }

        let modulators: Vec<NodeId> = self
            .get(id)
            .ok_or_else(|| MayaError::argument("node handle is stale or missing"))?
            .core
            .modulators()
            .to_vec();

        let mut input = 0.0;
        for modulator in modulators {
            input += self.process_sample(modulator, sample_rate)?;
        }

        let node = self
            .get_mut(id)
            .ok_or_else(|| MayaError::argument("node handle is stale or missing"))?;
        let mock = node.core.flags().contains(crate::node::NodeFlags::MOCK_PROCESS);
        let (output, transition) = node.kind.advance(input, sample_rate);
        let output = if mock { node.core.last_output() } else { output };
        node.core.last_output = output;
        node.core.set_flag(crate::node::NodeFlags::PROCESSED);
        node.core.hooks.fire(output, transition);
        Ok(output)
    }

    /// Pulls a full block of samples for `id` one sample at a time,
    /// calling [`Self::reset_processed_state`] between samples so each
    /// sample re-evaluates the graph (block processing is a loop of
    /// independent single-sample pulls, matching the sample-accurate task
    /// token's granularity).
    pub fn process_block(&mut self, id: NodeId, out: &mut [f64], sample_rate: f64) -> Result<(), MayaError> {
        for slot in out {
            self.reset_processed_state();
            *slot = self.process_sample(id, sample_rate)?;
        }
        Ok(())
    }

    /// Produces `n` consecutive samples from `id` for an off-audio-thread
    /// reader (e.g. an analyzer) without perturbing the audio thread's own
    /// view of the node: it claims the node's [`crate::node::SnapshotContext`],
    /// saves the kind's mutable state, advances `n` times with hooks
    /// suppressed, restores the saved state, and releases the claim.
    ///
    /// The claim attempt spins with exponentially increasing backoff (capped
    /// at [`SNAPSHOT_SPIN_CAP`] `core::hint::spin_loop` iterations per
    /// round) for [`SNAPSHOT_SPIN_ROUNDS`] rounds, yielding the thread
    /// between rounds when the `std` feature is enabled. If the context is
    /// still held after the spin budget, this returns
    /// [`MayaError::Timeout`] without claiming; the caller treats an `Err`
    /// here the same way a hot-path caller treats a zero sample.
    ///
    /// Modulator inputs are not pulled for this read: the snapshot sampling
    /// path feeds `0.0` as input, since an off-thread reader asking for a
    /// node's own continuation has no block position to pull shared
    /// modulators at.
    pub fn snapshot_sample_range(
        &mut self,
        id: NodeId,
        sample_rate: f64,
        n: usize,
        claimant_ids: &SnapshotIdSource,
    ) -> Result<Vec<f64>, MayaError> {
        let claimant_id = claimant_ids.next();
        let mut spin_len = 1u32;
        let mut claimed = false;
        for _ in 0..SNAPSHOT_SPIN_ROUNDS {
            let node = self
                .get(id)
                .ok_or_else(|| MayaError::argument("node handle is stale or missing"))?;
            if node.core.snapshot.try_claim(claimant_id) {
                claimed = true;
                break;
            }
            for _ in 0..spin_len {
                core::hint::spin_loop();
            }
            spin_len = (spin_len * 2).min(SNAPSHOT_SPIN_CAP);
            #[cfg(feature = "std")]
            std::thread::yield_now();
        }
        if !claimed {
            return Err(MayaError::timeout("snapshot claim spin budget exceeded, potential deadlock"));
        }

        let node = self
            .get_mut(id)
            .ok_or_else(|| MayaError::argument("node handle is stale or missing"))?;
        let saved_kind = node.kind.save_state();
        let saved_last_output = node.core.last_output;

        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            let (output, _transition) = node.kind.advance(0.0, sample_rate);
            samples.push(output);
        }

        node.kind.restore_state(saved_kind);
        node.core.last_output = saved_last_output;
        node.core.snapshot.release(claimant_id);
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeFlags;

    #[test]
    fn create_and_remove_invalidates_handle() {
        let mut graph = NodeGraph::new();
        let id = graph.create_node(NodeKind::sine(440.0, 1.0), NodeToken::AudioRate);
        assert!(graph.get(id).is_some());
        graph.remove_node(id).unwrap();
        assert!(graph.get(id).is_none());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut graph = NodeGraph::new();
        let first = graph.create_node(NodeKind::sine(440.0, 1.0), NodeToken::AudioRate);
        graph.remove_node(first).unwrap();
        let second = graph.create_node(NodeKind::sine(220.0, 1.0), NodeToken::AudioRate);
        assert_eq!(first.index, second.index);
        assert_ne!(first.generation, second.generation);
        assert!(graph.get(first).is_none());
        assert!(graph.get(second).is_some());
    }

    #[test]
    fn shared_modulator_evaluated_once_per_block() {
        let mut graph = NodeGraph::new();
        let modulator = graph.create_node(NodeKind::sine(1.0, 1.0), NodeToken::AudioRate);
        let a = graph.create_node(NodeKind::polynomial(vec![0.0, 1.0], crate::node::PolynomialMode::Direct), NodeToken::AudioRate);
        let b = graph.create_node(NodeKind::polynomial(vec![0.0, 1.0], crate::node::PolynomialMode::Direct), NodeToken::AudioRate);
        graph.connect_modulator(a, modulator).unwrap();
        graph.connect_modulator(b, modulator).unwrap();

        let out_a = graph.process_sample(a, 48_000.0).unwrap();
        assert!(graph.get(modulator).unwrap().core.is_processed());
        let out_b = graph.process_sample(b, 48_000.0).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn mock_process_runs_hooks_without_changing_output() {
        let mut graph = NodeGraph::new();
        let id = graph.create_node(NodeKind::sine(440.0, 1.0), NodeToken::AudioRate);
        graph.get_mut(id).unwrap().core.set_flag(NodeFlags::MOCK_PROCESS);
        let first = graph.process_sample(id, 48_000.0).unwrap();
        assert_eq!(first, 0.0);
    }

    #[test]
    fn snapshot_read_restores_phase_for_the_next_block() {
        use crate::node::SnapshotIdSource;

        let mut graph = NodeGraph::new();
        let id = graph.create_node(NodeKind::sine(440.0, 48_000.0 / 4.0), NodeToken::AudioRate);
        let claimants = SnapshotIdSource::default();

        // Audio thread processes one block.
        let mut block = vec![0.0; 8];
        graph.process_block(id, &mut block, 48_000.0).unwrap();

        // Control thread reads ahead without disturbing the audio thread's
        // next block.
        let peek = graph.snapshot_sample_range(id, 48_000.0, 256, &claimants).unwrap();
        assert_eq!(peek.len(), 256);
        assert!(!graph.get(id).unwrap().core.snapshot.is_claimed());

        // Audio thread's next block continues from where it left off, as
        // if the snapshot read never happened.
        let mut continued = vec![0.0; 8];
        graph.process_block(id, &mut continued, 48_000.0).unwrap();

        let mut uninterrupted = vec![0.0; 8];
        let mut reference = NodeGraph::new();
        let ref_id = reference.create_node(NodeKind::sine(440.0, 48_000.0 / 4.0), NodeToken::AudioRate);
        reference.process_block(ref_id, &mut vec![0.0; 8], 48_000.0).unwrap();
        reference.process_block(ref_id, &mut uninterrupted, 48_000.0).unwrap();

        assert_eq!(continued, uninterrupted);
    }

    #[test]
    fn snapshot_claim_already_held_times_out() {
        use crate::node::SnapshotIdSource;

        let mut graph = NodeGraph::new();
        let id = graph.create_node(NodeKind::sine(440.0, 1.0), NodeToken::AudioRate);
        graph.get(id).unwrap().core.snapshot.try_claim(999);

        let claimants = SnapshotIdSource::default();
        let result = graph.snapshot_sample_range(id, 48_000.0, 4, &claimants);
        assert!(result.is_err());
    }
}
