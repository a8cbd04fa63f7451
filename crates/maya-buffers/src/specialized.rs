//! Specialized child buffer kinds attached under a [`crate::root::RootBuffer`].
//!
//! Grounded on `original_source/src/MayaFlux/Buffers/` for the
//! node-source/feedback/polynomial/container vocabulary, expressed here
//! as [`crate::buffer::Processor`] implementations rather than buffer
//! subclasses — the processor chain already gives every
//! [`crate::buffer::Buffer`] the per-block hook these need.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use maya_core::MayaError;
use maya_graph::{NodeGraph, NodeId};

use crate::buffer::Processor;

/// Renders a node's per-sample output into the buffer, pulling one sample
/// per array slot via [`NodeGraph::process_sample`].
pub struct NodeBuffer {
    node: NodeId,
    sample_rate: f64,
    clear_first: bool,
}

impl NodeBuffer {
    pub fn new(node: NodeId, sample_rate: f64, clear_first: bool) -> Self {
        Self {
            node,
            sample_rate,
            clear_first,
        }
    }

    /// Runs the node graph pull for this block, writing results directly
    /// into `samples`. Call once per block before the buffer's own
    /// `process_default`/`process_chain` run.
    pub fn render(&self, graph: &mut NodeGraph, samples: &mut [f64]) -> Result<(), MayaError> {
        if self.clear_first {
            for s in samples.iter_mut() {
                *s = 0.0;
            }
        }
        for s in samples.iter_mut() {
            *s += graph.process_sample(self.node, self.sample_rate)?;
        }
        Ok(())
    }
}

/// Mixes the previous block's samples back in at `feedback_amount` before
/// each new block is produced; a classic comb/delay building block.
pub struct FeedbackBuffer {
    previous: Vec<f64>,
    feedback_amount: f64,
}

impl FeedbackBuffer {
    pub fn new(num_samples: usize, feedback_amount: f64) -> Self {
        Self {
            previous: zeroed(num_samples),
            feedback_amount: feedback_amount.clamp(0.0, 1.0),
        }
    }

    pub fn set_feedback_amount(&mut self, amount: f64) {
        self.feedback_amount = amount.clamp(0.0, 1.0);
    }
}

impl Processor for FeedbackBuffer {
    fn process(&mut self, samples: &mut [f64]) {
        let n = samples.len().min(self.previous.len());
        for i in 0..n {
            samples[i] += self.previous[i] * self.feedback_amount;
        }
        self.previous.resize(samples.len(), 0.0);
        self.previous.copy_from_slice(samples);
    }
}

/// Hosts a [`maya_graph::NodeKind::Polynomial`] node and runs it over every
/// sample in the buffer each block, reusing the node's own history ring
/// rather than keeping a second copy here.
pub struct PolynomialBuffer {
    node: NodeId,
    sample_rate: f64,
}

impl PolynomialBuffer {
    pub fn new(node: NodeId, sample_rate: f64) -> Self {
        Self { node, sample_rate }
    }

    pub fn render(&self, graph: &mut NodeGraph, samples: &mut [f64]) -> Result<(), MayaError> {
        for s in samples.iter_mut() {
            *s = graph.process_sample(self.node, self.sample_rate)?;
        }
        Ok(())
    }
}

/// Seam for file-backed playback buffers. File I/O is out of scope for
/// this crate (§1 Non-goals); a platform-backend crate implements this
/// trait over whatever decoder it uses and hands the result to
/// [`ContainerBuffer::from_source`].
pub trait SampleSource {
    /// Fills `out` with the next `out.len()` samples, returning the number
    /// actually written (fewer than `out.len()` at end-of-source).
    fn read(&mut self, out: &mut [f64]) -> usize;
}

/// A child buffer that reads from an arbitrary [`SampleSource`].
pub struct ContainerBuffer {
    source: Box<dyn SampleSource + Send>,
    exhausted: bool,
}

impl ContainerBuffer {
    pub fn from_source(source: impl SampleSource + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Processor for ContainerBuffer {
    fn process(&mut self, samples: &mut [f64]) {
        let written = self.source.read(samples);
        if written < samples.len() {
            for s in &mut samples[written..] {
                *s = 0.0;
            }
            self.exhausted = true;
        }
    }
}

fn zeroed(len: usize) -> Vec<f64> {
    let mut v = Vec::with_capacity(len);
    v.resize(len, 0.0);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use maya_core::tokens::NodeToken;
    use maya_graph::NodeKind;

    #[test]
    fn node_buffer_renders_from_graph() {
        let mut graph = NodeGraph::new();
        let node = graph.create_node(NodeKind::impulse(1.0, 1.0), NodeToken::AudioRate);
        let renderer = NodeBuffer::new(node, 4.0, true);
        let mut samples = vec![0.0; 4];
        renderer.render(&mut graph, &mut samples).unwrap();
        assert_eq!(samples, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn feedback_buffer_mixes_previous_block() {
        let mut fb = FeedbackBuffer::new(2, 0.5);
        let mut block = vec![1.0, 1.0];
        fb.process(&mut block);
        assert_eq!(block, vec![1.0, 1.0]);
        let mut next = vec![0.0, 0.0];
        fb.process(&mut next);
        assert_eq!(next, vec![0.5, 0.5]);
    }

    struct CountingSource {
        remaining: usize,
    }

    impl SampleSource for CountingSource {
        fn read(&mut self, out: &mut [f64]) -> usize {
            let n = out.len().min(self.remaining);
            for (i, s) in out.iter_mut().enumerate().take(n) {
                *s = i as f64;
            }
            self.remaining -= n;
            n
        }
    }

    #[test]
    fn container_buffer_zero_fills_past_exhaustion() {
        let mut buf = ContainerBuffer::from_source(CountingSource { remaining: 2 });
        let mut samples = vec![9.0; 4];
        buf.process(&mut samples);
        assert_eq!(samples, vec![0.0, 1.0, 0.0, 0.0]);
        assert!(buf.is_exhausted());
    }
}
