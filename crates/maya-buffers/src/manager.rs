//! Owns every output channel's [`RootBuffer`] and the separate input-buffer
//! path, and converts between per-channel storage and an interleaved
//! platform-backend buffer.
//!
//! Grounded on `sonido-core/src/graph/engine.rs`'s channel/slot bookkeeping
//! style and `original_source/src/MayaFlux/Buffers/Root/RootBuffer.hpp`
//! for the "input buffers are pushed to, never polled" distinction.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use maya_core::tokens::BufferToken;
use maya_core::MayaError;
use maya_graph::{NodeGraph, NodeId};

use crate::buffer::{Buffer, Processor};
use crate::root::{EnforcementStrategy, RootBuffer};
use crate::specialized::NodeBuffer;

/// Mixes a node's rendered samples into a channel's chain, matching
/// `connect_node_to_channel`'s "insert a NodeSourceProcessor" description.
struct NodeSourceProcessor {
    renderer: NodeBuffer,
    mix: f64,
    scratch: Vec<f64>,
}

impl NodeSourceProcessor {
    fn process(&mut self, samples: &mut [f64], graph: &mut NodeGraph) -> Result<(), MayaError> {
        self.scratch.resize(samples.len(), 0.0);
        for s in &mut self.scratch {
            *s = 0.0;
        }
        self.renderer.render(graph, &mut self.scratch)?;
        for (dst, src) in samples.iter_mut().zip(self.scratch.iter()) {
            *dst += src * self.mix;
        }
        Ok(())
    }
}

/// One output channel's state: its root buffer and the node-source
/// processors feeding it.
struct Channel {
    root: RootBuffer,
    node_sources: Vec<NodeSourceProcessor>,
    global_chain_indices: Vec<usize>,
}

/// An input channel: pushed to by the platform backend, never polled by a
/// root. Fan-out happens by copy to every registered listener buffer.
struct InputChannel {
    listeners: Vec<Buffer>,
}

/// Owns all output and input channel state for the engine.
pub struct BufferManager {
    channels: Vec<Channel>,
    inputs: Vec<InputChannel>,
    global_chain: Vec<Box<dyn Processor + Send>>,
    sample_rate: f64,
}

impl BufferManager {
    pub fn new(num_channels: usize, num_samples: usize, sample_rate: f64, strategy: EnforcementStrategy) -> Self {
        let channels = (0..num_channels)
            .map(|_| Channel {
                root: RootBuffer::new(num_samples, BufferToken::AUDIO_BACKEND, strategy),
                node_sources: Vec::new(),
                global_chain_indices: Vec::new(),
            })
            .collect();
        Self {
            channels,
            inputs: Vec::new(),
            global_chain: Vec::new(),
            sample_rate,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    fn channel_mut(&mut self, channel: usize) -> Result<&mut Channel, MayaError> {
        self.channels
            .get_mut(channel)
            .ok_or_else(|| MayaError::argument("output channel index out of range"))
    }

    /// Attaches a new child buffer of the given token to `channel`'s root.
    pub fn create_specialized_buffer(
        &mut self,
        channel: usize,
        buffer: Buffer,
        token: BufferToken,
    ) -> Result<(), MayaError> {
        self.channel_mut(channel)?.root.add_child(buffer, token)
    }

    /// Registers a processor on the given channel's root aggregation
    /// (`buffer = None`) or the global chain run after every channel.
    pub fn add_global_processor(&mut self, processor: Box<dyn Processor + Send>) {
        self.global_chain.push(processor);
    }

    pub fn remove_global_processor(&mut self, index: usize) -> bool {
        if index < self.global_chain.len() {
            self.global_chain.remove(index);
            true
        } else {
            false
        }
    }

    /// Inserts a node-source processor into `channel`'s chain so the
    /// node's output is mixed in at `mix` amount during aggregation.
    pub fn connect_node_to_channel(&mut self, node: NodeId, channel: usize, mix: f64) -> Result<(), MayaError> {
        let sample_rate = self.sample_rate;
        let ch = self.channel_mut(channel)?;
        ch.node_sources.push(NodeSourceProcessor {
            renderer: NodeBuffer::new(node, sample_rate, true),
            mix,
            scratch: Vec::new(),
        });
        Ok(())
    }

    /// Runs one channel's full pipeline: node sources write into the
    /// root's array, the root aggregates its children and limits, then
    /// the global chain runs over the result.
    pub fn process_channel(&mut self, channel: usize, graph: &mut NodeGraph) -> Result<(), MayaError> {
        let num_samples = self.channel_mut(channel)?.root.num_samples();
        let mut node_output = zeroed(num_samples);

        let ch = self.channel_mut(channel)?;
        for source in &mut ch.node_sources {
            source.process(&mut node_output, graph)?;
        }
        if !ch.node_sources.is_empty() {
            ch.root.write_node_output(&node_output);
        }
        ch.root.process();

        for processor in &mut self.global_chain {
            processor.process(self.channels[channel].root_data_mut_unchecked());
        }
        Ok(())
    }

    pub fn process_all_channels(&mut self, graph: &mut NodeGraph) -> Result<(), MayaError> {
        for channel in 0..self.channels.len() {
            self.process_channel(channel, graph)?;
        }
        Ok(())
    }

    pub fn root(&self, channel: usize) -> Option<&RootBuffer> {
        self.channels.get(channel).map(|c| &c.root)
    }

    /// Adds a new input channel with its own listener-buffer list.
    pub fn add_input_channel(&mut self) -> usize {
        self.inputs.push(InputChannel { listeners: Vec::new() });
        self.inputs.len() - 1
    }

    pub fn register_input_listener(&mut self, input_channel: usize, listener: Buffer) -> Result<(), MayaError> {
        self.inputs
            .get_mut(input_channel)
            .ok_or_else(|| MayaError::argument("input channel index out of range"))?
            .listeners
            .push(listener);
        Ok(())
    }

    /// Pushes one block of input data to every registered listener on
    /// `input_channel`, running each listener's default processor after
    /// the copy (the platform-backend push path; never polled).
    pub fn process_audio_input(&mut self, input_channel: usize, data: &[f64]) -> Result<(), MayaError> {
        let input = self
            .inputs
            .get_mut(input_channel)
            .ok_or_else(|| MayaError::argument("input channel index out of range"))?;
        for listener in &mut input.listeners {
            let n = data.len().min(listener.num_samples());
            listener.data_mut()[..n].copy_from_slice(&data[..n]);
            listener.process_default();
        }
        Ok(())
    }

    /// Converts every output channel's root data into an interleaved
    /// buffer of `channels * nframes` samples, the layout a platform audio
    /// backend expects.
    pub fn fill_interleaved(&self, out: &mut [f64], nframes: usize) {
        let num_channels = self.channels.len();
        for frame in 0..nframes {
            for (ch_idx, channel) in self.channels.iter().enumerate() {
                let sample = channel.root.data().get(frame).copied().unwrap_or(0.0);
                let slot = frame * num_channels + ch_idx;
                if slot < out.len() {
                    out[slot] = sample;
                }
            }
        }
    }

    /// Inverse of [`Self::fill_interleaved`]: splits an interleaved input
    /// buffer into each input channel's listener fan-out.
    pub fn fill_from_interleaved(&mut self, data: &[f64], nframes: usize, num_channels: usize) -> Result<(), MayaError> {
        let mut scratch = Vec::with_capacity(nframes);
        for ch_idx in 0..num_channels {
            scratch.clear();
            for frame in 0..nframes {
                let slot = frame * num_channels + ch_idx;
                scratch.push(data.get(slot).copied().unwrap_or(0.0));
            }
            if ch_idx < self.inputs.len() {
                self.process_audio_input(ch_idx, &scratch)?;
            }
        }
        Ok(())
    }
}

impl Channel {
    /// Helper used only so the global chain can borrow the root's data
    /// mutably after the per-channel borrow above has ended.
    fn root_data_mut_unchecked(&mut self) -> &mut [f64] {
        self.root.data_mut()
    }
}

fn zeroed(len: usize) -> Vec<f64> {
    let mut v = Vec::with_capacity(len);
    v.resize(len, 0.0);
    v
}
