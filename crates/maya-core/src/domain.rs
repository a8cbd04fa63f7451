//! The unified [`Domain`] value: a mutually-compatible triple of
//! [`NodeToken`], [`BufferToken`], and [`TaskToken`] packed into one `u64`.
//!
//! Layout mirrors `original_source/src/MayaFlux/API/Proxy/Domain.hpp`
//! exactly: `(node_token << 32) | (buffer_token << 16) | task_token`, so a
//! caller passing a preset like [`Domain::AUDIO`] around as a single value
//! is unpacked into the same three tokens the reference implementation
//! would hand to its three subsystems.

use crate::error::MayaError;
use crate::tokens::{BufferToken, NodeToken, TaskToken};

/// A mutually-compatible triple of processing tokens, one per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Domain(u64);

impl Domain {
    /// Standard real-time audio processing domain.
    pub const AUDIO: Domain = Domain::pack(NodeToken::AudioRate, BufferToken::AUDIO_BACKEND, TaskToken::SampleAccurate);
    /// High-performance parallel audio processing domain.
    pub const AUDIO_PARALLEL: Domain = Domain::pack(NodeToken::AudioRate, BufferToken::AUDIO_PARALLEL, TaskToken::SampleAccurate);
    /// Standard real-time graphics processing domain.
    pub const GRAPHICS: Domain = Domain::pack(NodeToken::VisualRate, BufferToken::GRAPHICS_BACKEND, TaskToken::FrameAccurate);
    /// Multi-rate graphics processing for adaptive frame rates.
    pub const GRAPHICS_ADAPTIVE: Domain = Domain::pack(NodeToken::VisualRate, BufferToken::GRAPHICS_BACKEND, TaskToken::MultiRate);
    /// Custom processing domain with on-demand scheduling.
    pub const CUSTOM_ON_DEMAND: Domain = Domain::pack(
        NodeToken::CustomRate,
        BufferToken(BufferToken::SAMPLE_RATE.bits() | BufferToken::CPU_PROCESS.bits() | BufferToken::SEQUENTIAL.bits()),
        TaskToken::OnDemand,
    );
    /// Custom processing domain with flexible scheduling.
    pub const CUSTOM_FLEXIBLE: Domain = Domain::pack(
        NodeToken::CustomRate,
        BufferToken(BufferToken::FRAME_RATE.bits() | BufferToken::GPU_PROCESS.bits() | BufferToken::PARALLEL.bits()),
        TaskToken::Custom,
    );
    /// Audio-visual synchronization domain: audio-rate nodes, frame-accurate scheduling.
    pub const AUDIO_VISUAL_SYNC: Domain = Domain::pack(
        NodeToken::AudioRate,
        BufferToken(BufferToken::SAMPLE_RATE.bits() | BufferToken::CPU_PROCESS.bits() | BufferToken::SEQUENTIAL.bits()),
        TaskToken::FrameAccurate,
    );
    /// GPU-accelerated audio processing domain.
    pub const AUDIO_GPU: Domain = Domain::pack(
        NodeToken::AudioRate,
        BufferToken(BufferToken::SAMPLE_RATE.bits() | BufferToken::GPU_PROCESS.bits() | BufferToken::PARALLEL.bits()),
        TaskToken::MultiRate,
    );
    /// Pure windowing domain (no rendering).
    pub const WINDOWING: Domain = Domain::pack(NodeToken::VisualRate, BufferToken::WINDOW_EVENTS, TaskToken::FrameAccurate);
    /// Input event processing domain.
    pub const INPUT_EVENTS: Domain = Domain::pack(NodeToken::CustomRate, BufferToken::WINDOW_EVENTS, TaskToken::EventDriven);

    /// Packs three tokens into a `Domain` without validating compatibility.
    /// Used for the `const` presets above, which are compatible by
    /// construction; external callers should prefer
    /// [`Domain::compose`]/[`Domain::try_compose`].
    #[inline]
    const fn pack(node: NodeToken, buffer: BufferToken, task: TaskToken) -> Domain {
        Domain(((node as u64) << 32) | ((buffer.bits() as u64) << 16) | (task as u64))
    }

    /// Composes a `Domain` from individual tokens without validation.
    #[inline]
    pub const fn compose(node: NodeToken, buffer: BufferToken, task: TaskToken) -> Domain {
        Domain::pack(node, buffer, task)
    }

    /// Composes a `Domain`, rejecting mutually-incompatible token triples.
    ///
    /// Incompatibility rules (per the processing-token model): `FrameRate`
    /// buffers are incompatible with `AudioRate` nodes, `SampleRate`
    /// buffers are incompatible with `VisualRate` nodes, `Sequential` is
    /// incompatible with `Parallel`, and `CpuProcess` is incompatible with
    /// `GpuProcess`.
    pub fn try_compose(node: NodeToken, buffer: BufferToken, task: TaskToken) -> Result<Domain, MayaError> {
        let domain = Domain::pack(node, buffer, task);
        if domain.is_valid() {
            Ok(domain)
        } else {
            Err(MayaError::compatibility("incompatible token triple in domain composition"))
        }
    }

    /// Extracts the node-rate token.
    #[inline]
    pub fn node_token(self) -> NodeToken {
        match (self.0 >> 32) & 0xFFFF {
            1 => NodeToken::AudioRate,
            2 => NodeToken::VisualRate,
            _ => NodeToken::CustomRate,
        }
    }

    /// Extracts the buffer-rate token.
    #[inline]
    pub fn buffer_token(self) -> BufferToken {
        BufferToken::from_bits(((self.0 >> 16) & 0xFFFF) as u16)
    }

    /// Extracts the scheduler-rate token.
    #[inline]
    pub fn task_token(self) -> TaskToken {
        match self.0 & 0xFFFF {
            1 => TaskToken::SampleAccurate,
            2 => TaskToken::FrameAccurate,
            3 => TaskToken::MultiRate,
            4 => TaskToken::OnDemand,
            5 => TaskToken::EventDriven,
            _ => TaskToken::Custom,
        }
    }

    /// Returns true if the domain's three constituent tokens are mutually
    /// compatible.
    pub fn is_valid(self) -> bool {
        let node = self.node_token();
        let buffer = self.buffer_token();

        let frame_rate_with_audio_node =
            buffer.contains(BufferToken::FRAME_RATE) && matches!(node, NodeToken::AudioRate);
        let sample_rate_with_visual_node =
            buffer.contains(BufferToken::SAMPLE_RATE) && matches!(node, NodeToken::VisualRate);
        let sequential_and_parallel =
            buffer.contains(BufferToken::SEQUENTIAL) && buffer.contains(BufferToken::PARALLEL);
        let cpu_and_gpu =
            buffer.contains(BufferToken::CPU_PROCESS) && buffer.contains(BufferToken::GPU_PROCESS);

        !(frame_rate_with_audio_node || sample_rate_with_visual_node || sequential_and_parallel || cpu_and_gpu)
    }

    /// Raw packed bit representation (low 48 bits significant).
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Domain(node={:?}, buffer={:?}, task={:?})",
            self.node_token(),
            self.buffer_token(),
            self.task_token()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_round_trip_through_decompose() {
        for preset in [
            Domain::AUDIO,
            Domain::AUDIO_PARALLEL,
            Domain::GRAPHICS,
            Domain::GRAPHICS_ADAPTIVE,
            Domain::CUSTOM_ON_DEMAND,
            Domain::AUDIO_VISUAL_SYNC,
            Domain::AUDIO_GPU,
            Domain::WINDOWING,
            Domain::INPUT_EVENTS,
        ] {
            let recomposed = Domain::compose(preset.node_token(), preset.buffer_token(), preset.task_token());
            assert_eq!(preset, recomposed);
        }
    }

    #[test]
    fn presets_are_valid() {
        for preset in [Domain::AUDIO, Domain::AUDIO_PARALLEL, Domain::GRAPHICS, Domain::WINDOWING, Domain::INPUT_EVENTS] {
            assert!(preset.is_valid(), "{preset:?} should be valid");
        }
    }

    #[test]
    fn frame_rate_with_audio_node_is_invalid() {
        let bad = Domain::compose(NodeToken::AudioRate, BufferToken::FRAME_RATE, TaskToken::SampleAccurate);
        assert!(!bad.is_valid());
        assert!(Domain::try_compose(NodeToken::AudioRate, BufferToken::FRAME_RATE, TaskToken::SampleAccurate).is_err());
    }

    #[test]
    fn sequential_and_parallel_is_invalid() {
        let bad = Domain::compose(
            NodeToken::CustomRate,
            BufferToken::SEQUENTIAL | BufferToken::PARALLEL,
            TaskToken::Custom,
        );
        assert!(!bad.is_valid());
    }

    #[test]
    fn cpu_and_gpu_is_invalid() {
        let bad = Domain::compose(
            NodeToken::CustomRate,
            BufferToken::CPU_PROCESS | BufferToken::GPU_PROCESS,
            TaskToken::Custom,
        );
        assert!(!bad.is_valid());
    }
}
