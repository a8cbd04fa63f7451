//! Processing token families and the packed [`Domain`] triple.
//!
//! Grounded on `original_source/src/MayaFlux/API/Proxy/Domain.hpp` and the
//! sibling `Core/ProcessingTokens.hpp` it includes: each subsystem (nodes,
//! buffers, the scheduler) has its own small token enum, and a `Domain`
//! packs one of each into a single `u64` so a caller can pass "the audio
//! domain" as one value instead of three.

/// Node-rate processing token: which clock a node's transfer function is
/// driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NodeToken {
    /// Driven by the sample clock.
    AudioRate = 1,
    /// Driven by the frame clock.
    VisualRate = 2,
    /// Driven by an application-defined clock.
    CustomRate = 3,
}

/// Buffer-rate processing token. Individual bits compose into the
/// `*_BACKEND` presets below; `from_bits`/`bits` expose the raw value for
/// composition (`SAMPLE_RATE | CPU_PROCESS | SEQUENTIAL`, as the reference
/// implementation writes it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferToken(pub u16);

impl BufferToken {
    /// Buffer advances once per audio sample.
    pub const SAMPLE_RATE: BufferToken = BufferToken(1 << 0);
    /// Buffer advances once per rendered frame.
    pub const FRAME_RATE: BufferToken = BufferToken(1 << 1);
    /// Buffer processors run on the CPU.
    pub const CPU_PROCESS: BufferToken = BufferToken(1 << 2);
    /// Buffer processors run on the GPU.
    pub const GPU_PROCESS: BufferToken = BufferToken(1 << 3);
    /// Buffers in this domain are processed strictly in order.
    pub const SEQUENTIAL: BufferToken = BufferToken(1 << 4);
    /// Buffers in this domain may be processed out of order / concurrently.
    pub const PARALLEL: BufferToken = BufferToken(1 << 5);
    /// Windowing/input-event buffers (no sample data, just event queues).
    pub const WINDOW_EVENTS: BufferToken = BufferToken(1 << 6);

    /// Standard audio backend composite: sample-rate, CPU, sequential.
    pub const AUDIO_BACKEND: BufferToken = BufferToken(
        Self::SAMPLE_RATE.0 | Self::CPU_PROCESS.0 | Self::SEQUENTIAL.0,
    );
    /// Parallel audio backend composite: sample-rate, CPU, parallel.
    pub const AUDIO_PARALLEL: BufferToken = BufferToken(
        Self::SAMPLE_RATE.0 | Self::CPU_PROCESS.0 | Self::PARALLEL.0,
    );
    /// Standard graphics backend composite: frame-rate, GPU, sequential.
    pub const GRAPHICS_BACKEND: BufferToken = BufferToken(
        Self::FRAME_RATE.0 | Self::GPU_PROCESS.0 | Self::SEQUENTIAL.0,
    );

    /// Combines two token bitsets.
    #[inline]
    pub const fn or(self, other: BufferToken) -> BufferToken {
        BufferToken(self.0 | other.0)
    }

    /// Returns true if `self` contains every bit set in `mask`.
    #[inline]
    pub const fn contains(self, mask: BufferToken) -> bool {
        self.0 & mask.0 == mask.0
    }

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Reconstructs a token from its raw bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        BufferToken(bits)
    }
}

impl core::ops::BitOr for BufferToken {
    type Output = BufferToken;
    #[inline]
    fn bitor(self, rhs: BufferToken) -> BufferToken {
        self.or(rhs)
    }
}

/// Scheduler-rate processing token: how a routine is dispatched relative
/// to its domain's clock.
///
/// `Ord` is derived (on top of the `Hash`/`Eq` every token family has) so
/// `maya-scheduler` can key its per-domain clock/routine maps on this type
/// directly with a `BTreeMap` instead of a linear scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TaskToken {
    /// Resumed at exact sample positions.
    SampleAccurate = 1,
    /// Resumed at exact frame positions.
    FrameAccurate = 2,
    /// Tracks both a sample and a frame position simultaneously.
    MultiRate = 3,
    /// Resumed only when explicitly polled, not on a clock tick.
    OnDemand = 4,
    /// Resumed when an external event arrives; has no clock of its own.
    EventDriven = 5,
    /// Dispatched by an application-registered token processor.
    Custom = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_token_composes_with_bitor() {
        let combo = BufferToken::SAMPLE_RATE | BufferToken::CPU_PROCESS | BufferToken::SEQUENTIAL;
        assert_eq!(combo, BufferToken::AUDIO_BACKEND);
    }

    #[test]
    fn buffer_token_contains_checks_all_bits() {
        assert!(BufferToken::AUDIO_BACKEND.contains(BufferToken::SAMPLE_RATE));
        assert!(!BufferToken::AUDIO_BACKEND.contains(BufferToken::GPU_PROCESS));
    }
}
