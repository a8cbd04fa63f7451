//! Engine-wide tunables that are not arguments to a single call.
//!
//! Grounded on `sonido-config`'s `Preset`: a plain `serde`-derived struct
//! with `#[serde(default = "...")]` fallbacks so a caller-supplied
//! deserializer (TOML, JSON, whatever the embedding application already
//! uses) can omit any field it doesn't care about. This crate never reads
//! one off disk itself — loading is a caller concern.

use serde::{Deserialize, Serialize};

/// Sample rate, block size, default frame cadence, and the other values
/// every subsystem needs at construction time but that are not per-call
/// arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Audio sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Number of interleaved output channels [`crate::Engine::on_block`]
    /// expects.
    #[serde(default = "default_num_channels")]
    pub num_channels: usize,

    /// Capacity, in samples, of each output channel's root buffer.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Target frames per second for the frame clock
    /// [`crate::Engine::on_frame`] advances.
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// How many ticks [`maya_scheduler::Scheduler`] lets elapse between
    /// amortized sweeps of finished routines.
    #[serde(default = "default_cleanup_threshold")]
    pub cleanup_threshold: u32,

    /// Child-buffer enforcement strategy every output channel's root is
    /// constructed with.
    #[serde(default)]
    pub enforcement_strategy: EnforcementStrategyConfig,
}

/// `serde`-friendly mirror of [`maya_buffers::EnforcementStrategy`]; kept
/// separate since the original has no `Serialize`/`Deserialize` impl and
/// adding one there would reach past the buffer-pipeline crate's no_std
/// budget for a facade-only concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EnforcementStrategyConfig {
    /// Reject incompatible children at attach time.
    Strict,
    /// Reject incompatible children at attach time, silently.
    Filtered,
    /// Attach anything; skip incompatible children during processing.
    #[default]
    OverrideSkip,
    /// Attach anything; flag incompatible children for removal on sweep.
    OverrideReject,
    /// No compatibility checks at all.
    Ignore,
}

impl From<EnforcementStrategyConfig> for maya_buffers::EnforcementStrategy {
    fn from(value: EnforcementStrategyConfig) -> Self {
        match value {
            EnforcementStrategyConfig::Strict => maya_buffers::EnforcementStrategy::Strict,
            EnforcementStrategyConfig::Filtered => maya_buffers::EnforcementStrategy::Filtered,
            EnforcementStrategyConfig::OverrideSkip => maya_buffers::EnforcementStrategy::OverrideSkip,
            EnforcementStrategyConfig::OverrideReject => maya_buffers::EnforcementStrategy::OverrideReject,
            EnforcementStrategyConfig::Ignore => maya_buffers::EnforcementStrategy::Ignore,
        }
    }
}

fn default_sample_rate() -> f64 {
    48_000.0
}

fn default_num_channels() -> usize {
    2
}

fn default_block_size() -> usize {
    512
}

fn default_fps() -> f64 {
    60.0
}

fn default_cleanup_threshold() -> u32 {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            num_channels: default_num_channels(),
            block_size: default_block_size(),
            fps: default_fps(),
            cleanup_threshold: default_cleanup_threshold(),
            enforcement_strategy: EnforcementStrategyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Starts from [`EngineConfig::default`] with an explicit sample rate,
    /// the common case for a platform backend that only knows its own
    /// device rate at setup time.
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self { sample_rate, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_named_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.num_channels, 2);
        assert_eq!(config.cleanup_threshold, 256);
    }

    #[test]
    fn with_sample_rate_only_overrides_the_rate() {
        let config = EngineConfig::with_sample_rate(44_100.0);
        assert_eq!(config.sample_rate, 44_100.0);
        assert_eq!(config.block_size, 512);
    }
}
