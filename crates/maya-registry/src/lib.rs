//! Node-kind and buffer-kind factory registries.
//!
//! Generalizes the guitar-pedal effect registry this crate started from
//! (the `EffectRegistry`/`EffectDescriptor`/`EffectCategory` trio) to the
//! node-graph and buffer-pipeline domain: instead of looking up a DSP
//! effect by name and instantiating it with a sample rate, callers look
//! up a node kind or buffer kind by name and instantiate it with a small
//! parameter struct, without needing a preprocessor-generated factory
//! macro — `maya-dsl`'s fluent builders go through these registries
//! rather than switching on a hardcoded kind name.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! maya-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use maya_buffers::{EnforcementStrategy, RootBuffer};
use maya_core::tokens::BufferToken;
use maya_graph::{NoiseDistribution, PolynomialMode};

/// Category of node kind, for organization and filtering in a registry
/// browser UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Periodic waveform generators (sine, impulse).
    Generator,
    /// Transfer functions evaluated against their own or their input's
    /// history (polynomial).
    Shaper,
    /// Stochastic sources (noise).
    Stochastic,
    /// User-registered [`maya_graph::NodeBehavior`] implementations.
    Custom,
}

impl NodeCategory {
    pub const fn name(&self) -> &'static str {
        match self {
            NodeCategory::Generator => "Generator",
            NodeCategory::Shaper => "Shaper",
            NodeCategory::Stochastic => "Stochastic",
            NodeCategory::Custom => "Custom",
        }
    }
}

/// The fixed set of constructor arguments every built-in [`NodeKind`]
/// factory draws from. Unused fields are ignored by kinds that don't
/// need them, the same way the effect registry's factories all took a
/// sample rate even though some effects ignored it.
///
/// [`NodeKind`]: maya_graph::NodeKind
#[derive(Debug, Clone)]
pub struct NodeKindParams {
    pub freq: f64,
    pub amp: f64,
    pub coeffs: Vec<f64>,
    pub mode: PolynomialMode,
    pub distribution: NoiseDistribution,
    pub seed: u64,
}

impl Default for NodeKindParams {
    fn default() -> Self {
        Self {
            freq: 440.0,
            amp: 1.0,
            coeffs: vec![0.0, 1.0],
            mode: PolynomialMode::Direct,
            distribution: NoiseDistribution::Uniform,
            seed: 1,
        }
    }
}

/// Describes a node kind in the registry.
#[derive(Debug, Clone)]
pub struct NodeKindDescriptor {
    /// Unique identifier (lowercase, no spaces).
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: NodeCategory,
}

type NodeKindFactory = fn(&NodeKindParams) -> maya_graph::NodeKind;

struct NodeKindEntry {
    descriptor: NodeKindDescriptor,
    factory: NodeKindFactory,
}

/// Registry of all built-in node kinds, keyed by id.
pub struct NodeKindRegistry {
    entries: Vec<NodeKindEntry>,
}

impl Default for NodeKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKindRegistry {
    /// Creates a registry with every built-in node kind registered.
    pub fn new() -> Self {
        let mut registry = Self { entries: Vec::with_capacity(4) };
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.register(
            NodeKindDescriptor {
                id: "sine",
                name: "Sine",
                description: "Phase-accumulating sine wave generator",
                category: NodeCategory::Generator,
            },
            |p| maya_graph::NodeKind::sine(p.freq, p.amp),
        );

        self.register(
            NodeKindDescriptor {
                id: "impulse",
                name: "Impulse",
                description: "Periodic unit impulse train",
                category: NodeCategory::Generator,
            },
            |p| maya_graph::NodeKind::impulse(p.freq, p.amp),
        );

        self.register(
            NodeKindDescriptor {
                id: "polynomial",
                name: "Polynomial",
                description: "Polynomial transfer function over raw or lagged history",
                category: NodeCategory::Shaper,
            },
            |p| maya_graph::NodeKind::polynomial(p.coeffs.clone(), p.mode),
        );

        self.register(
            NodeKindDescriptor {
                id: "noise",
                name: "Noise",
                description: "xorshift64-seeded uniform or Gaussian noise source",
                category: NodeCategory::Stochastic,
            },
            |p| maya_graph::NodeKind::noise(p.distribution, p.amp, p.seed),
        );
    }

    fn register(&mut self, descriptor: NodeKindDescriptor, factory: NodeKindFactory) {
        self.entries.push(NodeKindEntry { descriptor, factory });
    }

    /// Registers a user-defined node kind descriptor/factory pair at
    /// runtime, alongside the built-ins. Re-registering an existing id
    /// shadows the earlier entry for [`Self::create`] and [`Self::get`],
    /// which both return the most recently registered match.
    pub fn register_custom(&mut self, descriptor: NodeKindDescriptor, factory: NodeKindFactory) {
        self.register(descriptor, factory);
    }

    pub fn all_kinds(&self) -> Vec<&NodeKindDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    pub fn kinds_in_category(&self, category: NodeCategory) -> Vec<&NodeKindDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&NodeKindDescriptor> {
        self.entries.iter().rev().find(|e| e.descriptor.id == id).map(|e| &e.descriptor)
    }

    /// Creates a node kind instance by id, using the most recently
    /// registered factory for that id. Returns `None` if `id` is unknown.
    pub fn create(&self, id: &str, params: &NodeKindParams) -> Option<maya_graph::NodeKind> {
        self.entries.iter().rev().find(|e| e.descriptor.id == id).map(|e| (e.factory)(params))
    }
}

/// Category of buffer kind: which domain preset it is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferCategory {
    AudioBackend,
    AudioParallel,
    GraphicsBackend,
    WindowEvents,
    Custom,
}

/// Describes a buffer kind preset in the registry: a [`BufferToken`] and
/// an [`EnforcementStrategy`] bundled under a friendly name, the same way
/// the node registry bundles constructor arguments under an id.
#[derive(Debug, Clone)]
pub struct BufferKindDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: BufferCategory,
    pub token: BufferToken,
    pub enforcement: EnforcementStrategy,
}

struct BufferKindEntry {
    descriptor: BufferKindDescriptor,
}

/// Registry of all built-in buffer-kind presets.
pub struct BufferKindRegistry {
    entries: Vec<BufferKindEntry>,
}

impl Default for BufferKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferKindRegistry {
    pub fn new() -> Self {
        let mut registry = Self { entries: Vec::with_capacity(3) };
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.register(BufferKindDescriptor {
            id: "audio",
            name: "Audio Backend",
            description: "Sample-rate, CPU-processed, sequential root buffer",
            category: BufferCategory::AudioBackend,
            token: BufferToken::AUDIO_BACKEND,
            enforcement: EnforcementStrategy::Strict,
        });

        self.register(BufferKindDescriptor {
            id: "audio-parallel",
            name: "Audio Parallel",
            description: "Sample-rate, CPU-processed, parallel root buffer",
            category: BufferCategory::AudioParallel,
            token: BufferToken::AUDIO_PARALLEL,
            enforcement: EnforcementStrategy::Filtered,
        });

        self.register(BufferKindDescriptor {
            id: "graphics",
            name: "Graphics Backend",
            description: "Frame-rate, GPU-processed, sequential root buffer",
            category: BufferCategory::GraphicsBackend,
            token: BufferToken::GRAPHICS_BACKEND,
            enforcement: EnforcementStrategy::OverrideSkip,
        });
    }

    fn register(&mut self, descriptor: BufferKindDescriptor) {
        self.entries.push(BufferKindEntry { descriptor });
    }

    /// Registers a user-defined buffer-kind preset at runtime.
    pub fn register_custom(&mut self, descriptor: BufferKindDescriptor) {
        self.register(descriptor);
    }

    pub fn all_kinds(&self) -> Vec<&BufferKindDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    pub fn kinds_in_category(&self, category: BufferCategory) -> Vec<&BufferKindDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&BufferKindDescriptor> {
        self.entries.iter().rev().find(|e| e.descriptor.id == id).map(|e| &e.descriptor)
    }

    /// Builds a [`RootBuffer`] of `capacity` samples from the preset
    /// registered under `id`. Returns `None` if `id` is unknown.
    pub fn create(&self, id: &str, capacity: usize) -> Option<RootBuffer> {
        let descriptor = self.get(id)?;
        Some(RootBuffer::new(capacity, descriptor.token, descriptor.enforcement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_registry_creates_known_kinds_by_id() {
        let registry = NodeKindRegistry::new();
        let params = NodeKindParams { freq: 220.0, amp: 0.5, ..Default::default() };
        assert!(registry.create("sine", &params).is_some());
        assert!(registry.create("missing", &params).is_none());
    }

    #[test]
    fn node_registry_filters_by_category() {
        let registry = NodeKindRegistry::new();
        let generators = registry.kinds_in_category(NodeCategory::Generator);
        assert_eq!(generators.len(), 2);
        assert!(generators.iter().any(|d| d.id == "sine"));
        assert!(generators.iter().any(|d| d.id == "impulse"));
    }

    #[test]
    fn node_registry_custom_shadows_by_id() {
        let mut registry = NodeKindRegistry::new();
        registry.register_custom(
            NodeKindDescriptor {
                id: "sine",
                name: "Custom Sine",
                description: "overridden",
                category: NodeCategory::Custom,
            },
            |p| maya_graph::NodeKind::sine(p.freq * 2.0, p.amp),
        );
        assert_eq!(registry.get("sine").unwrap().name, "Custom Sine");
    }

    #[test]
    fn buffer_registry_builds_presets_with_requested_capacity() {
        let registry = BufferKindRegistry::new();
        let root = registry.create("audio", 256).unwrap();
        assert_eq!(root.num_samples(), 256);
    }

    #[test]
    fn buffer_registry_unknown_id_returns_none() {
        let registry = BufferKindRegistry::new();
        assert!(registry.create("missing", 256).is_none());
    }
}
