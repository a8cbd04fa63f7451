//! MayaFlux: a real-time multimodal processing engine core.
//!
//! This crate is the facade wiring together the five subsystem crates
//! ([`maya_graph`]'s node graph, [`maya_buffers`]'s aggregation/limiter
//! pipeline, [`maya_scheduler`]'s token-domain routines, [`maya_registry`]'s
//! factories, [`maya_dsl`]'s fluent construction API) plus the
//! domain-scoped access layer in [`maya_arch`], into the single [`Engine`]
//! a platform backend drives via [`Engine::on_block`]/[`Engine::on_frame`]/
//! [`Engine::on_event`].
//!
//! Grounded on `sonido-io`'s role in `ampactor-sonido`: the crate every
//! other crate in the workspace is a library for, and the only one that
//! owns a concrete processing loop end to end.
//!
//! ```
//! use maya::{EngineConfig, Engine};
//! use maya_registry::NodeKindParams;
//! use maya_core::tokens::{BufferToken, NodeToken, TaskToken};
//! use maya_core::Domain;
//!
//! let mut engine = Engine::new(EngineConfig::with_sample_rate(48_000.0)).unwrap();
//! let domain = Domain::try_compose(NodeToken::AudioRate, BufferToken::AUDIO_BACKEND, TaskToken::SampleAccurate).unwrap();
//! {
//!     let mut creator = engine.creator();
//!     let handle = creator.node("sine", &NodeKindParams { freq: 440.0, amp: 0.2, ..Default::default() }).unwrap();
//!     let _ = (handle | domain).channel(0);
//! }
//!
//! let mut output = vec![0.0; 256];
//! engine.on_block(&vec![0.0; 256], &mut output, 2, 128).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EnforcementStrategyConfig, EngineConfig};
pub use engine::{Engine, Event};
pub use error::{EngineError, Result};

pub use maya_arch::{BufferProcessingHandle, NodeProcessingHandle, SubsystemProcessingHandle, SubsystemTokens, TaskSchedulerHandle};
pub use maya_buffers::EnforcementStrategy;
pub use maya_core::tokens::{BufferToken, NodeToken, TaskToken};
pub use maya_core::{Domain, MayaError};
pub use maya_dsl::{CreationContext, CreationHandle, CreationOutcome, Creator, TemporalActivation, TemporalWrapper, Time};
pub use maya_graph::{NodeId, NodeKind};
pub use maya_registry::{BufferKindRegistry, NodeKindDescriptor, NodeKindParams, NodeKindRegistry};
pub use maya_scheduler::{Routine, RoutineCx, RoutineState, RoutineValue};
