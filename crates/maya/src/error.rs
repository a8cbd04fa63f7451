//! Facade-level error type.
//!
//! Grounded on `sonido-io`'s `Error`: a `thiserror`-derived enum with
//! `#[from]` conversions, used only at setup time and in the `Result`s
//! returned by construction-session methods. The real-time callback path
//! (`Engine::on_block`/`on_frame`/`on_event`) never returns this type —
//! it absorbs [`maya_core::MayaError`] internally and leaves its output
//! buffer silent on failure instead.

/// Errors a caller can see from facade-level setup and construction-session
/// methods (never from the audio/frame/event callbacks themselves).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A subsystem rejected an operation (bad channel index, incompatible
    /// token composition, stale handle).
    #[error("processing error: {0}")]
    Processing(#[from] maya_core::MayaError),

    /// `Engine::new` was given a configuration that cannot build a working
    /// engine (e.g. zero channels).
    #[error("engine setup failed: {0}")]
    Setup(String),
}

/// Convenience result type for facade-level operations.
pub type Result<T> = core::result::Result<T, EngineError>;
