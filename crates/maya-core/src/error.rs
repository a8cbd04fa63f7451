//! The six-kind error taxonomy shared by every hot-path crate.
//!
//! Follows `sonido-core`'s convention for `no_std`-compatible crates: a
//! plain enum with a hand-written `Display` gated behind the `std`
//! feature, since `core::error::Error` plus `alloc`-only formatting would
//! otherwise force an allocation just to report an error. Nothing here
//! unwinds; every variant is returned, never thrown, from a `Result`.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// A recoverable error from any subsystem in the processing core.
///
/// None of these ever escape as a panic from the audio thread; callers on
/// the hot path match on the kind, log it if a subscriber is installed,
/// and fall back to silence/zero for that block.
#[derive(Debug, Clone, PartialEq)]
pub enum MayaError {
    /// Out-of-range channel index, null required handle, non-positive
    /// duration, or an explicitly incompatible token pair.
    Argument(String),
    /// A child buffer was rejected by a root's enforcement strategy, or an
    /// invalid token composition was requested.
    Compatibility(String),
    /// A node's transfer function or a buffer processor failed mid-block.
    /// The snapshot context (if any) has already been released by the
    /// time this is constructed; the caller receives zero for the sample.
    Processing(String),
    /// A snapshot wait exceeded its spin budget.
    Timeout(String),
    /// A subsystem was used before initialization or after teardown.
    Lifecycle(String),
    /// Initialization failed outright (backend could not open, allocator
    /// exhausted). Only ever produced at startup.
    Fatal(String),
}

impl MayaError {
    /// Constructs an [`MayaError::Argument`].
    pub fn argument(msg: impl Into<String>) -> Self {
        MayaError::Argument(msg.into())
    }

    /// Constructs an [`MayaError::Compatibility`].
    pub fn compatibility(msg: impl Into<String>) -> Self {
        MayaError::Compatibility(msg.into())
    }

    /// Constructs an [`MayaError::Processing`].
    pub fn processing(msg: impl Into<String>) -> Self {
        MayaError::Processing(msg.into())
    }

    /// Constructs an [`MayaError::Timeout`].
    pub fn timeout(msg: impl Into<String>) -> Self {
        MayaError::Timeout(msg.into())
    }

    /// Constructs an [`MayaError::Lifecycle`].
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        MayaError::Lifecycle(msg.into())
    }

    /// Constructs an [`MayaError::Fatal`].
    pub fn fatal(msg: impl Into<String>) -> Self {
        MayaError::Fatal(msg.into())
    }

    /// True for errors that should cause a best-effort silence fallback
    /// rather than propagate further up the call stack (every kind except
    /// `Fatal`, which is only ever produced during startup).
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MayaError::Fatal(_))
    }
}

#[cfg(feature = "std")]
impl std::fmt::Display for MayaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MayaError::Argument(m) => write!(f, "argument error: {m}"),
            MayaError::Compatibility(m) => write!(f, "compatibility error: {m}"),
            MayaError::Processing(m) => write!(f, "processing error: {m}"),
            MayaError::Timeout(m) => write!(f, "timeout error: {m}"),
            MayaError::Lifecycle(m) => write!(f, "lifecycle error: {m}"),
            MayaError::Fatal(m) => write!(f, "fatal error: {m}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MayaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fatal_is_unrecoverable() {
        assert!(!MayaError::fatal("x").is_recoverable());
        assert!(MayaError::argument("x").is_recoverable());
        assert!(MayaError::timeout("x").is_recoverable());
    }
}
