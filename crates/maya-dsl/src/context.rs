//! The accumulated construction context a [`crate::handle::CreationHandle`]
//! builds up across chained calls before it is applied.
//!
//! Grounded on `original_source/src/MayaFlux/API/Proxy/Creator.hpp`'s
//! `CreationContext` struct (`domain`/`channel`/`channels`/`metadata`).
//! The original's `std::any`-typed metadata map is dropped in favor of a
//! small `f64`-valued one — nothing in this construction layer needs an
//! open type-erased value, and `maya_scheduler::RoutineValue` already
//! covers that need where it actually arises (routine parameters).

use maya_core::Domain;

/// Construction-time state accumulated by `.domain()`/`.channel()`/
/// `.channels()`/`.with()` calls on a creation handle.
#[derive(Debug, Clone, Default)]
pub struct CreationContext {
    pub domain: Option<Domain>,
    pub channel: Option<u32>,
    pub channels: Option<Vec<u32>>,
    pub metadata: Vec<(&'static str, f64)>,
}

impl CreationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once enough information has accumulated to apply the pending
    /// construction: a domain, and either a single channel or a channel
    /// list.
    pub fn is_complete(&self) -> bool {
        self.domain.is_some() && (self.channel.is_some() || self.channels.is_some())
    }

    /// The channel list to attach to: `channels` if set, otherwise the
    /// single `channel` as a one-element list, otherwise empty.
    pub fn target_channels(&self) -> Vec<u32> {
        if let Some(channels) = &self.channels {
            channels.clone()
        } else if let Some(channel) = self.channel {
            vec![channel]
        } else {
            Vec::new()
        }
    }
}
