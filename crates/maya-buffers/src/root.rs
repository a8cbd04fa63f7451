//! Per-channel root aggregation buffers and child-attachment enforcement.
//!
//! Grounded on `original_source/src/MayaFlux/Buffers/Root/RootBuffer.hpp`.
//! One subtlety carried over faithfully: under `OverrideSkip` and
//! `OverrideReject`, an incompatible child is still attached at
//! `add_child` time — the strategy only changes what happens to it
//! *during processing* (skipped silently vs. flagged for removal), not
//! whether `add_child` itself succeeds. Only `Strict` and `Filtered`
//! reject at attachment time.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use maya_core::tokens::BufferToken;
use maya_core::{soft_knee_limit, MayaError};

use crate::buffer::Buffer;

/// How a [`RootBuffer`] treats a child whose [`BufferToken`] is
/// incompatible with its preferred token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementStrategy {
    /// Reject incompatible children at attachment time.
    Strict,
    /// Reject incompatible children at attachment time, same as `Strict`,
    /// but additionally records the rejection reason for diagnostics.
    Filtered,
    /// Attach regardless, but skip the child's contribution during
    /// processing when its token is incompatible.
    OverrideSkip,
    /// Attach regardless, but flag the child for removal on the next
    /// maintenance pass when its token is incompatible.
    OverrideReject,
    /// Attach regardless and process unconditionally; no compatibility
    /// check is performed at all.
    Ignore,
}

struct Child {
    buffer: Buffer,
    token: BufferToken,
    compatible: bool,
    flagged_for_removal: bool,
}

/// The per-output-channel aggregation point: sums node output with every
/// attached child buffer, averages, then limits.
pub struct RootBuffer {
    preferred_token: BufferToken,
    strategy: EnforcementStrategy,
    children: Vec<Child>,
    processing_rate_hint: Option<f64>,
    cross_modal_sharing: bool,
    data: Vec<f64>,
    node_output_written: bool,
}

impl RootBuffer {
    pub fn new(num_samples: usize, preferred_token: BufferToken, strategy: EnforcementStrategy) -> Self {
        Self {
            preferred_token,
            strategy,
            children: Vec::new(),
            processing_rate_hint: None,
            cross_modal_sharing: false,
            data: zeroed(num_samples),
            node_output_written: false,
        }
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the aggregated sample array, used by the global
    /// processor chain after per-channel aggregation completes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn preferred_token(&self) -> BufferToken {
        self.preferred_token
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn set_processing_rate_hint(&mut self, hz: f64) {
        self.processing_rate_hint = Some(hz);
    }

    pub fn processing_rate_hint(&self) -> Option<f64> {
        self.processing_rate_hint
    }

    pub fn enable_cross_modal_sharing(&mut self, enabled: bool) {
        self.cross_modal_sharing = enabled;
    }

    pub fn is_cross_modal_sharing_enabled(&self) -> bool {
        self.cross_modal_sharing
    }

    /// Resizes the root and every attached child to `num_samples`.
    pub fn resize(&mut self, num_samples: usize) {
        self.data.resize(num_samples, 0.0);
        for child in &mut self.children {
            child.buffer.resize(num_samples);
        }
    }

    /// Attaches `buffer` as a child, unifying the reference implementation's
    /// `add_child_buffer` (throwing) and `try_add_child_buffer` (bool +
    /// reason) into one `Result`-returning entry point.
    ///
    /// Returns `Err` only under `Strict`/`Filtered` when `token` is
    /// incompatible with the root's preferred token — every other
    /// strategy attaches unconditionally and defers enforcement to
    /// [`Self::process`].
    pub fn add_child(&mut self, buffer: Buffer, token: BufferToken) -> Result<(), MayaError> {
        let compatible = self.preferred_token.contains(token) || self.preferred_token == token;
        if !compatible {
            match self.strategy {
                EnforcementStrategy::Strict | EnforcementStrategy::Filtered => {
                    return Err(MayaError::compatibility(rejection_reason(self.preferred_token, token)));
                }
                EnforcementStrategy::OverrideSkip
                | EnforcementStrategy::OverrideReject
                | EnforcementStrategy::Ignore => {}
            }
        }
        self.children.push(Child {
            buffer,
            token,
            compatible,
            flagged_for_removal: false,
        });
        Ok(())
    }

    pub fn remove_child(&mut self, index: usize) -> bool {
        if index < self.children.len() {
            self.children.remove(index);
            true
        } else {
            false
        }
    }

    /// Drops every child buffer, recursing into this call only (children
    /// do not themselves hold grandchildren in this model).
    pub fn clear(&mut self) {
        self.children.clear();
        for s in &mut self.data {
            *s = 0.0;
        }
        self.node_output_written = false;
    }

    /// Writes a channel's node output into the root's array ahead of
    /// aggregation (step 2 of the root aggregation algorithm).
    pub fn write_node_output(&mut self, samples: &[f64]) {
        let n = samples.len().min(self.data.len());
        self.data[..n].copy_from_slice(&samples[..n]);
        self.node_output_written = true;
    }

    /// Runs the five-step root aggregation algorithm: zero (unless node
    /// output was already written this block), overlay node output,
    /// sum in every non-skipped child's processed data, average, then
    /// apply the soft-knee limiter.
    pub fn process(&mut self) {
        if !self.node_output_written {
            for s in &mut self.data {
                *s = 0.0;
            }
        }

        let mut active_children = 0usize;
        for child in &mut self.children {
            let skip = matches!(self.strategy, EnforcementStrategy::OverrideSkip) && !child.compatible;
            if skip {
                continue;
            }
            child.buffer.process_default();
            child.buffer.process_chain();
            active_children += 1;
            let n = child.buffer.num_samples().min(self.data.len());
            for i in 0..n {
                self.data[i] += child.buffer.data()[i];
            }
            if matches!(self.strategy, EnforcementStrategy::OverrideReject) && !child.compatible {
                child.flagged_for_removal = true;
            }
        }

        if active_children > 0 {
            let divisor = active_children as f64;
            for s in &mut self.data {
                *s /= divisor;
            }
        }

        for s in &mut self.data {
            *s = soft_knee_limit(*s);
        }
        self.node_output_written = false;
    }

    /// Removes every child flagged for removal by an `OverrideReject` pass.
    /// A maintenance operation, run outside the hot processing loop.
    pub fn sweep_flagged_children(&mut self) {
        self.children.retain(|c| !c.flagged_for_removal);
    }
}

fn rejection_reason(preferred: BufferToken, offered: BufferToken) -> String {
    format_reason(preferred.bits(), offered.bits())
}

#[cfg(feature = "std")]
fn format_reason(preferred: u16, offered: u16) -> String {
    format!("buffer token {offered:#06x} incompatible with root's preferred token {preferred:#06x}")
}

#[cfg(not(feature = "std"))]
fn format_reason(preferred: u16, offered: u16) -> String {
    use alloc::format;
    format!("buffer token {offered:#06x} incompatible with root's preferred token {preferred:#06x}")
}

fn zeroed(len: usize) -> Vec<f64> {
    let mut v = Vec::with_capacity(len);
    v.resize(len, 0.0);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_rejects_incompatible_child_at_attach_time() {
        let mut root = RootBuffer::new(4, BufferToken::SAMPLE_RATE, EnforcementStrategy::Strict);
        let result = root.add_child(Buffer::new(0, 4), BufferToken::FRAME_RATE);
        assert!(result.is_err());
        assert_eq!(root.num_children(), 0);
    }

    #[test]
    fn override_skip_still_attaches_but_skips_during_processing() {
        let mut root = RootBuffer::new(2, BufferToken::SAMPLE_RATE, EnforcementStrategy::OverrideSkip);
        let mut child = Buffer::new(0, 2);
        child.data_mut().copy_from_slice(&[1.0, 1.0]);
        child.set_default_processor(Box::new(|_: &mut [f64]| {}));
        root.add_child(child, BufferToken::FRAME_RATE).unwrap();
        assert_eq!(root.num_children(), 1);
        root.process();
        assert_eq!(root.data(), &[0.0, 0.0]);
    }

    #[test]
    fn override_reject_flags_but_still_processes_once() {
        let mut root = RootBuffer::new(2, BufferToken::SAMPLE_RATE, EnforcementStrategy::OverrideReject);
        let mut child = Buffer::new(0, 2);
        child.data_mut().copy_from_slice(&[0.2, 0.2]);
        root.add_child(child, BufferToken::FRAME_RATE).unwrap();
        root.process();
        assert_eq!(root.data(), &[0.2, 0.2]);
        root.sweep_flagged_children();
        assert_eq!(root.num_children(), 0);
    }

    #[test]
    fn output_is_always_limited_to_unit_range() {
        let mut root = RootBuffer::new(1, BufferToken::SAMPLE_RATE, EnforcementStrategy::Ignore);
        let mut child = Buffer::new(0, 1);
        child.data_mut()[0] = 5.0;
        root.add_child(child, BufferToken::SAMPLE_RATE).unwrap();
        root.process();
        assert!(root.data()[0] <= 1.0 && root.data()[0] >= -1.0);
    }

    #[test]
    fn averages_node_output_with_children() {
        let mut root = RootBuffer::new(1, BufferToken::SAMPLE_RATE, EnforcementStrategy::Ignore);
        root.write_node_output(&[0.4]);
        let mut child = Buffer::new(0, 1);
        child.data_mut()[0] = 0.2;
        root.add_child(child, BufferToken::SAMPLE_RATE).unwrap();
        root.process();
        // Node output is copied in at step 2, not counted in the averaging
        // divisor: (0.4 + 0.2) / 1 child == 0.6.
        assert!((root.data()[0] - 0.6).abs() < 1e-9);
    }
}
