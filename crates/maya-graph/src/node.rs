//! Node identity, state flags, hooks, and the built-in transfer-function
//! variants.
//!
//! Grounded on `sonido-core/src/graph/node.rs` for the `NodeId`/kind-enum
//! shape, generalized from a fixed `NodeKind { Input, Output, Effect, Split,
//! Merge }` role enum to a sample-producing `NodeKind`, and on
//! `original_source/src/MayaFlux/Nodes/Generators` for the per-kind
//! transfer functions.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use maya_core::tokens::NodeToken;
use maya_core::{sin_turns, wrap_phase};

/// Generational identifier for a node living in a [`crate::graph::NodeGraph`]
/// arena.
///
/// The generation half guards against a freed-and-reused arena slot aliasing
/// a stale handle still held by a dangling modulator reference — the
/// idiomatic substitute for the `shared_ptr` cycle the reference
/// implementation used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Raw arena index, ignoring generation. Exposed for diagnostics only.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Minimal internal `bitflags`-style macro, since this crate stays off an
/// external bitflags dependency for a three-flag word (`maya-core::tokens`
/// does the same for [`maya_core::tokens::BufferToken`]).
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(
                $(#[$fmeta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub $repr);

        impl $name {
            $(
                $(#[$fmeta])*
                pub const $flag: $name = $name($value);
            )*

            /// Empty flag set (the `INACTIVE` state: no bits set).
            pub const INACTIVE: $name = $name(0);

            /// Returns true if every bit in `mask` is set.
            #[inline]
            pub const fn contains(self, mask: $name) -> bool {
                self.0 & mask.0 == mask.0
            }

            /// Bitwise-or.
            #[inline]
            pub const fn or(self, other: $name) -> $name {
                $name(self.0 | other.0)
            }

            /// Bitwise-and-not (removes `mask`'s bits).
            #[inline]
            pub const fn without(self, mask: $name) -> $name {
                $name(self.0 & !mask.0)
            }

            #[inline]
            pub const fn bits(self) -> $repr {
                self.0
            }
        }
    };
}

bitflags_like! {
    /// Node lifecycle flags, packed into one atomic word so a reader can
    /// check `ACTIVE`/`PROCESSED` without taking a lock.
    pub struct NodeFlags: u32 {
        /// Node is currently bound to an output channel or another node's
        /// modulator list.
        const ACTIVE = 1 << 0;
        /// Node has already produced a value for the current block; readers
        /// should use `last_output` instead of re-invoking the transfer
        /// function.
        const PROCESSED = 1 << 1;
        /// The root should still invoke `process_sample` (for side-effecting
        /// hooks) but ignore the returned value.
        const MOCK_PROCESS = 1 << 2;
    }
}

/// Snapshot-context claim state for lock-free off-thread state access.
///
/// `0` means `UNCLAIMED`; any other value is the monotonic claimant id
/// returned by the successful claimant, matching the
/// `UNCLAIMED -> CLAIMED(ctx_id) -> UNCLAIMED` state machine.
#[derive(Debug, Default)]
pub struct SnapshotContext {
    claim: AtomicU64,
}

/// Monotonic source of snapshot-claimant ids, shared by every node in a
/// graph so ids never collide across nodes.
#[derive(Debug, Default)]
pub struct SnapshotIdSource(AtomicU64);

impl SnapshotIdSource {
    pub fn next(&self) -> u64 {
        // id 0 is reserved for UNCLAIMED, so the first real id is 1.
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl SnapshotContext {
    /// Attempts to claim the context for `claimant_id` (never 0). Returns
    /// `true` on success.
    pub fn try_claim(&self, claimant_id: u64) -> bool {
        self.claim
            .compare_exchange(0, claimant_id, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases a context previously claimed with `claimant_id`. No-op if
    /// the claim does not match (defensive against double-release).
    pub fn release(&self, claimant_id: u64) {
        let _ = self
            .claim
            .compare_exchange(claimant_id, 0, Ordering::AcqRel, Ordering::Acquire);
    }

    /// True if currently claimed by anyone.
    pub fn is_claimed(&self) -> bool {
        self.claim.load(Ordering::Acquire) != 0
    }
}

/// Distribution used by [`NodeKind::Noise`]'s generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseDistribution {
    /// Uniform in `[-1, 1]`.
    Uniform,
    /// Approximately standard-normal via Box-Muller, scaled into `[-1, 1]`
    /// by clamping at 4 standard deviations.
    Gaussian,
}

/// How a [`NodeKind::Polynomial`] node's history ring feeds its recursive
/// evaluation: `Recursive` feeds the node's own prior **outputs** back in;
/// `Feedforward` feeds the prior **inputs** to `process_sample` back in
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolynomialMode {
    /// `coeffs[0] + Σ coeffs[k] * input^k` — no history.
    Direct,
    /// `coeffs[0] + Σ coeffs[k] * history[k-1]` where `history` holds prior
    /// outputs.
    Recursive,
    /// Same evaluation as `Recursive` but `history` holds prior raw inputs
    /// instead of prior outputs.
    Feedforward,
}

const POLYNOMIAL_HISTORY_CAP: usize = 15;

/// Fixed-capacity ring buffer of the last `N` raw samples (outputs in
/// `Recursive` mode, inputs in `Feedforward` mode) used by
/// [`NodeKind::Polynomial`].
#[derive(Debug, Clone)]
pub struct PolynomialHistory {
    ring: [f64; POLYNOMIAL_HISTORY_CAP],
    len: usize,
    cursor: usize,
}

impl Default for PolynomialHistory {
    fn default() -> Self {
        Self {
            ring: [0.0; POLYNOMIAL_HISTORY_CAP],
            len: 0,
            cursor: 0,
        }
    }
}

impl PolynomialHistory {
    /// Pushes a new sample, evicting the oldest once the ring is full.
    pub fn push(&mut self, sample: f64) {
        self.ring[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % POLYNOMIAL_HISTORY_CAP;
        if self.len < POLYNOMIAL_HISTORY_CAP {
            self.len += 1;
        }
    }

    /// Returns the sample `k` steps back (`0` = most recent), or `0.0` if
    /// fewer than `k + 1` samples have been pushed yet.
    pub fn lag(&self, k: usize) -> f64 {
        if k >= self.len {
            return 0.0;
        }
        let idx = (self.cursor + POLYNOMIAL_HISTORY_CAP - 1 - k) % POLYNOMIAL_HISTORY_CAP;
        self.ring[idx]
    }
}

/// Extension point for user-defined transfer functions. Unlike the
/// built-in [`NodeKind`] variants (matched inline in the hot loop), a
/// `Custom` node pays one v-table dispatch per sample.
pub trait NodeBehavior {
    /// Produces the next sample given the combined modulator input.
    fn process_sample(&mut self, input: f64) -> f64;
}

/// A saved copy of one [`NodeKind`] variant's mutable internal state,
/// returned by [`NodeKind::save_state`] and consumed by
/// [`NodeKind::restore_state`].
#[derive(Debug, Clone)]
pub enum KindSnapshot {
    /// `Sine`/`Impulse` phase.
    Phase(f64),
    /// `Polynomial` history ring plus its threshold-crossing latch.
    Polynomial(PolynomialHistory, bool),
    /// `Noise` generator state word.
    Noise(u64),
    /// `Custom` nodes have nothing this layer can snapshot.
    None,
}

/// Outcome flags from a single `process_sample` call, used by
/// [`crate::graph::NodeGraph`] to decide which event hooks to fire this
/// sample.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transition {
    pub phase_wrapped: bool,
    pub impulse: bool,
    pub threshold_crossed: bool,
}

/// A node's transfer-function variant and kind-specific parameters.
///
/// A tagged variant enum instead of an open `Generator -> Sine`
/// inheritance chain. Built-ins are matched
/// inline by [`NodeKind::advance`]; [`NodeKind::Custom`] is the trait-object
/// escape hatch for extensions.
pub enum NodeKind {
    /// `amp * sin(2π·phase)`; phase advances by `freq / sample_rate` each
    /// sample and wraps modulo `1.0`.
    Sine { freq: f64, amp: f64, phase: f64 },
    /// Emits `amp` on the sample where `phase` wraps, `0.0` otherwise.
    Impulse { freq: f64, amp: f64, phase: f64 },
    /// Evaluates a polynomial in the raw input (or in its own history, per
    /// `mode`).
    Polynomial {
        coeffs: Vec<f64>,
        mode: PolynomialMode,
        history: PolynomialHistory,
        threshold: Option<f64>,
        above_threshold: bool,
    },
    /// xorshift64-seeded PRNG; resolves the `NoiseEngine`/`Random` Open
    /// Question (DESIGN.md) in favor of a small deterministic generator.
    Noise {
        distribution: NoiseDistribution,
        amp: f64,
        state: u64,
    },
    /// User-supplied transfer function.
    Custom(Box<dyn NodeBehavior + Send>),
}

impl NodeKind {
    /// Convenience constructor for a 440 Hz-style sine generator.
    pub fn sine(freq: f64, amp: f64) -> Self {
        NodeKind::Sine {
            freq,
            amp,
            phase: 0.0,
        }
    }

    /// Convenience constructor for an impulse train.
    pub fn impulse(freq: f64, amp: f64) -> Self {
        NodeKind::Impulse {
            freq,
            amp,
            phase: 0.0,
        }
    }

    /// Convenience constructor for a direct (history-free) polynomial.
    pub fn polynomial(coeffs: Vec<f64>, mode: PolynomialMode) -> Self {
        NodeKind::Polynomial {
            coeffs,
            mode,
            history: PolynomialHistory::default(),
            threshold: None,
            above_threshold: false,
        }
    }

    /// Convenience constructor for a noise generator.
    pub fn noise(distribution: NoiseDistribution, amp: f64, seed: u64) -> Self {
        NodeKind::Noise {
            distribution,
            amp,
            // xorshift64 requires a nonzero seed.
            state: if seed == 0 { 0x9E3779B97F4A7C15 } else { seed },
        }
    }

    /// Saves the mutable internal state [`Self::advance`] perturbs, for
    /// [`crate::graph::NodeGraph::snapshot_sample_range`]'s
    /// claim/save/advance/restore sequence. A `Custom` node has no generic way
    /// to snapshot its trait object, so it restores to whatever it was
    /// left at — extensions that need snapshot safety implement their own
    /// save/restore inside `process_sample`.
    pub fn save_state(&self) -> KindSnapshot {
        match self {
            NodeKind::Sine { phase, .. } => KindSnapshot::Phase(*phase),
            NodeKind::Impulse { phase, .. } => KindSnapshot::Phase(*phase),
            NodeKind::Polynomial { history, above_threshold, .. } => {
                KindSnapshot::Polynomial(history.clone(), *above_threshold)
            }
            NodeKind::Noise { state, .. } => KindSnapshot::Noise(*state),
            NodeKind::Custom(_) => KindSnapshot::None,
        }
    }

    /// Restores state previously returned by [`Self::save_state`].
    pub fn restore_state(&mut self, snapshot: KindSnapshot) {
        match (self, snapshot) {
            (NodeKind::Sine { phase, .. }, KindSnapshot::Phase(p)) => *phase = p,
            (NodeKind::Impulse { phase, .. }, KindSnapshot::Phase(p)) => *phase = p,
            (
                NodeKind::Polynomial { history, above_threshold, .. },
                KindSnapshot::Polynomial(saved_history, saved_above),
            ) => {
                *history = saved_history;
                *above_threshold = saved_above;
            }
            (NodeKind::Noise { state, .. }, KindSnapshot::Noise(s)) => *state = s,
            _ => {}
        }
    }

    /// Advances the kind's internal state by one sample and returns the
    /// produced value along with which transition hooks should fire.
    pub fn advance(&mut self, input: f64, sample_rate: f64) -> (f64, Transition) {
        match self {
            NodeKind::Sine { freq, amp, phase } => {
                let out = *amp * sin_turns(*phase);
                let step = *freq / sample_rate;
                let next = wrap_phase(*phase + step);
                let wrapped = next < *phase;
                *phase = next;
                (out, Transition { phase_wrapped: wrapped, ..Default::default() })
            }
            NodeKind::Impulse { freq, amp, phase } => {
                let step = *freq / sample_rate;
                let next = wrap_phase(*phase + step);
                let wrapped = next < *phase;
                *phase = next;
                let out = if wrapped { *amp } else { 0.0 };
                (out, Transition { impulse: wrapped, ..Default::default() })
            }
            NodeKind::Polynomial {
                coeffs,
                mode,
                history,
                threshold,
                above_threshold,
            } => {
                let out = match mode {
                    PolynomialMode::Direct => evaluate(coeffs, input),
                    PolynomialMode::Recursive => {
                        let out = evaluate_with_history(coeffs, history);
                        history.push(out);
                        out
                    }
                    PolynomialMode::Feedforward => {
                        history.push(input);
                        evaluate_with_history(coeffs, history)
                    }
                };
                let crossed = match threshold {
                    Some(t) => {
                        let now_above = out >= *t;
                        let crossed = now_above && !*above_threshold;
                        *above_threshold = now_above;
                        crossed
                    }
                    None => false,
                };
                (out, Transition { threshold_crossed: crossed, ..Default::default() })
            }
            NodeKind::Noise { distribution, amp, state } => {
                let out = *amp * next_noise_sample(state, *distribution);
                (out, Transition::default())
            }
            NodeKind::Custom(behavior) => (behavior.process_sample(input), Transition::default()),
        }
    }
}

/// `coeffs[0] + coeffs[1]*x + coeffs[2]*x^2 + ...`
fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    let mut acc = 0.0;
    let mut power = 1.0;
    for &c in coeffs {
        acc += c * power;
        power *= x;
    }
    acc
}

/// `coeffs[0] + coeffs[1]*history[0] + coeffs[2]*history[1] + ...`
fn evaluate_with_history(coeffs: &[f64], history: &PolynomialHistory) -> f64 {
    if coeffs.is_empty() {
        return 0.0;
    }
    let mut acc = coeffs[0];
    for (k, &c) in coeffs.iter().enumerate().skip(1) {
        acc += c * history.lag(k - 1);
    }
    acc
}

fn xorshift64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

fn next_noise_sample(state: &mut u64, distribution: NoiseDistribution) -> f64 {
    match distribution {
        NoiseDistribution::Uniform => {
            let bits = xorshift64(state);
            (bits as f64 / u64::MAX as f64) * 2.0 - 1.0
        }
        NoiseDistribution::Gaussian => {
            let u1 = ((xorshift64(state) as f64) / u64::MAX as f64).max(1e-12);
            let u2 = (xorshift64(state) as f64) / u64::MAX as f64;
            let mag = libm::sqrt(-2.0 * libm::log(u1));
            let z = mag * maya_core::cos_turns(u2);
            (z / 4.0).clamp(-1.0, 1.0)
        }
    }
}

type TickHook = Box<dyn FnMut(f64) + Send>;
type PredicateHook = (Box<dyn Fn(f64) -> bool + Send>, Box<dyn FnMut(f64) + Send>);
type EventHook = Box<dyn FnMut() + Send>;

/// Hook lists fired during a node's evaluation.
#[derive(Default)]
pub struct Hooks {
    pub on_tick: Vec<TickHook>,
    pub on_tick_if: Vec<PredicateHook>,
    pub on_phase_wrap: Vec<EventHook>,
    pub on_impulse: Vec<EventHook>,
    pub on_threshold: Vec<EventHook>,
}

impl Hooks {
    /// Runs every `on_tick`/`on_tick_if` hook with the sample just produced,
    /// then the event-specific hooks for any transitions that occurred.
    pub fn fire(&mut self, output: f64, transition: Transition) {
        for hook in &mut self.on_tick {
            hook(output);
        }
        for (predicate, action) in &mut self.on_tick_if {
            if predicate(output) {
                action(output);
            }
        }
        if transition.phase_wrapped {
            for hook in &mut self.on_phase_wrap {
                hook();
            }
        }
        if transition.impulse {
            for hook in &mut self.on_impulse {
                hook();
            }
        }
        if transition.threshold_crossed {
            for hook in &mut self.on_threshold {
                hook();
            }
        }
    }
}

/// The common bookkeeping shared by every node kind: lifecycle flags, the
/// snapshot claim, the modulator list, and the last produced sample.
pub struct NodeCore {
    pub(crate) flags: AtomicU32,
    pub(crate) snapshot: SnapshotContext,
    pub(crate) modulators: Vec<NodeId>,
    pub(crate) last_output: f64,
    pub(crate) token: NodeToken,
    pub hooks: Hooks,
}

impl NodeCore {
    pub fn new(token: NodeToken) -> Self {
        Self {
            flags: AtomicU32::new(NodeFlags::INACTIVE.bits()),
            snapshot: SnapshotContext::default(),
            modulators: Vec::new(),
            last_output: 0.0,
            token,
            hooks: Hooks::default(),
        }
    }

    #[inline]
    pub fn flags(&self) -> NodeFlags {
        NodeFlags(self.flags.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set_flag(&self, flag: NodeFlags) {
        self.flags.fetch_or(flag.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn clear_flag(&self, flag: NodeFlags) {
        self.flags.fetch_and(!flag.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.flags().contains(NodeFlags::ACTIVE)
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.flags().contains(NodeFlags::PROCESSED)
    }

    #[inline]
    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn add_modulator(&mut self, id: NodeId) {
        self.modulators.push(id);
    }

    pub fn modulators(&self) -> &[NodeId] {
        &self.modulators
    }
}

/// A node: its identity-independent core plus its transfer-function kind.
pub struct Node {
    pub core: NodeCore,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind, token: NodeToken) -> Self {
        Self {
            core: NodeCore::new(token),
            kind,
        }
    }
}
