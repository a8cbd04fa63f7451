//! Property-based tests for the token/domain/clock/limiter primitives.
//!
//! Mirrors `sonido-core`'s `tests/properties.rs` in style: one
//! `proptest!` block per file, each property named after the invariant
//! it checks.

use maya_core::domain::Domain;
use maya_core::tokens::{BufferToken, NodeToken, TaskToken};
use maya_core::{soft_knee_limit, Clock, CEILING, SOFT_KNEE};
use proptest::prelude::*;

fn any_node_token() -> impl Strategy<Value = NodeToken> {
    prop_oneof![
        Just(NodeToken::AudioRate),
        Just(NodeToken::VisualRate),
        Just(NodeToken::CustomRate),
    ]
}

fn any_task_token() -> impl Strategy<Value = TaskToken> {
    prop_oneof![
        Just(TaskToken::SampleAccurate),
        Just(TaskToken::FrameAccurate),
        Just(TaskToken::MultiRate),
        Just(TaskToken::OnDemand),
        Just(TaskToken::EventDriven),
        Just(TaskToken::Custom),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// `compose` then decompose-via-accessors round-trips for any bit
    /// pattern a `BufferToken` can hold, regardless of validity — the
    /// packing itself is lossless even when the triple is incompatible.
    #[test]
    fn domain_compose_decompose_round_trips(
        node in any_node_token(),
        buffer_bits in 0u16..0x80,
        task in any_task_token(),
    ) {
        let buffer = BufferToken::from_bits(buffer_bits);
        let domain = Domain::compose(node, buffer, task);
        prop_assert_eq!(domain.node_token(), node);
        prop_assert_eq!(domain.buffer_token(), buffer);
        prop_assert_eq!(domain.task_token(), task);
    }

    /// `tick(n); tick(m)` agrees with one `tick(n + m)` on both `position`
    /// and `seconds` — clock advancement is additive.
    #[test]
    fn clock_tick_is_additive(
        rate in 1.0f64..200_000.0,
        n in 0u64..1_000_000,
        m in 0u64..1_000_000,
    ) {
        let mut split = Clock::new(rate);
        split.tick(n);
        split.tick(m);

        let mut combined = Clock::new(rate);
        combined.tick(n + m);

        prop_assert_eq!(split.position(), combined.position());
        prop_assert!((split.seconds() - combined.seconds()).abs() < 1e-9);
    }

    /// `seconds_to_units` then `units_to_seconds` recovers the original
    /// duration to within one unit's worth of time at that rate.
    #[test]
    fn clock_seconds_round_trip_within_one_unit(
        rate in 1.0f64..200_000.0,
        seconds in 0.0f64..1000.0,
    ) {
        let clock = Clock::new(rate);
        let units = clock.seconds_to_units(seconds);
        let recovered = clock.units_to_seconds(units);
        prop_assert!((recovered - seconds).abs() <= 1.0 / rate + 1e-9);
    }

    /// The soft-knee limiter never produces a sample outside `[-1, 1]`
    /// for any finite input.
    #[test]
    fn soft_knee_limit_stays_in_unit_range(raw in -1.0e6f64..1.0e6) {
        let out = soft_knee_limit(raw);
        prop_assert!(out >= -CEILING - 1e-12 && out <= CEILING + 1e-12);
    }

    /// Applying the limiter twice is the same as applying it once.
    #[test]
    fn soft_knee_limit_is_idempotent(raw in -1.0e6f64..1.0e6) {
        let once = soft_knee_limit(raw);
        let twice = soft_knee_limit(once);
        prop_assert!((once - twice).abs() < 1e-9, "once={} twice={}", once, twice);
    }

    /// Samples strictly under the knee are passed through unchanged.
    #[test]
    fn soft_knee_limit_passes_through_below_knee(raw in -SOFT_KNEE..SOFT_KNEE) {
        prop_assert_eq!(soft_knee_limit(raw), raw);
    }
}
