//! Scalar math helpers shared by the node graph and buffer pipeline.
//!
//! Every function here operates on `f64` samples (the engine's native
//! sample type) and is allocation-free, suitable for the audio thread.

use libm::{fabs, floor};

/// Soft-knee ceiling: samples above this magnitude are compressed.
pub const SOFT_KNEE: f64 = 0.9;
/// Absolute output ceiling after compression.
pub const CEILING: f64 = 1.0;

/// Applies the soft-knee limiter described in the root buffer aggregation
/// algorithm: samples under the knee pass through unchanged; samples above
/// it are compressed toward the ceiling, then hard-clamped as a backstop.
///
/// The compression factor is floored at `0.0`: past `excess == CEILING -
/// SOFT_KNEE` the literal `1 - excess / (1 - SOFT_KNEE)` formula goes
/// negative, which would flip the sample's sign instead of limiting it.
/// Flooring keeps the limiter sign-preserving and, as a consequence, makes
/// it genuinely idempotent — every input with `|s| > SOFT_KNEE` lands at or
/// below `SOFT_KNEE` in one pass, so a second pass always takes the
/// below-knee, unchanged branch.
#[inline]
pub fn soft_knee_limit(s: f64) -> f64 {
    let mag = fabs(s);
    let limited = if mag > SOFT_KNEE {
        let excess = mag - SOFT_KNEE;
        let compression = (1.0 - excess / (CEILING - SOFT_KNEE)).max(0.0);
        s * compression
    } else {
        s
    };
    clamp(limited, -CEILING, CEILING)
}

/// Clamps `x` to `[min, max]`.
#[inline]
pub fn clamp(x: f64, min: f64, max: f64) -> f64 {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

/// Linear interpolation between `a` and `b` at `t` in `[0, 1]`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wraps a phase accumulator into `[0, 1)`, the unit used by node phase
/// fields instead of radians.
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase - floor(phase);
    if wrapped < 0.0 { wrapped + 1.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_knee_passes_through() {
        assert_eq!(soft_knee_limit(0.5), 0.5);
        assert_eq!(soft_knee_limit(-0.8), -0.8);
    }

    #[test]
    fn just_above_knee_is_compressed_but_not_squashed() {
        let out = soft_knee_limit(0.95);
        assert!(out < 0.95);
        assert!(out > 0.0);
        assert!(out <= SOFT_KNEE);
    }

    #[test]
    fn excess_past_the_knee_budget_is_squashed_to_zero() {
        // Past `excess == CEILING - SOFT_KNEE` the compression factor would
        // go negative under the literal formula; it is floored at zero
        // instead of flipping the sample's sign (see `soft_knee_limit` doc).
        assert_eq!(soft_knee_limit(1.4), 0.0);
        assert_eq!(soft_knee_limit(-1.4), 0.0);
    }

    #[test]
    fn never_exceeds_ceiling() {
        for raw in [1.0, 2.0, 10.0, -2.0, -10.0] {
            let out = soft_knee_limit(raw);
            assert!(fabs(out) <= CEILING + 1e-12);
        }
    }

    #[test]
    fn idempotent_within_epsilon() {
        for raw in [0.5, 0.9, 0.95, 0.999, 1.0, 1.4, -1.4, 2.0, 10.0] {
            let once = soft_knee_limit(raw);
            let twice = soft_knee_limit(once);
            assert!(fabs(once - twice) < 1e-9, "raw={raw} once={once} twice={twice}");
        }
    }

    #[test]
    fn phase_wraps_into_unit_interval() {
        assert!((wrap_phase(1.25) - 0.25).abs() < 1e-12);
        assert!((wrap_phase(-0.25) - 0.75).abs() < 1e-12);
    }
}
