//! Turns-based trigonometry for phase-accumulator node kinds.
//!
//! Node phases are tracked in "turns" (`[0, 1)` instead of `[0, 2π)`) so
//! wrap detection is a plain `>= 1.0` check rather than a modulo against
//! `2π`. These thin wrappers convert to radians at the libm call site.

use core::f64::consts::PI;
use libm::{cos, sin};

/// `sin(2π · turns)`.
#[inline]
pub fn sin_turns(turns: f64) -> f64 {
    sin(2.0 * PI * turns)
}

/// `cos(2π · turns)`.
#[inline]
pub fn cos_turns(turns: f64) -> f64 {
    cos(2.0 * PI * turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_phase_is_zero() {
        assert_eq!(sin_turns(0.0), 0.0);
    }

    #[test]
    fn quarter_turn_is_one() {
        assert!((sin_turns(0.25) - 1.0).abs() < 1e-12);
    }
}
