//! # Filter Interpolation
//!
//! Morphing between two filters by blending their *coefficients*:
//!
//! ```text
//! effective[i] = low[i] * (1 - x) + high[i] * x
//! ```
//!
//! Because an FIR filter's output is linear in its coefficients, blending
//! the taps is the same as running both filters and crossfading their
//! outputs, but at one convolution's cost instead of two.
//!
//! The blend is computed once per audio block. That is 21 multiply-adds per
//! block, against `frames × channels × 21` for the convolution itself, so
//! there is nothing to gain from caching it.
//!
//! No clamp is applied to `x`. Values below 0.0 or above 1.0 extrapolate
//! past the two designs, producing coefficients that neither design would
//! produce. The result is still a valid FIR filter, just not a designed one.

use std::ops::Index;

use super::coefficients::TAPS;

/// The 21 taps actually convolved with the signal during one block.
///
/// `taps()[0]` weights the current sample; `taps()[20]` the oldest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveFilter([f32; TAPS]);

impl EffectiveFilter {
    pub fn taps(&self) -> &[f32; TAPS] {
        &self.0
    }

    /// Response to a constant input: the sum of all coefficients.
    pub fn dc_gain(&self) -> f32 {
        self.0.iter().sum()
    }
}

impl Index<usize> for EffectiveFilter {
    type Output = f32;

    fn index(&self, tap: usize) -> &f32 {
        &self.0[tap]
    }
}

/// Blend `low` and `high` at position `x`.
///
/// At `x = 0.0` the result is `low` bit for bit; at `x = 1.0` it is `high`.
pub fn interpolate(low: &[f32; TAPS], high: &[f32; TAPS], x: f32) -> EffectiveFilter {
    let mut taps = [0.0; TAPS];
    for (tap, (&l, &h)) in taps.iter_mut().zip(low.iter().zip(high.iter())) {
        *tap = l * (1.0 - x) + h * x;
    }
    EffectiveFilter(taps)
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::coefficients::{FILTER_HIGH, FILTER_LOW};
    use proptest::prelude::*;

    #[test]
    fn test_endpoints_are_exact() {
        assert_eq!(interpolate(&FILTER_LOW, &FILTER_HIGH, 0.0).taps(), &FILTER_LOW);
        assert_eq!(interpolate(&FILTER_LOW, &FILTER_HIGH, 1.0).taps(), &FILTER_HIGH);
    }

    #[test]
    fn test_midpoint_is_average() {
        let mid = interpolate(&FILTER_LOW, &FILTER_HIGH, 0.5);
        for i in 0..TAPS {
            let expected = (FILTER_LOW[i] + FILTER_HIGH[i]) / 2.0;
            assert!(
                (mid[i] - expected).abs() < 1e-7,
                "tap {i}: expected {expected}, got {}",
                mid[i]
            );
        }
    }

    /// Out-of-range control values extrapolate rather than saturate.
    #[test]
    fn test_no_clamping() {
        let over = interpolate(&FILTER_LOW, &FILTER_HIGH, 1.5);
        let expected = FILTER_LOW[10] * -0.5 + FILTER_HIGH[10] * 1.5;
        assert!((over[10] - expected).abs() < 1e-6);
        assert_ne!(over.taps(), &FILTER_HIGH);
    }

    /// Blending two unit-gain filters keeps unit gain for any `x`.
    #[test]
    fn test_dc_gain_stays_at_unity() {
        for x in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let gain = interpolate(&FILTER_LOW, &FILTER_HIGH, x).dc_gain();
            assert!((gain - 1.0).abs() < 1e-5, "x = {x}: DC gain {gain}");
        }
    }

    proptest! {
        /// Affine in `x`: the filter at the midpoint of `x1` and `x2` is the
        /// average of the filters at `x1` and `x2`.
        #[test]
        fn prop_affine_in_control(x1 in -1.0f32..2.0, x2 in -1.0f32..2.0) {
            let a = interpolate(&FILTER_LOW, &FILTER_HIGH, x1);
            let b = interpolate(&FILTER_LOW, &FILTER_HIGH, x2);
            let m = interpolate(&FILTER_LOW, &FILTER_HIGH, (x1 + x2) / 2.0);
            for i in 0..TAPS {
                prop_assert!((m[i] - (a[i] + b[i]) / 2.0).abs() < 1e-5);
            }
        }
    }
}
