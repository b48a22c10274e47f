//! # Filter Coefficient Store
//!
//! Two fixed 21-tap FIR lowpass filters. The speed control blends between
//! them (see [`interpolate`](super::interpolate)), so these two designs are
//! the end points of everything the effect can sound like:
//!
//! - **`FILTER_LOW`** is heard at speed 0.0. Pass band up to 0.1 × Nyquist,
//!   stop band from 0.2 × Nyquist. At 48 kHz that keeps roughly the bottom
//!   2.4 kHz, which gives the muffled "slowed down" sound.
//! - **`FILTER_HIGH`** is heard at speed 1.0. Pass band up to 0.4 × Nyquist,
//!   stop band from 0.5 × Nyquist. Only the very top of the spectrum is
//!   rolled off.
//!
//! ## How the Coefficients Were Designed
//!
//! Both sets come from a least-squares FIR design: choose the 21 taps that
//! minimise the squared error between the filter's frequency response and
//! an ideal brick-wall response over the pass and stop bands (the transition
//! band in between is left unconstrained). The result was then scaled so the
//! taps sum to exactly 1.0, which means a constant (DC) input comes out at
//! the same level it went in.
//!
//! Both filters are symmetric (`h[i] == h[20 - i]`). A symmetric FIR has
//! *linear phase*: every frequency is delayed by the same amount, here
//! `(21 - 1) / 2 = 10` samples. Because any blend of two symmetric filters
//! is also symmetric, that delay never changes with the speed control, and
//! the plugin can report it to the host as a fixed latency.

/// Number of taps in every filter the effect uses.
pub const TAPS: usize = 21;

/// Group delay of the linear-phase filters, in samples.
pub const GROUP_DELAY: usize = (TAPS - 1) / 2;

/// Narrow lowpass, selected at speed 0.0.
#[rustfmt::skip]
pub const FILTER_LOW: [f32; TAPS] = [
    -0.016_473_228, -0.020_352_627, -0.018_658_824, -0.009_089_693,
     0.009_350_466,  0.035_780_926,  0.067_402_992,  0.099_841_609,
     0.128_022_668,  0.147_185_050,  0.153_981_317,  0.147_185_050,
     0.128_022_668,  0.099_841_609,  0.067_402_992,  0.035_780_926,
     0.009_350_466, -0.009_089_693, -0.018_658_824, -0.020_352_627,
    -0.016_473_228,
];

/// Wide lowpass, selected at speed 1.0.
#[rustfmt::skip]
pub const FILTER_HIGH: [f32; TAPS] = [
     0.016_350_251,  0.003_558_867, -0.025_119_105, -0.015_474_759,
     0.034_076_913,  0.038_703_574, -0.041_862_567, -0.088_914_657,
     0.047_147_872,  0.308_994_600,  0.445_078_022,  0.308_994_600,
     0.047_147_872, -0.088_914_657, -0.041_862_567,  0.038_703_574,
     0.034_076_913, -0.015_474_759, -0.025_119_105,  0.003_558_867,
     0.016_350_251,
];

/// The pair of fixed filters owned by one effect instance.
///
/// There is no way to mutate a `FilterBank` after construction; the
/// interpolated filter used for each block is a separate value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    low: [f32; TAPS],
    high: [f32; TAPS],
}

impl FilterBank {
    pub const fn new() -> Self {
        Self {
            low: FILTER_LOW,
            high: FILTER_HIGH,
        }
    }

    pub fn low(&self) -> &[f32; TAPS] {
        &self.low
    }

    pub fn high(&self) -> &[f32; TAPS] {
        &self.high
    }

    /// Blend the two filters for control value `x` (0.0 = low, 1.0 = high).
    pub fn interpolate(&self, x: f32) -> super::interpolate::EffectiveFilter {
        super::interpolate::interpolate(&self.low, &self.high, x)
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Magnitude of the filter's response to the highest representable
    /// frequency (+1, -1, +1, ... at Nyquist).
    fn nyquist_gain(taps: &[f32; TAPS]) -> f32 {
        taps.iter()
            .enumerate()
            .map(|(i, &h)| if i % 2 == 0 { h } else { -h })
            .sum::<f32>()
            .abs()
    }

    /// Both filters are normalised, so DC passes at unity gain.
    #[test]
    fn test_unit_dc_gain() {
        for (name, taps) in [("low", FILTER_LOW), ("high", FILTER_HIGH)] {
            let sum: f32 = taps.iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-5,
                "{name} filter should sum to 1.0, got {sum}"
            );
        }
    }

    /// Linear phase requires mirror-image coefficients.
    #[test]
    fn test_filters_are_symmetric() {
        for taps in [FILTER_LOW, FILTER_HIGH] {
            for i in 0..TAPS {
                assert_eq!(taps[i], taps[TAPS - 1 - i], "tap {i} breaks symmetry");
            }
        }
        assert_eq!(GROUP_DELAY, 10);
    }

    /// Both are lowpass designs: the Nyquist frequency is strongly cut.
    #[test]
    fn test_both_reject_nyquist() {
        assert!(nyquist_gain(&FILTER_LOW) < 0.05);
        assert!(nyquist_gain(&FILTER_HIGH) < 0.05);
    }

    /// The "low" filter should be the darker one. Its main lobe is wider
    /// and flatter, so the centre tap carries less of the total weight.
    #[test]
    fn test_low_is_narrower_than_high() {
        assert!(FILTER_LOW[GROUP_DELAY] < FILTER_HIGH[GROUP_DELAY]);
    }

    #[test]
    fn test_bank_exposes_constants() {
        let bank = FilterBank::default();
        assert_eq!(bank.low(), &FILTER_LOW);
        assert_eq!(bank.high(), &FILTER_HIGH);
    }
}
