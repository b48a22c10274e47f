//! # FIR Processing Stage
//!
//! The per-block convolution. For every frame, on every channel:
//!
//! 1. **Write** the input sample into the ring at the current frame.
//! 2. **Convolve**: sum the last 21 samples of that channel, each weighted
//!    by its tap of the [`EffectiveFilter`]. Tap 0 is the sample just
//!    written, tap 20 the oldest.
//!
//! ```text
//! y[n] = h[0]·x[n] + h[1]·x[n-1] + ... + h[20]·x[n-20]
//! ```
//!
//! Once every channel of the frame is done, the ring's cursor advances.
//!
//! The filter is fixed for the whole block. A speed change therefore lands
//! on the next block boundary; at typical block sizes (64-1024 frames) that
//! is a few milliseconds, well under anything audible as a step.
//!
//! The cost per block is exactly `frames × channels × 21` multiply-adds, with
//! no allocation and no branching on the signal itself.

use super::circular_buffer::CircularBuffer;
use super::coefficients::TAPS;
use super::interpolate::EffectiveFilter;
use crate::error::{DspError, Result};

/// Channel count the ring is sized for: up to 7.1 surround.
pub const MAX_CHANNELS: usize = 8;

/// Filter one interleaved block.
///
/// `input` holds `frames * in_channels` samples, `output` holds
/// `frames * out_channels`. Output channel `c` is fed from input channel `c`;
/// output channels the input does not have are fed silence.
///
/// All checks happen before the first sample is touched, so a failed call
/// leaves both the ring and `output` unchanged.
pub fn process_block(
    filter: &EffectiveFilter,
    history: &mut CircularBuffer,
    input: &[f32],
    output: &mut [f32],
    frames: usize,
    in_channels: usize,
    out_channels: usize,
) -> Result<()> {
    check_block(
        history.capacity(),
        input.len(),
        output.len(),
        frames,
        in_channels,
        out_channels,
    )?;

    for frame in 0..frames {
        let in_frame = &input[frame * in_channels..(frame + 1) * in_channels];
        let out_frame = &mut output[frame * out_channels..(frame + 1) * out_channels];

        for (channel, out) in out_frame.iter_mut().enumerate() {
            // Step 1: WRITE the new sample into the ring at the current
            // frame. It becomes tap 0 of this channel's history.
            let sample = in_frame.get(channel).copied().unwrap_or(0.0);
            history.write(out_channels, channel, sample);

            // Step 2: CONVOLVE. Walk back through the last 21 frames of this
            // channel, newest first, weighting each by its tap.
            //
            //   tap 0  → the sample we just wrote   × h[0]
            //   tap 1  → one frame ago              × h[1]
            //   ...
            //   tap 20 → twenty frames ago          × h[20]
            let mut acc = 0.0;
            for tap in 0..TAPS {
                acc += history.read(out_channels, channel, tap) * filter[tap];
            }
            *out = acc;
        }

        // Step 3: ADVANCE the cursor, once per frame and only after every
        // channel has been written, so all channels of a frame share one
        // `sample_count`.
        history.advance();
    }

    Ok(())
}

/// Validate a whole block without touching any state.
///
/// Combines [`check_layout`] with the slice length checks, so callers that
/// keep their own per-block state can find out whether a block will be
/// rejected before committing anything.
pub fn check_block(
    capacity: usize,
    input_len: usize,
    output_len: usize,
    frames: usize,
    in_channels: usize,
    out_channels: usize,
) -> Result<()> {
    check_layout(capacity, out_channels)?;
    check_len(input_len, frames * in_channels)?;
    check_len(output_len, frames * out_channels)
}

/// Can a ring of `capacity` samples serve `channels` interleaved channels?
///
/// It needs at least one slot, and enough slots to keep all 21 taps of
/// every channel alive at once.
pub fn check_layout(capacity: usize, channels: usize) -> Result<()> {
    if capacity == 0 {
        return Err(DspError::EmptyBuffer);
    }
    if channels == 0 || channels > MAX_CHANNELS || capacity < TAPS * channels {
        return Err(DspError::UnsupportedChannelCount { channels, capacity });
    }
    Ok(())
}

fn check_len(actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(DspError::BufferLength { expected, actual });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
