//! # Multi-Channel Circular Buffer
//!
//! The FIR filter needs the last 21 input samples of every channel. Rather
//! than shifting an array every sample, we keep a fixed-size ring and move
//! a logical cursor through it.
//!
//! ## Interleaved Addressing
//!
//! All channels share one buffer, laid out the same way the host lays out
//! its audio: frame after frame, channel after channel.
//!
//! ```text
//! linear index = sample_count * channels + channel
//! physical     = linear index  (floor-mod)  capacity
//! ```
//!
//! Reading `tap` samples into the past on the same channel steps back by
//! whole frames:
//!
//! ```text
//! physical = ((sample_count - tap) * channels + channel)  (floor-mod)  capacity
//! ```
//!
//! Since writes walk the linear index one slot at a time, the ring behaves
//! like an ordinary single-channel ring of interleaved samples. The capacity
//! does not need to be a multiple of the channel count; it only needs to be
//! at least `TAPS * channels` so the oldest tap has not been overwritten.
//!
//! ## Why Floor-Modulo?
//!
//! `sample_count - tap` goes negative near the start of a stream (the cursor
//! starts at the block size, which the host may report as smaller than 21).
//! Rust's `%` keeps the sign of the left operand, so `-3 % 8 == -3`, which
//! is not a valid index. [`i64::rem_euclid`] always returns a value in
//! `[0, capacity)`: `(-3).rem_euclid(8) == 5`.
//!
//! ## Before Priming
//!
//! The buffer starts zeroed. Until 21 frames have been written, the oldest
//! taps read silence, so the first 20 output samples of a stream fade in.
//! This is left as is.

use crate::error::{DspError, Result};

/// A fixed-capacity ring of interleaved samples plus the logical cursor.
pub struct CircularBuffer {
    /// Interleaved history. Allocated once, never resized.
    buffer: Vec<f32>,

    /// Frame counter. Advances by one after every channel of a frame has
    /// been written; never wraps in practice (2^63 frames).
    sample_count: i64,
}

impl CircularBuffer {
    /// Allocate a zeroed ring of `capacity` samples.
    ///
    /// Uses `try_reserve_exact` so an allocator refusal is reported as
    /// [`DspError::OutOfMemory`] rather than aborting the host process.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        // Reserve fallibly, then fill with silence.
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| DspError::OutOfMemory {
                requested: capacity,
            })?;
        buffer.resize(capacity, 0.0);

        Ok(Self {
            buffer,
            sample_count: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn sample_count(&self) -> i64 {
        self.sample_count
    }

    pub fn set_sample_count(&mut self, sample_count: i64) {
        self.sample_count = sample_count;
    }

    /// Store `value` for `channel` at the current frame.
    ///
    /// Does NOT advance the cursor. Write every channel of a frame, then
    /// call [`advance()`](Self::advance) once.
    pub fn write(&mut self, channels: usize, channel: usize, value: f32) {
        let index = self.index_of(self.sample_count, channels, channel);
        self.buffer[index] = value;
    }

    /// Load the sample `tap` frames before the current one on `channel`.
    ///
    /// `tap = 0` is the value most recently written at the current frame.
    ///
    /// Example: 2 channels, capacity 16, `sample_count = 1`, reading tap 3
    /// on channel 1:
    /// ```text
    /// frame  = 1 - 3           = -2
    /// linear = -2 * 2 + 1      = -3
    /// index  = (-3).rem_euclid(16) = 13
    /// ```
    /// Slot 13 holds channel 1 of frame -2, which is silence on a fresh ring.
    pub fn read(&self, channels: usize, channel: usize, tap: usize) -> f32 {
        // Step back whole frames, not samples: one frame is `channels`
        // interleaved slots.
        let frame = self.sample_count - tap as i64;
        self.buffer[self.index_of(frame, channels, channel)]
    }

    /// Move the cursor to the next frame.
    pub fn advance(&mut self) {
        self.sample_count += 1;
    }

    /// Zero the history in place. The cursor is left where it is.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Raw interleaved storage, in physical (not chronological) order.
    pub fn as_slice(&self) -> &[f32] {
        &self.buffer
    }

    fn index_of(&self, frame: i64, channels: usize, channel: usize) -> usize {
        // A channel past the stride would land in the next frame's slot.
        debug_assert!(channel < channels, "channel {channel} of {channels}");
        wrap_index(frame * channels as i64 + channel as i64, self.buffer.len())
    }
}

/// Floor-modulo of a possibly negative linear index into `[0, capacity)`.
///
/// `capacity` must be non-zero; callers check for an empty ring first.
pub fn wrap_index(linear: i64, capacity: usize) -> usize {
    let index = linear.rem_euclid(capacity as i64) as usize;
    debug_assert!(index < capacity, "index {index} outside ring of {capacity}");
    index
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
