//! # Effect Lifecycle
//!
//! A host audio engine drives an effect through a handful of callbacks:
//!
//! ```text
//! create ──► process, process, process, ... ──► release
//!               ▲
//!               └── set/get parameter (any thread, any time)
//! ```
//!
//! [`DspCallbacks`] is that surface as a Rust trait. The nih-plug adapter in
//! the crate root holds a [`SpeedFilterDsp`] and forwards the real plugin
//! host's calls to it; the tests in this module call it directly.
//!
//! ## Parameters
//!
//! | index | name        | kind  | access     |
//! |-------|-------------|-------|------------|
//! | 0     | `wave data` | blob  | read       |
//! | 1     | `speed`     | float | read/write |
//!
//! ## Threading
//!
//! `process()` runs on the audio thread and takes `&mut self`. Parameter
//! changes may arrive from the UI or game thread at the same time, through
//! a [`ParameterHandle`]. The only state the two share is the speed value,
//! held in a [`SpeedControl`]: an `f32` stored as bits in an `AtomicU32`,
//! with relaxed ordering since nothing else is published alongside it. The
//! audio thread reads it once at the start of each block; the last write
//! wins.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use nih_plug::{nih_debug_assert, nih_log};

use crate::dsp::circular_buffer::CircularBuffer;
use crate::dsp::coefficients::FilterBank;
use crate::dsp::fir::{self, MAX_CHANNELS};
use crate::error::{DspError, Result};

/// Index of the read-only raw history blob.
pub const PARAM_WAVE_DATA: usize = 0;
/// Index of the speed control.
pub const PARAM_SPEED: usize = 1;

pub const DEFAULT_SPEED: f32 = 1.0;

/// What an effect instance needs to know from the host at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectConfig {
    /// Frames per block the host reports. Sizes the ring once; later blocks
    /// may be any length.
    pub block_size: usize,
}

impl EffectConfig {
    pub const fn new(block_size: usize) -> Self {
        Self { block_size }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Declared metadata
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    /// Opaque sample data, read only.
    Data,
    Float { min: f32, max: f32, default: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub kind: ParameterKind,
}

/// Everything the host reads about the effect before creating it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectDescriptor {
    pub name: &'static str,
    pub input_buffers: usize,
    pub output_buffers: usize,
    pub parameters: &'static [ParameterDescriptor],
}

impl EffectDescriptor {
    pub fn parameter(&self, index: usize) -> Result<&ParameterDescriptor> {
        self.parameters
            .get(index)
            .ok_or(DspError::InvalidParameter(index))
    }
}

pub const DESCRIPTOR: EffectDescriptor = EffectDescriptor {
    name: "Speed Lowpass",
    input_buffers: 1,
    output_buffers: 1,
    parameters: &[
        ParameterDescriptor {
            name: "wave data",
            kind: ParameterKind::Data,
        },
        ParameterDescriptor {
            name: "speed",
            kind: ParameterKind::Float {
                min: 0.0,
                max: 1.0,
                default: DEFAULT_SPEED,
            },
        },
    ],
};

fn expect_float(index: usize) -> Result<()> {
    match DESCRIPTOR.parameter(index)?.kind {
        ParameterKind::Float { .. } => Ok(()),
        ParameterKind::Data => Err(DspError::InvalidParameter(index)),
    }
}

fn expect_data(index: usize) -> Result<()> {
    match DESCRIPTOR.parameter(index)?.kind {
        ParameterKind::Data => Ok(()),
        ParameterKind::Float { .. } => Err(DspError::InvalidParameter(index)),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Shared speed control
// ─────────────────────────────────────────────────────────────────────

/// A lock-free `f32` cell.
#[derive(Debug)]
pub struct SpeedControl(AtomicU32);

impl SpeedControl {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Parameter access from outside the audio thread.
///
/// Cheap to clone; every clone talks to the same effect instance.
#[derive(Debug, Clone)]
pub struct ParameterHandle {
    speed: Arc<SpeedControl>,
}

impl ParameterHandle {
    /// Overwrite a float parameter. The value is stored as given: a speed
    /// outside 0..=1 extrapolates the filter blend instead of clamping.
    pub fn set_float(&self, index: usize, value: f32) -> Result<()> {
        expect_float(index)?;
        self.speed.store(value);
        Ok(())
    }

    /// Current value of a float parameter and its display string, the
    /// value as a whole percentage (`0.5` → `"50"`).
    pub fn get_float(&self, index: usize) -> Result<(f32, String)> {
        expect_float(index)?;
        let value = self.speed.load();
        Ok((value, format_percent(value)))
    }
}

fn format_percent(value: f32) -> String {
    format!("{}", (value * 100.0).round() as i32)
}

// ─────────────────────────────────────────────────────────────────────
// Callbacks
// ─────────────────────────────────────────────────────────────────────

/// The callback surface an audio host drives.
pub trait DspCallbacks: Sized {
    /// Allocate all state. Fails only if the allocator refuses.
    fn create(config: &EffectConfig) -> Result<Self>;

    /// Filter one interleaved block of `frames` frames.
    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        frames: usize,
        in_channels: usize,
        out_channels: usize,
    ) -> Result<()>;

    /// Borrow a data parameter.
    fn get_parameter_data(&self, index: usize) -> Result<&[f32]>;

    fn set_parameter_float(&self, index: usize, value: f32) -> Result<()>;

    fn get_parameter_float(&self, index: usize) -> Result<(f32, String)>;

    /// Tear the instance down. Taking `self` by value makes a second release
    /// of the same instance a compile error.
    fn release(self);
}

/// One attached instance of the speed-controlled lowpass.
pub struct SpeedFilterDsp {
    bank: FilterBank,

    /// `block_size * MAX_CHANNELS` samples of interleaved input history.
    history: CircularBuffer,

    block_size: usize,

    /// Channel count of the previous block, 0 before the first one.
    channels: usize,

    /// Output gain. Carried for hosts that read it; processing ignores it.
    volume_linear: f32,

    speed: Arc<SpeedControl>,
}

impl SpeedFilterDsp {
    /// A handle for changing parameters from another thread.
    pub fn parameter_handle(&self) -> ParameterHandle {
        ParameterHandle {
            speed: Arc::clone(&self.speed),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed.load()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn volume_linear(&self) -> f32 {
        self.volume_linear
    }

    pub fn sample_count(&self) -> i64 {
        self.history.sample_count()
    }

    pub fn filter_bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Silence the history and rewind the cursor, as if freshly created.
    /// Parameters keep their values.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.set_sample_count(self.block_size as i64);
    }
}

impl DspCallbacks for SpeedFilterDsp {
    fn create(config: &EffectConfig) -> Result<Self> {
        let capacity = config.block_size * MAX_CHANNELS;
        let mut history = CircularBuffer::with_capacity(capacity)?;
        history.set_sample_count(config.block_size as i64);

        nih_log!(
            "created '{}': block size {}, {} history samples",
            DESCRIPTOR.name,
            config.block_size,
            capacity
        );

        Ok(Self {
            bank: FilterBank::new(),
            history,
            block_size: config.block_size,
            channels: 0,
            volume_linear: 1.0,
            speed: Arc::new(SpeedControl::new(DEFAULT_SPEED)),
        })
    }

    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        frames: usize,
        in_channels: usize,
        out_channels: usize,
    ) -> Result<()> {
        // Reject a bad block before anything below changes state.
        fir::check_block(
            self.history.capacity(),
            input.len(),
            output.len(),
            frames,
            in_channels,
            out_channels,
        )?;
        if frames == 0 {
            return Ok(());
        }

        // The ring's stride is the channel count. History laid out under the
        // old stride would be read back scrambled, so start from silence.
        if out_channels != self.channels {
            self.history.clear();
            self.channels = out_channels;
        }

        let filter = self.bank.interpolate(self.speed.load());
        nih_debug_assert!(filter.dc_gain().is_finite());

        fir::process_block(
            &filter,
            &mut self.history,
            input,
            output,
            frames,
            in_channels,
            out_channels,
        )
    }

    /// The first `block_size * 2` samples of raw ring storage, for meters
    /// and debugging views. Physical order, not chronological.
    fn get_parameter_data(&self, index: usize) -> Result<&[f32]> {
        expect_data(index)?;
        let raw = self.history.as_slice();
        let len = (self.block_size * 2).min(raw.len());
        Ok(&raw[..len])
    }

    fn set_parameter_float(&self, index: usize, value: f32) -> Result<()> {
        expect_float(index)?;
        self.speed.store(value);
        Ok(())
    }

    fn get_parameter_float(&self, index: usize) -> Result<(f32, String)> {
        expect_float(index)?;
        let value = self.speed.load();
        Ok((value, format_percent(value)))
    }

    fn release(self) {
        nih_log!(
            "released '{}' after {} frames",
            DESCRIPTOR.name,
            self.history.sample_count() - self.block_size as i64
        );
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
