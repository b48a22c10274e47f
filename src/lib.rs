//! # Speed Lowpass — A Speed-Controlled FIR Filter Plugin
//!
//! A music-channel effect built with [nih-plug](https://github.com/robbert-vdh/nih-plug)
//! that makes playback *sound* slower or faster by darkening or opening up
//! the spectrum. One knob, "Speed", morphs between two fixed 21-tap lowpass
//! filters. Outputs Audio Unit (AUv2), VST3, and CLAP formats from a single
//! codebase.
//!
//! ## Signal Flow
//!
//! ```text
//!                       Speed (0..1, sampled once per block)
//!                                   │
//!          FILTER_LOW ──► × (1 - s) ┤
//!                                  (+)──► effective taps h[0..21]
//!          FILTER_HIGH ─► × s ──────┘              │
//!                                                  ▼
//! Input ──► [Ring Buffer: last 21 frames] ──► Σ h[i]·x[n-i] ──► Output
//!            (per channel, interleaved)
//! ```
//!
//! ## Layout
//!
//! - [`dsp`]: the coefficient store, the interpolator, the ring buffer and
//!   the convolution itself. No host types.
//! - [`effect`]: the create / process / parameter / release lifecycle as a
//!   host-independent trait.
//! - This file: the nih-plug adapter that maps the plugin host's calls onto
//!   that lifecycle.

// The DSP and lifecycle layers expose a complete host-independent surface;
// the nih-plug adapter below drives only part of it.
#[allow(dead_code)]
mod dsp;
#[allow(dead_code)]
mod effect;
mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::coefficients::{GROUP_DELAY, TAPS};
use effect::{DspCallbacks, EffectConfig, SpeedFilterDsp, DESCRIPTOR, PARAM_SPEED};
use error::Result;
use nih_plug::prelude::*;
use params::PluginParams;

/// The plugin struct the host talks to.
///
/// nih-plug hands us audio as one slice per channel and expects the result
/// written back in place. The FIR engine works on interleaved blocks, so
/// the plugin keeps two interleaved scratch buffers, sized once in
/// `initialize()`, and shuttles samples through them.
struct SpeedLowpass {
    params: Arc<PluginParams>,

    /// `None` until the host has initialized us, and again after
    /// `deactivate()` has released the instance.
    dsp: Option<SpeedFilterDsp>,

    /// Interleaved input for one chunk, `block_size * channels` samples.
    scratch_in: Vec<f32>,

    /// Interleaved output for one chunk, same size as `scratch_in`.
    scratch_out: Vec<f32>,
}

impl Default for SpeedLowpass {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            dsp: None,
            // Populated in initialize() when we know the block size and
            // channel count.
            scratch_in: Vec::new(),
            scratch_out: Vec::new(),
        }
    }
}

impl Plugin for SpeedLowpass {
    const NAME: &'static str = DESCRIPTOR.name;
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most music channels are stereo, then mono, then
    // 7.1 surround: the widest layout the ring is sized for.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(8),
            main_output_channels: NonZeroU32::new(8),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // The filter blend is fixed per block, so sub-block automation would
    // only be thrown away.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate everything the audio thread will touch: the effect's ring
    /// buffer and the interleaving scratch space.
    ///
    /// The host's maximum buffer size plays the role of the block size an
    /// audio engine reports at creation. Returning `false` tells the host we
    /// cannot run with this configuration.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        context: &mut impl InitContext<Self>,
    ) -> bool {
        // A re-initialize (new sample rate, new layout) replaces the old
        // instance entirely.
        if let Some(old) = self.dsp.take() {
            old.release();
        }

        let num_channels = audio_io_layout
            .main_output_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        let config = EffectConfig::new(buffer_config.max_buffer_size as usize);
        let dsp = match SpeedFilterDsp::create(&config) {
            Ok(dsp) => dsp,
            Err(err) => {
                nih_error!("failed to create {}: {err}", DESCRIPTOR.name);
                return false;
            }
        };

        let scratch_len = config.block_size * num_channels;
        self.scratch_in = vec![0.0; scratch_len];
        self.scratch_out = vec![0.0; scratch_len];
        self.dsp = Some(dsp);

        // Symmetric taps: every frequency comes out GROUP_DELAY samples late,
        // whatever the speed.
        context.set_latency_samples(GROUP_DELAY as u32);

        nih_log!(
            "{} initialized: {} channels at {} Hz",
            DESCRIPTOR.name,
            num_channels,
            buffer_config.sample_rate
        );
        true
    }

    /// Playback stopped: forget the old history so it doesn't bleed into
    /// the start of the next play.
    fn reset(&mut self) {
        if let Some(dsp) = self.dsp.as_mut() {
            dsp.reset();
        }
    }

    /// Push the Speed knob into the engine, then filter the buffer in
    /// chunks no larger than the scratch space.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let Some(dsp) = self.dsp.as_mut() else {
            return ProcessStatus::Normal;
        };

        if dsp
            .set_parameter_float(PARAM_SPEED, self.params.speed.value())
            .is_err()
        {
            return ProcessStatus::Error("speed parameter rejected");
        }

        let channels = buffer.channels();
        let frames = buffer.samples();
        let chunk = dsp.block_size();
        if channels == 0 || chunk == 0 || chunk * channels > self.scratch_in.len() {
            return ProcessStatus::Error("buffer layout does not match initialize()");
        }

        if process_chunked(
            dsp,
            buffer.as_slice(),
            frames,
            &mut self.scratch_in,
            &mut self.scratch_out,
        )
        .is_err()
        {
            return ProcessStatus::Error("FIR block aborted");
        }

        // After the input stops, the last 21 samples are still ringing
        // through the filter.
        ProcessStatus::Tail(TAPS as u32)
    }

    fn deactivate(&mut self) {
        if let Some(dsp) = self.dsp.take() {
            dsp.release();
        }
    }
}

/// Run `frames` frames of per-channel audio through the engine in place,
/// in chunks of at most `dsp.block_size()` frames.
///
/// Each chunk goes through three steps:
///
/// 1. **Interleave** the chunk from the host's per-channel slices into
///    `scratch_in`.
/// 2. **Filter** `scratch_in` into `scratch_out`.
/// 3. **De-interleave** `scratch_out` back over the host's slices.
///
/// The scratch buffers must hold at least `block_size * channels` samples.
fn process_chunked(
    dsp: &mut SpeedFilterDsp,
    channel_slices: &mut [&mut [f32]],
    frames: usize,
    scratch_in: &mut [f32],
    scratch_out: &mut [f32],
) -> Result<()> {
    let channels = channel_slices.len();
    let chunk = dsp.block_size();

    let mut start = 0;
    while start < frames {
        let len = chunk.min(frames - start);
        let n = len * channels;

        interleave(channel_slices, start, len, &mut scratch_in[..n]);
        dsp.process(&scratch_in[..n], &mut scratch_out[..n], len, channels, channels)?;
        deinterleave(&scratch_out[..n], start, len, channel_slices);

        start += len;
    }

    Ok(())
}

/// Copy `len` frames starting at `start` from per-channel slices into
/// interleaved `out`.
fn interleave(channel_slices: &[&mut [f32]], start: usize, len: usize, out: &mut [f32]) {
    let channels = channel_slices.len();
    for (channel, samples) in channel_slices.iter().enumerate() {
        for (frame, &sample) in samples[start..start + len].iter().enumerate() {
            out[frame * channels + channel] = sample;
        }
    }
}

/// The reverse of [`interleave`].
fn deinterleave(input: &[f32], start: usize, len: usize, channel_slices: &mut [&mut [f32]]) {
    let channels = channel_slices.len();
    for (channel, samples) in channel_slices.iter_mut().enumerate() {
        for (frame, sample) in samples[start..start + len].iter_mut().enumerate() {
            *sample = input[frame * channels + channel];
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for SpeedLowpass {
    const CLAP_ID: &'static str = "com.loveless-audio.speed-lowpass";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A lowpass whose brightness follows a playback speed control");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Surround,
        ClapFeature::Filter,
    ];
}

impl Vst3Plugin for SpeedLowpass {
    // `*b"..."` turns a 16-character ASCII literal into `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"SpeedLowpass_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Filter];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 so Logic Pro
// (Audio Units only) can load it.

nih_export_clap!(SpeedLowpass);
nih_export_vst3!(SpeedLowpass);

clap_wrapper::export_auv2!();

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_round_trip() {
        let mut left = [1.0, 2.0, 3.0, 4.0];
        let mut right = [-1.0, -2.0, -3.0, -4.0];
        let mut slices: Vec<&mut [f32]> = vec![&mut left[..], &mut right[..]];

        let mut scratch = [0.0; 4];
        interleave(&slices, 1, 2, &mut scratch);
        assert_eq!(scratch, [2.0, -2.0, 3.0, -3.0]);

        deinterleave(&[9.0, 8.0, 7.0, 6.0], 1, 2, &mut slices);
        assert_eq!(left, [1.0, 9.0, 7.0, 4.0]);
        assert_eq!(right, [-1.0, 8.0, 6.0, -4.0]);
    }

    /// A host buffer longer than one block is filtered in several chunks,
    /// with the same result as one interleaved call on a fresh instance.
    #[test]
    fn test_chunked_matches_single_call() {
        let block_size = 16;
        let frames = 50; // 16 + 16 + 16 + 2
        let signal = |frame: usize, channel: usize| ((frame * 7 + channel * 3) % 13) as f32 - 6.0;

        let mut left: Vec<f32> = (0..frames).map(|f| signal(f, 0)).collect();
        let mut right: Vec<f32> = (0..frames).map(|f| signal(f, 1)).collect();

        let mut chunked = SpeedFilterDsp::create(&EffectConfig::new(block_size)).unwrap();
        chunked.set_parameter_float(PARAM_SPEED, 0.4).unwrap();
        let mut scratch_in = vec![0.0; block_size * 2];
        let mut scratch_out = vec![0.0; block_size * 2];
        {
            let mut slices: Vec<&mut [f32]> = vec![&mut left[..], &mut right[..]];
            process_chunked(&mut chunked, &mut slices, frames, &mut scratch_in, &mut scratch_out)
                .unwrap();
        }

        let mut whole = SpeedFilterDsp::create(&EffectConfig::new(block_size)).unwrap();
        whole.set_parameter_float(PARAM_SPEED, 0.4).unwrap();
        let input: Vec<f32> = (0..frames * 2).map(|i| signal(i / 2, i % 2)).collect();
        let mut expected = vec![0.0; frames * 2];
        whole.process(&input, &mut expected, frames, 2, 2).unwrap();

        for frame in 0..frames {
            assert_eq!(left[frame], expected[frame * 2], "left, frame {frame}");
            assert_eq!(right[frame], expected[frame * 2 + 1], "right, frame {frame}");
        }
        assert_eq!(chunked.sample_count(), whole.sample_count());
    }

    /// A failing chunk is reported instead of silently skipped.
    #[test]
    fn test_chunked_reports_engine_errors() {
        let mut dsp = SpeedFilterDsp::create(&EffectConfig::new(16)).unwrap();
        let mut channels: Vec<Vec<f32>> = vec![vec![0.0; 4]; 9];
        let mut slices: Vec<&mut [f32]> = channels.iter_mut().map(|c| &mut c[..]).collect();
        let mut scratch_in = vec![0.0; 16 * 9];
        let mut scratch_out = vec![0.0; 16 * 9];

        let result = process_chunked(&mut dsp, &mut slices, 4, &mut scratch_in, &mut scratch_out);
        assert!(matches!(
            result,
            Err(error::DspError::UnsupportedChannelCount { channels: 9, .. })
        ));
    }

    /// The host-facing name and the engine's declared name are one string.
    #[test]
    fn test_plugin_metadata() {
        assert_eq!(SpeedLowpass::NAME, "Speed Lowpass");
        assert_eq!(SpeedLowpass::VST3_CLASS_ID.len(), 16);
    }
}
