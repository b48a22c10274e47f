//! # Plugin Parameters
//!
//! The one knob the host sees. Its value is pushed into the FIR engine once
//! at the start of every block, where it picks the blend between the narrow
//! and the wide lowpass.
//!
//! No smoother is attached. The engine only looks at the value once per
//! block anyway, and the filter blend changes smoothly with the knob, so
//! block-rate steps are inaudible at normal buffer sizes.

use nih_plug::prelude::*;

use crate::effect::{ParameterKind, DEFAULT_SPEED, DESCRIPTOR, PARAM_SPEED};

#[derive(Params)]
pub struct PluginParams {
    /// **Speed**: how "fast" the music is meant to sound.
    ///
    /// - 0% = narrow lowpass, dull and muffled (slow motion)
    /// - 100% = wide lowpass, close to the dry signal (normal speed)
    ///
    /// Anything in between linearly blends the two filters' coefficients.
    #[id = "speed"]
    pub speed: FloatParam,
}

impl Default for PluginParams {
    fn default() -> Self {
        // Range comes from the effect's declared parameter table.
        let (min, max) = match DESCRIPTOR.parameters[PARAM_SPEED].kind {
            ParameterKind::Float { min, max, .. } => (min, max),
            ParameterKind::Data => (0.0, 1.0),
        };

        Self {
            speed: FloatParam::new("Speed", DEFAULT_SPEED, FloatRange::Linear { min, max })
                .with_unit("%")
                // Display as percentage: 0.75 → "75%"
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_defaults_to_full() {
        let params = PluginParams::default();
        assert_eq!(params.speed.value(), 1.0);
    }
}
