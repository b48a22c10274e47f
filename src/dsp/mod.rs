//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks of the speed-controlled lowpass, leaf first:
//!
//! - **`coefficients`**: the two fixed 21-tap FIR lowpass designs.
//!
//! - **`interpolate`**: blends those two designs into the one filter used
//!   for the current block, driven by the speed control.
//!
//! - **`circular_buffer`**: a fixed-size multi-channel ring holding the
//!   most recent input samples of every channel.
//!
//! - **`fir`**: the per-sample convolution of the blended filter against
//!   the ring, producing the output block.

pub mod circular_buffer;
pub mod coefficients;
pub mod fir;
pub mod interpolate;
