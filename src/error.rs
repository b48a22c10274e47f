//! Errors reported by the FIR engine's lifecycle callbacks.
//!
//! Every failure is a value handed straight back to the caller. Nothing is
//! retried internally: when creation fails the host drops that instance, and
//! when a block fails the host loses that block.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DspError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DspError {
    /// The allocator refused the ring buffer during creation.
    #[error("out of memory allocating {requested} history samples")]
    OutOfMemory { requested: usize },

    /// A parameter index outside the declared table, or of the wrong kind
    /// for the accessor that was called.
    #[error("invalid parameter index {0}")]
    InvalidParameter(usize),

    /// The ring buffer has zero capacity. Unreachable through `create()`.
    #[error("circular buffer has zero capacity")]
    EmptyBuffer,

    /// The channel count is zero, above the supported maximum, or too large
    /// for the ring to hold a full filter's worth of history per channel.
    #[error("{channels} channels cannot be filtered with a {capacity}-sample history")]
    UnsupportedChannelCount { channels: usize, capacity: usize },

    /// An input or output slice is shorter than `frames * channels`.
    #[error("buffer holds {actual} samples but the block needs {expected}")]
    BufferLength { expected: usize, actual: usize },
}
