//! Error types for the arithmetic circuit builders.

use qwalk_sim::SimError;
use thiserror::Error;

/// Errors produced while synthesizing arithmetic circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArithError {
    /// A block of zero qubits cannot hold a counter.
    #[error("Target block is empty")]
    EmptyBlock,

    /// Cycle size is zero.
    #[error("Cycle size must be at least 1")]
    EmptyCycle,

    /// Cycle size does not fit the block.
    #[error("Cycle of size {size} does not fit in {width} qubits (capacity {capacity})")]
    CycleTooLarge {
        /// Requested cycle size.
        size: u64,
        /// Block width in qubits.
        width: usize,
        /// `2^width`.
        capacity: u128,
    },

    /// A classical value does not fit the block it is written to.
    #[error("Value {value} does not fit in a {width}-qubit block")]
    ValueOutOfRange {
        /// Offending value.
        value: u64,
        /// Block width in qubits.
        width: usize,
    },

    /// Blocks wider than a machine word cannot be described by bit patterns.
    #[error("Block of {0} qubits is wider than 63 bits")]
    BlockTooWide(usize),

    /// A block of the wrong width was handed to a prebuilt circuit.
    #[error("Circuit was built for {expected} qubits but the block has {got}")]
    WidthMismatch {
        /// Width the circuit was synthesized for.
        expected: usize,
        /// Width of the block supplied.
        got: usize,
    },

    /// Control mask and control list disagree in length.
    #[error("Control mask has {mask} entries but {controls} control qubits were given")]
    MaskLengthMismatch {
        /// Number of mask entries.
        mask: usize,
        /// Number of control qubits.
        controls: usize,
    },

    /// The backend rejected an operation.
    #[error("Backend error: {0}")]
    Sim(#[from] SimError),
}

/// Result type for arithmetic synthesis.
pub type ArithResult<T> = Result<T, ArithError>;
