//! Error types for the simulation engine.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while allocating, driving or measuring the statevector.
///
/// Every variant is an execution error: the engine does not roll back a
/// partially applied gate sequence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A gate referenced a qubit outside the allocated register.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit register (gate: {gate})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Size of the allocated register.
        num_qubits: usize,
        /// Name of the gate being applied.
        gate: &'static str,
    },

    /// The same qubit appeared twice among the targets and controls of a gate.
    #[error("Duplicate qubit {qubit} in operands of gate '{gate}'")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Name of the gate being applied.
        gate: &'static str,
    },

    /// Control mask and control list disagree in length.
    #[error("Control mask has {mask} entries but {controls} control qubits were given (gate: {gate})")]
    MaskLengthMismatch {
        /// Number of mask entries.
        mask: usize,
        /// Number of control qubits.
        controls: usize,
        /// Name of the gate being applied.
        gate: &'static str,
    },

    /// Gate was given the wrong number of target qubits.
    #[error("Gate '{gate}' expects {expected} target qubits, got {got}")]
    TargetCountMismatch {
        /// Name of the gate.
        gate: &'static str,
        /// Human readable expectation.
        expected: &'static str,
        /// Number of targets supplied.
        got: usize,
    },

    /// A gate or measurement was issued before `allocate`.
    #[error("No register has been allocated")]
    NotAllocated,

    /// `allocate` was called on a backend that already owns a register.
    #[error("A {0}-qubit register is already allocated; registers are allocated once per run")]
    AlreadyAllocated(usize),

    /// The register was measured and can no longer be driven.
    #[error("Register has been measured; no further operations are possible")]
    AlreadyMeasured,

    /// The requested register exceeds what the simulator supports.
    #[error("Register of {requested} qubits exceeds the simulator limit of {max}")]
    CircuitTooLarge {
        /// Requested number of qubits.
        requested: usize,
        /// Maximum supported by the simulator.
        max: usize,
    },

    /// A backend failure that does not fit the variants above.
    #[error("Backend '{backend}' failed during {operation}: {message}")]
    Backend {
        /// Backend name.
        backend: String,
        /// Operation being performed.
        operation: String,
        /// Failure description.
        message: String,
    },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
