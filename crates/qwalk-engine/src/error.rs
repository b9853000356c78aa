//! Error types for topology compilation and walk execution.

use qwalk_arith::ArithError;
use qwalk_sim::{QubitId, SimError};
use thiserror::Error;

/// Errors produced while compiling or running a walk.
///
/// Configuration errors are raised while the topology is compiled, before
/// any gate reaches the backend; see [`WalkError::is_config_error`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalkError {
    /// The walk declares no coordinates to move along.
    #[error("Walk declares no coordinates")]
    NoCoordinates,

    /// Operator lists and coordinate blocks are not paired one to one.
    #[error("Got {operators} operator lists for {blocks} coordinate blocks; one list per coordinate is required")]
    CoordinateCountMismatch {
        /// Number of operator-token strings.
        operators: usize,
        /// Number of coordinate blocks.
        blocks: usize,
    },

    /// The operator-token string does not follow `tok(,tok)*`.
    #[error("Coordinate {coordinate}: syntax error at position {position}: {message}")]
    Syntax {
        /// Coordinate index.
        coordinate: usize,
        /// Byte offset in the operator string.
        position: usize,
        /// Description.
        message: String,
    },

    /// A token's two-character prefix names no operator.
    #[error("Coordinate {coordinate}: unknown operator '{token}' at position {position} (expected 'sh' or 'sm' prefix)")]
    UnknownOperator {
        /// Coordinate index.
        coordinate: usize,
        /// The offending token.
        token: String,
        /// Byte offset in the operator string.
        position: usize,
    },

    /// The part of a token after its prefix is not an unsigned integer.
    #[error("Coordinate {coordinate}: invalid constant in '{token}' at position {position}")]
    InvalidConstant {
        /// Coordinate index.
        coordinate: usize,
        /// The offending token.
        token: String,
        /// Byte offset in the operator string.
        position: usize,
    },

    /// A coordinate has no qubits.
    #[error("Coordinate {0} has an empty qubit block")]
    EmptyBlock(usize),

    /// A coordinate block is wider than the arithmetic supports.
    #[error("Coordinate {coordinate} spans {width} qubits; at most 63 are supported")]
    BlockTooWide {
        /// Coordinate index.
        coordinate: usize,
        /// Block width.
        width: usize,
    },

    /// A coordinate references a qubit outside the vertex register.
    #[error("Coordinate {coordinate} uses {qubit}, outside the {vertex_qubits}-qubit vertex register")]
    QubitOutOfRange {
        /// Coordinate index.
        coordinate: usize,
        /// Offending qubit.
        qubit: QubitId,
        /// Vertex register width.
        vertex_qubits: usize,
    },

    /// Two coordinates (or one coordinate twice) claim the same qubit.
    #[error("{qubit} is claimed by coordinate {first} and coordinate {second}")]
    OverlappingBlocks {
        /// The shared qubit.
        qubit: QubitId,
        /// First claimant.
        first: usize,
        /// Second claimant.
        second: usize,
    },

    /// A coordinate's cycle is empty.
    #[error("Coordinate {0} has graph size 0")]
    EmptyGraph(usize),

    /// The graph does not fit the coordinate block.
    #[error("Coordinate {coordinate}: graph size {size} exceeds the {capacity} values of a {width}-qubit block")]
    GraphTooLarge {
        /// Coordinate index.
        coordinate: usize,
        /// Requested graph size.
        size: u64,
        /// Block width.
        width: usize,
        /// `2^width`.
        capacity: u128,
    },

    /// Rotation cannot keep vertex values below a partial cycle size.
    #[error("Coordinate {coordinate}: shift requires the graph to fill its block (size {size}, {width} qubits)")]
    ShiftOnPartialCycle {
        /// Coordinate index.
        coordinate: usize,
        /// Graph size.
        size: u64,
        /// Block width.
        width: usize,
    },

    /// Starting vertex lies outside the graph.
    #[error("Coordinate {coordinate}: start vertex {value} is outside graph of size {size}")]
    StartOutOfRange {
        /// Coordinate index.
        coordinate: usize,
        /// Requested start value.
        value: u64,
        /// Graph size.
        size: u64,
    },

    /// A start vertex was set for a coordinate before it was added.
    #[error("Start vertex set for coordinate {coordinate} before it was added ({coordinates} coordinates in the walk)")]
    StartForUnknownCoordinate {
        /// Requested coordinate index.
        coordinate: usize,
        /// Number of coordinates in the walk.
        coordinates: usize,
    },

    /// A coin code does not fit the coin register.
    #[error("Coordinate {coordinate}: coin code {code} does not fit {coin_qubits} coin qubits")]
    CoinCodeOutOfRange {
        /// Coordinate index.
        coordinate: usize,
        /// Offending code.
        code: u64,
        /// Coin register width.
        coin_qubits: usize,
    },

    /// Two moves are triggered by the same coin value.
    #[error("Coin code {code} is used by coordinate {first} and coordinate {second}")]
    CoinCollision {
        /// Shared coin code.
        code: u64,
        /// First coordinate using it.
        first: usize,
        /// Second coordinate using it.
        second: usize,
    },

    /// The configuration document could not be decoded.
    #[error("Invalid walk configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A coordinate index names no compiled coordinate.
    #[error("Unknown coordinate {0}")]
    UnknownCoordinate(usize),

    /// A driver operation was called in the wrong phase.
    #[error("Cannot {operation} a walk in phase {phase}")]
    InvalidTransition {
        /// Current phase.
        phase: String,
        /// Attempted operation.
        operation: &'static str,
    },

    /// Arithmetic synthesis failed while gates were being applied.
    #[error("Arithmetic synthesis failed: {0}")]
    Arith(#[from] ArithError),

    /// The backend failed.
    #[error("Backend error: {0}")]
    Sim(#[from] SimError),
}

impl WalkError {
    /// True for errors detected before any gate is emitted.
    pub fn is_config_error(&self) -> bool {
        !matches!(
            self,
            WalkError::InvalidTransition { .. }
                | WalkError::UnknownCoordinate(_)
                | WalkError::Arith(_)
                | WalkError::Sim(_)
        )
    }

    /// Translate a cycle-validation failure for `coordinate`.
    pub(crate) fn from_cycle(coordinate: usize, err: ArithError) -> Self {
        match err {
            ArithError::EmptyBlock => WalkError::EmptyBlock(coordinate),
            ArithError::EmptyCycle => WalkError::EmptyGraph(coordinate),
            ArithError::BlockTooWide(width) => WalkError::BlockTooWide { coordinate, width },
            ArithError::CycleTooLarge {
                size,
                width,
                capacity,
            } => WalkError::GraphTooLarge {
                coordinate,
                size,
                width,
                capacity,
            },
            other => WalkError::Arith(other),
        }
    }
}

/// Result type for walk operations.
pub type WalkResult<T> = Result<T, WalkError>;
