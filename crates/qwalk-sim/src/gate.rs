//! Gate primitives understood by every backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SimError, SimResult};

/// The closed set of gates a walk circuit is built from.
///
/// Each gate may carry any number of controls; polarity is given per control
/// by the mask passed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard, applied to every target.
    H,
    /// Pauli-X, applied to every target. With controls this is the
    /// generalized multi-controlled NOT.
    X,
    /// Exchange of two qubits.
    Swap,
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Gate::H => "h",
            Gate::X => "x",
            Gate::Swap => "swap",
        }
    }

    /// Check that `got` targets is a legal operand count for this gate.
    pub fn check_targets(self, got: usize) -> SimResult<()> {
        let ok = match self {
            Gate::H | Gate::X => got >= 1,
            Gate::Swap => got == 2,
        };
        if ok {
            Ok(())
        } else {
            Err(SimError::TargetCountMismatch {
                gate: self.name(),
                expected: match self {
                    Gate::H | Gate::X => "at least 1",
                    Gate::Swap => "exactly 2",
                },
                got,
            })
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
