//! Cyclic shift: rotation of a block's bits.

use qwalk_sim::{Backend, Gate, QubitId};
use tracing::debug;

use crate::control::controlled;
use crate::direction::Direction;
use crate::error::{ArithError, ArithResult};

/// Bit rotation over a block, first qubit least significant.
///
/// A forward rotation moves every bit one place toward the most significant
/// end and the top bit to position 0; backward is its inverse. Each unit
/// rotation is a bubble of SWAPs against a fixed anchor: the last qubit when
/// rotating forward, the first when rotating backward.
#[derive(Debug, Clone)]
pub struct CyclicShifter {
    block: Vec<QubitId>,
}

impl CyclicShifter {
    /// Build a shifter over `block`.
    pub fn new(block: Vec<QubitId>) -> ArithResult<Self> {
        if block.is_empty() {
            return Err(ArithError::EmptyBlock);
        }
        Ok(Self { block })
    }

    /// The target block.
    pub fn block(&self) -> &[QubitId] {
        &self.block
    }

    /// The SWAP pairs of one unit rotation, in application order.
    pub fn swap_pairs(&self, direction: Direction) -> Vec<(QubitId, QubitId)> {
        let last = self.block.len() - 1;
        match direction {
            Direction::Forward => (0..last)
                .map(|i| (self.block[i], self.block[last]))
                .collect(),
            Direction::Backward => (1..=last)
                .rev()
                .map(|i| (self.block[i], self.block[0]))
                .collect(),
        }
    }

    /// Rotate by `constant` places, every SWAP gated on `outer` being `|1⟩`.
    pub fn rotate<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        outer: &[QubitId],
        constant: u64,
        direction: Direction,
    ) -> ArithResult<()> {
        debug!(
            width = self.block.len(),
            constant,
            %direction,
            "synthesizing cyclic shift"
        );

        let mask = vec![true; outer.len()];
        let pairs = self.swap_pairs(direction);
        for _ in 0..constant {
            for &(a, b) in &pairs {
                controlled(backend, Gate::Swap, &[a, b], outer, &mask)?;
            }
        }
        Ok(())
    }
}
