//! Cyclic adder: ripple increment / decrement by a classical constant.

use qwalk_sim::{Backend, Gate, QubitId};
use tracing::debug;

use crate::boundary::{BoundaryCorrection, check_cycle};
use crate::control::{controlled, join_controls};
use crate::direction::Direction;
use crate::error::ArithResult;

/// Modular adder over a block of qubits, first qubit least significant.
///
/// Adds or subtracts a constant modulo the cycle size by repeating a unit
/// ripple step, each followed by the boundary correction when the cycle does
/// not fill the block. Cost is O(k · width) multi-controlled flips; there is
/// no shortcut for large constants.
#[derive(Debug, Clone)]
pub struct CyclicAdder {
    block: Vec<QubitId>,
    cycle_size: u64,
    correction: Option<BoundaryCorrection>,
}

impl CyclicAdder {
    /// Build an adder for a cycle of `cycle_size` vertices on `block`.
    pub fn new(block: Vec<QubitId>, cycle_size: u64) -> ArithResult<Self> {
        let correction = BoundaryCorrection::for_cycle(block.len(), cycle_size)?;
        Ok(Self {
            block,
            cycle_size,
            correction,
        })
    }

    /// Build an adder whose cycle fills the whole block (`2^width` vertices).
    pub fn full(block: Vec<QubitId>) -> ArithResult<Self> {
        check_cycle(block.len(), 1)?;
        let size = 1u64 << block.len();
        Self::new(block, size)
    }

    /// The target block.
    pub fn block(&self) -> &[QubitId] {
        &self.block
    }

    /// Number of vertices in the cycle.
    pub fn cycle_size(&self) -> u64 {
        self.cycle_size
    }

    /// The boundary correction, absent when the cycle fills the block.
    pub fn correction(&self) -> Option<&BoundaryCorrection> {
        self.correction.as_ref()
    }

    /// One unit ripple step with no boundary handling (modulo `2^width`).
    ///
    /// Bits are flipped from the most significant down: bit `i` toggles when
    /// every less significant bit is 1 (counting up) or 0 (counting down).
    /// All flips are gated on `outer` being `|1⟩`.
    pub fn ripple_step<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        outer: &[QubitId],
        direction: Direction,
    ) -> ArithResult<()> {
        let polarity = direction.carry_polarity();
        for (i, &target) in self.block.iter().enumerate().rev() {
            let (controls, mask) = join_controls(
                outer,
                self.block[..i].iter().map(|&q| (q, polarity)),
            );
            controlled(backend, Gate::X, &[target], &controls, &mask)?;
        }
        Ok(())
    }

    /// Add (`Forward`) or subtract (`Backward`) `constant` modulo the cycle size.
    ///
    /// Returns how many boundary corrections were applied, which is 0 when
    /// the cycle fills the block.
    pub fn add<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        outer: &[QubitId],
        constant: u64,
        direction: Direction,
    ) -> ArithResult<usize> {
        debug!(
            width = self.block.len(),
            cycle_size = self.cycle_size,
            constant,
            %direction,
            corrected = self.correction.is_some(),
            "synthesizing cyclic adder"
        );

        let mut corrections = 0;
        for _ in 0..constant {
            self.ripple_step(backend, outer, direction)?;
            if let Some(correction) = &self.correction {
                correction.apply(backend, &self.block, outer, direction)?;
                corrections += 1;
            }
        }
        Ok(corrections)
    }
}
