//! Boundary correction: making a binary counter wrap at an arbitrary size.
//!
//! A `w`-qubit ripple counter cycles through all `2^w` values. To walk a cycle
//! of `size < 2^w` vertices, the counter must jump `size - 1 → 0` when
//! incrementing and `0 → size - 1` when decrementing.
//!
//! After a plain increment the boundary vertex sits at `size`, which must be
//! exchanged with `0`; after a plain decrement `0` sits at `2^w - 1`, which
//! must be exchanged with `size - 1`. Each exchange of two basis values `a`
//! and `b` is synthesized from multi-controlled flips along a path
//! `a = g0, g1, …, gk = b` where consecutive values differ in one bit:
//!
//! ```text
//! F1 F2 … Fk  Fk-1 … F1
//! ```
//!
//! Flip `Fj` toggles the bit separating `g(j-1)` from `gj`, gated on every
//! other bit of the block matching them, so it exchanges exactly those two
//! values. The forward run carries `a` to `b`; the reverse run (without `Fk`)
//! puts back every intermediate value the forward run displaced, because the
//! later flips are conditioned on bits the earlier flips changed.
//!
//! When `size == 2^w` the plain counter already wraps correctly and no
//! correction is built.

use qwalk_sim::{Backend, Gate, QubitId};
use tracing::debug;

use crate::control::{controlled, join_controls};
use crate::direction::Direction;
use crate::error::{ArithError, ArithResult};

/// Widest block whose values fit the `u64` bit patterns used here.
pub const MAX_BLOCK_WIDTH: usize = 63;

/// One multi-controlled flip of a correction sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionFlip {
    /// Bit position toggled.
    pub target: usize,
    /// Value every other bit position must hold for the flip to fire.
    /// The bit at `target` is ignored.
    pub pattern: u64,
}

impl CorrectionFlip {
    fn fires_on(self, value: u64) -> bool {
        let others = !(1u64 << self.target);
        value & others == self.pattern & others
    }

    /// Effect of this flip on a classical basis value.
    pub fn apply_classical(self, value: u64) -> u64 {
        if self.fires_on(value) {
            value ^ (1 << self.target)
        } else {
            value
        }
    }
}

/// Correction sequences for one block width and cycle size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCorrection {
    width: usize,
    cycle_size: u64,
    increment: Vec<CorrectionFlip>,
    decrement: Vec<CorrectionFlip>,
}

impl BoundaryCorrection {
    /// Build the corrections for a cycle of `cycle_size` vertices stored in a
    /// `width`-qubit block.
    ///
    /// Returns `Ok(None)` when `cycle_size == 2^width`: the ripple counter
    /// then wraps on its own and no correction is ever applied.
    pub fn for_cycle(width: usize, cycle_size: u64) -> ArithResult<Option<Self>> {
        check_cycle(width, cycle_size)?;

        let last = cycle_size - 1;
        if last.count_ones() as usize == width {
            return Ok(None);
        }

        let all_ones = (1u64 << width) - 1;
        // size ↔ 0, clearing the set bits of `size` from the LSB up
        let increment = flip_path(cycle_size, 0..width);
        // (2^w - 1) ↔ size - 1, clearing the zero bits of `size - 1` from the MSB down
        let decrement = flip_path_to(all_ones, last, (0..width).rev());

        debug!(
            width,
            cycle_size,
            increment_flips = increment.len(),
            decrement_flips = decrement.len(),
            "synthesized boundary correction"
        );

        Ok(Some(Self {
            width,
            cycle_size,
            increment,
            decrement,
        }))
    }

    /// Block width the correction was built for.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of vertices in the cycle.
    pub fn cycle_size(&self) -> u64 {
        self.cycle_size
    }

    /// The forward run of flips for `direction`; the full sequence re-applies
    /// all but the last of them in reverse.
    pub fn flips(&self, direction: Direction) -> &[CorrectionFlip] {
        match direction {
            Direction::Forward => &self.increment,
            Direction::Backward => &self.decrement,
        }
    }

    /// The full flip sequence applied after a ripple step in `direction`.
    pub fn sequence(&self, direction: Direction) -> impl Iterator<Item = CorrectionFlip> + '_ {
        let flips = self.flips(direction);
        let undo = &flips[..flips.len().saturating_sub(1)];
        flips.iter().chain(undo.iter().rev()).copied()
    }

    /// Number of multi-controlled flips applied per correction.
    pub fn gate_count(&self, direction: Direction) -> usize {
        self.sequence(direction).count()
    }

    /// Effect of the correction on a classical basis value.
    pub fn apply_classical(&self, value: u64, direction: Direction) -> u64 {
        self.sequence(direction)
            .fold(value, |v, flip| flip.apply_classical(v))
    }

    /// Apply the correction that follows a ripple step in `direction`.
    ///
    /// Every flip is additionally gated on the `outer` qubits being `|1⟩`.
    pub fn apply<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        block: &[QubitId],
        outer: &[QubitId],
        direction: Direction,
    ) -> ArithResult<()> {
        if block.len() != self.width {
            return Err(ArithError::WidthMismatch {
                expected: self.width,
                got: block.len(),
            });
        }

        for flip in self.sequence(direction) {
            let (controls, mask) = join_controls(
                outer,
                block
                    .iter()
                    .enumerate()
                    .filter(|(pos, _)| *pos != flip.target)
                    .map(|(pos, &qubit)| (qubit, (flip.pattern >> pos) & 1 == 1)),
            );
            controlled(backend, Gate::X, &[block[flip.target]], &controls, &mask)?;
        }
        Ok(())
    }
}

/// Validate that a cycle of `size` vertices fits a `width`-qubit block.
pub fn check_cycle(width: usize, size: u64) -> ArithResult<()> {
    if width == 0 {
        return Err(ArithError::EmptyBlock);
    }
    if width > MAX_BLOCK_WIDTH {
        return Err(ArithError::BlockTooWide(width));
    }
    if size == 0 {
        return Err(ArithError::EmptyCycle);
    }
    let capacity = 1u128 << width;
    if u128::from(size) > capacity {
        return Err(ArithError::CycleTooLarge {
            size,
            width,
            capacity,
        });
    }
    Ok(())
}

/// Flips carrying `start` to 0, visiting the set bits of `start` in `order`.
fn flip_path(start: u64, order: impl Iterator<Item = usize>) -> Vec<CorrectionFlip> {
    flip_path_to(start, 0, order)
}

/// Flips carrying `start` to `end`, visiting the differing bits in `order`.
fn flip_path_to(start: u64, end: u64, order: impl Iterator<Item = usize>) -> Vec<CorrectionFlip> {
    let differing = start ^ end;
    let mut current = start;
    order
        .filter(|&pos| (differing >> pos) & 1 == 1)
        .map(|target| {
            let flip = CorrectionFlip {
                target,
                pattern: current,
            };
            current ^= 1 << target;
            flip
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ripple(value: u64, width: usize, direction: Direction) -> u64 {
        let modulus = 1u64 << width;
        match direction {
            Direction::Forward => (value + 1) % modulus,
            Direction::Backward => (value + modulus - 1) % modulus,
        }
    }

    #[test]
    fn test_power_of_two_needs_no_correction() {
        assert_eq!(BoundaryCorrection::for_cycle(5, 32).unwrap(), None);
        assert_eq!(BoundaryCorrection::for_cycle(1, 2).unwrap(), None);
        assert!(BoundaryCorrection::for_cycle(5, 16).unwrap().is_some());
    }

    #[test]
    fn test_invalid_cycles() {
        assert!(matches!(
            BoundaryCorrection::for_cycle(0, 1),
            Err(ArithError::EmptyBlock)
        ));
        assert!(matches!(
            BoundaryCorrection::for_cycle(3, 0),
            Err(ArithError::EmptyCycle)
        ));
        assert!(matches!(
            BoundaryCorrection::for_cycle(3, 9),
            Err(ArithError::CycleTooLarge { size: 9, width: 3, .. })
        ));
    }

    #[test]
    fn test_flip_sequence_shape() {
        // size 20 = 0b10100: two set bits, so F1 F2 F1
        let corr = BoundaryCorrection::for_cycle(6, 20).unwrap().unwrap();
        let inc: Vec<_> = corr.sequence(Direction::Forward).map(|f| f.target).collect();
        assert_eq!(inc, vec![2, 4, 2]);

        // size - 1 = 19 = 0b010011, zero bits 5, 3, 2 visited MSB first
        let dec: Vec<_> = corr.sequence(Direction::Backward).map(|f| f.target).collect();
        assert_eq!(dec, vec![5, 3, 2, 3, 5]);

        assert_eq!(corr.width(), 6);
        assert_eq!(corr.cycle_size(), 20);
        assert_eq!(corr.gate_count(Direction::Forward), 3);
        assert_eq!(corr.gate_count(Direction::Backward), 5);
    }

    #[test]
    fn test_corrected_counter_is_a_cycle() {
        use Direction::{Backward, Forward};

        for width in 1..=6 {
            for size in 1..=(1u64 << width) {
                let Some(corr) = BoundaryCorrection::for_cycle(width, size).unwrap() else {
                    continue;
                };
                for v in 0..size {
                    let up = corr.apply_classical(ripple(v, width, Forward), Forward);
                    assert_eq!(up, (v + 1) % size, "width {width} size {size} v {v}");

                    let down = corr.apply_classical(ripple(v, width, Backward), Backward);
                    assert_eq!(down, (v + size - 1) % size, "width {width} size {size} v {v}");
                }
            }
        }
    }

    #[test]
    fn test_correction_is_a_permutation() {
        let width = 4;
        let corr = BoundaryCorrection::for_cycle(width, 11).unwrap().unwrap();
        for direction in [Direction::Forward, Direction::Backward] {
            let mut images: Vec<u64> = (0..16)
                .map(|v| corr.apply_classical(v, direction))
                .collect();
            images.sort_unstable();
            assert_eq!(images, (0..16).collect::<Vec<_>>());
        }
    }
}
