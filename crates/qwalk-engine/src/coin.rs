//! Coin register: superposition, per-direction masks and gated moves.

use qwalk_arith::{Direction, with_controls};
use qwalk_sim::{Backend, QubitId, bits_of};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WalkError, WalkResult};
use crate::topology::{Coordinate, PlannedMove};

/// Coin values selecting the two moves of one coordinate.
///
/// Codes are read least significant bit first: bit `j` of a code is the
/// required state of coin qubit `j`, and mask entry `j` holds it. Code 2 on
/// two coin qubits therefore reads `[false, true]` and is measured as coin
/// qubit 1 set. Bitstring conventions that print the most significant bit
/// first place the same code on the opposite end of the coin register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinDescriptor {
    forward_code: u64,
    backward_code: u64,
    forward: Vec<bool>,
    backward: Vec<bool>,
}

impl CoinDescriptor {
    /// Derive one descriptor per `[forward, backward]` code pair.
    ///
    /// Every code must fit `coin_qubits` bits and no code may be used twice.
    pub fn derive(codes: &[[u64; 2]], coin_qubits: usize) -> WalkResult<Vec<Self>> {
        let mut seen: FxHashMap<u64, usize> = FxHashMap::default();

        for (coordinate, pair) in codes.iter().enumerate() {
            for &code in pair {
                if coin_qubits < u64::BITS as usize && code >> coin_qubits != 0 {
                    return Err(WalkError::CoinCodeOutOfRange {
                        coordinate,
                        code,
                        coin_qubits,
                    });
                }
                if let Some(&first) = seen.get(&code) {
                    return Err(WalkError::CoinCollision {
                        code,
                        first,
                        second: coordinate,
                    });
                }
                seen.insert(code, coordinate);
            }
        }

        Ok(codes
            .iter()
            .map(|&[forward_code, backward_code]| Self {
                forward_code,
                backward_code,
                forward: bits_of(forward_code, coin_qubits),
                backward: bits_of(backward_code, coin_qubits),
            })
            .collect())
    }

    /// Coin value triggering the move in `direction`.
    pub fn code(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.forward_code,
            Direction::Backward => self.backward_code,
        }
    }

    /// Control mask over the coin block for the move in `direction`.
    pub fn mask(&self, direction: Direction) -> &[bool] {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }
}

/// Owner of the coin block during a run.
#[derive(Debug, Clone)]
pub struct CoinManager {
    qubits: Vec<QubitId>,
    descriptors: Vec<CoinDescriptor>,
}

impl CoinManager {
    /// Manage `qubits` with one descriptor per coordinate.
    pub fn new(qubits: Vec<QubitId>, descriptors: Vec<CoinDescriptor>) -> Self {
        Self {
            qubits,
            descriptors,
        }
    }

    /// The coin block.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Descriptor of `coordinate`, if it exists.
    pub fn descriptor(&self, coordinate: usize) -> Option<&CoinDescriptor> {
        self.descriptors.get(coordinate)
    }

    /// Put every coin qubit into equal superposition.
    pub fn prepare_superposition<B: Backend + ?Sized>(&self, backend: &mut B) -> WalkResult<()> {
        for &qubit in &self.qubits {
            backend.h(qubit)?;
        }
        Ok(())
    }

    /// Apply a planned move on the subspace where the coin equals its mask.
    ///
    /// The coin qubits are flipped so the mask reads as all-ones, the
    /// operators run with the whole coin block as positive controls, and the
    /// flips are undone even when an operator fails. Returns the number of
    /// boundary corrections applied.
    pub fn apply_move<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        coordinate: &Coordinate,
        planned: &PlannedMove,
    ) -> WalkResult<usize> {
        debug!(
            coordinate = planned.coordinate,
            direction = %planned.direction,
            operators = planned.operations.len(),
            "applying coin-gated move"
        );

        let corrections = with_controls(backend, &self.qubits, &planned.coin_mask, |b| {
            let mut corrections = 0;
            for &operator in &planned.operations {
                corrections +=
                    coordinate.apply_operator(b, &self.qubits, operator, planned.direction)?;
            }
            Ok(corrections)
        })?;
        Ok(corrections)
    }

    /// Move along `coordinate` in `direction`: the forward operators in
    /// order, or the backward operators in reverse.
    pub fn apply_on_coordinate<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        coordinate: &Coordinate,
        direction: Direction,
    ) -> WalkResult<usize> {
        let index = coordinate.index();
        let descriptor = self
            .descriptor(index)
            .ok_or(WalkError::UnknownCoordinate(index))?;
        let planned = PlannedMove {
            coordinate: index,
            direction,
            coin_mask: descriptor.mask(direction).to_vec(),
            operations: coordinate.operators_for(direction),
            target: coordinate.block().to_vec(),
        };
        self.apply_move(backend, coordinate, &planned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_are_lsb_first() {
        let coins = CoinDescriptor::derive(&[[1, 0], [2, 3]], 2).unwrap();
        assert_eq!(coins[0].mask(Direction::Forward), &[true, false]);
        assert_eq!(coins[0].mask(Direction::Backward), &[false, false]);
        assert_eq!(coins[1].mask(Direction::Forward), &[false, true]);
        assert_eq!(coins[1].code(Direction::Backward), 3);
    }

    #[test]
    fn test_collision_detected() {
        let err = CoinDescriptor::derive(&[[1, 0], [0, 2]], 2).unwrap_err();
        assert!(matches!(
            err,
            WalkError::CoinCollision { code: 0, first: 0, second: 1 }
        ));
        assert!(err.is_config_error());

        // Forward and backward of one coordinate must differ too
        assert!(matches!(
            CoinDescriptor::derive(&[[1, 1]], 1),
            Err(WalkError::CoinCollision { first: 0, second: 0, .. })
        ));
    }

    #[test]
    fn test_code_must_fit() {
        assert!(matches!(
            CoinDescriptor::derive(&[[2, 0]], 1),
            Err(WalkError::CoinCodeOutOfRange { code: 2, coin_qubits: 1, .. })
        ));
    }
}
