//! Qubit identifiers, registers and measured bitstrings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Index of a qubit inside the allocated register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The position of this qubit as a bit index into a basis state.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// A fixed-size, contiguous qubit register.
///
/// Registers are handed out by [`Backend::allocate`](crate::Backend::allocate)
/// and never grow or shrink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    qubits: Vec<QubitId>,
}

impl Register {
    /// Create a register covering qubits `0..num_qubits`.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            qubits: (0..num_qubits as u32).map(QubitId).collect(),
        }
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// True for a zero-width register.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }

    /// All qubits in index order.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Qubit at position `index`, if any.
    pub fn qubit(&self, index: usize) -> Option<QubitId> {
        self.qubits.get(index).copied()
    }

    /// A sub-block of the register, or `None` when the range overruns it.
    pub fn block(&self, range: Range<usize>) -> Option<Vec<QubitId>> {
        self.qubits.get(range).map(<[QubitId]>::to_vec)
    }

    /// Iterate over the qubits.
    pub fn iter(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.qubits.iter().copied()
    }
}

/// Classical outcome of measuring a register, one bit per qubit in index order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitstring(Vec<bool>);

impl Bitstring {
    /// Decode a sampled basis index into `num_qubits` bits, qubit 0 first.
    pub fn from_basis_index(index: usize, num_qubits: usize) -> Self {
        Self((0..num_qubits).map(|q| (index >> q) & 1 == 1).collect())
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no qubit was measured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bit of a single qubit.
    pub fn bit(&self, qubit: QubitId) -> Option<bool> {
        self.0.get(qubit.index()).copied()
    }

    /// The raw bits in index order.
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    /// Read a block as an unsigned integer, first qubit least significant.
    ///
    /// Qubits outside the bitstring read as 0.
    pub fn value(&self, block: &[QubitId]) -> u64 {
        block
            .iter()
            .enumerate()
            .filter(|(_, q)| self.bit(**q).unwrap_or(false))
            .fold(0, |acc, (pos, _)| acc | (1 << pos))
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Bit pattern of `value` over `width` positions, least significant first.
///
/// This is the shape of a control mask that matches a block holding `value`.
pub fn bits_of(value: u64, width: usize) -> Vec<bool> {
    (0..width).map(|i| (value >> i) & 1 == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
    }

    #[test]
    fn test_register_blocks() {
        let reg = Register::new(5);
        assert_eq!(reg.len(), 5);
        assert_eq!(reg.block(1..3), Some(vec![QubitId(1), QubitId(2)]));
        assert_eq!(reg.block(3..7), None);
        assert_eq!(reg.qubit(4), Some(QubitId(4)));
        assert_eq!(reg.qubit(5), None);
    }

    #[test]
    fn test_bitstring_order_and_value() {
        // 0b0110 with qubit 0 as the least significant bit
        let bits = Bitstring::from_basis_index(6, 4);
        assert_eq!(bits.to_string(), "0110");
        assert_eq!(bits.value(&[QubitId(0), QubitId(1), QubitId(2)]), 6);
        assert_eq!(bits.value(&[QubitId(2), QubitId(3)]), 1);
    }

    #[test]
    fn test_bits_of() {
        assert_eq!(bits_of(5, 4), vec![true, false, true, false]);
        assert!(bits_of(0, 0).is_empty());
    }
}
