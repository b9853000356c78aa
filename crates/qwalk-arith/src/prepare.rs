//! Classical state preparation on a block.

use qwalk_sim::{Backend, QubitId};

use crate::error::{ArithError, ArithResult};

/// Write a classical `value` into a block assumed to be `|0…0⟩`.
///
/// This applies X gates to the set bits, first qubit least significant.
pub fn prepare_value<B: Backend + ?Sized>(
    backend: &mut B,
    block: &[QubitId],
    value: u64,
) -> ArithResult<()> {
    let width = block.len();
    if width < u64::BITS as usize && value >> width != 0 {
        return Err(ArithError::ValueOutOfRange { value, width });
    }

    for (i, &qubit) in block.iter().enumerate() {
        if (value >> i) & 1 == 1 {
            backend.x(qubit)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qwalk_sim::StatevectorSimulator;

    #[test]
    fn test_prepare_value() {
        let mut sim = StatevectorSimulator::with_seed(0);
        let reg = sim.allocate(4).unwrap();

        // 5 = 0b0101: X on bits 0 and 2
        prepare_value(&mut sim, reg.qubits(), 5).unwrap();
        assert_eq!(sim.gate_count(), 2);
        assert_eq!(sim.measure_all(&reg).unwrap().value(reg.qubits()), 5);
    }

    #[test]
    fn test_prepare_overflow() {
        let mut sim = StatevectorSimulator::with_seed(0);
        let reg = sim.allocate(4).unwrap();
        assert!(matches!(
            prepare_value(&mut sim, reg.qubits(), 16),
            Err(ArithError::ValueOutOfRange { value: 16, width: 4 })
        ));
    }
}
