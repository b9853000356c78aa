//! The backend contract circuit builders are written against.

use crate::error::SimResult;
use crate::gate::Gate;
use crate::qubit::{Bitstring, QubitId, Register};

/// A simulation backend able to run walk circuits.
///
/// Gates are applied immediately and in call order; the order of calls is
/// part of the computed result. Every method takes `&mut self` because the
/// backend exclusively owns its amplitude state for the lifetime of a run.
pub trait Backend {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Allocate a fresh `|0…0⟩` register. Allowed once per backend.
    fn allocate(&mut self, num_qubits: usize) -> SimResult<Register>;

    /// Apply `gate` to `targets` on the subspace where every control qubit
    /// equals its mask bit (`true` = `|1⟩`, `false` = `|0⟩`).
    fn apply_controlled(
        &mut self,
        gate: Gate,
        targets: &[QubitId],
        controls: &[QubitId],
        mask: &[bool],
    ) -> SimResult<()>;

    /// Sample every qubit of `register`, collapsing the state.
    ///
    /// The register cannot be driven afterwards.
    fn measure_all(&mut self, register: &Register) -> SimResult<Bitstring>;

    /// Apply Hadamard.
    fn h(&mut self, qubit: QubitId) -> SimResult<()> {
        self.apply_controlled(Gate::H, &[qubit], &[], &[])
    }

    /// Apply Pauli-X.
    fn x(&mut self, qubit: QubitId) -> SimResult<()> {
        self.apply_controlled(Gate::X, &[qubit], &[], &[])
    }

    /// Apply SWAP.
    fn swap(&mut self, q1: QubitId, q2: QubitId) -> SimResult<()> {
        self.apply_controlled(Gate::Swap, &[q1, q2], &[], &[])
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn allocate(&mut self, num_qubits: usize) -> SimResult<Register> {
        (**self).allocate(num_qubits)
    }

    fn apply_controlled(
        &mut self,
        gate: Gate,
        targets: &[QubitId],
        controls: &[QubitId],
        mask: &[bool],
    ) -> SimResult<()> {
        (**self).apply_controlled(gate, targets, controls, mask)
    }

    fn measure_all(&mut self, register: &Register) -> SimResult<Bitstring> {
        (**self).measure_all(register)
    }
}
