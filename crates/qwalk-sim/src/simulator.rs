//! Statevector backend implementation.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::error::{SimError, SimResult};
use crate::gate::Gate;
use crate::qubit::{Bitstring, QubitId, Register};
use crate::statevector::{ControlBits, Statevector};

/// Largest deviation of the squared norm from 1 tolerated before a drift
/// warning is emitted.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Default register limit; 2^20 amplitudes take 16 MiB.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Local statevector backend.
///
/// Owns a single register for the lifetime of one run. The state is exact;
/// only [`measure_all`](Backend::measure_all) draws randomness, from a
/// seedable generator.
pub struct StatevectorSimulator {
    state: Option<Statevector>,
    rng: SmallRng,
    max_qubits: usize,
    measured: bool,
    gate_count: usize,
    drift_warnings: usize,
}

impl StatevectorSimulator {
    /// Create a simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    /// Create a simulator whose measurements are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            state: None,
            rng,
            max_qubits: DEFAULT_MAX_QUBITS,
            measured: false,
            gate_count: 0,
            drift_warnings: 0,
        }
    }

    /// Override the register size limit.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Size of the allocated register, 0 before allocation.
    pub fn num_qubits(&self) -> usize {
        self.state.as_ref().map_or(0, Statevector::num_qubits)
    }

    /// Number of gates applied so far.
    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    /// Number of gates after which the norm drifted beyond [`NORM_TOLERANCE`].
    pub fn drift_warnings(&self) -> usize {
        self.drift_warnings
    }

    /// Whether the register has been measured.
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// The current amplitude state, if allocated.
    pub fn statevector(&self) -> Option<&Statevector> {
        self.state.as_ref()
    }

    /// Probability of every basis state, empty before allocation.
    pub fn probabilities(&self) -> Vec<f64> {
        self.state
            .as_ref()
            .map(Statevector::probabilities)
            .unwrap_or_default()
    }

    /// Probability distribution of the integer stored in `block`
    /// (first qubit least significant), indexed by value.
    pub fn block_distribution(&self, block: &[QubitId]) -> Vec<f64> {
        let mut dist = vec![0.0; 1 << block.len()];
        for (index, p) in self.probabilities().into_iter().enumerate() {
            let value = block
                .iter()
                .enumerate()
                .filter(|(_, q)| (index >> q.index()) & 1 == 1)
                .fold(0usize, |acc, (pos, _)| acc | (1 << pos));
            dist[value] += p;
        }
        dist
    }

    fn state_mut(&mut self) -> SimResult<&mut Statevector> {
        if self.measured {
            return Err(SimError::AlreadyMeasured);
        }
        self.state.as_mut().ok_or(SimError::NotAllocated)
    }

    fn validate(
        num_qubits: usize,
        gate: Gate,
        targets: &[QubitId],
        controls: &[QubitId],
        mask: &[bool],
    ) -> SimResult<()> {
        gate.check_targets(targets.len())?;
        if mask.len() != controls.len() {
            return Err(SimError::MaskLengthMismatch {
                mask: mask.len(),
                controls: controls.len(),
                gate: gate.name(),
            });
        }

        let mut seen = 0usize;
        for &qubit in targets.iter().chain(controls) {
            if qubit.index() >= num_qubits {
                return Err(SimError::QubitOutOfRange {
                    qubit,
                    num_qubits,
                    gate: gate.name(),
                });
            }
            let bit = 1 << qubit.index();
            if seen & bit != 0 {
                return Err(SimError::DuplicateQubit {
                    qubit,
                    gate: gate.name(),
                });
            }
            seen |= bit;
        }
        Ok(())
    }

    fn check_norm(&mut self, gate: Gate) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let drift = (state.norm_sqr() - 1.0).abs();
        if drift > NORM_TOLERANCE {
            self.drift_warnings += 1;
            warn!(
                gate = gate.name(),
                drift,
                gate_index = self.gate_count,
                "statevector norm drifted beyond tolerance"
            );
        }
    }
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StatevectorSimulator {
    fn name(&self) -> &str {
        "statevector"
    }

    fn allocate(&mut self, num_qubits: usize) -> SimResult<Register> {
        if let Some(state) = &self.state {
            return Err(SimError::AlreadyAllocated(state.num_qubits()));
        }
        if num_qubits > self.max_qubits {
            return Err(SimError::CircuitTooLarge {
                requested: num_qubits,
                max: self.max_qubits,
            });
        }

        debug!(num_qubits, "allocating statevector register");
        self.state = Some(Statevector::new(num_qubits));
        Ok(Register::new(num_qubits))
    }

    fn apply_controlled(
        &mut self,
        gate: Gate,
        targets: &[QubitId],
        controls: &[QubitId],
        mask: &[bool],
    ) -> SimResult<()> {
        let state = self.state_mut()?;
        Self::validate(state.num_qubits(), gate, targets, controls, mask)?;

        let control_bits =
            ControlBits::from_pairs(controls.iter().zip(mask).map(|(q, on)| (q.index(), *on)));
        let target_indices: Vec<usize> = targets.iter().map(|q| q.index()).collect();

        trace!(
            gate = gate.name(),
            targets = ?targets,
            controls = ?controls,
            "applying gate"
        );
        state.apply(gate, &target_indices, control_bits);
        self.gate_count += 1;
        self.check_norm(gate);
        Ok(())
    }

    fn measure_all(&mut self, register: &Register) -> SimResult<Bitstring> {
        let num_qubits = self.num_qubits();
        if register.len() != num_qubits {
            return Err(SimError::Backend {
                backend: self.name().to_string(),
                operation: "measure".into(),
                message: format!(
                    "register of {} qubits does not match the allocated {num_qubits}",
                    register.len()
                ),
            });
        }

        let Self { state, rng, measured, .. } = self;
        if *measured {
            return Err(SimError::AlreadyMeasured);
        }
        let state = state.as_mut().ok_or(SimError::NotAllocated)?;

        let outcome = state.sample(rng);
        state.collapse(outcome);
        *measured = true;

        let bits = Bitstring::from_basis_index(outcome, num_qubits);
        debug!(outcome = %bits, "measured register");
        Ok(bits)
    }
}
