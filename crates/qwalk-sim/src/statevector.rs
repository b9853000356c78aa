//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use crate::gate::Gate;

/// Control condition compiled to bit masks over basis indices.
///
/// A basis index `i` lies in the controlled subspace iff
/// `i & mask == value`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlBits {
    /// Bits of every control qubit.
    pub mask: usize,
    /// Required values of those bits.
    pub value: usize,
}

impl ControlBits {
    /// Compile `(qubit index, required bit)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, bool)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |acc, (qubit, on)| Self {
                mask: acc.mask | (1 << qubit),
                value: if on { acc.value | (1 << qubit) } else { acc.value },
            })
    }

    #[inline]
    fn matches(self, index: usize) -> bool {
        index & self.mask == self.value
    }
}

/// A statevector representing a quantum state.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Raw amplitudes, basis index `i` has qubit `q` set iff bit `q` of `i` is set.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply `gate` on the subspace selected by `controls`.
    ///
    /// Operands are assumed to be validated by the caller: in range, distinct,
    /// and of the right count for the gate.
    pub fn apply(&mut self, gate: Gate, targets: &[usize], controls: ControlBits) {
        match gate {
            Gate::X => {
                for &t in targets {
                    self.apply_x(t, controls);
                }
            }
            Gate::H => {
                for &t in targets {
                    self.apply_h(t, controls);
                }
            }
            Gate::Swap => self.apply_swap(targets[0], targets[1], controls),
        }
    }

    fn apply_x(&mut self, qubit: usize, controls: ControlBits) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 && controls.matches(i) {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize, controls: ControlBits) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 && controls.matches(i) {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize, controls: ControlBits) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & mask1 != 0 && i & mask2 == 0 && controls.matches(i) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scale_amplitude(&mut self, index: usize, factor: f64) {
        self.amplitudes[index] *= factor;
    }

    /// Sum of squared magnitudes; 1 for a normalized state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Sample a measurement outcome.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen::<f64>() * self.norm_sqr();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave r just above the final cumulative sum
        self.amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0)
    }

    /// Project onto a single basis state.
    pub fn collapse(&mut self, outcome: usize) {
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp = if i == outcome {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
    }
}
