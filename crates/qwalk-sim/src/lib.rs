//! Statevector engine for qwalk.
//!
//! This crate owns the amplitude state of a walk run and exposes it through
//! the narrow [`Backend`] contract that the circuit builders in
//! `qwalk-arith` and `qwalk-engine` are written against.
//!
//! # Overview
//!
//! - **Qubits and registers**: [`QubitId`], [`Register`], allocated once per run
//! - **Gates**: [`Gate`] (H, X, SWAP) with any number of mixed-polarity controls
//! - **Backend**: [`Backend`] trait, [`StatevectorSimulator`] implementation
//! - **Measurement**: [`Bitstring`], one bit per qubit in index order
//!
//! # Example
//!
//! ```rust
//! use qwalk_sim::{Backend, Gate, QubitId, StatevectorSimulator};
//!
//! let mut sim = StatevectorSimulator::with_seed(42);
//! let reg = sim.allocate(2).unwrap();
//!
//! // Flip q1 only while q0 is |0⟩
//! sim.apply_controlled(Gate::X, &[QubitId(1)], &[QubitId(0)], &[false]).unwrap();
//!
//! let bits = sim.measure_all(&reg).unwrap();
//! assert_eq!(bits.to_string(), "01");
//! ```
//!
//! Basis index `i` holds qubit `q` in `|1⟩` iff bit `q` of `i` is set.

pub mod backend;
pub mod error;
pub mod gate;
pub mod qubit;
pub mod simulator;
pub mod statevector;

pub use backend::Backend;
pub use error::{SimError, SimResult};
pub use gate::Gate;
pub use qubit::{Bitstring, QubitId, Register, bits_of};
pub use simulator::{DEFAULT_MAX_QUBITS, NORM_TOLERANCE, StatevectorSimulator};
pub use statevector::{ControlBits, Statevector};
