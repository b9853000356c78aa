//! Reversible modular arithmetic for qwalk.
//!
//! Circuits here are synthesized straight onto a [`qwalk_sim::Backend`]:
//! every builder takes the backend by `&mut` and applies its gates in order.
//!
//! - [`controlled`] / [`ControlScope`]: gates with mixed positive and negative
//!   controls, built from the flip-flop bracket
//! - [`CyclicAdder`]: ripple increment / decrement by a constant
//! - [`CyclicShifter`]: bit rotation
//! - [`BoundaryCorrection`]: wraps a counter at a cycle size below `2^width`
//!
//! Blocks are ordered least significant qubit first.
//!
//! # Example
//!
//! ```rust
//! use qwalk_arith::{CyclicAdder, Direction, prepare_value};
//! use qwalk_sim::{Backend, StatevectorSimulator};
//!
//! let mut sim = StatevectorSimulator::with_seed(1);
//! let reg = sim.allocate(3).unwrap();
//!
//! // A 5-cycle on 3 qubits: 4 + 1 wraps to 0
//! let adder = CyclicAdder::new(reg.qubits().to_vec(), 5).unwrap();
//! prepare_value(&mut sim, adder.block(), 4).unwrap();
//! adder.add(&mut sim, &[], 1, Direction::Forward).unwrap();
//!
//! let bits = sim.measure_all(&reg).unwrap();
//! assert_eq!(bits.value(reg.qubits()), 0);
//! ```

pub mod adder;
pub mod boundary;
pub mod control;
pub mod direction;
pub mod error;
pub mod prepare;
pub mod shift;

pub use adder::CyclicAdder;
pub use boundary::{BoundaryCorrection, CorrectionFlip, MAX_BLOCK_WIDTH, check_cycle};
pub use control::{ControlScope, controlled, with_controls};
pub use direction::Direction;
pub use error::{ArithError, ArithResult};
pub use prepare::prepare_value;
pub use shift::CyclicShifter;
