//! Coined quantum walks for qwalk.
//!
//! A walk is described by a [`WalkConfig`]: a vertex register split into one
//! block per coordinate, each with a list of move operators, and a coin
//! register whose value selects which coordinate moves and in which
//! direction. [`Topology::compile`] validates the description and produces a
//! [`CircuitPlan`]; [`QuantumWalk`] replays that plan on a backend for the
//! configured number of steps and measures.
//!
//! # Operator tokens
//!
//! Each coordinate takes a comma-separated list such as `"sm1,sh2"`:
//!
//! - `smK`: add `K` modulo the coordinate's cycle size
//! - `shK`: rotate the coordinate's bits by `K` places
//!
//! A forward move applies the list in order; a backward move applies it in
//! reverse with every operator inverted.
//!
//! # Example
//!
//! ```rust
//! use qwalk_engine::{QuantumWalk, WalkConfig};
//! use qwalk_sim::StatevectorSimulator;
//!
//! // One step on a 20-vertex ring, starting at vertex 19
//! let config = WalkConfig::ring(6, 20, 1).with_start(0, 19);
//! let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(7), &config).unwrap();
//! let outcome = walk.run().unwrap();
//!
//! // Coin 1 moved forward across the boundary, coin 0 moved backward
//! let expected = if outcome.coin == 1 { 0 } else { 18 };
//! assert_eq!(outcome.vertices, vec![expected]);
//! assert_eq!(outcome.bits.len(), 7);
//! ```

pub mod coin;
pub mod config;
pub mod error;
pub mod lexer;
pub mod topology;
pub mod walk;

pub use coin::{CoinDescriptor, CoinManager};
pub use config::{CoordinateConfig, WalkConfig};
pub use error::{WalkError, WalkResult};
pub use topology::{
    CircuitPlan, CompiledOperators, Coordinate, Operator, PlanEntry, PlannedMove, Topology,
    TopologyCompiler, coin_qubits_for,
};
pub use walk::{QuantumWalk, WalkOutcome, WalkPhase};
