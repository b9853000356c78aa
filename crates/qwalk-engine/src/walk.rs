//! Walk driver: coin preparation, gated moves and measurement.

use std::fmt;

use qwalk_arith::prepare_value;
use qwalk_sim::{Backend, Bitstring, Register};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::coin::CoinManager;
use crate::config::WalkConfig;
use crate::error::{WalkError, WalkResult};
use crate::topology::{CircuitPlan, Topology};

/// Lifecycle phase of a [`QuantumWalk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    /// Compiled; nothing has reached the backend yet.
    Init,
    /// Register allocated, start vertices written, coin in superposition.
    Prepared {
        /// Steps applied so far.
        steps_done: usize,
    },
    /// Measured; the register is spent.
    Measured,
}

impl fmt::Display for WalkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkPhase::Init => write!(f, "init"),
            WalkPhase::Prepared { steps_done } => write!(f, "prepared ({steps_done} steps)"),
            WalkPhase::Measured => write!(f, "measured"),
        }
    }
}

/// Result of a measured walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOutcome {
    /// One bit per qubit: vertex register, then coin register.
    pub bits: Bitstring,
    /// Vertex value per coordinate.
    pub vertices: Vec<u64>,
    /// Measured coin value.
    pub coin: u64,
    /// Steps applied before measurement.
    pub steps: usize,
    /// Boundary corrections applied over the run.
    pub corrections: usize,
}

/// A coined quantum walk bound to a backend.
///
/// The walk moves through [`WalkPhase::Init`], [`WalkPhase::Prepared`] and
/// [`WalkPhase::Measured`] in that order; calling an operation out of order
/// fails with [`WalkError::InvalidTransition`] without touching the backend.
pub struct QuantumWalk<B: Backend> {
    backend: B,
    topology: Topology,
    plan: CircuitPlan,
    coins: CoinManager,
    register: Option<Register>,
    phase: WalkPhase,
    corrections: usize,
}

impl<B: Backend> QuantumWalk<B> {
    /// Compile `config` and bind it to `backend`.
    ///
    /// Every configuration error is reported here, before any gate.
    pub fn new(backend: B, config: &WalkConfig) -> WalkResult<Self> {
        Ok(Self::from_topology(backend, Topology::compile(config)?))
    }

    /// Bind an already compiled topology to `backend`.
    pub fn from_topology(backend: B, topology: Topology) -> Self {
        let plan = topology.plan();
        let coins = CoinManager::new(topology.coin_block(), topology.coins().to_vec());
        Self {
            backend,
            topology,
            plan,
            coins,
            register: None,
            phase: WalkPhase::Init,
            corrections: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> WalkPhase {
        self.phase
    }

    /// The compiled topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The per-step move schedule.
    pub fn plan(&self) -> &CircuitPlan {
        &self.plan
    }

    /// Boundary corrections applied so far.
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Release the backend, e.g. to inspect its final state.
    pub fn into_backend(self) -> B {
        self.backend
    }

    fn invalid(&self, operation: &'static str) -> WalkError {
        WalkError::InvalidTransition {
            phase: self.phase.to_string(),
            operation,
        }
    }

    /// Allocate the register, write the start vertices and put the coin in
    /// superposition.
    pub fn prepare(&mut self) -> WalkResult<()> {
        if self.phase != WalkPhase::Init {
            return Err(self.invalid("prepare"));
        }

        let register = self.backend.allocate(self.topology.total_qubits())?;
        for coordinate in self.topology.coordinates() {
            prepare_value(&mut self.backend, coordinate.block(), coordinate.start())?;
        }
        self.coins.prepare_superposition(&mut self.backend)?;

        info!(
            backend = self.backend.name(),
            qubits = register.len(),
            coin_qubits = self.topology.coin_qubits(),
            "walk prepared"
        );
        self.register = Some(register);
        self.phase = WalkPhase::Prepared { steps_done: 0 };
        Ok(())
    }

    /// Apply one step: for each coordinate, its forward move then its
    /// backward move. Returns the boundary corrections applied.
    pub fn step(&mut self) -> WalkResult<usize> {
        let WalkPhase::Prepared { steps_done } = self.phase else {
            return Err(self.invalid("step"));
        };

        let mut corrections = 0;
        for planned in self.plan.moves() {
            let coordinate = self
                .topology
                .coordinates()
                .get(planned.coordinate)
                .ok_or(WalkError::UnknownCoordinate(planned.coordinate))?;
            corrections += self
                .coins
                .apply_move(&mut self.backend, coordinate, planned)?;
        }

        self.corrections += corrections;
        self.phase = WalkPhase::Prepared {
            steps_done: steps_done + 1,
        };
        debug!(step = steps_done + 1, corrections, "walk step applied");
        Ok(corrections)
    }

    /// Measure every qubit. The walk cannot be driven afterwards.
    pub fn measure(&mut self) -> WalkResult<WalkOutcome> {
        let (WalkPhase::Prepared { steps_done }, Some(register)) = (self.phase, &self.register)
        else {
            return Err(self.invalid("measure"));
        };

        let bits = self.backend.measure_all(register)?;
        self.phase = WalkPhase::Measured;

        let vertices = self
            .topology
            .coordinates()
            .iter()
            .map(|c| bits.value(c.block()))
            .collect();
        let coin = bits.value(self.coins.qubits());

        info!(
            outcome = %bits,
            steps = steps_done,
            corrections = self.corrections,
            "walk measured"
        );
        Ok(WalkOutcome {
            bits,
            vertices,
            coin,
            steps: steps_done,
            corrections: self.corrections,
        })
    }

    /// Run the configured schedule to completion and measure.
    ///
    /// Picks up from the current phase: an unprepared walk is prepared, and
    /// steps already applied count toward the configured total.
    #[instrument(skip(self), fields(steps = self.topology.steps()))]
    pub fn run(&mut self) -> WalkResult<WalkOutcome> {
        if self.phase == WalkPhase::Init {
            self.prepare()?;
        }
        let WalkPhase::Prepared { steps_done } = self.phase else {
            return Err(self.invalid("run"));
        };

        for _ in steps_done..self.topology.steps() {
            self.step()?;
        }
        self.measure()
    }
}

impl<B: Backend> fmt::Debug for QuantumWalk<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantumWalk")
            .field("backend", &self.backend.name())
            .field("phase", &self.phase)
            .field("qubits", &self.topology.total_qubits())
            .field("corrections", &self.corrections)
            .finish()
    }
}
