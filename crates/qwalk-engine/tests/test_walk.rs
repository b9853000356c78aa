//! End-to-end tests for the walk driver on the statevector backend.

use proptest::prelude::*;
use qwalk_arith::{ArithError, Direction};
use qwalk_engine::{
    CoordinateConfig, Operator, QuantumWalk, Topology, TopologyCompiler, WalkConfig, WalkError,
    WalkPhase,
};
use qwalk_sim::{
    Backend, Bitstring, Gate, QubitId, Register, SimError, SimResult, StatevectorSimulator,
};

/// Backend that forwards to a simulator but rejects every controlled gate.
struct RejectControlled {
    inner: StatevectorSimulator,
}

impl Backend for RejectControlled {
    fn name(&self) -> &str {
        "reject-controlled"
    }

    fn allocate(&mut self, num_qubits: usize) -> SimResult<Register> {
        self.inner.allocate(num_qubits)
    }

    fn apply_controlled(
        &mut self,
        gate: Gate,
        targets: &[QubitId],
        controls: &[QubitId],
        mask: &[bool],
    ) -> SimResult<()> {
        if !controls.is_empty() {
            return Err(SimError::Backend {
                backend: self.name().to_string(),
                operation: gate.name().to_string(),
                message: "controlled gates unsupported".into(),
            });
        }
        self.inner.apply_controlled(gate, targets, controls, mask)
    }

    fn measure_all(&mut self, register: &Register) -> SimResult<Bitstring> {
        self.inner.measure_all(register)
    }
}

fn qubits(range: std::ops::Range<u32>) -> Vec<QubitId> {
    range.map(QubitId).collect()
}

fn run(config: &WalkConfig, seed: u64) -> qwalk_engine::WalkOutcome {
    let sim = StatevectorSimulator::with_seed(seed);
    QuantumWalk::new(sim, config).unwrap().run().unwrap()
}

// ---------------------------------------------------------------------------
// Topology compiler
// ---------------------------------------------------------------------------

#[test]
fn operator_list_compiles_in_order() {
    let compiled = TopologyCompiler::compile(&["sm1,sh2"], &[qubits(0..3)]).unwrap();
    assert_eq!(
        compiled.operators,
        vec![vec![Operator::ModularAdd(1), Operator::Shift(2)]]
    );
    assert_eq!(compiled.coin_qubits, 1);
}

#[test]
fn spaced_operator_tokens_compile() {
    let compiled =
        TopologyCompiler::compile(&["s m1", "sm1, sh 2"], &[qubits(0..2), qubits(2..4)]).unwrap();
    assert_eq!(
        compiled.operators,
        vec![
            vec![Operator::ModularAdd(1)],
            vec![Operator::ModularAdd(1), Operator::Shift(2)],
        ]
    );
}

#[test]
fn too_few_operator_lists_rejected() {
    let err = TopologyCompiler::compile(&["sm1"], &[qubits(0..2), qubits(2..4)]).unwrap_err();
    assert!(matches!(
        err,
        WalkError::CoordinateCountMismatch {
            operators: 1,
            blocks: 2
        }
    ));
    assert!(err.is_config_error());
}

#[test]
fn config_errors_emit_no_gates() {
    let bad = [
        WalkConfig::new(2, 1).with_coordinate(CoordinateConfig::new("sq1", [0, 1])),
        WalkConfig::new(2, 1).with_coordinate(CoordinateConfig::new("sm1x", [0, 1])),
        WalkConfig::ring(3, 9, 1),
        WalkConfig::new(4, 1)
            .with_coordinate(CoordinateConfig::new("sm1", [0, 1]).with_coin(1, 0))
            .with_coordinate(CoordinateConfig::new("sm1", [2, 3]).with_coin(1, 2)),
    ];

    for config in &bad {
        let mut sim = StatevectorSimulator::with_seed(0);
        let err = QuantumWalk::new(&mut sim, config).unwrap_err();
        assert!(err.is_config_error(), "{err}");
        assert!(config.validate().is_err());
        assert_eq!(sim.num_qubits(), 0);
        assert_eq!(sim.gate_count(), 0);
    }
}

// ---------------------------------------------------------------------------
// Ring walks
// ---------------------------------------------------------------------------

#[test]
fn power_of_two_ring_never_corrects() {
    let config = WalkConfig::ring(6, 32, 10);
    let topology = Topology::compile(&config).unwrap();
    assert!(!topology.coordinates()[0].is_corrected());

    for seed in 0..4 {
        let outcome = run(&config, seed);
        assert_eq!(outcome.corrections, 0);
        assert_eq!(outcome.bits.len(), 7);
        assert_eq!(outcome.steps, 10);
        assert!(outcome.vertices[0] < 32);
        // The idle top vertex qubit is never touched
        assert_eq!(outcome.bits.bit(QubitId(5)), Some(false));
    }
}

#[test]
fn corrected_increment_wraps_to_zero() {
    let config = WalkConfig::ring(6, 20, 1).with_start(0, 19);
    let mut seen = [false; 2];

    for seed in 0..32 {
        let outcome = run(&config, seed);
        match outcome.coin {
            1 => assert_eq!(outcome.vertices, vec![0]),
            0 => assert_eq!(outcome.vertices, vec![18]),
            other => panic!("coin {other} out of range"),
        }
        seen[outcome.coin as usize] = true;
        // One corrected add per move
        assert_eq!(outcome.corrections, 2);
    }
    assert!(seen[0] && seen[1]);
}

#[test]
fn corrected_step_distribution() {
    let config = WalkConfig::ring(6, 20, 1).with_start(0, 19);
    let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(0), &config).unwrap();
    walk.prepare().unwrap();
    walk.step().unwrap();

    let block = walk.topology().coordinates()[0].block().to_vec();
    let dist = walk.backend().block_distribution(&block);
    assert!((dist[0] - 0.5).abs() < 1e-9);
    assert!((dist[18] - 0.5).abs() < 1e-9);
    assert!(dist[20..].iter().all(|&p| p < 1e-12));
}

#[test]
fn superposed_walk_stays_on_ring() {
    let config = WalkConfig::ring(5, 20, 6).with_start(0, 17);
    let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(3), &config).unwrap();
    walk.prepare().unwrap();

    let block = walk.topology().coordinates()[0].block().to_vec();
    for _ in 0..config.steps {
        walk.step().unwrap();
        let dist = walk.backend().block_distribution(&block);
        let total: f64 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(dist[20..].iter().all(|&p| p < 1e-12));
    }
    assert_eq!(walk.backend().drift_warnings(), 0);
}

#[test]
fn zero_steps_measures_prepared_state() {
    let config = WalkConfig::ring(4, 12, 0).with_start(0, 7);
    for seed in 0..4 {
        let outcome = run(&config, seed);
        assert_eq!(outcome.vertices, vec![7]);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.corrections, 0);
    }

    let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(0), &config).unwrap();
    walk.run().unwrap();
    let sim = walk.into_backend();
    assert!(sim.is_measured());
    assert_eq!(sim.drift_warnings(), 0);
}

// ---------------------------------------------------------------------------
// Multi-coordinate walks
// ---------------------------------------------------------------------------

#[test]
fn grid_moves_one_coordinate_per_coin() {
    let config = WalkConfig::new(4, 1)
        .with_coordinate(CoordinateConfig::new("sm1", [0, 1]).with_coin(1, 0))
        .with_coordinate(CoordinateConfig::new("sm1", [2, 3]).with_coin(2, 3));

    let mut seen = [false; 4];
    for seed in 0..64 {
        let outcome = run(&config, seed);
        let expected = match outcome.coin {
            1 => vec![1, 0],
            0 => vec![3, 0],
            2 => vec![0, 1],
            3 => vec![0, 3],
            other => panic!("coin {other} out of range"),
        };
        assert_eq!(outcome.vertices, expected);
        assert_eq!(outcome.bits.len(), 6);
        seen[outcome.coin as usize] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn unused_coin_values_leave_vertices_alone() {
    // Three coordinates need 3 coin qubits; codes 6 and 7 trigger nothing
    let config = WalkConfig::new(3, 1)
        .with_coordinate(CoordinateConfig::new("sm1", [0]))
        .with_coordinate(CoordinateConfig::new("sm1", [1]))
        .with_coordinate(CoordinateConfig::new("sm1", [2]));

    let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(0), &config).unwrap();
    assert_eq!(walk.topology().coin_qubits(), 3);
    walk.prepare().unwrap();
    walk.step().unwrap();

    let coin = walk.topology().coin_block();
    let probs = walk.backend().probabilities();
    for code in [6usize, 7] {
        let index = code << coin[0].index();
        assert!((probs[index] - 1.0 / 8.0).abs() < 1e-9);
    }
}

#[test]
fn shift_walk_rotates_bits() {
    let config = WalkConfig::new(3, 1)
        .with_coordinate(CoordinateConfig::new("sh1", [0, 1, 2]).with_start(1));

    for seed in 0..16 {
        let outcome = run(&config, seed);
        let expected = if outcome.coin == 1 { 2 } else { 4 };
        assert_eq!(outcome.vertices, vec![expected]);
        assert_eq!(outcome.corrections, 0);
    }
}

#[test]
fn backward_move_inverts_forward_move() {
    let config = WalkConfig::new(3, 0).with_coordinate(
        CoordinateConfig::new("sm1,sh1", [0, 1, 2])
            .with_coin(1, 0)
            .with_start(2),
    );
    let topology = Topology::compile(&config).unwrap();
    let coordinate = &topology.coordinates()[0];
    let coins = qwalk_engine::CoinManager::new(topology.coin_block(), topology.coins().to_vec());

    let mut sim = StatevectorSimulator::with_seed(0);
    let reg = sim.allocate(topology.total_qubits()).unwrap();
    qwalk_arith::prepare_value(&mut sim, coordinate.block(), coordinate.start()).unwrap();
    // Forward fires on coin 1, backward on coin 0
    sim.x(QubitId(3)).unwrap();
    coins
        .apply_on_coordinate(&mut sim, coordinate, Direction::Forward)
        .unwrap();
    // 2 + 1 = 0b011, rotated to 0b110
    let dist = sim.block_distribution(coordinate.block());
    assert!((dist[6] - 1.0).abs() < 1e-9);
    sim.x(QubitId(3)).unwrap();
    coins
        .apply_on_coordinate(&mut sim, coordinate, Direction::Backward)
        .unwrap();

    let bits = sim.measure_all(&reg).unwrap();
    assert_eq!(bits.value(coordinate.block()), 2);
    assert_eq!(bits.bit(QubitId(3)), Some(false));
}

// ---------------------------------------------------------------------------
// Configuration documents
// ---------------------------------------------------------------------------

#[test]
fn json_config_runs() -> anyhow::Result<()> {
    let config = WalkConfig::from_json(
        r#"{
            "vertex_qubits": 4,
            "steps": 1,
            "coordinates": [
                { "operators": "sm1", "qubits": [0, 1], "coin": [1, 0] },
                { "operators": "sm1", "qubits": [2, 3], "coin": [2, 3], "size": 3, "start": 2 }
            ]
        }"#,
    )?;
    config.validate()?;

    for seed in 0..16 {
        let outcome = QuantumWalk::new(StatevectorSimulator::with_seed(seed), &config)?.run()?;
        let expected = match outcome.coin {
            1 => vec![1, 2],
            0 => vec![3, 2],
            2 => vec![0, 0],
            3 => vec![0, 1],
            other => anyhow::bail!("coin {other} out of range"),
        };
        assert_eq!(outcome.vertices, expected);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Driver phases and execution errors
// ---------------------------------------------------------------------------

#[test]
fn out_of_order_calls_rejected() {
    let config = WalkConfig::ring(3, 8, 2);
    let mut walk = QuantumWalk::new(StatevectorSimulator::with_seed(0), &config).unwrap();

    assert!(matches!(
        walk.step(),
        Err(WalkError::InvalidTransition { operation: "step", .. })
    ));
    assert!(matches!(
        walk.measure(),
        Err(WalkError::InvalidTransition { operation: "measure", .. })
    ));
    assert_eq!(walk.backend().gate_count(), 0);

    walk.prepare().unwrap();
    assert!(matches!(
        walk.prepare(),
        Err(WalkError::InvalidTransition { operation: "prepare", .. })
    ));

    walk.step().unwrap();
    assert_eq!(walk.phase(), WalkPhase::Prepared { steps_done: 1 });

    // run picks up the remaining step
    let outcome = walk.run().unwrap();
    assert_eq!(outcome.steps, 2);
    assert_eq!(walk.phase(), WalkPhase::Measured);

    let err = walk.step().unwrap_err();
    assert!(!err.is_config_error());
    assert!(matches!(walk.run(), Err(WalkError::InvalidTransition { .. })));
}

#[test]
fn backend_failure_is_fatal() {
    let backend = RejectControlled {
        inner: StatevectorSimulator::with_seed(0),
    };
    let mut walk = QuantumWalk::new(backend, &WalkConfig::ring(3, 8, 1)).unwrap();

    let err = walk.run().unwrap_err();
    assert!(!err.is_config_error());
    assert!(matches!(
        err,
        WalkError::Arith(ArithError::Sim(SimError::Backend { .. }))
    ));
}

#[test]
fn oversized_register_rejected_by_backend() {
    let sim = StatevectorSimulator::with_seed(0).with_max_qubits(4);
    let mut walk = QuantumWalk::new(sim, &WalkConfig::ring(6, 64, 1)).unwrap();
    assert!(matches!(
        walk.run(),
        Err(WalkError::Sim(SimError::CircuitTooLarge { requested: 7, max: 4 }))
    ));
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn one_step_moves_to_a_neighbor(
        size in 2u64..=16,
        start_frac in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let start = ((size as f64) * start_frac) as u64 % size;
        let config = WalkConfig::ring(4, size, 1).with_start(0, start);
        let outcome = run(&config, seed);

        let expected = if outcome.coin == 1 {
            (start + 1) % size
        } else {
            (start + size - 1) % size
        };
        prop_assert_eq!(outcome.vertices[0], expected);
    }
}
