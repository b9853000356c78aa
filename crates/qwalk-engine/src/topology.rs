//! Topology compiler: operator tokens and qubit blocks to a circuit plan.
//!
//! Compilation runs every configuration check. A [`Topology`] that exists is
//! guaranteed to drive a backend without configuration errors.

use std::fmt;

use logos::Logos;
use qwalk_arith::{ArithResult, CyclicAdder, CyclicShifter, Direction};
use qwalk_sim::{Backend, QubitId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coin::CoinDescriptor;
use crate::config::WalkConfig;
use crate::error::{WalkError, WalkResult};
use crate::lexer::Token;

/// A move operator with its constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Rotate the block's bits by `k` places (`sh`).
    Shift(u64),
    /// Add `k` modulo the coordinate's cycle size (`sm`).
    ModularAdd(u64),
}

impl Operator {
    /// The operator's constant.
    pub fn constant(self) -> u64 {
        match self {
            Operator::Shift(k) | Operator::ModularAdd(k) => k,
        }
    }

    /// Token prefix naming this operator.
    pub fn prefix(self) -> &'static str {
        match self {
            Operator::Shift(_) => "sh",
            Operator::ModularAdd(_) => "sm",
        }
    }

    /// The same operator with a different constant.
    pub fn with_constant(self, k: u64) -> Self {
        match self {
            Operator::Shift(_) => Operator::Shift(k),
            Operator::ModularAdd(_) => Operator::ModularAdd(k),
        }
    }

    /// Build an operator from its token prefix, if the prefix is known.
    pub fn from_prefix(prefix: &str, constant: u64) -> Option<Self> {
        match prefix {
            "sh" => Some(Operator::Shift(constant)),
            "sm" => Some(Operator::ModularAdd(constant)),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.constant())
    }
}

/// Coin qubits needed to give every coordinate two distinct coin values.
pub fn coin_qubits_for(coordinates: usize) -> usize {
    let codes = coordinates.saturating_mul(2).max(2);
    (usize::BITS - (codes - 1).leading_zeros()) as usize
}

/// Output of [`TopologyCompiler::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOperators {
    /// Ordered operators per coordinate.
    pub operators: Vec<Vec<Operator>>,
    /// Width of the coin register.
    pub coin_qubits: usize,
}

/// Parser for per-coordinate operator lists.
pub struct TopologyCompiler;

impl TopologyCompiler {
    /// Parse one coordinate's operator list, e.g. `"sm1,sh2"`.
    ///
    /// Whitespace is ignored, including inside a token (`"sm 1"`). Empty
    /// tokens, such as a leading, doubled or dangling comma, are rejected.
    pub fn parse(coordinate: usize, source: &str) -> WalkResult<Vec<Operator>> {
        let mut operators = Vec::new();
        let mut expect_word = true;
        let mut lexer = Token::lexer(source);

        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let token = result.map_err(|()| WalkError::Syntax {
                coordinate,
                position: span.start,
                message: format!("invalid character in '{}'", &source[span.clone()]),
            })?;
            match (token, expect_word) {
                (Token::Word(word), true) => {
                    operators.push(Self::parse_token(coordinate, &word, span.start)?);
                    expect_word = false;
                }
                (Token::Comma, false) => expect_word = true,
                (token, _) => {
                    let expected = if expect_word { "an operator" } else { "','" };
                    return Err(WalkError::Syntax {
                        coordinate,
                        position: span.start,
                        message: format!("expected {expected}, found '{token}'"),
                    });
                }
            }
        }

        if expect_word {
            return Err(WalkError::Syntax {
                coordinate,
                position: source.len(),
                message: "expected an operator".into(),
            });
        }
        Ok(operators)
    }

    /// Parse a single token: a two-character prefix and an unsigned constant.
    fn parse_token(coordinate: usize, token: &str, position: usize) -> WalkResult<Operator> {
        let unknown = || WalkError::UnknownOperator {
            coordinate,
            token: token.to_owned(),
            position,
        };
        let prefix = token.get(..2).ok_or_else(unknown)?;
        let digits = &token[2..];

        let Some(operator) = Operator::from_prefix(prefix, 0) else {
            return Err(unknown());
        };
        let constant = Some(digits)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|d| d.parse::<u64>().ok())
            .ok_or_else(|| WalkError::InvalidConstant {
                coordinate,
                token: token.to_owned(),
                position,
            })?;
        Ok(operator.with_constant(constant))
    }

    /// Compile one operator list per coordinate block.
    ///
    /// The lists and blocks are paired by position; a count mismatch is
    /// rejected before anything is parsed.
    pub fn compile<S: AsRef<str>>(
        operators: &[S],
        blocks: &[Vec<QubitId>],
    ) -> WalkResult<CompiledOperators> {
        if operators.len() != blocks.len() {
            return Err(WalkError::CoordinateCountMismatch {
                operators: operators.len(),
                blocks: blocks.len(),
            });
        }
        if blocks.is_empty() {
            return Err(WalkError::NoCoordinates);
        }

        let operators = operators
            .iter()
            .enumerate()
            .map(|(c, source)| Self::parse(c, source.as_ref()))
            .collect::<WalkResult<Vec<_>>>()?;

        Ok(CompiledOperators {
            operators,
            coin_qubits: coin_qubits_for(blocks.len()),
        })
    }
}

/// A compiled degree of freedom.
#[derive(Debug, Clone)]
pub struct Coordinate {
    index: usize,
    operators: Vec<Operator>,
    adder: CyclicAdder,
    shifter: CyclicShifter,
    start: u64,
}

impl Coordinate {
    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Vertex qubits of this coordinate, least significant first.
    pub fn block(&self) -> &[QubitId] {
        self.adder.block()
    }

    /// Number of vertices along this coordinate.
    pub fn size(&self) -> u64 {
        self.adder.cycle_size()
    }

    /// Operators of a forward move, in application order.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Operators of a move in `direction`, in application order.
    pub fn operators_for(&self, direction: Direction) -> Vec<Operator> {
        match direction {
            Direction::Forward => self.operators.clone(),
            Direction::Backward => self.operators.iter().rev().copied().collect(),
        }
    }

    /// Starting vertex value.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// True when moves along this coordinate need the boundary correction.
    pub fn is_corrected(&self) -> bool {
        self.adder.correction().is_some()
    }

    /// Apply one operator gated on `outer`. Returns the number of boundary
    /// corrections applied.
    pub fn apply_operator<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        outer: &[QubitId],
        operator: Operator,
        direction: Direction,
    ) -> ArithResult<usize> {
        match operator {
            Operator::ModularAdd(k) => self.adder.add(backend, outer, k, direction),
            Operator::Shift(k) => {
                self.shifter.rotate(backend, outer, k, direction)?;
                Ok(0)
            }
        }
    }
}

/// One gated move of a walk step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Coordinate moved along.
    pub coordinate: usize,
    /// Orientation of the move.
    pub direction: Direction,
    /// Coin value selecting this move, one entry per coin qubit.
    pub coin_mask: Vec<bool>,
    /// Operators in application order.
    pub operations: Vec<Operator>,
    /// Target block.
    pub target: Vec<QubitId>,
}

/// One operator application as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntry<'a> {
    pub operator: Operator,
    pub direction: Direction,
    pub target: &'a [QubitId],
    pub controls: &'a [QubitId],
    pub mask: &'a [bool],
}

/// The ordered moves of a single walk step.
///
/// Immutable once built; every step replays the same moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitPlan {
    controls: Vec<QubitId>,
    moves: Vec<PlannedMove>,
}

impl CircuitPlan {
    /// Coin qubits gating every move.
    pub fn controls(&self) -> &[QubitId] {
        &self.controls
    }

    /// Moves in execution order.
    pub fn moves(&self) -> &[PlannedMove] {
        &self.moves
    }

    /// Flattened operator applications in execution order.
    pub fn entries(&self) -> impl Iterator<Item = PlanEntry<'_>> + '_ {
        self.moves.iter().flat_map(move |mv| {
            mv.operations.iter().map(move |&operator| PlanEntry {
                operator,
                direction: mv.direction,
                target: &mv.target,
                controls: &self.controls,
                mask: &mv.coin_mask,
            })
        })
    }

    /// Number of operator applications per step.
    pub fn len(&self) -> usize {
        self.moves.iter().map(|mv| mv.operations.len()).sum()
    }

    /// True when a step applies nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully validated walk.
#[derive(Debug, Clone)]
pub struct Topology {
    vertex_qubits: usize,
    coin_qubits: usize,
    steps: usize,
    coordinates: Vec<Coordinate>,
    coins: Vec<CoinDescriptor>,
}

impl Topology {
    /// Compile and validate `config`.
    pub fn compile(config: &WalkConfig) -> WalkResult<Self> {
        if config.coordinates.is_empty() {
            return Err(WalkError::NoCoordinates);
        }
        config.check_starts()?;

        let blocks = Self::check_blocks(config)?;
        let sources: Vec<&str> = config
            .coordinates
            .iter()
            .map(|c| c.operators.as_str())
            .collect();
        let compiled = TopologyCompiler::compile(&sources, &blocks)?;

        let mut coordinates = Vec::with_capacity(blocks.len());
        for (index, ((entry, block), operators)) in config
            .coordinates
            .iter()
            .zip(blocks)
            .zip(compiled.operators)
            .enumerate()
        {
            let width = block.len();
            let size = entry.effective_size();
            let adder = CyclicAdder::new(block.clone(), size)
                .map_err(|e| WalkError::from_cycle(index, e))?;
            let shifter =
                CyclicShifter::new(block).map_err(|e| WalkError::from_cycle(index, e))?;

            let has_shift = operators.iter().any(|op| matches!(op, Operator::Shift(_)));
            if has_shift && adder.correction().is_some() {
                return Err(WalkError::ShiftOnPartialCycle {
                    coordinate: index,
                    size,
                    width,
                });
            }
            if entry.start >= size {
                return Err(WalkError::StartOutOfRange {
                    coordinate: index,
                    value: entry.start,
                    size,
                });
            }

            coordinates.push(Coordinate {
                index,
                operators,
                adder,
                shifter,
                start: entry.start,
            });
        }

        let codes: Vec<[u64; 2]> = config
            .coordinates
            .iter()
            .enumerate()
            .map(|(c, entry)| entry.coin.unwrap_or([2 * c as u64 + 1, 2 * c as u64]))
            .collect();
        let coins = CoinDescriptor::derive(&codes, compiled.coin_qubits)?;

        debug!(
            vertex_qubits = config.vertex_qubits,
            coin_qubits = compiled.coin_qubits,
            coordinates = coordinates.len(),
            steps = config.steps,
            "compiled walk topology"
        );

        Ok(Self {
            vertex_qubits: config.vertex_qubits,
            coin_qubits: compiled.coin_qubits,
            steps: config.steps,
            coordinates,
            coins,
        })
    }

    /// Check every block against the vertex register and each other.
    fn check_blocks(config: &WalkConfig) -> WalkResult<Vec<Vec<QubitId>>> {
        let mut owners: FxHashMap<u32, usize> = FxHashMap::default();
        let mut blocks = Vec::with_capacity(config.coordinates.len());

        for (index, entry) in config.coordinates.iter().enumerate() {
            if entry.qubits.is_empty() {
                return Err(WalkError::EmptyBlock(index));
            }
            for &q in &entry.qubits {
                let qubit = QubitId(q);
                if qubit.index() >= config.vertex_qubits {
                    return Err(WalkError::QubitOutOfRange {
                        coordinate: index,
                        qubit,
                        vertex_qubits: config.vertex_qubits,
                    });
                }
                if let Some(&first) = owners.get(&q) {
                    return Err(WalkError::OverlappingBlocks {
                        qubit,
                        first,
                        second: index,
                    });
                }
                owners.insert(q, index);
            }
            blocks.push(entry.qubits.iter().copied().map(QubitId).collect());
        }
        Ok(blocks)
    }

    /// Width of the vertex register.
    pub fn vertex_qubits(&self) -> usize {
        self.vertex_qubits
    }

    /// Width of the coin register.
    pub fn coin_qubits(&self) -> usize {
        self.coin_qubits
    }

    /// Vertex qubits followed by coin qubits.
    pub fn total_qubits(&self) -> usize {
        self.vertex_qubits + self.coin_qubits
    }

    /// The coin block, placed right after the vertex register.
    pub fn coin_block(&self) -> Vec<QubitId> {
        (self.vertex_qubits..self.total_qubits())
            .map(|q| QubitId(q as u32))
            .collect()
    }

    /// Configured number of steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Compiled coordinates in declaration order.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Coin values per coordinate.
    pub fn coins(&self) -> &[CoinDescriptor] {
        &self.coins
    }

    /// The moves of one step: for each coordinate, forward then backward.
    pub fn plan(&self) -> CircuitPlan {
        let moves = self
            .coordinates
            .iter()
            .zip(&self.coins)
            .flat_map(|(coordinate, coin)| {
                [Direction::Forward, Direction::Backward].map(|direction| PlannedMove {
                    coordinate: coordinate.index,
                    direction,
                    coin_mask: coin.mask(direction).to_vec(),
                    operations: coordinate.operators_for(direction),
                    target: coordinate.block().to_vec(),
                })
            })
            .collect();

        CircuitPlan {
            controls: self.coin_block(),
            moves,
        }
    }
}
