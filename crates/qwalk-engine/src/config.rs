//! Walk configuration.
//!
//! A [`WalkConfig`] is plain data: it can be built in code, or loaded from a
//! JSON document. Every check happens in [`WalkConfig::validate`] (and again
//! when the walk is compiled), before any gate reaches a backend.

use serde::{Deserialize, Serialize};

use crate::error::{WalkError, WalkResult};
use crate::topology::Topology;

/// One run of a coined quantum walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Number of qubits in the vertex register.
    pub vertex_qubits: usize,
    /// Number of walk steps before measurement.
    #[serde(default)]
    pub steps: usize,
    /// Degrees of freedom, in the order they are moved along each step.
    pub coordinates: Vec<CoordinateConfig>,
    /// Coordinate index of the first `with_start` call that named no
    /// coordinate; reported by [`WalkConfig::validate`].
    #[serde(skip)]
    unknown_start: Option<usize>,
}

/// One degree of freedom of the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateConfig {
    /// Operator tokens, e.g. `"sm1"` or `"sm1,sh2"`.
    pub operators: String,
    /// Vertex qubits holding this coordinate, least significant first.
    pub qubits: Vec<u32>,
    /// Coin values `[forward, backward]` that trigger a move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin: Option<[u64; 2]>,
    /// Number of vertices along this coordinate; `2^width` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Starting vertex value.
    #[serde(default)]
    pub start: u64,
}

impl CoordinateConfig {
    /// A coordinate over `qubits` with the given operator tokens.
    pub fn new(operators: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            operators: operators.into(),
            qubits: qubits.into_iter().collect(),
            coin: None,
            size: None,
            start: 0,
        }
    }

    /// Set the coin values for the forward and backward moves.
    pub fn with_coin(mut self, forward: u64, backward: u64) -> Self {
        self.coin = Some([forward, backward]);
        self
    }

    /// Set the number of vertices along this coordinate.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the starting vertex value.
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Number of vertices along this coordinate.
    ///
    /// Saturates at `u64::MAX` for blocks of 64 qubits or more; those are
    /// rejected when the walk is compiled.
    pub fn effective_size(&self) -> u64 {
        self.size.unwrap_or_else(|| {
            let width = self.qubits.len() as u32;
            1u64.checked_shl(width).unwrap_or(u64::MAX)
        })
    }
}

impl WalkConfig {
    /// An empty walk over `vertex_qubits` qubits.
    pub fn new(vertex_qubits: usize, steps: usize) -> Self {
        Self {
            vertex_qubits,
            steps,
            coordinates: Vec::new(),
            unknown_start: None,
        }
    }

    /// A walk on a ring of `graph_size` vertices.
    ///
    /// The ring occupies the lowest `ceil(log2(graph_size))` vertex qubits
    /// (at least one); the remaining vertex qubits stay in `|0⟩`. It moves
    /// forward on coin 1 and backward on coin 0.
    pub fn ring(vertex_qubits: usize, graph_size: u64, steps: usize) -> Self {
        let width = ring_width(graph_size).min(vertex_qubits);
        let coordinate = CoordinateConfig::new("sm1", 0..width as u32).with_size(graph_size);
        Self::new(vertex_qubits, steps).with_coordinate(coordinate)
    }

    /// Append a coordinate.
    pub fn with_coordinate(mut self, coordinate: CoordinateConfig) -> Self {
        self.coordinates.push(coordinate);
        self
    }

    /// Set the starting vertex of coordinate `index`.
    ///
    /// An index past the coordinates added so far is kept and reported as
    /// [`WalkError::StartForUnknownCoordinate`] when the walk is validated.
    pub fn with_start(mut self, index: usize, start: u64) -> Self {
        match self.coordinates.get_mut(index) {
            Some(coordinate) => coordinate.start = start,
            None => {
                self.unknown_start.get_or_insert(index);
            }
        }
        self
    }

    /// Fail if a `with_start` call named a coordinate that does not exist.
    pub(crate) fn check_starts(&self) -> WalkResult<()> {
        match self.unknown_start {
            Some(coordinate) => Err(WalkError::StartForUnknownCoordinate {
                coordinate,
                coordinates: self.coordinates.len(),
            }),
            None => Ok(()),
        }
    }

    /// Load a configuration from a JSON document.
    pub fn from_json(source: &str) -> WalkResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> WalkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run every configuration check.
    pub fn validate(&self) -> WalkResult<()> {
        Topology::compile(self).map(|_| ())
    }
}

/// Qubits needed to label `graph_size` vertices.
fn ring_width(graph_size: u64) -> usize {
    if graph_size <= 2 {
        1
    } else {
        (u64::BITS - (graph_size - 1).leading_zeros()) as usize
    }
}
