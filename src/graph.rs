//! Compacted runtime graph for cyclic (or not-yet-analyzed) networks.
//!
//! Graph compilation converts the genome's sparse, ID-based connection list
//! into flat parallel arrays over a dense `[0, total_node_count)` index
//! space. Downstream activation touches only contiguous indices; the
//! sparse-to-dense mapping is built once here and discarded.
//!
//! ## Determinism
//!
//! Connections are sorted by `(source, target)` before materialization so
//! floating-point accumulation order is identical across equivalent genomes.
//! This matters because floating-point addition is not associative.

use serde::{Deserialize, Serialize};

use crate::connection::WeightedConnection;

/// Error type for graph compilation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// A connection references a negative node ID, which the genome
    /// contract forbids.
    NegativeNodeId(i32),
    /// The connection list contains the same `(source, target)` pair twice.
    /// Indices are the compiled dense indices.
    DuplicateConnection {
        /// Dense source index of the repeated connection.
        source: usize,
        /// Dense target index of the repeated connection.
        target: usize,
    },
    /// A graph asserted to be acyclic contains a cycle.
    ///
    /// Raised defensively by depth analysis; callers are expected to have
    /// verified acyclicity before compiling the feedforward form.
    CycleDetected,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::NegativeNodeId(id) => {
                write!(f, "invalid graph: negative node ID {}", id)
            }
            GraphError::DuplicateConnection { source, target } => {
                write!(f, "invalid graph: duplicate connection {} -> {}", source, target)
            }
            GraphError::CycleDetected => {
                write!(
                    f,
                    "cycle detected in a graph asserted to be acyclic; \
                     feedforward compilation requires an acyclic graph"
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// A compiled directed graph over dense node indices.
///
/// Node indices follow the genome convention: inputs at `[0, input_count)`,
/// outputs at `[input_count, input_count + output_count)`, hidden nodes
/// compacted to ascending indices from `input_count + output_count`.
/// Connections live in parallel `source/target/weight` arrays sorted
/// ascending by `(source, target)`.
///
/// Immutable after construction, and therefore safely shareable across
/// threads; wrap in [`std::sync::Arc`] to hand one graph to many engines.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    input_count: usize,
    output_count: usize,
    total_node_count: usize,
    source_ids: Vec<usize>,
    target_ids: Vec<usize>,
    weights: Vec<f64>,
}

impl DirectedGraph {
    /// Compile a sparse-ID connection list into a dense runtime graph.
    ///
    /// Hidden node IDs (anything outside the reserved input/output range)
    /// are collected, sorted ascending, and renumbered densely starting at
    /// `input_count + output_count`. Input and output IDs pass through
    /// unchanged since they already satisfy the dense convention.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NegativeNodeId`] if any node ID is negative,
    /// or [`GraphError::DuplicateConnection`] if the list contains the same
    /// `(source, target)` pair twice.
    pub fn compile(
        connections: &[WeightedConnection],
        input_count: usize,
        output_count: usize,
    ) -> Result<Self, GraphError> {
        let reserved = input_count + output_count;

        // Validate IDs and collect the hidden set in one pass.
        let mut hidden_ids: Vec<i32> = Vec::new();
        for conn in connections {
            for id in [conn.source_id, conn.target_id] {
                if id < 0 {
                    return Err(GraphError::NegativeNodeId(id));
                }
                if id as usize >= reserved {
                    hidden_ids.push(id);
                }
            }
        }
        hidden_ids.sort_unstable();
        hidden_ids.dedup();

        let total_node_count = reserved + hidden_ids.len();

        // Sorted-vec lookup instead of a hash map: the hidden set is small
        // and binary search avoids allocator churn in the evolutionary loop.
        let dense_id = |id: i32| -> usize {
            let id_usize = id as usize;
            if id_usize < reserved {
                id_usize
            } else {
                let slot = hidden_ids
                    .binary_search(&id)
                    .expect("hidden ID collected above");
                reserved + slot
            }
        };

        let mut compiled: Vec<(usize, usize, f64)> = connections
            .iter()
            .map(|c| (dense_id(c.source_id), dense_id(c.target_id), c.weight))
            .collect();

        // Hidden IDs all sit above the reserved range and remap in ascending
        // order, so sorting dense indices yields the same order as sorting
        // the original sparse IDs.
        compiled.sort_unstable_by_key(|&(s, t, _)| (s, t));

        for pair in compiled.windows(2) {
            if pair[0].0 == pair[1].0 && pair[0].1 == pair[1].1 {
                return Err(GraphError::DuplicateConnection {
                    source: pair[0].0,
                    target: pair[0].1,
                });
            }
        }

        let mut source_ids = Vec::with_capacity(compiled.len());
        let mut target_ids = Vec::with_capacity(compiled.len());
        let mut weights = Vec::with_capacity(compiled.len());
        for (s, t, w) in compiled {
            source_ids.push(s);
            target_ids.push(t);
            weights.push(w);
        }

        Ok(Self {
            input_count,
            output_count,
            total_node_count,
            source_ids,
            target_ids,
            weights,
        })
    }

    /// Number of input nodes.
    #[inline]
    #[must_use]
    pub const fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of output nodes.
    #[inline]
    #[must_use]
    pub const fn output_count(&self) -> usize {
        self.output_count
    }

    /// Total number of nodes: inputs + outputs + hiddens.
    #[inline]
    #[must_use]
    pub const fn total_node_count(&self) -> usize {
        self.total_node_count
    }

    /// Number of connections.
    #[inline]
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.source_ids.len()
    }

    /// Dense source index per connection, sorted ascending.
    #[inline]
    #[must_use]
    pub fn source_ids(&self) -> &[usize] {
        &self.source_ids
    }

    /// Dense target index per connection, parallel to [`Self::source_ids`].
    #[inline]
    #[must_use]
    pub fn target_ids(&self) -> &[usize] {
        &self.target_ids
    }

    /// Connection weights, parallel to [`Self::source_ids`].
    #[inline]
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Per-node offsets into the connection arrays (length
    /// `total_node_count + 1`): node `n`'s outgoing connections occupy
    /// `[offsets[n], offsets[n + 1])`. Valid because connections are sorted
    /// by source.
    #[must_use]
    pub(crate) fn outgoing_offsets(&self) -> Vec<usize> {
        let mut offsets = vec![0usize; self.total_node_count + 1];
        for &source in &self.source_ids {
            offsets[source + 1] += 1;
        }
        for n in 0..self.total_node_count {
            offsets[n + 1] += offsets[n];
        }
        offsets
    }
}

// Serde support mirrors the connection-list form: a graph serializes as the
// triple list plus counts, and deserialization re-runs compilation so the
// invariants cannot be bypassed by hand-edited data.
impl Serialize for DirectedGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let connections: Vec<WeightedConnection> = (0..self.connection_count())
            .map(|i| {
                WeightedConnection::new(
                    self.source_ids[i] as i32,
                    self.target_ids[i] as i32,
                    self.weights[i],
                )
            })
            .collect();
        let mut state = serializer.serialize_struct("DirectedGraph", 3)?;
        state.serialize_field("input_count", &self.input_count)?;
        state.serialize_field("output_count", &self.output_count)?;
        state.serialize_field("connections", &connections)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for DirectedGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            input_count: usize,
            output_count: usize,
            connections: Vec<WeightedConnection>,
        }
        let raw = Raw::deserialize(deserializer)?;
        DirectedGraph::compile(&raw.connections, raw.input_count, raw.output_count)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_basic() {
        // 2 inputs (0, 1), 1 output (2), hidden IDs 10 and 40.
        let connections = vec![
            WeightedConnection::new(0, 10, 0.5),
            WeightedConnection::new(1, 40, -0.5),
            WeightedConnection::new(10, 2, 1.0),
            WeightedConnection::new(40, 2, 2.0),
        ];
        let graph = DirectedGraph::compile(&connections, 2, 1).unwrap();

        assert_eq!(graph.input_count(), 2);
        assert_eq!(graph.output_count(), 1);
        assert_eq!(graph.total_node_count(), 5);
        assert_eq!(graph.connection_count(), 4);

        // Hidden 10 -> 3, hidden 40 -> 4.
        assert_eq!(graph.source_ids(), &[0, 1, 3, 4]);
        assert_eq!(graph.target_ids(), &[3, 4, 2, 2]);
    }

    #[test]
    fn test_compile_indices_in_range() {
        let connections = vec![
            WeightedConnection::new(0, 100, 1.0),
            WeightedConnection::new(100, 7, 1.0),
            WeightedConnection::new(7, 1, 1.0),
        ];
        let graph = DirectedGraph::compile(&connections, 1, 1).unwrap();
        assert_eq!(graph.total_node_count(), 4);
        for i in 0..graph.connection_count() {
            assert!(graph.source_ids()[i] < graph.total_node_count());
            assert!(graph.target_ids()[i] < graph.total_node_count());
        }
    }

    #[test]
    fn test_compile_sorts_connections() {
        let connections = vec![
            WeightedConnection::new(9, 1, 1.0),
            WeightedConnection::new(0, 9, 1.0),
            WeightedConnection::new(0, 1, 1.0),
        ];
        let graph = DirectedGraph::compile(&connections, 1, 1).unwrap();
        for i in 1..graph.connection_count() {
            let prev = (graph.source_ids()[i - 1], graph.target_ids()[i - 1]);
            let curr = (graph.source_ids()[i], graph.target_ids()[i]);
            assert!(prev < curr, "connections not sorted: {:?} >= {:?}", prev, curr);
        }
    }

    #[test]
    fn test_compile_preserves_weights_through_sort() {
        let connections = vec![
            WeightedConnection::new(5, 1, 3.0),
            WeightedConnection::new(0, 5, 2.0),
        ];
        let graph = DirectedGraph::compile(&connections, 1, 1).unwrap();
        // After sort: (0 -> 2, w=2.0), (2 -> 1, w=3.0).
        assert!((graph.weights()[0] - 2.0).abs() < 1e-12);
        assert!((graph.weights()[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compile_rejects_negative_id() {
        let connections = vec![WeightedConnection::new(-1, 0, 1.0)];
        let err = DirectedGraph::compile(&connections, 1, 1).unwrap_err();
        assert_eq!(err, GraphError::NegativeNodeId(-1));
    }

    #[test]
    fn test_compile_rejects_duplicate_connection() {
        let connections = vec![
            WeightedConnection::new(0, 1, 1.0),
            WeightedConnection::new(0, 1, 2.0),
        ];
        let err = DirectedGraph::compile(&connections, 1, 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateConnection {
                source: 0,
                target: 1
            }
        );
    }

    #[test]
    fn test_compile_allows_self_loop() {
        let connections = vec![
            WeightedConnection::new(0, 1, 1.0),
            WeightedConnection::new(1, 1, 0.5),
        ];
        let graph = DirectedGraph::compile(&connections, 1, 1).unwrap();
        assert_eq!(graph.connection_count(), 2);
    }

    #[test]
    fn test_compile_empty_connection_list() {
        let graph = DirectedGraph::compile(&[], 3, 2).unwrap();
        assert_eq!(graph.total_node_count(), 5);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_outgoing_offsets() {
        let connections = vec![
            WeightedConnection::new(0, 2, 1.0),
            WeightedConnection::new(0, 3, 1.0),
            WeightedConnection::new(1, 3, 1.0),
        ];
        let graph = DirectedGraph::compile(&connections, 2, 2).unwrap();
        let offsets = graph.outgoing_offsets();
        assert_eq!(offsets, vec![0, 2, 3, 3, 3]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let connections = vec![
            WeightedConnection::new(0, 17, 0.25),
            WeightedConnection::new(17, 1, -0.75),
        ];
        let graph = DirectedGraph::compile(&connections, 1, 1).unwrap();
        let json = serde_json::to_string(&graph).expect("Serialization failed");
        let restored: DirectedGraph = serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(restored.total_node_count(), graph.total_node_count());
        assert_eq!(restored.source_ids(), graph.source_ids());
        assert_eq!(restored.target_ids(), graph.target_ids());
    }

    #[test]
    fn test_error_display() {
        let err = GraphError::CycleDetected;
        assert!(err.to_string().contains("cycle"));
        let err = GraphError::NegativeNodeId(-3);
        assert!(err.to_string().contains("negative"));
        let err = GraphError::DuplicateConnection {
            source: 2,
            target: 5,
        };
        assert!(err.to_string().contains("duplicate"));
    }
}
