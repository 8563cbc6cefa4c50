//! Layer-sorted runtime graph for feedforward networks.
//!
//! The feedforward engine wants to touch nodes and connections exactly once,
//! front to back. To make that a pair of linear scans, the acyclic builder
//! renumbers nodes so indices are non-decreasing in depth, re-sorts
//! connections so source depth is non-decreasing, and records the layer
//! boundaries of both arrays. After this pass the activation loop carries no
//! per-node bookkeeping at all.

use crate::connection::WeightedConnection;
use crate::depth::{compute_depths, DepthInfo};
use crate::graph::{DirectedGraph, GraphError};

/// Exclusive end indices of one depth level in the node and connection
/// arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerBoundary {
    /// First node index at a depth greater than this layer's.
    pub end_node_idx: usize,
    /// First connection index whose source node is deeper than this layer.
    pub end_connection_idx: usize,
}

/// A compiled directed acyclic graph sorted by node depth.
///
/// Extends the cyclic form with depth metadata: node indices are
/// non-decreasing in depth (inputs keep `[0, input_count)`, they are all at
/// depth 0), connections are ordered by source depth, and
/// [`Self::layer_boundaries`] marks where each depth level ends in both
/// arrays. Output nodes are reordered along with everything else; their new
/// positions are recorded in [`Self::output_node_indices`].
///
/// Immutable after construction and safely shareable across threads.
#[derive(Debug, Clone)]
pub struct AcyclicDirectedGraph {
    input_count: usize,
    output_count: usize,
    total_node_count: usize,
    source_ids: Vec<usize>,
    target_ids: Vec<usize>,
    weights: Vec<f64>,
    node_depths: Vec<usize>,
    graph_depth: usize,
    layer_boundaries: Vec<LayerBoundary>,
    output_node_indices: Vec<usize>,
}

impl AcyclicDirectedGraph {
    /// Compile a cyclic-form graph into the layer-sorted feedforward form.
    ///
    /// Runs depth analysis, then:
    /// 1. stable-sorts non-input nodes by ascending depth (ties keep their
    ///    pre-sort relative order, which makes the build deterministic),
    /// 2. remaps every connection endpoint through the new numbering,
    /// 3. re-sorts connections by `(source, target)` (depth-monotone by
    ///    construction since node indices now follow depth), carrying the
    ///    permutation into the weight array,
    /// 4. walks nodes and connections once in lock-step to record the layer
    ///    boundary table.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if depth analysis finds a back
    /// edge.
    pub fn compile(graph: &DirectedGraph) -> Result<Self, GraphError> {
        let DepthInfo {
            node_depths,
            graph_depth,
        } = compute_depths(graph)?;

        let input_count = graph.input_count();
        let output_count = graph.output_count();
        let total_node_count = graph.total_node_count();

        // Inputs are all at depth 0 and keep their indices; only the rest
        // are reordered. `sort_by_key` is stable, which the determinism of
        // the whole build rests on.
        let mut node_order: Vec<usize> = (input_count..total_node_count).collect();
        node_order.sort_by_key(|&n| node_depths[n]);

        let mut new_id_by_old_id = vec![0usize; total_node_count];
        for (i, id) in new_id_by_old_id.iter_mut().enumerate().take(input_count) {
            *id = i;
        }
        for (position, &old_id) in node_order.iter().enumerate() {
            new_id_by_old_id[old_id] = input_count + position;
        }

        // Depths re-indexed by the new numbering.
        let mut sorted_depths = vec![0usize; total_node_count];
        for old_id in 0..total_node_count {
            sorted_depths[new_id_by_old_id[old_id]] = node_depths[old_id];
        }

        // Remap and re-sort connections, carrying the permutation so weights
        // follow their connections.
        let connection_count = graph.connection_count();
        let mut order: Vec<usize> = (0..connection_count).collect();
        let remapped_source: Vec<usize> = graph
            .source_ids()
            .iter()
            .map(|&s| new_id_by_old_id[s])
            .collect();
        let remapped_target: Vec<usize> = graph
            .target_ids()
            .iter()
            .map(|&t| new_id_by_old_id[t])
            .collect();
        order.sort_by_key(|&c| (remapped_source[c], remapped_target[c]));

        let mut source_ids = Vec::with_capacity(connection_count);
        let mut target_ids = Vec::with_capacity(connection_count);
        let mut weights = Vec::with_capacity(connection_count);
        for &c in &order {
            source_ids.push(remapped_source[c]);
            target_ids.push(remapped_target[c]);
            weights.push(graph.weights()[c]);
        }

        let output_node_indices: Vec<usize> = (input_count..input_count + output_count)
            .map(|old_id| new_id_by_old_id[old_id])
            .collect();

        // One lock-step walk over both sorted arrays yields the per-depth
        // end indices.
        let mut layer_boundaries = Vec::with_capacity(graph_depth);
        let mut node_cursor = 0usize;
        let mut conn_cursor = 0usize;
        for current_depth in 0..graph_depth {
            while node_cursor < total_node_count && sorted_depths[node_cursor] == current_depth {
                node_cursor += 1;
            }
            while conn_cursor < connection_count
                && sorted_depths[source_ids[conn_cursor]] == current_depth
            {
                conn_cursor += 1;
            }
            layer_boundaries.push(LayerBoundary {
                end_node_idx: node_cursor,
                end_connection_idx: conn_cursor,
            });
        }

        Ok(Self {
            input_count,
            output_count,
            total_node_count,
            source_ids,
            target_ids,
            weights,
            node_depths: sorted_depths,
            graph_depth,
            layer_boundaries,
            output_node_indices,
        })
    }

    /// Compile straight from a sparse connection list.
    ///
    /// Convenience for the common genome-to-phenome path; equivalent to
    /// [`DirectedGraph::compile`] followed by [`Self::compile`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NegativeNodeId`] or
    /// [`GraphError::DuplicateConnection`] for contract violations in the
    /// connection list and [`GraphError::CycleDetected`] for cycles.
    pub fn compile_connections(
        connections: &[WeightedConnection],
        input_count: usize,
        output_count: usize,
    ) -> Result<Self, GraphError> {
        let graph = DirectedGraph::compile(connections, input_count, output_count)?;
        Self::compile(&graph)
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

    /// Total number of nodes.
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

    /// Source index per connection, in layer order.
    #[inline]
    #[must_use]
    pub fn source_ids(&self) -> &[usize] {
        &self.source_ids
    }

    /// Target index per connection, parallel to [`Self::source_ids`].
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

    /// Longest-path depth per node, indexed by the layer-sorted numbering.
    /// Non-decreasing over node indices.
    #[inline]
    #[must_use]
    pub fn node_depths(&self) -> &[usize] {
        &self.node_depths
    }

    /// Number of depth levels (deepest node depth plus one).
    #[inline]
    #[must_use]
    pub const fn graph_depth(&self) -> usize {
        self.graph_depth
    }

    /// Per-depth end indices into the node and connection arrays; one entry
    /// per depth level.
    #[inline]
    #[must_use]
    pub fn layer_boundaries(&self) -> &[LayerBoundary] {
        &self.layer_boundaries
    }

    /// Layer-sorted index of each output node, in genome output order.
    #[inline]
    #[must_use]
    pub fn output_node_indices(&self) -> &[usize] {
        &self.output_node_indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(conns: &[WeightedConnection], inputs: usize, outputs: usize) -> AcyclicDirectedGraph {
        AcyclicDirectedGraph::compile_connections(conns, inputs, outputs).unwrap()
    }

    #[test]
    fn test_node_depths_non_decreasing() {
        let graph = compile(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(1, 10, 1.0),
                WeightedConnection::new(10, 11, 1.0),
                WeightedConnection::new(0, 11, 1.0),
                WeightedConnection::new(11, 2, 1.0),
            ],
            2,
            1,
        );
        for pair in graph.node_depths().windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_connections_depth_increasing() {
        let graph = compile(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(10, 1, 1.0),
                WeightedConnection::new(0, 1, 1.0),
            ],
            1,
            1,
        );
        for i in 0..graph.connection_count() {
            let s = graph.source_ids()[i];
            let t = graph.target_ids()[i];
            assert!(graph.node_depths()[t] > graph.node_depths()[s]);
        }
    }

    #[test]
    fn test_output_scatter_indices() {
        // Output (old ID 2) ends up behind the depth-1 hidden nodes.
        let graph = compile(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(1, 11, 1.0),
                WeightedConnection::new(10, 2, 1.0),
                WeightedConnection::new(11, 2, 1.0),
            ],
            2,
            1,
        );
        assert_eq!(graph.output_node_indices(), &[4]);
        assert_eq!(graph.node_depths()[4], 2);
    }

    #[test]
    fn test_stable_sort_preserves_same_depth_order() {
        // Hidden IDs 10 and 11 both at depth 1: compaction ordered them
        // 3 then 4 in the cyclic graph, and the depth sort must not swap
        // them.
        let graph = compile(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(0, 11, 1.0),
                WeightedConnection::new(10, 1, 1.0),
                WeightedConnection::new(11, 1, 1.0),
            ],
            1,
            1,
        );
        // New order: input 0, then 10 (old 2), 11 (old 3), then output.
        // Connections from the input keep target order 10 before 11.
        assert_eq!(graph.source_ids()[0], 0);
        assert_eq!(graph.source_ids()[1], 0);
        assert!(graph.target_ids()[0] < graph.target_ids()[1]);
    }

    #[test]
    fn test_layer_boundaries_cover_arrays() {
        let graph = compile(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(1, 10, 1.0),
                WeightedConnection::new(10, 11, 1.0),
                WeightedConnection::new(1, 11, 1.0),
                WeightedConnection::new(11, 2, 1.0),
                WeightedConnection::new(10, 2, 1.0),
            ],
            2,
            1,
        );
        let boundaries = graph.layer_boundaries();
        assert_eq!(boundaries.len(), graph.graph_depth());

        let last = boundaries.last().unwrap();
        assert_eq!(last.end_node_idx, graph.total_node_count());
        assert_eq!(last.end_connection_idx, graph.connection_count());

        // Per-layer spans partition both arrays.
        let mut prev = LayerBoundary {
            end_node_idx: 0,
            end_connection_idx: 0,
        };
        let mut node_total = 0;
        let mut conn_total = 0;
        for &b in boundaries {
            assert!(b.end_node_idx >= prev.end_node_idx);
            assert!(b.end_connection_idx >= prev.end_connection_idx);
            node_total += b.end_node_idx - prev.end_node_idx;
            conn_total += b.end_connection_idx - prev.end_connection_idx;
            prev = b;
        }
        assert_eq!(node_total, graph.total_node_count());
        assert_eq!(conn_total, graph.connection_count());
    }

    #[test]
    fn test_cycle_rejected() {
        let result = AcyclicDirectedGraph::compile_connections(
            &[
                WeightedConnection::new(0, 10, 1.0),
                WeightedConnection::new(10, 11, 1.0),
                WeightedConnection::new(11, 10, 1.0),
                WeightedConnection::new(11, 1, 1.0),
            ],
            1,
            1,
        );
        assert_eq!(result.unwrap_err(), GraphError::CycleDetected);
    }

    #[test]
    fn test_weights_follow_connections_through_reorder() {
        // Give every connection a distinct weight and check each survives
        // next to its endpoints.
        let conns = [
            WeightedConnection::new(0, 10, 0.1),
            WeightedConnection::new(10, 2, 0.2),
            WeightedConnection::new(1, 2, 0.3),
            WeightedConnection::new(1, 10, 0.4),
        ];
        let graph = compile(&conns, 2, 1);
        // Old IDs: inputs 0/1, output 2, hidden 10 -> depth 1, output depth 2.
        // For each compiled connection, find the original by weight and check
        // endpoints map consistently.
        for i in 0..graph.connection_count() {
            let w = graph.weights()[i];
            let s = graph.source_ids()[i];
            let t = graph.target_ids()[i];
            if (w - 0.2).abs() < 1e-12 {
                // hidden -> output
                assert_eq!(graph.node_depths()[s], 1);
                assert_eq!(t, graph.output_node_indices()[0]);
            } else if (w - 0.3).abs() < 1e-12 {
                // input 1 -> output
                assert_eq!(s, 1);
                assert_eq!(t, graph.output_node_indices()[0]);
            }
        }
    }
}
