//! Single-pass activation engine for acyclic networks.
//!
//! The layer-sorted graph guarantees that by the time a depth level's nodes
//! are activated, every connection feeding them has already been applied, so
//! one forward sweep computes the whole network and each node is activated
//! at most once. This is the engine an evolutionary run spends nearly all of
//! its time in.

use std::mem;
use std::sync::Arc;

use crate::acyclic::AcyclicDirectedGraph;
use crate::activation::Activation;
use crate::blackbox::BlackBox;
use crate::pool;

/// Activation engine for a layer-sorted acyclic graph.
///
/// Holds a single pooled buffer of `total_node_count` signals. Inputs occupy
/// `[0, input_count)`; output nodes are scattered by the depth sort and read
/// through the graph's output index table.
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    graph: Arc<AcyclicDirectedGraph>,
    activation: Activation,
    activations: Vec<f64>,
}

impl FeedForwardNetwork {
    /// Create an engine over `graph`.
    #[must_use]
    pub fn new(graph: impl Into<Arc<AcyclicDirectedGraph>>, activation: Activation) -> Self {
        let graph = graph.into();
        let node_count = graph.total_node_count();
        Self {
            graph,
            activation,
            activations: pool::acquire(node_count),
        }
    }

    /// The compiled graph this engine runs.
    #[must_use]
    pub fn graph(&self) -> &AcyclicDirectedGraph {
        &self.graph
    }
}

/// Apply the connection span `[start, end)` to the activation buffer.
#[inline]
fn propagate_connections(
    graph: &AcyclicDirectedGraph,
    activations: &mut [f64],
    start: usize,
    end: usize,
) {
    let sources = graph.source_ids();
    let targets = graph.target_ids();
    let weights = graph.weights();

    #[cfg(feature = "simd")]
    {
        use wide::f64x4;

        const LANES: usize = 4;
        let mut i = start;
        // Strip-mine: gather source signals and weights into lanes,
        // multiply vectorized, then scatter-add with a scalar loop; two
        // connections in one block may share a target, so a vector
        // scatter-store would drop additions.
        while i + LANES <= end {
            let gathered = f64x4::from([
                activations[sources[i]],
                activations[sources[i + 1]],
                activations[sources[i + 2]],
                activations[sources[i + 3]],
            ]);
            let w = f64x4::from([weights[i], weights[i + 1], weights[i + 2], weights[i + 3]]);
            let products = (gathered * w).to_array();
            for (lane, product) in products.into_iter().enumerate() {
                activations[targets[i + lane]] += product;
            }
            i += LANES;
        }
        for c in i..end {
            let signal = activations[sources[c]] * weights[c];
            activations[targets[c]] += signal;
        }
    }

    #[cfg(not(feature = "simd"))]
    for c in start..end {
        let signal = activations[sources[c]] * weights[c];
        activations[targets[c]] += signal;
    }
}

impl BlackBox for FeedForwardNetwork {
    fn input_count(&self) -> usize {
        self.graph.input_count()
    }

    fn output_count(&self) -> usize {
        self.graph.output_count()
    }

    fn input_mut(&mut self) -> &mut [f64] {
        let input_count = self.graph.input_count();
        &mut self.activations[..input_count]
    }

    fn activate(&mut self) {
        let input_count = self.graph.input_count();
        let graph_depth = self.graph.graph_depth();

        // Clear non-input slots at entry rather than on exit, so outputs
        // stay readable between calls.
        self.activations[input_count..].fill(0.0);

        let mut conn_cursor = 0usize;
        let mut node_cursor = self.graph.layer_boundaries()[0].end_node_idx;
        for layer in 0..graph_depth - 1 {
            let conn_end = self.graph.layer_boundaries()[layer].end_connection_idx;
            propagate_connections(&self.graph, &mut self.activations, conn_cursor, conn_end);
            conn_cursor = conn_end;

            let node_end = self.graph.layer_boundaries()[layer + 1].end_node_idx;
            self.activation
                .apply_range(&mut self.activations, node_cursor, node_end);
            node_cursor = node_end;
        }
    }

    fn output(&self, idx: usize) -> f64 {
        self.activations[self.graph.output_node_indices()[idx]]
    }

    /// No-op: `activate` unconditionally clears non-input state at entry,
    /// so there is never hidden state to erase.
    fn reset_state(&mut self) {}
}

impl Drop for FeedForwardNetwork {
    fn drop(&mut self) {
        pool::release(mem::take(&mut self.activations));
    }
}
