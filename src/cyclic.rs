//! Fixed-iteration activation engine for cyclic networks.
//!
//! Recurrent topologies have no evaluation order, so the engine settles the
//! network by brute force: a fixed number of whole-graph propagation passes,
//! each accumulating weighted signals into a pre-activation buffer and then
//! activating every non-input node. Recurrent state lives in the
//! post-activation buffer between calls, which is what gives these networks
//! memory across activations.

use std::mem;
use std::sync::Arc;

use crate::activation::Activation;
use crate::blackbox::{BlackBox, Bounding};
use crate::graph::DirectedGraph;
use crate::pool;

/// Activation engine for a (possibly) cyclic compiled graph.
///
/// Holds two pooled buffers of `total_node_count` signals: `pre` collects
/// weighted sums during a pass, `post` holds activation levels. The caller's
/// input signals sit in `post[0..input_count)` and are never overwritten by
/// the engine; outputs are read from the contiguous range that follows.
#[derive(Debug, Clone)]
pub struct CyclicNetwork {
    graph: Arc<DirectedGraph>,
    activation: Activation,
    activation_count: usize,
    bounding: Bounding,
    pre: Vec<f64>,
    post: Vec<f64>,
}

impl CyclicNetwork {
    /// Create an engine over `graph`.
    ///
    /// `activation_count` is the number of whole-graph propagation passes
    /// per [`BlackBox::activate`] call; for an acyclic graph it needs to be
    /// at least the graph depth for signals to reach the outputs.
    #[must_use]
    pub fn new(
        graph: impl Into<Arc<DirectedGraph>>,
        activation: Activation,
        activation_count: usize,
    ) -> Self {
        let graph = graph.into();
        let node_count = graph.total_node_count();
        Self {
            graph,
            activation,
            activation_count,
            bounding: Bounding::None,
            pre: pool::acquire(node_count),
            post: pool::acquire(node_count),
        }
    }

    /// Clamp output reads to the given range.
    #[must_use]
    pub fn with_bounding(mut self, bounding: Bounding) -> Self {
        self.bounding = bounding;
        self
    }

    /// The compiled graph this engine runs.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    /// Number of propagation passes per activation.
    #[must_use]
    pub const fn activation_count(&self) -> usize {
        self.activation_count
    }
}

impl BlackBox for CyclicNetwork {
    fn input_count(&self) -> usize {
        self.graph.input_count()
    }

    fn output_count(&self) -> usize {
        self.graph.output_count()
    }

    fn input_mut(&mut self) -> &mut [f64] {
        &mut self.post[..self.graph.input_count()]
    }

    fn activate(&mut self) {
        let sources = self.graph.source_ids();
        let targets = self.graph.target_ids();
        let weights = self.graph.weights();
        let input_count = self.graph.input_count();
        let node_count = self.graph.total_node_count();

        for _ in 0..self.activation_count {
            // Accumulate weighted signals. Connection order is the sorted
            // order from compilation, so reads of `post` walk forward.
            for i in 0..sources.len() {
                let signal = self.post[sources[i]] * weights[i];
                self.pre[targets[i]] += signal;
            }

            // Activate every non-input node from its accumulated sum, then
            // clear the sums for the next pass. Input slots of `pre` are
            // never read and stay untouched.
            self.post[input_count..node_count]
                .copy_from_slice(&self.pre[input_count..node_count]);
            self.activation
                .apply_range(&mut self.post, input_count, node_count);
            self.pre[input_count..node_count].fill(0.0);
        }
    }

    fn output(&self, idx: usize) -> f64 {
        assert!(
            idx < self.graph.output_count(),
            "Output index {} out of bounds for network with {} outputs",
            idx,
            self.graph.output_count()
        );
        self.bounding
            .clamp(self.post[self.graph.input_count() + idx])
    }

    fn reset_state(&mut self) {
        let input_count = self.graph.input_count();
        self.pre[input_count..].fill(0.0);
        self.post[input_count..].fill(0.0);
    }
}

impl Drop for CyclicNetwork {
    fn drop(&mut self) {
        pool::release(mem::take(&mut self.pre));
        pool::release(mem::take(&mut self.post));
    }
}
