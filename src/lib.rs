//! # Symbios Phenome
//!
//! The phenome evaluation core of a NEAT (`NeuroEvolution` of Augmenting
//! Topologies) system: compile a genome's connection list into a compact
//! runtime graph, propagate signals through it, and score the result
//! against a task. An evolutionary loop evaluates millions of networks, so
//! everything here is built around flat arrays, dense indices, and pooled
//! buffers.
//!
//! ## Features
//!
//! - **Sparse-to-Dense Compilation**: genomes carry sparse historical node
//!   IDs; [`DirectedGraph::compile`] renumbers them into a contiguous index
//!   space and sorts connections for sequential memory access
//! - **Two Engines, One Facade**: cyclic networks settle by fixed-iteration
//!   propagation ([`CyclicNetwork`]), acyclic networks run a single
//!   layer-by-layer pass ([`FeedForwardNetwork`]); evaluators see only the
//!   [`BlackBox`] trait
//! - **Depth-Sorted Feedforward Form**: [`AcyclicDirectedGraph`] re-indexes
//!   nodes by longest-path depth so activation is two linear scans with no
//!   per-node bookkeeping
//! - **Pooled Activation Buffers**: engine state is recycled thread-locally
//!   to keep allocator pressure out of the evolutionary loop
//! - **Task Evaluators**: single-pole balancing physics and truth-table
//!   scoring ([`SinglePoleBalancingEvaluator`], [`TruthTableEvaluator`])
//!
//! ## Quick Start
//!
//! ```rust
//! use symbios_phenome::{
//!     Activation, BlackBox, CyclicNetwork, DirectedGraph, WeightedConnection,
//! };
//!
//! // Two inputs feeding one output through a single hidden node. Node IDs
//! // are sparse genome IDs: inputs 0-1, output 2, hidden 7.
//! let connections = vec![
//!     WeightedConnection::new(0, 7, 0.9),
//!     WeightedConnection::new(1, 7, 0.9),
//!     WeightedConnection::new(7, 2, 1.3),
//! ];
//! let graph = DirectedGraph::compile(&connections, 2, 1).unwrap();
//!
//! let mut net = CyclicNetwork::new(graph, Activation::SteepLogistic, 2);
//! net.set_inputs(&[1.0, 0.5]);
//! net.activate();
//! let response = net.output(0);
//! assert!(response > 0.0 && response < 1.0);
//! ```
//!
//! ## Choosing an engine
//!
//! Whether a genome is recurrent is decided by the evolutionary layer.
//! Acyclic genomes should always run on [`FeedForwardNetwork`]: each node
//! is activated exactly once per pass, which is the central performance
//! advantage over brute-force settling. [`CyclicNetwork`] handles arbitrary
//! topologies (self-loops and parallel paths included) and carries
//! recurrent state in its post-activation buffer between calls.
//!
//! ## Concurrency
//!
//! Compiled graphs are immutable and safely shareable across threads; wrap
//! one in an [`std::sync::Arc`] and hand it to one engine per worker. An
//! engine instance holds mutable activation state and is single-threaded.
//!
//! ## Feature Flags
//!
//! - `simd`: strip-mined connection propagation in the feedforward engine
//!   via the `wide` crate

pub mod acyclic;
pub mod activation;
pub mod blackbox;
pub mod connection;
pub mod cyclic;
pub mod depth;
pub mod evaluator;
pub mod feedforward;
pub mod graph;

mod pool;

// Re-exports for convenience
pub use acyclic::{AcyclicDirectedGraph, LayerBoundary};
pub use activation::Activation;
pub use blackbox::{BlackBox, Bounding};
pub use connection::WeightedConnection;
pub use cyclic::CyclicNetwork;
pub use depth::{compute_depths, DepthInfo};
pub use evaluator::{
    CartPoleState, PhenomeEvaluator, SinglePoleBalancingConfig, SinglePoleBalancingEvaluator,
    TruthTableCase, TruthTableEvaluator,
};
pub use feedforward::FeedForwardNetwork;
pub use graph::{DirectedGraph, GraphError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engines_share_a_graph_across_threads() {
        use std::sync::Arc;

        let connections = vec![
            WeightedConnection::new(0, 5, 0.4),
            WeightedConnection::new(1, 5, -0.4),
            WeightedConnection::new(5, 2, 1.0),
        ];
        let graph = Arc::new(
            AcyclicDirectedGraph::compile_connections(&connections, 2, 1).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let graph = Arc::clone(&graph);
                std::thread::spawn(move || {
                    let mut net = FeedForwardNetwork::new(graph, Activation::Tanh);
                    net.set_inputs(&[worker as f64, 1.0]);
                    net.activate();
                    net.output(0)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_finite());
        }
    }

    #[test]
    fn test_trait_object_dispatch() {
        let graph = DirectedGraph::compile(&[WeightedConnection::new(0, 1, 1.0)], 1, 1).unwrap();
        let acyclic = AcyclicDirectedGraph::compile(&graph).unwrap();

        let mut boxes: Vec<Box<dyn BlackBox>> = vec![
            Box::new(CyclicNetwork::new(graph, Activation::SteepLogistic, 1)),
            Box::new(FeedForwardNetwork::new(acyclic, Activation::SteepLogistic)),
        ];

        for net in &mut boxes {
            net.set_inputs(&[1.0]);
            net.activate();
        }
        // Same single-connection graph, same activation: identical response
        // through either engine.
        assert!((boxes[0].output(0) - boxes[1].output(0)).abs() < 1e-12);
    }
}
