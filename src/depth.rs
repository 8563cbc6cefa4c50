//! Depth analysis for acyclic networks.
//!
//! A node's depth is the longest path, in connection hops, from any input
//! node to it. Inputs sit at depth 0. The feedforward builder uses depths to
//! order nodes and connections so a single pass activates every node after
//! all of its sources.

use crate::graph::{DirectedGraph, GraphError};

/// Node depths plus the derived layer count for an acyclic graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthInfo {
    /// Longest-path depth per dense node index. Nodes with no path from an
    /// input (including inputs themselves) are at depth 0.
    pub node_depths: Vec<usize>,
    /// Number of distinct depth levels: deepest node depth plus one.
    pub graph_depth: usize,
}

/// Compute longest-path node depths for a graph asserted to be acyclic.
///
/// The traversal is an iterative depth-first descent from each input node in
/// turn, carrying the path depth on an explicit heap stack to tolerate deep
/// graphs. A node is re-expanded only when a strictly deeper path reaches
/// it, so every relaxation raises a recorded depth and the walk terminates
/// on any DAG.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if a relaxation pushes a depth past
/// `total_node_count - 1`, which no simple path can; behavior on cyclic
/// input is otherwise undefined by contract, this is a defensive check.
pub fn compute_depths(graph: &DirectedGraph) -> Result<DepthInfo, GraphError> {
    let node_count = graph.total_node_count();
    let offsets = graph.outgoing_offsets();
    let targets = graph.target_ids();

    let mut node_depths = vec![0usize; node_count];
    // (node, depth reached along the current path)
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(node_count);

    for input in 0..graph.input_count() {
        stack.push((input, 0));

        while let Some((node, depth)) = stack.pop() {
            let candidate = depth + 1;
            for conn in offsets[node]..offsets[node + 1] {
                let target = targets[conn];
                if candidate > node_depths[target] {
                    if candidate >= node_count {
                        return Err(GraphError::CycleDetected);
                    }
                    node_depths[target] = candidate;
                    stack.push((target, candidate));
                }
            }
        }
    }

    let graph_depth = node_depths.iter().max().copied().unwrap_or(0) + 1;
    Ok(DepthInfo {
        node_depths,
        graph_depth,
    })
}
