//! Genome-side connection representation.
//!
//! A genome describes a network as a flat list of weighted connections over
//! sparse, historically-assigned node IDs. [`WeightedConnection`] is the sole
//! input to graph compilation; everything downstream works on dense indices.

use serde::{Deserialize, Serialize};

/// A weighted directed connection between two genome node IDs.
///
/// Node IDs are sparse non-negative integers: they accrete over an
/// evolutionary run and carry gaps. Input IDs occupy `[0, input_count)`,
/// output IDs `[input_count, input_count + output_count)`, and hidden IDs are
/// arbitrary IDs above that range. Self-loops are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedConnection {
    /// ID of the node the signal leaves from.
    pub source_id: i32,
    /// ID of the node the signal arrives at.
    pub target_id: i32,
    /// Signal multiplier. Weights are set by the evolutionary layer and are
    /// immutable once the connection reaches graph compilation.
    pub weight: f64,
}

impl WeightedConnection {
    /// Create a new connection.
    #[must_use]
    pub const fn new(source_id: i32, target_id: i32, weight: f64) -> Self {
        Self {
            source_id,
            target_id,
            weight,
        }
    }

    /// Sort key used everywhere a connection list needs a canonical order.
    #[inline]
    #[must_use]
    pub const fn sort_key(&self) -> (i32, i32) {
        (self.source_id, self.target_id)
    }
}
