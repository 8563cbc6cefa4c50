//! The black-box view of an activated network.
//!
//! Evaluators drive phenomes exclusively through this trait: write the input
//! vector, activate, read the output vector. The trait hides whether outputs
//! are contiguous (cyclic engine) or scattered (feedforward engine), and
//! whether reads are clamped.

use serde::{Deserialize, Serialize};

/// Clamp policy applied when reading from a bounded output view.
///
/// Bounding exists to stabilize fitness computation when the paired
/// activation function is unbounded; which range applies depends on the
/// activation convention, so it is configured on the view rather than baked
/// into an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Bounding {
    /// Reads pass through unchanged.
    #[default]
    None,
    /// Reads clamp to `[0, 1]` (logistic convention).
    Unipolar,
    /// Reads clamp to `[-1, 1]` (tanh convention).
    Bipolar,
}

impl Bounding {
    /// Apply this clamp to an output value. NaN passes through: a degenerate
    /// network scores low on its own, it is not an error.
    #[inline]
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::Unipolar => value.clamp(0.0, 1.0),
            Self::Bipolar => value.clamp(-1.0, 1.0),
        }
    }
}

/// A neural network seen only through its input vector, output vector, and
/// activation operation.
///
/// Mis-sized input/output buffers are programming errors and panic; there
/// are no runtime failure modes. One instance holds mutable activation
/// state and is not safe for concurrent use; parallel evaluation creates
/// one instance per worker over a shared immutable graph.
pub trait BlackBox {
    /// Number of input signals the network consumes.
    fn input_count(&self) -> usize;

    /// Number of output signals the network produces.
    fn output_count(&self) -> usize;

    /// Mutable view of the input vector. Values persist across activations
    /// until overwritten by the caller.
    fn input_mut(&mut self) -> &mut [f64];

    /// Copy `inputs` into the input vector.
    ///
    /// # Panics
    ///
    /// Panics if `inputs.len() != self.input_count()`.
    fn set_inputs(&mut self, inputs: &[f64]) {
        assert_eq!(
            inputs.len(),
            self.input_count(),
            "Input length mismatch: expected {}, got {}",
            self.input_count(),
            inputs.len()
        );
        self.input_mut().copy_from_slice(inputs);
    }

    /// Propagate the current input signals through the network.
    fn activate(&mut self);

    /// Read one output signal.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.output_count()`.
    fn output(&self, idx: usize) -> f64;

    /// Copy the output vector into `outputs`.
    ///
    /// # Panics
    ///
    /// Panics if `outputs.len() != self.output_count()`.
    fn read_outputs(&self, outputs: &mut [f64]) {
        assert_eq!(
            outputs.len(),
            self.output_count(),
            "Output length mismatch: expected {}, got {}",
            self.output_count(),
            outputs.len()
        );
        for (i, out) in outputs.iter_mut().enumerate() {
            *out = self.output(i);
        }
    }

    /// Clear hidden and output state so the next activation starts from a
    /// blank network. Input signals are left alone. Callers reset between
    /// independent evaluations; engines never reset implicitly.
    fn reset_state(&mut self);
}
