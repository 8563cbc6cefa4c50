//! Activation functions for compiled phenomes.
//!
//! Each network instance carries exactly one activation function, applied
//! elementwise to pre-activation sums. The steep logistic variant uses the
//! classic NEAT slope of 4.9, which sharpens the transition region enough for
//! near-binary gating while remaining differentiable.

use serde::{Deserialize, Serialize};

/// Activation function types supported by phenome networks.
///
/// The function is fixed per network instance at construction time; there is
/// no per-node dispatch in the activation hot loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    /// Steep logistic sigmoid: `f(x) = 1 / (1 + e^(-4.9x))`. The canonical
    /// NEAT activation; output in `(0, 1)`.
    #[default]
    SteepLogistic,
    /// Plain logistic sigmoid: `f(x) = 1 / (1 + e^(-x))`.
    Logistic,
    /// Hyperbolic tangent: `f(x) = tanh(x)`; bipolar output in `(-1, 1)`.
    Tanh,
    /// Rectified Linear Unit: `f(x) = max(0, x)`.
    ReLU,
    /// Leaky ReLU: `f(x) = x` if `x > 0` else `0.01x`.
    LeakyReLU,
    /// Identity function: `f(x) = x`.
    Identity,
}

impl Activation {
    /// All available activation functions.
    pub const ALL: [Self; 6] = [
        Self::SteepLogistic,
        Self::Logistic,
        Self::Tanh,
        Self::ReLU,
        Self::LeakyReLU,
        Self::Identity,
    ];

    /// Apply this activation function to a single value.
    ///
    /// NaN inputs propagate as NaN; infinities saturate where the function is
    /// bounded. Non-finite signals are not an error anywhere in the engine,
    /// they simply flow through into the fitness.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::SteepLogistic => 1.0 / (1.0 + (-4.9 * x).exp()),
            Self::Logistic => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            // Written as a comparison rather than `max` so NaN falls through.
            Self::ReLU => {
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
            Self::LeakyReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            Self::Identity => x,
        }
    }

    /// Apply this activation function in place over `buffer[start..end]`.
    ///
    /// The variant is matched once so the inner loops stay free of dispatch.
    pub fn apply_range(self, buffer: &mut [f64], start: usize, end: usize) {
        let slice = &mut buffer[start..end];
        match self {
            Self::SteepLogistic => {
                for v in slice {
                    *v = 1.0 / (1.0 + (-4.9 * *v).exp());
                }
            }
            Self::Logistic => {
                for v in slice {
                    *v = 1.0 / (1.0 + (-*v).exp());
                }
            }
            Self::Tanh => {
                for v in slice {
                    *v = v.tanh();
                }
            }
            Self::ReLU => {
                for v in slice {
                    if *v < 0.0 {
                        *v = 0.0;
                    }
                }
            }
            Self::LeakyReLU => {
                for v in slice {
                    if *v <= 0.0 {
                        *v *= 0.01;
                    }
                }
            }
            Self::Identity => {}
        }
    }

    /// The codomain of this activation function.
    ///
    /// Used by bounded output views to pick a clamp range that matches the
    /// activation convention.
    #[must_use]
    pub const fn output_range(self) -> (f64, f64) {
        match self {
            Self::SteepLogistic | Self::Logistic => (0.0, 1.0),
            Self::Tanh => (-1.0, 1.0),
            Self::ReLU => (0.0, f64::INFINITY),
            Self::LeakyReLU | Self::Identity => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}
