//! Task evaluators: drive a black box through a scenario, return a fitness.
//!
//! Evaluators are the bridge between the activation engines and the
//! surrounding evolutionary algorithm. Each one implements a single
//! operation (given a network, produce a non-negative fitness score) and
//! none of them can fail: a degenerate or diverging network simply scores
//! low. NaN outputs fall through comparisons and clamps and end up scoring
//! nothing, which is exactly the selection pressure they deserve.

use serde::{Deserialize, Serialize};

use crate::blackbox::BlackBox;

/// Assigns a fitness score to a phenome.
///
/// Implementations are stateless with respect to the box beyond driving it;
/// they reset it as needed and never leave an error behind.
pub trait PhenomeEvaluator {
    /// Drive `net` through the task and score it. Higher is better; scores
    /// are non-negative.
    fn evaluate(&self, net: &mut dyn BlackBox) -> f64;
}

// ---------------------------------------------------------------------------
// Single-pole balancing
// ---------------------------------------------------------------------------

const GRAVITY: f64 = 9.8;
const MASS_CART: f64 = 1.0;
const MASS_POLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASS_CART + MASS_POLE;
const POLE_HALF_LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = MASS_POLE * POLE_HALF_LENGTH;
const FORCE_MAGNITUDE: f64 = 10.0;
const TIME_DELTA: f64 = 0.02;
const FOUR_THIRDS: f64 = 4.0 / 3.0;
/// Pole angle scale used for the network input; also the default failure
/// threshold (pi / 15 rad, twelve degrees).
const TWELVE_DEGREES: f64 = std::f64::consts::PI / 15.0;

/// Cart-pole system state: cart position and velocity, pole angle and
/// angular velocity. Angle 0 is upright; position 0 is the track center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartPoleState {
    /// Cart position on the track, meters.
    pub cart_position: f64,
    /// Cart velocity, m/s.
    pub cart_velocity: f64,
    /// Pole angle from vertical, radians.
    pub pole_angle: f64,
    /// Pole angular velocity, rad/s.
    pub pole_angular_velocity: f64,
}

/// Configuration for the single-pole balancing task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinglePoleBalancingConfig {
    /// Simulation length cap in timesteps.
    pub max_timesteps: usize,
    /// The cart fails when `|cart_position|` exceeds this, meters.
    pub track_length_threshold: f64,
    /// The pole fails when `|pole_angle|` exceeds this, radians.
    pub pole_angle_threshold: f64,
    /// State the simulation starts from.
    pub initial_state: CartPoleState,
}

impl Default for SinglePoleBalancingConfig {
    fn default() -> Self {
        Self {
            max_timesteps: 200_000,
            track_length_threshold: 2.4,
            pole_angle_threshold: TWELVE_DEGREES,
            initial_state: CartPoleState::default(),
        }
    }
}

/// Single-pole balancing evaluator.
///
/// Simulates standard cart-pole physics (1 kg cart, 0.1 kg pole of
/// half-length 0.5 m, gravity 9.8 m/s², Euler integration at 0.02 s steps).
/// Per step the network reads five inputs,
/// `[bias, cart_pos / track_threshold, cart_vel, pole_angle / twelve_degrees,
/// pole_ang_vel]`, and its single output maps to a horizontal force of
/// `clamp(output - 0.5, -1, 1) * 10 N`.
///
/// Fitness is the number of balanced timesteps plus a centering bonus of
/// `(track_threshold - |cart_pos|) * 5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePoleBalancingEvaluator {
    config: SinglePoleBalancingConfig,
}

impl SinglePoleBalancingEvaluator {
    /// Create an evaluator with the given task configuration.
    #[must_use]
    pub const fn new(config: SinglePoleBalancingConfig) -> Self {
        Self { config }
    }

    /// The task configuration.
    #[must_use]
    pub const fn config(&self) -> &SinglePoleBalancingConfig {
        &self.config
    }
}

/// One Euler step of the cart-pole dynamics under `force`.
fn simulate_timestep(state: &mut CartPoleState, force: f64) {
    let cos_theta = state.pole_angle.cos();
    let sin_theta = state.pole_angle.sin();

    let temp = (force + POLE_MASS_LENGTH * state.pole_angular_velocity.powi(2) * sin_theta)
        / TOTAL_MASS;
    let angular_accel = (GRAVITY * sin_theta - cos_theta * temp)
        / (POLE_HALF_LENGTH * (FOUR_THIRDS - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
    let linear_accel = temp - POLE_MASS_LENGTH * angular_accel * cos_theta / TOTAL_MASS;

    state.cart_position += TIME_DELTA * state.cart_velocity;
    state.cart_velocity += TIME_DELTA * linear_accel;
    state.pole_angle += TIME_DELTA * state.pole_angular_velocity;
    state.pole_angular_velocity += TIME_DELTA * angular_accel;
}

impl PhenomeEvaluator for SinglePoleBalancingEvaluator {
    fn evaluate(&self, net: &mut dyn BlackBox) -> f64 {
        let cfg = &self.config;
        let mut state = cfg.initial_state;

        net.reset_state();

        let mut timestep = 0;
        while timestep < cfg.max_timesteps {
            net.set_inputs(&[
                1.0, // bias
                state.cart_position / cfg.track_length_threshold,
                state.cart_velocity,
                state.pole_angle / TWELVE_DEGREES,
                state.pole_angular_velocity,
            ]);
            net.activate();

            let force = (net.output(0) - 0.5).clamp(-1.0, 1.0) * FORCE_MAGNITUDE;
            simulate_timestep(&mut state, force);
            timestep += 1;

            if state.cart_position.abs() > cfg.track_length_threshold
                || state.pole_angle.abs() > cfg.pole_angle_threshold
            {
                break;
            }
        }

        let centering_bonus =
            (cfg.track_length_threshold - state.cart_position.abs()).max(0.0) * 5.0;
        timestep as f64 + centering_bonus
    }
}

// ---------------------------------------------------------------------------
// Truth tables
// ---------------------------------------------------------------------------

/// One truth-table case: an input vector (bias included) and the sign of the
/// correct response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTableCase {
    /// Signals written to the input vector, bias first.
    pub inputs: Vec<f64>,
    /// Expected response sign: positive or negative.
    pub expected: f64,
}

/// Truth-table evaluator for binary logic tasks.
///
/// Iterates every case of the table: resets the box, writes the case's
/// inputs, activates, and scores the single output `y` with a continuous
/// reward: `0.75 + 0.5*y - 0.25*y²` when the expected response is positive,
/// mirrored when negative. Each case contributes at most 1 (exact response)
/// and at least 0; a bonus of 10 is added when every response has the
/// correct sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTableEvaluator {
    cases: Vec<TruthTableCase>,
}

impl TruthTableEvaluator {
    /// Fitness bonus granted when all responses have the correct sign.
    pub const ALL_CORRECT_BONUS: f64 = 10.0;

    /// Create an evaluator over an explicit case table.
    #[must_use]
    pub fn new(cases: Vec<TruthTableCase>) -> Self {
        Self { cases }
    }

    /// The bipolar XOR task: inputs `{-1, 1}²` with a leading bias of 1,
    /// expected response positive exactly when the inputs differ.
    #[must_use]
    pub fn xor() -> Self {
        let cases = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)]
            .into_iter()
            .map(|(a, b)| TruthTableCase {
                inputs: vec![1.0, a, b],
                expected: if (a > 0.0) != (b > 0.0) { 1.0 } else { -1.0 },
            })
            .collect();
        Self::new(cases)
    }

    /// The bipolar binary 6-multiplexer: two address lines select one of
    /// four data lines. Inputs are `[bias, a1, a0, d0, d1, d2, d3]` over all
    /// 64 combinations; the expected response is the selected data line.
    #[must_use]
    pub fn six_multiplexer() -> Self {
        let bit = |pattern: usize, n: usize| -> f64 {
            if pattern & (1 << n) != 0 {
                1.0
            } else {
                -1.0
            }
        };
        let cases = (0..64)
            .map(|pattern| {
                let a1 = bit(pattern, 5);
                let a0 = bit(pattern, 4);
                let data = [
                    bit(pattern, 0),
                    bit(pattern, 1),
                    bit(pattern, 2),
                    bit(pattern, 3),
                ];
                let address = (usize::from(a1 > 0.0) << 1) | usize::from(a0 > 0.0);
                TruthTableCase {
                    inputs: vec![1.0, a1, a0, data[0], data[1], data[2], data[3]],
                    expected: data[address],
                }
            })
            .collect();
        Self::new(cases)
    }

    /// The case table.
    #[must_use]
    pub fn cases(&self) -> &[TruthTableCase] {
        &self.cases
    }
}

impl PhenomeEvaluator for TruthTableEvaluator {
    fn evaluate(&self, net: &mut dyn BlackBox) -> f64 {
        let mut fitness = 0.0;
        let mut all_correct = true;

        for case in &self.cases {
            net.reset_state();
            net.set_inputs(&case.inputs);
            net.activate();
            let y = net.output(0);

            let reward = if case.expected > 0.0 {
                0.75 + 0.5 * y - 0.25 * y * y
            } else {
                0.75 - 0.5 * y - 0.25 * y * y
            };
            // NaN rewards contribute nothing; max() discards them along with
            // negative overshoot from unbounded activations.
            fitness += reward.max(0.0);

            let correct = (y > 0.0) == (case.expected > 0.0);
            if !correct || y.is_nan() {
                all_correct = false;
            }
        }

        if all_correct {
            fitness += Self::ALL_CORRECT_BONUS;
        }
        fitness
    }
}
