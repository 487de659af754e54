//! Gain update laws for the AGC loop.
//!
//! Each law consumes one input sample, refreshes the energy estimate and
//! writes a new (unclamped) gain. Laws receive the loop configuration by
//! value and can only mutate [`LoopState`], so target, bandwidth and limits
//! are out of their reach.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use super::math::{Real, energy};
use crate::constants::ENERGY_SMOOTHING;

/// Gain update algorithm, selected when the controller is built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UpdateLaw {
    /// Linear blend of the previous gain and the ideal gain
    Default,
    /// Multiplicative update proportional to the log-domain gain error
    #[default]
    Logarithmic,
    /// Unfiltered instantaneous level with relative over/undershoot steps
    Exponential,
}

/// Mutable estimator and gain memory of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopState<T> {
    /// Current gain
    pub gain: T,
    /// Energy of the last sample seen by the estimator
    pub energy_inst: T,
    /// Square root of the smoothed energy (or of the instantaneous energy
    /// for the exponential law)
    pub energy_smoothed: T,
    /// Smoothing filter memory, in the energy domain
    pub energy_prev: T,
}

/// Read-only loop parameters handed to an update law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopCoefficients<T> {
    pub target_energy: T,
    pub alpha: T,
    pub beta: T,
}

impl UpdateLaw {
    /// All laws, in declaration order.
    pub const ALL: [UpdateLaw; 3] = [
        UpdateLaw::Default,
        UpdateLaw::Logarithmic,
        UpdateLaw::Exponential,
    ];

    /// Run one estimation and gain update step for input `x`.
    #[inline]
    pub fn update<T: Real>(
        self,
        state: &mut LoopState<T>,
        coeffs: LoopCoefficients<T>,
        x: Complex<T>,
    ) {
        match self {
            UpdateLaw::Default => update_default(state, coeffs, x),
            UpdateLaw::Logarithmic => update_logarithmic(state, coeffs, x),
            UpdateLaw::Exponential => update_exponential(state, coeffs, x),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateLaw::Default => "default",
            UpdateLaw::Logarithmic => "logarithmic",
            UpdateLaw::Exponential => "exponential",
        }
    }
}

impl fmt::Display for UpdateLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateLaw {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "linear" => Ok(UpdateLaw::Default),
            "logarithmic" | "log" => Ok(UpdateLaw::Logarithmic),
            "exponential" | "exp" => Ok(UpdateLaw::Exponential),
            _ => Err(format!("invalid update law: {}", s)),
        }
    }
}

/// Exponential moving average of the sample energy shared by the
/// default and logarithmic laws.
#[inline]
fn smooth_energy<T: Real>(state: &mut LoopState<T>, x: Complex<T>) {
    let zeta = T::from_f64(ENERGY_SMOOTHING);
    state.energy_inst = energy(x);
    state.energy_prev = state.energy_inst * zeta + state.energy_prev * (T::one() - zeta);
    state.energy_smoothed = state.energy_prev.sqrt();
}

fn update_default<T: Real>(
    state: &mut LoopState<T>,
    coeffs: LoopCoefficients<T>,
    x: Complex<T>,
) {
    smooth_energy(state, x);

    let gain_ideal = coeffs.target_energy / state.energy_smoothed;
    state.gain = coeffs.beta * state.gain + coeffs.alpha * gain_ideal;
}

fn update_logarithmic<T: Real>(
    state: &mut LoopState<T>,
    coeffs: LoopCoefficients<T>,
    x: Complex<T>,
) {
    smooth_energy(state, x);

    let gain_ideal = coeffs.target_energy / state.energy_smoothed;
    let log_gain_error = gain_ideal.ln() - state.gain.ln();
    state.gain = state.gain * (coeffs.alpha * log_gain_error).exp();
}

fn update_exponential<T: Real>(
    state: &mut LoopState<T>,
    coeffs: LoopCoefficients<T>,
    x: Complex<T>,
) {
    state.energy_inst = energy(x);
    state.energy_smoothed = state.energy_inst.sqrt();

    let target = coeffs.target_energy;
    let level_out = state.energy_smoothed * state.gain;

    if level_out > target {
        state.gain = state.gain * (T::one() - coeffs.beta * (level_out - target) / level_out);
    } else {
        state.gain = state.gain * (T::one() + coeffs.beta * (target - level_out) / target);
    }
}
