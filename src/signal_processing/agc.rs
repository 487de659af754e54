use std::fmt;

use num_complex::Complex;

use super::math::{Real, power_to_db};
use super::update_law::{LoopCoefficients, LoopState, UpdateLaw};
use crate::config::AgcConfig;
use crate::constants::{
    DEFAULT_BANDWIDTH, DEFAULT_GAIN, DEFAULT_GAIN_MAX, DEFAULT_GAIN_MIN, DEFAULT_TARGET_ENERGY,
    INITIAL_ENERGY_ESTIMATE,
};
use crate::error::{GainloopError, Result};

/// Automatic Gain Control (AGC)
///
/// Feedback loop that drives the energy of a complex sample stream toward a
/// target level by adapting a scalar gain, one sample at a time.
///
/// The loop tracks input energy with an exponential smoothing filter and
/// updates the gain with one of three [`UpdateLaw`]s chosen at construction:
/// - Default: linear blend of the previous gain and the ideal gain
/// - Logarithmic: multiplicative step proportional to the log gain error
/// - Exponential: unfiltered level with relative over/undershoot steps
///
/// Loop responsiveness is set by the bandwidth-time product `BT` in
/// `[0, 1]`; `alpha = sqrt(BT)` and `beta = 1 - alpha` are derived from it.
/// Gain is clamped to the configured limits after every update. While
/// locked the gain is frozen and no estimation takes place.
///
/// # Example
/// ```
/// use gainloop::signal_processing::{Agc, UpdateLaw};
/// use num_complex::Complex32;
///
/// let mut agc = Agc::<f32>::with_law(UpdateLaw::Logarithmic);
/// agc.set_bandwidth(0.01).unwrap();
///
/// let y = agc.execute(Complex32::new(0.1, 0.0));
/// assert!(y.re > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Agc<T: Real> {
    law: UpdateLaw,
    target_energy: T,
    gain_min: T,
    gain_max: T,
    bandwidth: T,
    alpha: T,
    beta: T,
    state: LoopState<T>,
    locked: bool,
}

impl<T: Real> Agc<T> {
    /// Create an AGC with default settings and the logarithmic update law.
    pub fn new() -> Self {
        Self::with_law(UpdateLaw::default())
    }

    /// Create an AGC with default settings and the given update law.
    ///
    /// The law cannot be changed after construction.
    pub fn with_law(law: UpdateLaw) -> Self {
        let bandwidth = T::from_f64(DEFAULT_BANDWIDTH);
        let alpha = bandwidth.sqrt();

        Self {
            law,
            target_energy: T::from_f64(DEFAULT_TARGET_ENERGY),
            gain_min: T::from_f64(DEFAULT_GAIN_MIN),
            gain_max: T::from_f64(DEFAULT_GAIN_MAX),
            bandwidth,
            alpha,
            beta: T::one() - alpha,
            state: LoopState {
                gain: T::from_f64(DEFAULT_GAIN),
                energy_inst: T::zero(),
                energy_smoothed: T::from_f64(INITIAL_ENERGY_ESTIMATE),
                energy_prev: T::from_f64(INITIAL_ENERGY_ESTIMATE),
            },
            locked: false,
        }
    }

    /// Build an AGC from configuration, validating every parameter.
    ///
    /// `initial_gain` must be finite and is clamped into the configured limits.
    pub fn from_config(config: &AgcConfig) -> Result<Self> {
        let mut agc = Self::with_law(config.law);
        agc.set_target(T::from_f64(config.target_energy))?;
        agc.set_gain_limits(T::from_f64(config.gain_min), T::from_f64(config.gain_max))?;
        agc.set_bandwidth(T::from_f64(config.bandwidth))?;

        let initial_gain = T::from_f64(config.initial_gain);
        if !initial_gain.is_finite() {
            return Err(GainloopError::InvalidParameter(format!(
                "initial gain must be finite, got {}",
                initial_gain
            )));
        }
        agc.state.gain = initial_gain;
        agc.limit_gain();
        Ok(agc)
    }

    /// Restore the energy estimator to its initial state and unlock.
    ///
    /// Gain and configuration are left untouched.
    pub fn reset(&mut self) {
        self.state.energy_prev = T::from_f64(INITIAL_ENERGY_ESTIMATE);
        self.state.energy_smoothed = T::from_f64(INITIAL_ENERGY_ESTIMATE);
        self.unlock();
        log::debug!("AGC reset (gain held at {})", self.state.gain);
    }

    /// Set the target output energy. Must be strictly positive.
    pub fn set_target(&mut self, target_energy: T) -> Result<()> {
        if !(target_energy > T::zero()) {
            return Err(GainloopError::InvalidParameter(format!(
                "target energy must be greater than 0, got {}",
                target_energy
            )));
        }

        self.target_energy = target_energy;
        log::debug!("AGC target energy set to {}", target_energy);
        Ok(())
    }

    /// Set the gain limits.
    ///
    /// The current gain is not re-clamped until the next processed sample.
    pub fn set_gain_limits(&mut self, gain_min: T, gain_max: T) -> Result<()> {
        if !(gain_min <= gain_max) {
            return Err(GainloopError::InvalidParameter(format!(
                "minimum gain ({}) must not exceed maximum gain ({})",
                gain_min, gain_max
            )));
        }

        self.gain_min = gain_min;
        self.gain_max = gain_max;
        log::debug!("AGC gain limits set to [{:e}, {:e}]", gain_min, gain_max);
        Ok(())
    }

    /// Set the loop bandwidth-time product, `0 <= bandwidth <= 1`.
    pub fn set_bandwidth(&mut self, bandwidth: T) -> Result<()> {
        if !(bandwidth >= T::zero() && bandwidth <= T::one()) {
            return Err(GainloopError::InvalidParameter(format!(
                "bandwidth must be in [0, 1], got {}",
                bandwidth
            )));
        }

        let alpha = bandwidth.sqrt();
        self.bandwidth = bandwidth;
        self.alpha = alpha;
        self.beta = T::one() - alpha;
        log::debug!(
            "AGC bandwidth set to {} (alpha={}, beta={})",
            bandwidth,
            self.alpha,
            self.beta
        );
        Ok(())
    }

    /// Freeze the gain.
    pub fn lock(&mut self) {
        self.locked = true;
        log::debug!("AGC locked at gain {}", self.state.gain);
    }

    /// Resume gain adaptation.
    pub fn unlock(&mut self) {
        self.locked = false;
        log::debug!("AGC unlocked");
    }

    /// Process one complex sample and return it with the updated gain applied.
    #[inline]
    pub fn execute(&mut self, x: Complex<T>) -> Complex<T> {
        if self.locked {
            return x * self.state.gain;
        }

        let previous_gain = self.state.gain;
        let coeffs = self.coefficients();
        self.law.update(&mut self.state, coeffs, x);
        if self.state.gain.is_nan() {
            // 0 * inf from a silent input with zero bandwidth
            self.state.gain = previous_gain;
        }
        self.limit_gain();

        x * self.state.gain
    }

    /// Estimated input signal level, `target_energy / gain`.
    pub fn signal_level(&self) -> T {
        self.target_energy / self.state.gain
    }

    /// Received signal strength in dB, `10 log10(target_energy / gain)`.
    pub fn rssi_db(&self) -> T {
        power_to_db(self.signal_level())
    }

    /// Current gain factor.
    pub fn gain(&self) -> T {
        self.state.gain
    }

    /// Print a one-line diagnostic summary to stdout.
    pub fn print(&self) {
        println!("{}", self);
    }

    pub fn update_law(&self) -> UpdateLaw {
        self.law
    }

    pub fn target_energy(&self) -> T {
        self.target_energy
    }

    /// Returns `(gain_min, gain_max)`.
    pub fn gain_limits(&self) -> (T, T) {
        (self.gain_min, self.gain_max)
    }

    pub fn bandwidth(&self) -> T {
        self.bandwidth
    }

    pub fn alpha(&self) -> T {
        self.alpha
    }

    pub fn beta(&self) -> T {
        self.beta
    }

    /// Energy of the most recent sample seen by the estimator.
    pub fn energy_instantaneous(&self) -> T {
        self.state.energy_inst
    }

    /// Square root of the smoothed energy estimate.
    pub fn energy_smoothed(&self) -> T {
        self.state.energy_smoothed
    }

    /// Smoothing filter memory, in the energy domain.
    pub fn energy_prev(&self) -> T {
        self.state.energy_prev
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn coefficients(&self) -> LoopCoefficients<T> {
        LoopCoefficients {
            target_energy: self.target_energy,
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    fn limit_gain(&mut self) {
        if self.state.gain > self.gain_max {
            self.state.gain = self.gain_max;
        } else if self.state.gain < self.gain_min {
            self.state.gain = self.gain_min;
        }
    }
}

impl<T: Real> Default for Agc<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> fmt::Display for Agc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agc [rssi: {:12.4}dB]:", self.rssi_db())
    }
}
