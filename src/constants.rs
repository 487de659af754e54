//! Numeric constants for the gain control loop
//!
//! Defaults applied by `Agc::new()` and the smoothing constant shared by the
//! filtered update laws.

/// Smoothing factor of the energy estimator (weight of the newest sample).
pub const ENERGY_SMOOTHING: f64 = 0.1;

/// Initial value of the energy filter memory after creation or reset.
pub const INITIAL_ENERGY_ESTIMATE: f64 = 1.0;

/// Default target output energy.
pub const DEFAULT_TARGET_ENERGY: f64 = 1.0;

/// Gain applied before the first sample is processed.
pub const DEFAULT_GAIN: f64 = 1.0;

/// Lower gain bound.
pub const DEFAULT_GAIN_MIN: f64 = 1e-6;

/// Upper gain bound.
pub const DEFAULT_GAIN_MAX: f64 = 1e6;

/// Loop bandwidth-time product; zero freezes adaptation.
pub const DEFAULT_BANDWIDTH: f64 = 0.0;
