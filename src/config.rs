//! Configuration for the gain control loop and the stream driver.
//!
//! All structs have sensible `Default` impls and can be loaded from TOML.
//! Missing sections or fields fall back to their defaults:
//!
//! ```toml
//! [agc]
//! law = "logarithmic"
//! target_energy = 1.0
//! bandwidth = 0.01
//!
//! [stream]
//! report_interval = 48000
//! lock_after = 96000
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GAIN, DEFAULT_GAIN_MAX, DEFAULT_GAIN_MIN, DEFAULT_TARGET_ENERGY};
use crate::error::{GainloopError, Result};
use crate::signal_processing::{Agc, UpdateLaw};

/// Top-level configuration
///
/// # Example
/// ```
/// use gainloop::config::GainloopConfig;
///
/// let config = GainloopConfig::from_toml_str("[agc]\nbandwidth = 0.05\n").unwrap();
/// assert_eq!(config.agc.bandwidth, 0.05);
/// assert_eq!(config.agc.target_energy, 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainloopConfig {
    /// Gain control loop parameters
    pub agc: AgcConfig,
    /// Sample stream processing parameters
    pub stream: StreamConfig,
}

/// Automatic gain control configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgcConfig {
    /// Gain update law
    pub law: UpdateLaw,
    /// Target output energy (must be > 0)
    pub target_energy: f64,
    /// Loop bandwidth-time product in [0, 1]
    pub bandwidth: f64,
    /// Minimum gain
    pub gain_min: f64,
    /// Maximum gain
    pub gain_max: f64,
    /// Gain before the first sample, clamped into [gain_min, gain_max]
    pub initial_gain: f64,
}

/// Stream driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Samples per processing chunk when reading from a file
    pub chunk_size: usize,
    /// Samples between status reports (0 disables periodic reports)
    pub report_interval: u64,
    /// Lock the gain after this many samples have been processed
    pub lock_after: Option<u64>,
}

impl GainloopConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| GainloopError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Check every parameter without building anything long-lived.
    pub fn validate(&self) -> Result<()> {
        self.agc.validate()?;
        self.stream.validate()
    }
}

impl AgcConfig {
    /// Validate by running the parameters through the controller setters, at
    /// the single precision the stream driver runs at.
    pub fn validate(&self) -> Result<()> {
        Agc::<f32>::from_config(self).map(|_| ())
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(GainloopError::Config("chunk_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for AgcConfig {
    fn default() -> Self {
        Self {
            law: UpdateLaw::default(),
            target_energy: DEFAULT_TARGET_ENERGY,
            bandwidth: 0.01,
            gain_min: DEFAULT_GAIN_MIN,
            gain_max: DEFAULT_GAIN_MAX,
            initial_gain: DEFAULT_GAIN,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            report_interval: 48000,
            lock_after: None,
        }
    }
}
