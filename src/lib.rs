pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod processing;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{AgcConfig, GainloopConfig, StreamConfig};
pub use error::{GainloopError, Result};
pub use processing::{StatusReport, StreamProcessor, StreamSummary};
pub use signal_processing::{Agc, UpdateLaw};
pub use wav::{IqRecording, read_iq_wav, save_iq_wav};
