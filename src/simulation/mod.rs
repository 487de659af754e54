mod noise;
mod signal;

pub use noise::{
    AdditiveNoiseConfig, FadingConfig, FadingType, NoiseConfig, apply_noise, signal_power,
};
pub use signal::{
    AmplitudeStep, generate_stepped_tone, generate_tone, generate_tone_with_amplitude_fn,
};
