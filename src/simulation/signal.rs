use num_complex::Complex32;
use serde::Deserialize;
use std::f32::consts::PI;

/// One segment of a piecewise-constant amplitude profile.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AmplitudeStep {
    pub duration_secs: f32,
    pub amplitude: f32,
}

/// Generate a complex exponential tone with constant amplitude.
pub fn generate_tone(
    duration_secs: f32,
    sample_rate: u32,
    freq_hz: f32,
    amplitude: f32,
) -> Vec<Complex32> {
    generate_tone_with_amplitude_fn(duration_secs, sample_rate, freq_hz, |_| amplitude)
}

/// Generate a complex exponential tone with time-varying amplitude.
/// The amplitude_fn takes time in seconds and returns the linear amplitude.
pub fn generate_tone_with_amplitude_fn<F>(
    duration_secs: f32,
    sample_rate: u32,
    freq_hz: f32,
    amplitude_fn: F,
) -> Vec<Complex32>
where
    F: Fn(f32) -> f32,
{
    let num_samples = (duration_secs * sample_rate as f32) as usize;

    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // wrap phase per cycle to keep f32 precision on long signals
            let phase = 2.0 * PI * (freq_hz * t).fract();
            Complex32::from_polar(amplitude_fn(t), phase)
        })
        .collect()
}

/// Generate a tone whose amplitude follows `steps` in order.
pub fn generate_stepped_tone(
    steps: &[AmplitudeStep],
    sample_rate: u32,
    freq_hz: f32,
) -> Vec<Complex32> {
    let mut samples = Vec::new();
    let mut offset = 0.0;

    for step in steps {
        let segment = generate_tone_with_amplitude_fn(
            step.duration_secs,
            sample_rate,
            freq_hz,
            |_| step.amplitude,
        );
        // continue the phase of the previous segment
        let rotation = Complex32::from_polar(1.0, 2.0 * PI * (freq_hz * offset).fract());
        samples.extend(segment.into_iter().map(|s| s * rotation));
        offset += step.duration_secs;
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_has_constant_magnitude() {
        let tone = generate_tone(0.1, 8000, 440.0, 0.3);
        assert_eq!(tone.len(), 800);
        assert!(tone.iter().all(|s| (s.norm() - 0.3).abs() < 1e-6));
    }

    #[test]
    fn test_stepped_tone_lengths_and_levels() {
        let steps = [
            AmplitudeStep {
                duration_secs: 0.5,
                amplitude: 0.1,
            },
            AmplitudeStep {
                duration_secs: 0.25,
                amplitude: 2.0,
            },
        ];
        let tone = generate_stepped_tone(&steps, 1000, 50.0);
        assert_eq!(tone.len(), 750);
        assert!((tone[499].norm() - 0.1).abs() < 1e-5);
        assert!((tone[500].norm() - 2.0).abs() < 1e-5);
    }
}
