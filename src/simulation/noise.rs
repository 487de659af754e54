use num_complex::Complex32;
use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f32::consts::PI;

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub fading: Option<FadingConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_fading(mut self, fading_type: FadingType, doppler_spread_hz: f32) -> Self {
        self.fading = Some(FadingConfig {
            fading_type,
            doppler_spread_hz,
        });
        self
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f32,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FadingType {
    Rayleigh,
    Rician { k_factor: f32 },
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct FadingConfig {
    #[serde(flatten)]
    pub fading_type: FadingType,
    pub doppler_spread_hz: f32,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean energy per sample.
pub fn signal_power(signal: &[Complex32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|x| x.norm_sqr()).sum::<f32>() / signal.len() as f32
}

/// Circular complex AWGN: half the noise power in each of I and Q.
fn apply_additive_noise(
    signal: &mut [Complex32],
    config: &AdditiveNoiseConfig,
    rng: &mut ChaCha8Rng,
) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f32.powf(config.snr_db / 10.0);
    let noise_power = sig_power / snr_linear;
    let noise_std = (noise_power / 2.0).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std as f64) else {
        return;
    };

    for sample in signal.iter_mut() {
        *sample += Complex32::new(normal.sample(rng) as f32, normal.sample(rng) as f32);
    }
}

/// Sum-of-sinusoids fading envelope (flat fading; phase is left alone).
fn apply_fading(
    signal: &mut [Complex32],
    config: &FadingConfig,
    sample_rate: f32,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 {
        return;
    }

    let (los, scatter) = match config.fading_type {
        FadingType::Rayleigh => (0.0, 1.0),
        FadingType::Rician { k_factor } => (
            (k_factor / (k_factor + 1.0)).sqrt(),
            (1.0 / (k_factor + 1.0)).sqrt(),
        ),
    };

    let fd = config.doppler_spread_hz;
    let mut scattered = vec![Complex32::new(0.0, 0.0); n];

    if fd > 0.0 {
        let num_sinusoids = 16;
        for _ in 0..num_sinusoids {
            let theta: f32 = rng.random::<f32>() * 2.0 * PI;
            let freq = fd * theta.cos();
            let phi: f32 = rng.random::<f32>() * 2.0 * PI;

            for (i, s) in scattered.iter_mut().enumerate() {
                let t = i as f32 / sample_rate;
                *s += Complex32::from_polar(1.0, 2.0 * PI * freq * t + phi);
            }
        }

        let scale = 1.0 / (num_sinusoids as f32).sqrt();
        for s in scattered.iter_mut() {
            *s *= scale;
        }
    } else {
        let Ok(normal) = Normal::new(0.0, std::f64::consts::FRAC_1_SQRT_2) else {
            return;
        };
        let s = Complex32::new(normal.sample(rng) as f32, normal.sample(rng) as f32);
        scattered.fill(s);
    }

    for (sample, s) in signal.iter_mut().zip(scattered.iter()) {
        let envelope = (Complex32::new(los, 0.0) + *s * scatter).norm();
        *sample *= envelope;
    }
}

pub fn apply_noise(
    clean_signal: &[Complex32],
    config: &NoiseConfig,
    sample_rate: f32,
) -> Vec<Complex32> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref fading_config) = config.fading {
        apply_fading(&mut signal, fading_config, sample_rate, &mut rng);
    }

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    signal
}
