use anyhow::{Context, Result};
use clap::Parser;
use gainloop::save_iq_wav;
use gainloop::simulation::{
    AmplitudeStep, FadingConfig, FadingType, NoiseConfig, apply_noise, generate_stepped_tone,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_iq")]
#[command(about = "Generate synthetic I/Q WAV files with amplitude steps for AGC testing")]
struct Args {
    /// TOML signal configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, default_value = "data/synthetic/steps.wav")]
    output: PathBuf,

    /// Amplitude profile: comma-separated "amplitude@seconds" (e.g., "0.1@1,2.0@0.5")
    #[arg(short, long, default_value = "0.1@1,1.0@1,0.01@1")]
    steps: String,

    /// Tone offset frequency in Hz
    #[arg(long, default_value_t = 1000.0)]
    tone_hz: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f32>,

    /// Rayleigh fading Doppler spread in Hz (CLI override)
    #[arg(long)]
    fading_hz: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    steps: Option<Vec<AmplitudeStep>>,
    awgn: Option<AwgnSection>,
    fading: Option<FadingConfig>,
}

#[derive(Debug, Deserialize)]
struct AwgnSection {
    snr_db: f32,
}

fn parse_steps(s: &str) -> Result<Vec<AmplitudeStep>> {
    s.split(',')
        .map(|part| {
            let (amplitude, duration) = part
                .trim()
                .split_once('@')
                .context("Invalid step format. Use 'amplitude@seconds'")?;
            Ok(AmplitudeStep {
                amplitude: amplitude.trim().parse().context("Invalid amplitude")?,
                duration_secs: duration.trim().parse().context("Invalid duration")?,
            })
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(toml: &TomlConfig, args: &Args) -> NoiseConfig {
    let mut config = NoiseConfig {
        seed: args.seed,
        ..NoiseConfig::default()
    };

    if let Some(snr) = args.snr {
        config = config.with_awgn(snr);
    } else if let Some(ref awgn) = toml.awgn {
        config = config.with_awgn(awgn.snr_db);
    }

    if let Some(fading_hz) = args.fading_hz {
        config = config.with_fading(FadingType::Rayleigh, fading_hz);
    } else if let Some(ref fading) = toml.fading {
        config.fading = Some(fading.clone());
    }

    config
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let steps = match toml_config.steps {
        Some(ref steps) if !steps.is_empty() => steps.clone(),
        _ => parse_steps(&args.steps)?,
    };
    let noise_config = build_noise_config(&toml_config, &args);
    log::debug!("steps: {:?}, noise: {:?}", steps, noise_config);

    let clean = generate_stepped_tone(&steps, args.sample_rate, args.tone_hz);
    let signal = apply_noise(&clean, &noise_config, args.sample_rate as f32);

    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    save_iq_wav(&args.output, &signal, args.sample_rate).context("Failed to write WAV file")?;

    eprintln!(
        "Generated {} samples ({} steps) in {}",
        signal.len(),
        steps.len(),
        args.output.display()
    );
    Ok(())
}
