use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use gainloop::config::GainloopConfig;
use gainloop::output::{OutputFormat, create_formatter};
use gainloop::processing::{StreamProcessor, StreamSummary};
use gainloop::signal_processing::UpdateLaw;
use gainloop::{read_iq_wav, save_iq_wav};

#[derive(Parser, Debug)]
#[command(name = "gainloop")]
#[command(about = "Run an automatic gain control loop over an I/Q WAV recording", long_about = None)]
struct Args {
    /// Stereo I/Q WAV file (left = I, right = Q)
    input: PathBuf,

    /// Write the gain-adjusted samples to this WAV file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// TOML configuration file; command line options override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Gain update law: default, logarithmic, exponential
    #[arg(short = 'l', long, value_enum)]
    law: Option<UpdateLaw>,

    /// Loop bandwidth-time product in [0, 1]
    #[arg(short = 'b', long)]
    bandwidth: Option<f64>,

    /// Target output energy
    #[arg(short = 't', long)]
    target: Option<f64>,

    /// Minimum gain
    #[arg(long)]
    gain_min: Option<f64>,

    /// Maximum gain
    #[arg(long)]
    gain_max: Option<f64>,

    /// Lock the gain after this many samples
    #[arg(long)]
    lock_after: Option<u64>,

    /// Samples between status reports (0 = final summary only)
    #[arg(short = 'r', long)]
    report_interval: Option<u64>,

    /// Report format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> anyhow::Result<GainloopConfig> {
    let mut config = match args.config {
        Some(ref path) => GainloopConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GainloopConfig::default(),
    };

    if let Some(law) = args.law {
        config.agc.law = law;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.agc.bandwidth = bandwidth;
    }
    if let Some(target) = args.target {
        config.agc.target_energy = target;
    }
    if let Some(gain_min) = args.gain_min {
        config.agc.gain_min = gain_min;
    }
    if let Some(gain_max) = args.gain_max {
        config.agc.gain_max = gain_max;
    }
    if args.lock_after.is_some() {
        config.stream.lock_after = args.lock_after;
    }
    if let Some(interval) = args.report_interval {
        config.stream.report_interval = interval;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_summary(summary: &StreamSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(summary)?;
            println!("{}", json);
        }
        OutputFormat::Text | OutputFormat::Csv => {
            eprintln!("\n=== Summary ===");
            eprintln!("  Samples: {}", summary.samples);
            eprintln!("  Final gain: {:.6}", summary.final_gain);
            eprintln!("  Final RSSI: {:.2} dB", summary.final_rssi_db);
            if let Some(at) = summary.locked_at {
                eprintln!("  Locked at sample: {}", at);
            }
            if let Some(ref gain) = summary.gain {
                eprintln!(
                    "  Gain: {:.4} ± {:.4} (min {:.4}, max {:.4})",
                    gain.mean, gain.std_dev, gain.min, gain.max
                );
            }
            if let Some(ref energy) = summary.output_energy {
                eprintln!(
                    "  Output energy: {:.4} ± {:.4}",
                    energy.mean, energy.std_dev
                );
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;

    let recording = read_iq_wav(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    log::info!(
        "Read {} I/Q samples at {} Hz from {}",
        recording.samples.len(),
        recording.sample_rate,
        args.input.display()
    );

    let mut processor = StreamProcessor::new(&config)?;
    let formatter = create_formatter(args.format, args.verbose > 0);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Some(header) = formatter.header() {
        writeln!(out, "{}", header)?;
    }

    let keep_output = args.output.is_some();
    let mut processed = Vec::with_capacity(if keep_output {
        recording.samples.len()
    } else {
        0
    });

    for chunk in recording.samples.chunks(config.stream.chunk_size) {
        let mut buffer = chunk.to_vec();
        for report in processor.process_in_place(&mut buffer) {
            writeln!(out, "{}", formatter.format(&report))?;
        }
        if keep_output {
            processed.extend_from_slice(&buffer);
        }
    }
    if config.stream.report_interval > 0
        && let Some(report) = processor.finish()
    {
        writeln!(out, "{}", formatter.format(&report))?;
    }
    drop(out);

    if let Some(ref path) = args.output {
        save_iq_wav(path, &processed, recording.sample_rate)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {} samples to {}", processed.len(), path.display());
    }

    if args.verbose > 0 {
        processor.agc().print();
    }
    print_summary(&processor.summary(), args.format)?;

    Ok(())
}
