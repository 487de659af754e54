use num_complex::Complex32;
use rolling_stats::Stats;
use serde::Serialize;

use crate::config::{GainloopConfig, StreamConfig};
use crate::error::Result;
use crate::signal_processing::{Agc, amplitude_to_db, energy};

/// Periodic snapshot of the loop, emitted every `report_interval` samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Total samples processed when the report was taken
    pub sample_index: u64,
    /// Samples covered by this report
    pub interval_samples: u64,
    pub gain: f32,
    pub gain_db: f32,
    pub rssi_db: f32,
    pub signal_level: f32,
    /// Mean output energy over the interval
    pub output_energy_mean: f32,
    /// Output energy standard deviation over the interval
    pub output_energy_std_dev: f32,
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Whole-stream statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub samples: u64,
    pub final_gain: f32,
    pub final_rssi_db: f32,
    pub locked_at: Option<u64>,
    pub gain: Option<StatsSummary>,
    pub output_energy: Option<StatsSummary>,
}

/// Drives an [`Agc`] over a stream of complex samples.
///
/// Samples arrive in arbitrary chunks; the controller still sees them one at
/// a time. The processor counts samples, applies the optional acquire-then-lock
/// policy and collects interval and whole-stream statistics.
pub struct StreamProcessor {
    agc: Agc<f32>,
    stream_config: StreamConfig,
    samples_processed: u64,
    locked_at: Option<u64>,
    at_limit: bool,
    interval_energy: Stats<f32>,
    interval_samples: u64,
    gain_stats: Stats<f32>,
    energy_stats: Stats<f32>,
}

impl StreamProcessor {
    pub fn new(config: &GainloopConfig) -> Result<Self> {
        config.stream.validate()?;
        let agc = Agc::from_config(&config.agc)?;
        log::info!(
            "AGC: law={}, target={}, bandwidth={}, gain limits=[{:e}, {:e}]",
            agc.update_law(),
            agc.target_energy(),
            agc.bandwidth(),
            agc.gain_limits().0,
            agc.gain_limits().1
        );

        let mut processor = Self {
            agc,
            stream_config: config.stream.clone(),
            samples_processed: 0,
            locked_at: None,
            at_limit: false,
            interval_energy: Stats::new(),
            interval_samples: 0,
            gain_stats: Stats::new(),
            energy_stats: Stats::new(),
        };
        // lock_after = 0 holds the configured initial gain from the first sample
        processor.lock_if_due();
        Ok(processor)
    }

    /// Apply the AGC to every sample in place and return any status reports
    /// that fell due within the chunk.
    pub fn process_in_place(&mut self, samples: &mut [Complex32]) -> Vec<StatusReport> {
        let mut reports = Vec::new();

        for sample in samples.iter_mut() {
            *sample = self.agc.execute(*sample);
            self.samples_processed += 1;
            self.record(*sample);

            self.lock_if_due();

            let interval = self.stream_config.report_interval;
            if interval > 0 && self.interval_samples >= interval {
                reports.push(self.take_report());
            }
        }

        reports
    }

    /// Like [`process_in_place`](Self::process_in_place) but leaves the input intact.
    pub fn process(&mut self, samples: &[Complex32]) -> (Vec<Complex32>, Vec<StatusReport>) {
        let mut output = samples.to_vec();
        let reports = self.process_in_place(&mut output);
        (output, reports)
    }

    /// Report for the samples since the last periodic report, if any.
    pub fn finish(&mut self) -> Option<StatusReport> {
        if self.interval_samples == 0 {
            return None;
        }
        Some(self.take_report())
    }

    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            samples: self.samples_processed,
            final_gain: self.agc.gain(),
            final_rssi_db: self.agc.rssi_db(),
            locked_at: self.locked_at,
            gain: StatsSummary::from_stats(&self.gain_stats),
            output_energy: StatsSummary::from_stats(&self.energy_stats),
        }
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    pub fn agc(&self) -> &Agc<f32> {
        &self.agc
    }

    pub fn agc_mut(&mut self) -> &mut Agc<f32> {
        &mut self.agc
    }

    fn record(&mut self, output: Complex32) {
        let output_energy = energy(output);
        let gain = self.agc.gain();

        self.interval_energy.update(output_energy);
        self.interval_samples += 1;
        self.gain_stats.update(gain);
        self.energy_stats.update(output_energy);

        let (gain_min, gain_max) = self.agc.gain_limits();
        let pinned = gain <= gain_min || gain >= gain_max;
        if pinned && !self.at_limit {
            log::warn!(
                "AGC gain pinned at limit {:e} (sample {})",
                gain,
                self.samples_processed
            );
        }
        self.at_limit = pinned;
    }

    fn lock_if_due(&mut self) {
        if let Some(lock_after) = self.stream_config.lock_after
            && self.locked_at.is_none()
            && self.samples_processed >= lock_after
        {
            self.agc.lock();
            self.locked_at = Some(self.samples_processed);
            log::info!(
                "AGC locked after {} samples at gain {:.4} ({:.1} dB)",
                self.samples_processed,
                self.agc.gain(),
                amplitude_to_db(self.agc.gain())
            );
        }
    }

    fn take_report(&mut self) -> StatusReport {
        let report = StatusReport {
            sample_index: self.samples_processed,
            interval_samples: self.interval_samples,
            gain: self.agc.gain(),
            gain_db: amplitude_to_db(self.agc.gain()),
            rssi_db: self.agc.rssi_db(),
            signal_level: self.agc.signal_level(),
            output_energy_mean: self.interval_energy.mean,
            output_energy_std_dev: self.interval_energy.std_dev,
            locked: self.agc.is_locked(),
        };
        log::debug!(
            "sample {}: gain {:.4}, rssi {:.2} dB",
            report.sample_index,
            report.gain,
            report.rssi_db
        );

        self.interval_energy = Stats::new();
        self.interval_samples = 0;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgcConfig;
    use crate::signal_processing::UpdateLaw;

    fn config(report_interval: u64, lock_after: Option<u64>) -> GainloopConfig {
        GainloopConfig {
            agc: AgcConfig {
                law: UpdateLaw::Logarithmic,
                bandwidth: 0.02,
                ..AgcConfig::default()
            },
            stream: StreamConfig {
                chunk_size: 256,
                report_interval,
                lock_after,
            },
        }
    }

    fn constant(amplitude: f32, n: usize) -> Vec<Complex32> {
        vec![Complex32::new(amplitude, 0.0); n]
    }

    #[test]
    fn test_reports_at_interval_across_chunks() {
        let mut processor = StreamProcessor::new(&config(100, None)).unwrap();
        let mut reports = Vec::new();
        for chunk in constant(0.5, 350).chunks(64) {
            let mut chunk = chunk.to_vec();
            reports.extend(processor.process_in_place(&mut chunk));
        }

        let indices: Vec<u64> = reports.iter().map(|r| r.sample_index).collect();
        assert_eq!(indices, vec![100, 200, 300]);
        assert!(reports.iter().all(|r| r.interval_samples == 100));

        let last = processor.finish().unwrap();
        assert_eq!(last.sample_index, 350);
        assert_eq!(last.interval_samples, 50);
        assert!(processor.finish().is_none());
    }

    #[test]
    fn test_zero_interval_disables_reports() {
        let mut processor = StreamProcessor::new(&config(0, None)).unwrap();
        let (_, reports) = processor.process(&constant(0.5, 1000));
        assert!(reports.is_empty());
        assert_eq!(processor.samples_processed(), 1000);
    }

    #[test]
    fn test_lock_after_freezes_gain() {
        let mut processor = StreamProcessor::new(&config(0, Some(500))).unwrap();
        processor.process(&constant(0.1, 500));
        assert!(processor.agc().is_locked());
        let gain = processor.agc().gain();

        let (output, _) = processor.process(&constant(2.0, 100));
        assert_eq!(processor.agc().gain(), gain);
        assert!(output.iter().all(|y| *y == Complex32::new(2.0, 0.0) * gain));
        assert_eq!(processor.summary().locked_at, Some(500));
    }

    #[test]
    fn test_lock_after_zero_keeps_initial_gain() {
        let mut cfg = config(0, Some(0));
        cfg.agc.initial_gain = 3.0;
        let mut processor = StreamProcessor::new(&cfg).unwrap();
        assert!(processor.agc().is_locked());

        let (output, _) = processor.process(&constant(0.1, 50));
        assert_eq!(processor.agc().gain(), 3.0);
        assert_eq!(output[0], Complex32::new(0.1, 0.0) * 3.0);
        assert_eq!(processor.summary().locked_at, Some(0));
    }

    #[test]
    fn test_output_energy_converges_in_reports() {
        let mut processor = StreamProcessor::new(&config(1000, None)).unwrap();
        let (_, reports) = processor.process(&constant(0.2, 4000));

        let last = reports.last().unwrap();
        assert!((last.output_energy_mean - 1.0).abs() < 1e-3);
        assert!((last.rssi_db - 10.0 * 0.2_f32.log10()).abs() < 0.05);
        assert!(!last.locked);
    }

    #[test]
    fn test_summary_counts_samples() {
        let mut processor = StreamProcessor::new(&config(0, None)).unwrap();
        processor.process(&constant(1.0, 123));
        let summary = processor.summary();
        assert_eq!(summary.samples, 123);
        assert_eq!(summary.gain.unwrap().count, 123);
        assert_eq!(summary.locked_at, None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = config(0, None);
        cfg.agc.gain_min = 5.0;
        cfg.agc.gain_max = 1.0;
        assert!(StreamProcessor::new(&cfg).is_err());
    }
}
