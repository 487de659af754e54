use super::Formatter;
use crate::processing::StatusReport;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &StatusReport) -> String {
        let lock = if report.locked { " [locked]" } else { "" };
        if self.verbose {
            format!(
                "Sample {:>10}: gain {:>10.4} ({:>6.1} dB) rssi {:>7.2} dB [level: {:.4}, energy: {:.4} ± {:.4}]{}",
                report.sample_index,
                report.gain,
                report.gain_db,
                report.rssi_db,
                report.signal_level,
                report.output_energy_mean,
                report.output_energy_std_dev,
                lock
            )
        } else {
            format!(
                "Sample {:>10}: gain {:>10.4} rssi {:>7.2} dB{}",
                report.sample_index, report.gain, report.rssi_db, lock
            )
        }
    }
}
