use super::{Formatter, iso8601_timestamp};
use crate::processing::StatusReport;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &StatusReport) -> String {
        format!(
            "{},{},{},{:.6},{:.2},{:.2},{:.6},{:.6},{:.6},{}",
            iso8601_timestamp(),
            report.sample_index,
            report.interval_samples,
            report.gain,
            report.gain_db,
            report.rssi_db,
            report.signal_level,
            report.output_energy_mean,
            report.output_energy_std_dev,
            u8::from(report.locked)
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "ts,sample,interval,gain,gain_db,rssi_db,signal_level,energy_mean,energy_std_dev,locked",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_report;

    #[test]
    fn test_csv_matches_header() {
        let formatter = CsvFormatter;
        let header_fields = formatter.header().unwrap().split(',').count();
        let line = formatter.format(&sample_report());
        let fields: Vec<&str> = line.split(',').collect();

        assert_eq!(fields.len(), header_fields);
        assert_eq!(fields[1], "48000");
        assert_eq!(fields[3], "5.000000");
        assert_eq!(fields[9], "0");
    }
}
