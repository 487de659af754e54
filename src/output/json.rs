use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::processing::StatusReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    report: &'a StatusReport,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &StatusReport) -> String {
        let line = JsonLine {
            ts: iso8601_timestamp(),
            report,
        };
        serde_json::to_string(&line).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_report;

    #[test]
    fn test_json_line_fields() {
        let line = JsonFormatter.format(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert!(value["ts"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["sample_index"], 48000);
        assert_eq!(value["gain"], 5.0);
        assert_eq!(value["locked"], false);
        assert!(!line.contains('\n'));
    }
}
