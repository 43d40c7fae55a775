mod csv;
mod json;
mod text;

use chrono::Utc;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

use crate::processing::ProcessedSample;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub trait Formatter: Send {
    fn format(&self, output: &ProcessedSample) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sample::Vector3;
    use crate::signal_processing::Separation;

    pub fn sample_output() -> ProcessedSample {
        let raw = Vector3::new(0.5, 0.0, 9.8);
        let gravity = Vector3::new(0.0, 0.0, 9.8);
        ProcessedSample {
            timestamp_ns: 1_500_000,
            dt_secs: Some(0.02),
            separation: Separation {
                raw,
                gravity,
                linear: raw - gravity,
                magnitude: 1.0006,
                threshold: 1.0325,
                run_count: 7,
                qualifying: true,
                latched: true,
            },
        }
    }

    #[test]
    fn test_create_formatter_headers() {
        assert!(create_formatter(OutputFormat::Csv, false).header().is_some());
        assert!(create_formatter(OutputFormat::Json, false).header().is_none());
        assert!(create_formatter(OutputFormat::Text, true).header().is_none());
    }

    #[test]
    fn test_iso8601_timestamp_shape() {
        let ts = iso8601_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
