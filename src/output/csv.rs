use super::{Formatter, iso8601_timestamp};
use crate::processing::ProcessedSample;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, output: &ProcessedSample) -> String {
        let s = &output.separation;
        let dt = output
            .dt_secs
            .map_or(String::new(), |dt| format!("{:.6}", dt));
        format!(
            "{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{},{},{}",
            iso8601_timestamp(),
            output.timestamp_ns,
            s.raw.x,
            s.raw.y,
            s.raw.z,
            s.gravity.x,
            s.gravity.y,
            s.gravity.z,
            s.linear.x,
            s.linear.y,
            s.linear.z,
            s.magnitude,
            s.threshold,
            s.run_count,
            u8::from(s.latched),
            dt
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "ts,timestamp_ns,raw_x,raw_y,raw_z,gravity_x,gravity_y,gravity_z,linear_x,linear_y,linear_z,magnitude,threshold,run_count,latched,dt",
        )
    }
}
