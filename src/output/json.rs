use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::processing::ProcessedSample;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    #[serde(flatten)]
    sample: &'a ProcessedSample,
}

impl Formatter for JsonFormatter {
    fn format(&self, output: &ProcessedSample) -> String {
        let record = JsonRecord {
            ts: iso8601_timestamp(),
            sample: output,
        };
        // Only plain numbers, bools and strings; serialization cannot fail
        serde_json::to_string(&record).unwrap_or_default()
    }
}
