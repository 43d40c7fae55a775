use super::Formatter;
use crate::processing::ProcessedSample;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &ProcessedSample) -> String {
        let s = &output.separation;
        let base = format!(
            "raw [{:>7.3} {:>7.3} {:>7.3}] gravity [{:>7.3} {:>7.3} {:>7.3}] linear [{:>7.3} {:>7.3} {:>7.3}]",
            s.raw.x,
            s.raw.y,
            s.raw.z,
            s.gravity.x,
            s.gravity.y,
            s.gravity.z,
            s.linear.x,
            s.linear.y,
            s.linear.z
        );

        if self.verbose {
            let rate = output
                .dt_secs
                .filter(|dt| *dt > 0.0)
                .map_or("-".to_string(), |dt| format!("{:.1} Hz", 1.0 / dt));
            format!(
                "{} [mag: {:.4}, thresh: {:.4}, run: {}{}, rate: {}]",
                base,
                s.magnitude,
                s.threshold,
                s.run_count,
                if s.latched { ", latched" } else { "" },
                rate
            )
        } else {
            base
        }
    }
}
