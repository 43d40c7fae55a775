use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;

use super::SampleSource;
use crate::error::TiltError;
use crate::sample::{AccelSample, Vector3};

pub const TRACE_HEADER: &str = "timestamp_ns,x,y,z";

/// Reads `timestamp_ns,x,y,z` rows from a CSV trace
///
/// Blank lines and lines starting with `#` are ignored, as is a header row
/// before the first sample.
pub struct CsvTraceSource<R> {
    reader: R,
    line_number: usize,
    seen_data: bool,
    line: String,
}

impl CsvTraceSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open trace {}", path.display()))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvTraceSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            seen_data: false,
            line: String::new(),
        }
    }

    fn parse_line(line: &str, line_number: usize) -> Result<AccelSample, TiltError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(TiltError::Parse {
                line: line_number,
                message: format!("expected 4 fields, found {}", fields.len()),
            });
        }

        let timestamp_ns: u64 = fields[0].parse().map_err(|_| TiltError::Parse {
            line: line_number,
            message: format!("invalid timestamp {:?}", fields[0]),
        })?;

        let mut values = [0.0f32; 3];
        for (value, field) in values.iter_mut().zip(&fields[1..]) {
            *value = field.parse().map_err(|_| TiltError::Parse {
                line: line_number,
                message: format!("invalid acceleration value {:?}", field),
            })?;
        }

        Ok(AccelSample::new(timestamp_ns, Vector3::from(values)))
    }
}

impl<R: BufRead + Send> SampleSource for CsvTraceSource<R> {
    fn next_sample(&mut self) -> anyhow::Result<Option<AccelSample>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if !self.seen_data && line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.seen_data = true;
                continue;
            }
            self.seen_data = true;

            return Ok(Some(Self::parse_line(line, self.line_number)?));
        }
    }
}

/// Write samples as a CSV trace readable by [`CsvTraceSource`]
pub fn write_trace<W: Write>(writer: &mut W, samples: &[AccelSample]) -> std::io::Result<()> {
    writeln!(writer, "{}", TRACE_HEADER)?;
    for sample in samples {
        writeln!(
            writer,
            "{},{},{},{}",
            sample.timestamp_ns, sample.values.x, sample.values.y, sample.values.z
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str) -> anyhow::Result<Vec<AccelSample>> {
        let mut source = CsvTraceSource::from_reader(Cursor::new(text.as_bytes().to_vec()));
        let mut samples = Vec::new();
        while let Some(sample) = source.next_sample()? {
            samples.push(sample);
        }
        Ok(samples)
    }

    #[test]
    fn test_reads_rows_with_header_and_comments() {
        let samples = read_all(
            "# recorded on bench\ntimestamp_ns,x,y,z\n\n1000,0.1,0.2,9.8\n2000, -0.1 ,0.0,9.81\n",
        )
        .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp_ns, 1000);
        assert_eq!(samples[0].values, Vector3::new(0.1, 0.2, 9.8));
        assert_eq!(samples[1].values.x, -0.1);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = read_all("timestamp_ns,x,y,z\n1000,0,0,9.8\n2000,0,zero,9.8\n").unwrap_err();
        match err.downcast_ref::<TiltError>() {
            Some(TiltError::Parse { line, .. }) => assert_eq!(*line, 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_field_count() {
        let err = read_all("1000,0,9.8\n").unwrap_err();
        assert!(err.to_string().contains("expected 4 fields"));
    }

    #[test]
    fn test_header_only_allowed_before_data() {
        assert!(read_all("1000,0,0,9.8\nx,y,z,w\n").is_err());
    }

    #[test]
    fn test_write_then_read() {
        let samples = vec![
            AccelSample::new(5, Vector3::new(0.0, 0.0, 9.80665)),
            AccelSample::new(10, Vector3::new(1.5, -2.25, 8.0)),
        ];
        let mut out = Vec::new();
        write_trace(&mut out, &samples).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(TRACE_HEADER));
        assert_eq!(read_all(&text).unwrap(), samples);
    }
}
