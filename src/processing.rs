use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::config::{SeparatorConfig, TiltConfig};
use crate::error::Result;
use crate::history::PlotHistory;
use crate::sample::{AccelSample, Vector3};
use crate::signal_processing::{GravityLinearSeparator, Separation};
use crate::source::SampleSource;

/// One sample after gravity separation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProcessedSample {
    /// Sensor timestamp in nanoseconds
    pub timestamp_ns: u64,
    /// Time since the previous accepted sample, in seconds
    pub dt_secs: Option<f32>,
    #[serde(flatten)]
    pub separation: Separation,
}

/// Sample-driven pipeline: separator plus plot history
///
/// Sensors occasionally deliver the same event twice. Samples whose
/// timestamp equals the previous one are dropped before they reach the
/// separator, so they neither advance the qualifying run nor drift the
/// threshold.
pub struct TiltProcessor {
    separator: GravityLinearSeparator,
    history: PlotHistory,
    last_timestamp_ns: Option<u64>,
    sample_period_secs: Option<f32>,
    processed: usize,
    duplicates: usize,
}

impl TiltProcessor {
    pub fn new(config: &TiltConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            separator: GravityLinearSeparator::new(&config.separator)?,
            history: PlotHistory::new(&config.history),
            last_timestamp_ns: None,
            sample_period_secs: None,
            processed: 0,
            duplicates: 0,
        })
    }

    /// Run one accelerometer event through the pipeline
    ///
    /// Returns `None` if the event repeats the previous timestamp.
    pub fn process_sample(&mut self, sample: AccelSample) -> Option<ProcessedSample> {
        if self.last_timestamp_ns == Some(sample.timestamp_ns) {
            self.duplicates += 1;
            log::trace!("dropping duplicate event at {} ns", sample.timestamp_ns);
            return None;
        }

        let dt_secs = self
            .last_timestamp_ns
            .map(|last| sample.timestamp_ns.abs_diff(last) as f32 / 1_000_000_000.0);
        if dt_secs.is_some() {
            self.sample_period_secs = dt_secs;
        }
        self.last_timestamp_ns = Some(sample.timestamp_ns);

        let separation = self.separator.process(sample.values);
        self.history.push(&separation);
        self.processed += 1;

        Some(ProcessedSample {
            timestamp_ns: sample.timestamp_ns,
            dt_secs,
            separation,
        })
    }

    /// Drain `source`, calling `on_sample` for every processed sample
    ///
    /// # Returns
    /// Number of samples processed (duplicates excluded)
    pub fn run<S, F>(&mut self, source: &mut S, mut on_sample: F) -> anyhow::Result<usize>
    where
        S: SampleSource + ?Sized,
        F: FnMut(&ProcessedSample) -> anyhow::Result<()>,
    {
        let mut count = 0;
        while let Some(sample) = source.next_sample()? {
            if let Some(processed) = self.process_sample(sample) {
                on_sample(&processed)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Apply new separator tuning; the gravity estimate is kept
    pub fn configure(&mut self, config: &SeparatorConfig) -> Result<()> {
        self.separator.configure(config)
    }

    /// Most recent interval between samples, in seconds
    pub fn sample_period(&self) -> Option<f32> {
        self.sample_period_secs
    }

    /// Update frequency derived from the most recent sample period, in Hz
    pub fn update_frequency(&self) -> Option<f32> {
        self.sample_period_secs
            .filter(|dt| *dt > 0.0)
            .map(|dt| 1.0 / dt)
    }

    pub fn gravity(&self) -> Vector3 {
        self.separator.gravity()
    }

    pub fn separator(&self) -> &GravityLinearSeparator {
        &self.separator
    }

    pub fn history(&self) -> &PlotHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut PlotHistory {
        &mut self.history
    }

    pub fn processed_count(&self) -> usize {
        self.processed
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

/// Separator that can be fed from one thread and retuned from another
///
/// The whole estimator sits behind a single lock, so every sample sees a
/// consistent threshold, run count, gravity estimate and filter window.
#[derive(Clone)]
pub struct SharedSeparator {
    inner: Arc<Mutex<GravityLinearSeparator>>,
}

impl SharedSeparator {
    pub fn new(config: &SeparatorConfig) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(GravityLinearSeparator::new(config)?)),
        })
    }

    pub fn process(&self, raw: Vector3) -> Separation {
        self.lock().process(raw)
    }

    pub fn configure(&self, config: &SeparatorConfig) -> Result<()> {
        self.lock().configure(config)
    }

    pub fn gravity(&self) -> Vector3 {
        self.lock().gravity()
    }

    pub fn threshold(&self) -> f64 {
        self.lock().threshold()
    }

    /// Lock the separator for several operations in a row
    pub fn lock(&self) -> MutexGuard<'_, GravityLinearSeparator> {
        // A panic while holding the lock cannot leave the estimator in a
        // state worse than any sequence of samples could
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SignalKind;
    use crate::sample::Axis;
    use crate::source::MemorySource;

    fn rest(timestamp_ns: u64) -> AccelSample {
        AccelSample::new(timestamp_ns, Vector3::new(0.0, 0.0, 9.8))
    }

    #[test]
    fn test_duplicate_timestamps_dropped() {
        let mut processor = TiltProcessor::new(&TiltConfig::default()).unwrap();

        assert!(processor.process_sample(rest(100)).is_some());
        assert!(processor.process_sample(rest(100)).is_none());
        assert!(processor.process_sample(rest(200)).is_some());

        assert_eq!(processor.processed_count(), 2);
        assert_eq!(processor.duplicate_count(), 1);
        assert_eq!(processor.separator().qualifying_run_count(), 2);
    }

    #[test]
    fn test_sample_period_and_frequency() {
        let mut processor = TiltProcessor::new(&TiltConfig::default()).unwrap();
        assert!(processor.update_frequency().is_none());

        let first = processor.process_sample(rest(0)).unwrap();
        assert!(first.dt_secs.is_none());

        let second = processor.process_sample(rest(20_000_000)).unwrap();
        assert!((second.dt_secs.unwrap() - 0.02).abs() < 1e-6);
        assert!((processor.update_frequency().unwrap() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_run_feeds_history() {
        let mut config = TiltConfig::default();
        config.separator.count_threshold = 2;
        config.history.capacity = 3;
        let mut processor = TiltProcessor::new(&config).unwrap();

        let samples = (0..5).map(|i| rest(i * 10)).collect();
        let mut source = MemorySource::new(samples);
        let mut latched = 0;
        let count = processor
            .run(&mut source, |sample| {
                if sample.separation.latched {
                    latched += 1;
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 5);
        assert_eq!(latched, 4);
        let gravity_z = processor.history().history(SignalKind::Gravity, Axis::Z);
        assert_eq!(gravity_z.to_vec(), vec![9.8, 9.8, 9.8]);
        let linear_z = processor.history().history(SignalKind::Linear, Axis::Z);
        assert_eq!(linear_z.latest(), Some(0.0));
    }

    #[test]
    fn test_reconfigure_mid_stream_keeps_estimate() {
        let mut config = TiltConfig::default();
        config.separator.count_threshold = 3;
        let mut processor = TiltProcessor::new(&config).unwrap();

        for i in 0..4 {
            processor.process_sample(rest(i * 10));
        }
        assert_eq!(processor.gravity(), Vector3::new(0.0, 0.0, 9.8));
        assert_eq!(processor.separator().qualifying_run_count(), 4);

        let retuned = SeparatorConfig {
            alpha: 0.2,
            count_threshold: 10,
            window_size: 4,
            ..config.separator
        };
        processor.configure(&retuned).unwrap();
        assert_eq!(processor.separator().config(), retuned);
        assert_eq!(processor.gravity(), Vector3::new(0.0, 0.0, 9.8));
        assert_eq!(processor.separator().qualifying_run_count(), 4);

        let out = processor.process_sample(rest(40)).unwrap();
        assert_eq!(out.separation.run_count, 5);
        assert!(!out.separation.latched);
        assert_eq!(out.separation.gravity, Vector3::new(0.0, 0.0, 9.8));

        let bad = SeparatorConfig {
            window_size: 0,
            ..retuned
        };
        assert!(processor.configure(&bad).is_err());
        assert_eq!(processor.separator().window_size(), 4);
    }

    #[test]
    fn test_history_capacity_resized_mid_stream() {
        let mut processor = TiltProcessor::new(&TiltConfig::default()).unwrap();
        for i in 0..6 {
            processor.process_sample(rest(i * 10));
        }
        assert_eq!(processor.history().history(SignalKind::Raw, Axis::Z).len(), 6);

        processor.history_mut().set_capacity(2);
        for kind in SignalKind::ALL {
            assert_eq!(processor.history().history(kind, Axis::X).len(), 2);
        }

        processor.process_sample(rest(60));
        let raw_z = processor.history().history(SignalKind::Raw, Axis::Z);
        assert_eq!(raw_z.len(), 2);
        assert_eq!(raw_z.capacity(), 2);
    }

    #[test]
    fn test_shared_separator_across_threads() {
        let shared = SharedSeparator::new(&SeparatorConfig::default()).unwrap();

        let feeder = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    shared.process(Vector3::new(0.0, 0.0, 9.8));
                }
            })
        };

        let retuned = SeparatorConfig {
            alpha: 0.25,
            count_threshold: 3,
            ..SeparatorConfig::default()
        };
        shared.configure(&retuned).unwrap();
        feeder.join().unwrap();

        assert_eq!(shared.gravity(), Vector3::new(0.0, 0.0, 9.8));
        let separator = shared.lock();
        assert_eq!(separator.count_threshold(), 3);
        assert_eq!(separator.qualifying_run_count(), 100);
    }
}
