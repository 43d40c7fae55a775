use serde::Serialize;

use super::MovingAverageFilter;
use crate::config::SeparatorConfig;
use crate::constants::{MAGNITUDE_FLOOR, THRESHOLD_BIAS};
use crate::error::Result;
use crate::sample::{Vector3, normalized_magnitude};

/// Result of separating one raw sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Separation {
    /// Raw acceleration as received
    pub raw: Vector3,
    /// Current gravity estimate (after this sample)
    pub gravity: Vector3,
    /// Tilt-compensated linear acceleration, `raw - gravity`
    pub linear: Vector3,
    /// Raw norm divided by standard gravity
    pub magnitude: f32,
    /// Adaptive threshold after this sample
    pub threshold: f64,
    /// Length of the current qualifying run
    pub run_count: usize,
    /// Whether the sample fell inside the static-detection band
    pub qualifying: bool,
    /// Whether this sample was latched as the new gravity estimate
    pub latched: bool,
}

/// Adaptive gravity / linear acceleration separator
///
/// Without a gyroscope there is no way to tell tilt from motion directly, so
/// the separator assumes the device is static whenever the normalized
/// magnitude stays inside `(0.95, threshold]`. Each sample in that band
/// pushes the threshold towards the moving average of recent static
/// magnitudes, plus a small constant bias. The bias has no decay counterpart,
/// so over long static runs the threshold creeps upward.
///
/// Motion can momentarily produce a magnitude of ~1g, so a single sample in
/// the band is not enough. Only after `count_threshold` consecutive
/// qualifying samples is the raw vector latched as the gravity estimate. The
/// latch is a direct copy of all three axes, never a smoothed value.
///
/// Linear acceleration is always `raw - gravity`. Before the first latch the
/// gravity estimate is zero and linear acceleration equals the raw input.
#[derive(Debug, Clone)]
pub struct GravityLinearSeparator {
    threshold: f64,
    initial_threshold: f32,
    alpha: f32,
    count_threshold: usize,
    run_count: usize,
    gravity: Vector3,
    magnitude_filter: MovingAverageFilter,
}

impl GravityLinearSeparator {
    /// Create a new separator
    ///
    /// # Arguments
    /// * `config` - Separator tuning; rejected if it fails validation
    pub fn new(config: &SeparatorConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            threshold: f64::from(config.initial_threshold),
            initial_threshold: config.initial_threshold,
            alpha: config.alpha,
            count_threshold: config.count_threshold,
            run_count: 0,
            gravity: Vector3::ZERO,
            magnitude_filter: MovingAverageFilter::new(config.window_size),
        })
    }

    /// Process one raw accelerometer sample
    ///
    /// # Returns
    /// The gravity estimate and linear acceleration after this sample,
    /// together with the detector state that produced them
    pub fn process(&mut self, raw: Vector3) -> Separation {
        let magnitude = normalized_magnitude(&raw);

        // NaN fails both comparisons, infinity fails the upper bound
        let qualifying = f64::from(magnitude) <= self.threshold && magnitude > MAGNITUDE_FLOOR;

        if qualifying {
            // Threshold accumulates in f64
            let mean = f64::from(self.magnitude_filter.insert(magnitude));
            self.threshold += f64::from(self.alpha) * (mean - self.threshold) + THRESHOLD_BIAS;
            self.run_count += 1;
        } else {
            self.run_count = 0;
        }

        log::trace!(
            "magnitude {:.4}, threshold {:.4}, run {}",
            magnitude,
            self.threshold,
            self.run_count
        );

        let latched = self.run_count >= self.count_threshold && raw.is_finite();
        if latched {
            if self.gravity != raw {
                log::debug!(
                    "gravity latched: [{:.3}, {:.3}, {:.3}] after {} static samples",
                    raw.x,
                    raw.y,
                    raw.z,
                    self.run_count
                );
            }
            self.gravity = raw;
        }

        Separation {
            raw,
            gravity: self.gravity,
            linear: raw - self.gravity,
            magnitude,
            threshold: self.threshold,
            run_count: self.run_count,
            qualifying,
            latched,
        }
    }

    /// Apply new tuning without discarding the gravity estimate or the
    /// current qualifying run
    ///
    /// The live threshold is re-seeded only when `initial_threshold` differs
    /// from the one currently configured, so re-applying the same config
    /// keeps whatever the threshold has adapted to.
    pub fn configure(&mut self, config: &SeparatorConfig) -> Result<()> {
        config.validate()?;

        self.alpha = config.alpha;
        self.count_threshold = config.count_threshold;
        self.magnitude_filter.set_window_size(config.window_size);

        if config.initial_threshold != self.initial_threshold {
            self.initial_threshold = config.initial_threshold;
            self.threshold = f64::from(config.initial_threshold);
        }

        Ok(())
    }

    /// Current configuration, with `initial_threshold` as last configured
    pub fn config(&self) -> SeparatorConfig {
        SeparatorConfig {
            alpha: self.alpha,
            count_threshold: self.count_threshold,
            initial_threshold: self.initial_threshold,
            window_size: self.magnitude_filter.window_size(),
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        let config = SeparatorConfig {
            alpha,
            ..self.config()
        };
        config.validate()?;
        self.alpha = alpha;
        Ok(())
    }

    pub fn set_count_threshold(&mut self, count_threshold: usize) {
        self.count_threshold = count_threshold;
    }

    pub fn set_window_size(&mut self, window_size: usize) -> Result<()> {
        let config = SeparatorConfig {
            window_size,
            ..self.config()
        };
        config.validate()?;
        self.magnitude_filter.set_window_size(window_size);
        Ok(())
    }

    /// Overwrite the live adaptive threshold
    pub fn set_threshold(&mut self, threshold: f32) -> Result<()> {
        let config = SeparatorConfig {
            initial_threshold: threshold,
            ..self.config()
        };
        config.validate()?;
        self.threshold = f64::from(threshold);
        Ok(())
    }

    /// Return to the freshly constructed state, keeping the configuration
    pub fn reset(&mut self) {
        self.threshold = f64::from(self.initial_threshold);
        self.run_count = 0;
        self.gravity = Vector3::ZERO;
        self.magnitude_filter.reset();
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn qualifying_run_count(&self) -> usize {
        self.run_count
    }

    pub fn gravity(&self) -> Vector3 {
        self.gravity
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn count_threshold(&self) -> usize {
        self.count_threshold
    }

    pub fn window_size(&self) -> usize {
        self.magnitude_filter.window_size()
    }
}
