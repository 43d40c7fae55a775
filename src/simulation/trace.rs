use std::f32::consts::PI;

use super::noise::{SensorNoise, SensorNoiseConfig};
use crate::constants::GRAVITY_EARTH;
use crate::error::{Result, TiltError};
use crate::sample::{AccelSample, Vector3};

/// One stretch of simulated device behaviour
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// Device held still at a fixed tilt
    Static {
        duration_secs: f32,
        /// `[roll, pitch]` in degrees
        tilt_degrees: [f32; 2],
    },
    /// Fixed tilt plus sinusoidal linear acceleration
    Motion {
        duration_secs: f32,
        tilt_degrees: [f32; 2],
        /// Peak linear acceleration per axis in m/s²
        amplitude: [f32; 3],
        frequency_hz: f32,
    },
    /// Slow rotation from one tilt to another with no linear acceleration
    Rotate {
        duration_secs: f32,
        from_degrees: [f32; 2],
        to_degrees: [f32; 2],
    },
}

impl Segment {
    fn duration_secs(&self) -> f32 {
        match self {
            Segment::Static { duration_secs, .. }
            | Segment::Motion { duration_secs, .. }
            | Segment::Rotate { duration_secs, .. } => *duration_secs,
        }
    }

    /// Ground-truth gravity and linear acceleration `t` seconds into the segment
    fn truth_at(&self, t: f32) -> (Vector3, Vector3) {
        match self {
            Segment::Static { tilt_degrees, .. } => {
                (gravity_from_tilt(tilt_degrees[0], tilt_degrees[1]), Vector3::ZERO)
            }
            Segment::Motion {
                tilt_degrees,
                amplitude,
                frequency_hz,
                ..
            } => {
                let s = (2.0 * PI * frequency_hz * t).sin();
                (
                    gravity_from_tilt(tilt_degrees[0], tilt_degrees[1]),
                    Vector3::new(amplitude[0] * s, amplitude[1] * s, amplitude[2] * s),
                )
            }
            Segment::Rotate {
                duration_secs,
                from_degrees,
                to_degrees,
            } => {
                let f = if *duration_secs > 0.0 {
                    (t / duration_secs).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let roll = from_degrees[0] + f * (to_degrees[0] - from_degrees[0]);
                let pitch = from_degrees[1] + f * (to_degrees[1] - from_degrees[1]);
                (gravity_from_tilt(roll, pitch), Vector3::ZERO)
            }
        }
    }
}

/// Scenario description for a synthetic accelerometer trace
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceConfig {
    pub sample_rate_hz: f32,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub noise: Option<SensorNoiseConfig>,
}

impl TraceConfig {
    pub fn new(sample_rate_hz: f32) -> Self {
        Self {
            sample_rate_hz,
            segments: Vec::new(),
            noise: None,
        }
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_noise(mut self, noise: SensorNoiseConfig) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn total_duration_secs(&self) -> f32 {
        self.segments.iter().map(Segment::duration_secs).sum()
    }
}

/// A generated sample with the gravity and linear acceleration that produced it
#[derive(Clone, Copy, Debug)]
pub struct SimulatedSample {
    pub sample: AccelSample,
    pub gravity: Vector3,
    pub linear: Vector3,
}

/// Gravity as read by an accelerometer at rest, for the given tilt
///
/// With zero roll and pitch the device lies flat and reads `+g` on z.
pub fn gravity_from_tilt(roll_degrees: f32, pitch_degrees: f32) -> Vector3 {
    let roll = roll_degrees.to_radians();
    let pitch = pitch_degrees.to_radians();
    Vector3::new(
        -GRAVITY_EARTH * pitch.sin(),
        GRAVITY_EARTH * roll.sin() * pitch.cos(),
        GRAVITY_EARTH * roll.cos() * pitch.cos(),
    )
}

/// Render a scenario into timestamped samples
pub fn generate_trace(config: &TraceConfig) -> Result<Vec<SimulatedSample>> {
    if !config.sample_rate_hz.is_finite() || config.sample_rate_hz <= 0.0 {
        return Err(TiltError::Config(format!(
            "sample_rate_hz must be positive, got {}",
            config.sample_rate_hz
        )));
    }

    let mut noise = config.noise.as_ref().map(SensorNoise::new).transpose()?;

    let period_ns = 1_000_000_000.0 / config.sample_rate_hz as f64;
    let mut samples = Vec::new();
    let mut index: u64 = 0;

    for segment in &config.segments {
        let count = (segment.duration_secs() * config.sample_rate_hz).round() as usize;
        for i in 0..count {
            let t = i as f32 / config.sample_rate_hz;
            let (gravity, linear) = segment.truth_at(t);

            let clean = Vector3::new(
                gravity.x + linear.x,
                gravity.y + linear.y,
                gravity.z + linear.z,
            );
            let values = match noise.as_mut() {
                Some(noise) => noise.apply(clean),
                None => clean,
            };

            let timestamp_ns = (index as f64 * period_ns).round() as u64;
            samples.push(SimulatedSample {
                sample: AccelSample::new(timestamp_ns, values),
                gravity,
                linear,
            });
            index += 1;
        }
    }

    Ok(samples)
}

/// Strip ground truth, leaving what a sensor would deliver
pub fn samples(trace: &[SimulatedSample]) -> Vec<AccelSample> {
    trace.iter().map(|s| s.sample).collect()
}
