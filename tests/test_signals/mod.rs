#![allow(dead_code)]

use tiltcomp::constants::GRAVITY_EARTH;
use tiltcomp::{AccelSample, Vector3};

/// Sample with the given normalized magnitude, pointing along `direction`
pub fn sample_with_magnitude(direction: Vector3, magnitude: f32) -> Vector3 {
    let norm = direction.norm();
    let scale = magnitude * GRAVITY_EARTH / norm;
    Vector3::new(direction.x * scale, direction.y * scale, direction.z * scale)
}

/// Device lying flat, reading exactly 1g on z
pub fn flat() -> Vector3 {
    Vector3::new(0.0, 0.0, GRAVITY_EARTH)
}

/// Timestamped samples at a fixed rate
pub fn at_rate(values: &[Vector3], sample_rate_hz: f32) -> Vec<AccelSample> {
    let period_ns = (1_000_000_000.0 / sample_rate_hz as f64) as u64;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| AccelSample::new(i as u64 * period_ns, *v))
        .collect()
}
