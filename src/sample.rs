use std::ops::Sub;

use serde::Serialize;

use crate::constants::GRAVITY_EARTH;

/// Three-axis acceleration vector in m/s²
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(values: [f32; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component for the given axis
    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(values: [f32; 3]) -> Self {
        Self::from_array(values)
    }
}

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// One accelerometer event as delivered by a sensor source
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AccelSample {
    /// Sensor timestamp in nanoseconds
    pub timestamp_ns: u64,
    /// Raw acceleration in m/s²
    pub values: Vector3,
}

impl AccelSample {
    pub fn new(timestamp_ns: u64, values: Vector3) -> Self {
        Self {
            timestamp_ns,
            values,
        }
    }
}

/// Magnitude of a raw sample normalized by standard gravity.
///
/// Reads ~1.0 for a device at rest regardless of its orientation.
pub fn normalized_magnitude(raw: &Vector3) -> f32 {
    raw.norm() / GRAVITY_EARTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_magnitude_at_rest() {
        let raw = Vector3::new(0.0, 0.0, GRAVITY_EARTH);
        assert!((normalized_magnitude(&raw) - 1.0).abs() < 1e-6);

        let tilted = Vector3::new(GRAVITY_EARTH / 2f32.sqrt(), 0.0, GRAVITY_EARTH / 2f32.sqrt());
        assert!((normalized_magnitude(&tilted) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_subtraction_is_componentwise() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(0.5, 2.0, 4.0);
        assert_eq!(a - b, Vector3::new(0.5, 0.0, -1.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vector3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vector3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vector3::new(0.0, f32::INFINITY, 0.0).is_finite());
    }
}
