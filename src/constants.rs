//! Numeric constants for gravity separation
//!
//! These constants define the static-detection band and the default tuning
//! used by the gravity/linear acceleration separator.

/// Standard gravity in m/s². Raw sample norms are divided by this to get
/// a dimensionless magnitude that sits near 1.0 when the device is at rest.
pub const GRAVITY_EARTH: f32 = 9.80665;

/// Lower (exclusive) edge of the qualifying magnitude band.
/// Samples at or below this are treated as linear acceleration.
pub const MAGNITUDE_FLOOR: f32 = 0.95;

/// Constant added to the adaptive threshold on every qualifying sample.
pub const THRESHOLD_BIAS: f64 = 0.01;

/// Starting value of the adaptive threshold (upper edge of the band).
pub const DEFAULT_INITIAL_THRESHOLD: f32 = 1.05;

/// Default weight pulling the threshold towards the magnitude mean.
pub const DEFAULT_ALPHA: f32 = 0.5;

/// Default number of consecutive qualifying samples before gravity is latched.
pub const DEFAULT_COUNT_THRESHOLD: usize = 5;

/// Default moving average window over the magnitude stream.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Default capacity of each plot history FIFO.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
