//! Configuration for the tilt compensation pipeline.
//!
//! Everything here can be built from `Default`, loaded from a TOML file, and
//! then overridden field by field from the command line:
//!
//! ```toml
//! [separator]
//! alpha = 0.5
//! count_threshold = 5
//! initial_threshold = 1.05
//! window_size = 20
//!
//! [history]
//! capacity = 100
//! axes = "xyz"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_COUNT_THRESHOLD, DEFAULT_HISTORY_CAPACITY, DEFAULT_INITIAL_THRESHOLD,
    DEFAULT_WINDOW_SIZE, MAGNITUDE_FLOOR,
};
use crate::error::{Result, TiltError};
use crate::sample::Axis;

/// Set of accelerometer axes to record
///
/// # Parsing formats
/// - `xyz` - all three axes
/// - `xz`, `Z`, `y` - any non-empty combination of the letters x, y and z
///
/// # Example
/// ```
/// use tiltcomp::config::AxisSelection;
/// use tiltcomp::sample::Axis;
///
/// let axes: AxisSelection = "xz".parse().unwrap();
/// assert!(axes.contains(Axis::X));
/// assert!(!axes.contains(Axis::Y));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSelection {
    x: bool,
    y: bool,
    z: bool,
}

impl AxisSelection {
    pub fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    pub fn contains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl Default for AxisSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for AxisSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (axis, name) in [(Axis::X, 'x'), (Axis::Y, 'y'), (Axis::Z, 'z')] {
            if self.contains(axis) {
                write!(f, "{}", name)?;
            }
        }
        Ok(())
    }
}

impl FromStr for AxisSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut selection = Self {
            x: false,
            y: false,
            z: false,
        };

        for c in s.trim().chars() {
            match c.to_ascii_lowercase() {
                'x' => selection.x = true,
                'y' => selection.y = true,
                'z' => selection.z = true,
                ',' | ' ' => {}
                other => return Err(format!("invalid axis '{}' in {:?}", other, s)),
            }
        }

        if !(selection.x || selection.y || selection.z) {
            return Err("at least one axis is required".to_string());
        }
        Ok(selection)
    }
}

impl<'de> Deserialize<'de> for AxisSelection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// System-wide configuration
///
/// Use `TiltConfig::default()` for the stock tuning.
///
/// # Example
/// ```
/// use tiltcomp::config::TiltConfig;
///
/// let mut config = TiltConfig::default();
/// config.separator.count_threshold = 10;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TiltConfig {
    /// Gravity separator tuning
    pub separator: SeparatorConfig,
    /// Plot history configuration
    pub history: HistoryConfig,
}

impl TiltConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TiltConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.separator.validate()?;
        self.history.validate()
    }
}

/// Gravity separator tuning
///
/// All of these can be changed on a running separator without losing its
/// gravity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeparatorConfig {
    /// Weight pulling the threshold towards the magnitude mean (0-1)
    pub alpha: f32,
    /// Consecutive qualifying samples required before gravity is latched
    pub count_threshold: usize,
    /// Starting upper edge of the static band, in g
    pub initial_threshold: f32,
    /// Moving average window over static-sample magnitudes
    pub window_size: usize,
}

impl SeparatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(TiltError::Config(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if self.window_size == 0 {
            return Err(TiltError::Config(
                "window_size must be at least 1".to_string(),
            ));
        }
        if !self.initial_threshold.is_finite() || self.initial_threshold <= 0.0 {
            return Err(TiltError::Config(format!(
                "initial_threshold must be a positive finite number, got {}",
                self.initial_threshold
            )));
        }
        if self.initial_threshold <= MAGNITUDE_FLOOR {
            log::warn!(
                "initial_threshold {} is at or below the {} floor; no sample can qualify",
                self.initial_threshold,
                MAGNITUDE_FLOOR
            );
        }
        Ok(())
    }
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            count_threshold: DEFAULT_COUNT_THRESHOLD,
            initial_threshold: DEFAULT_INITIAL_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Plot history configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Values kept per signal and axis
    pub capacity: usize,
    /// Axes to record
    pub axes: AxisSelection,
    /// Record raw acceleration
    pub raw: bool,
    /// Record the gravity estimate
    pub gravity: bool,
    /// Record linear acceleration
    pub linear: bool,
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TiltError::Config(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            axes: AxisSelection::all(),
            raw: true,
            gravity: true,
            linear: true,
        }
    }
}
