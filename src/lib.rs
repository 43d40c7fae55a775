pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod output;
pub mod processing;
pub mod sample;
pub mod signal_processing;
pub mod source;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::TiltConfig;
pub use error::{Result, TiltError};
pub use processing::{ProcessedSample, SharedSeparator, TiltProcessor};
pub use sample::{AccelSample, Vector3};
pub use signal_processing::{GravityLinearSeparator, MovingAverageFilter, Separation};
