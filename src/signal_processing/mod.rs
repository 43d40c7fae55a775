pub mod gravity_separator;
pub mod moving_average;

pub use gravity_separator::{GravityLinearSeparator, Separation};
pub use moving_average::MovingAverageFilter;
