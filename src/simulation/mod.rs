mod noise;
mod trace;

pub use noise::{SensorNoise, SensorNoiseConfig};
pub use trace::{
    Segment, SimulatedSample, TraceConfig, generate_trace, gravity_from_tilt, samples,
};
