mod buffer;
mod plot;

pub use buffer::ScalarHistory;
pub use plot::{PlotHistory, SignalKind};
