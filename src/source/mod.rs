mod channel;
mod trace;

pub use channel::{ChannelSource, spawn_acquisition};
pub use trace::{CsvTraceSource, TRACE_HEADER, write_trace};

use crate::sample::AccelSample;

/// Producer of accelerometer samples
///
/// Returns `Ok(None)` once the source is exhausted.
pub trait SampleSource: Send {
    fn next_sample(&mut self) -> anyhow::Result<Option<AccelSample>>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn next_sample(&mut self) -> anyhow::Result<Option<AccelSample>> {
        (**self).next_sample()
    }
}

/// Source over samples already held in memory
pub struct MemorySource {
    samples: std::vec::IntoIter<AccelSample>,
}

impl MemorySource {
    pub fn new(samples: Vec<AccelSample>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }
}

impl SampleSource for MemorySource {
    fn next_sample(&mut self) -> anyhow::Result<Option<AccelSample>> {
        Ok(self.samples.next())
    }
}
