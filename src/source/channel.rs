use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, bounded};

use super::SampleSource;
use crate::sample::AccelSample;

/// Receiving end of an acquisition thread
///
/// Yields samples until the producing side hangs up. If the acquisition
/// thread stopped because of an error, that error is returned once the
/// buffered samples are drained.
pub struct ChannelSource {
    rx: Receiver<AccelSample>,
    producer: Option<JoinHandle<anyhow::Result<usize>>>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<AccelSample>) -> Self {
        Self { rx, producer: None }
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        if let Some(handle) = self.producer.take() {
            match handle.join() {
                Ok(result) => {
                    let count = result?;
                    log::debug!("acquisition finished after {} samples", count);
                }
                Err(_) => anyhow::bail!("acquisition thread panicked"),
            }
        }
        Ok(())
    }
}

impl SampleSource for ChannelSource {
    fn next_sample(&mut self) -> anyhow::Result<Option<AccelSample>> {
        match self.rx.recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(_) => {
                self.finish()?;
                Ok(None)
            }
        }
    }
}

/// Run `source` on a background thread, handing samples over a bounded channel
///
/// The acquisition thread stops when its source is exhausted, fails, or the
/// returned [`ChannelSource`] is dropped.
pub fn spawn_acquisition<S>(mut source: S, capacity: usize) -> anyhow::Result<ChannelSource>
where
    S: SampleSource + 'static,
{
    let (tx, rx) = bounded(capacity);

    let handle = std::thread::Builder::new()
        .name("acquisition".to_string())
        .spawn(move || -> anyhow::Result<usize> {
            let mut count = 0;
            while let Some(sample) = source.next_sample()? {
                if tx.send(sample).is_err() {
                    log::debug!("sample consumer went away");
                    break;
                }
                count += 1;
            }
            Ok(count)
        })?;

    Ok(ChannelSource {
        rx,
        producer: Some(handle),
    })
}
