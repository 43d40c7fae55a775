use super::ScalarHistory;
use crate::config::HistoryConfig;
use crate::sample::{Axis, Vector3};
use crate::signal_processing::Separation;

/// Which of the three separated signals a history holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Acceleration as measured
    Raw,
    /// Latched gravity estimate
    Gravity,
    /// Tilt-compensated linear acceleration
    Linear,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [SignalKind::Raw, SignalKind::Gravity, SignalKind::Linear];

    fn index(self) -> usize {
        match self {
            SignalKind::Raw => 0,
            SignalKind::Gravity => 1,
            SignalKind::Linear => 2,
        }
    }

    fn select(self, separation: &Separation) -> Vector3 {
        match self {
            SignalKind::Raw => separation.raw,
            SignalKind::Gravity => separation.gravity,
            SignalKind::Linear => separation.linear,
        }
    }
}

/// Rolling per-axis history of raw, gravity and linear acceleration
///
/// Holds one bounded FIFO for every signal/axis pair. Turning a signal or
/// an axis off clears its histories so that a later re-enable starts fresh
/// rather than splicing stale data onto new samples.
pub struct PlotHistory {
    histories: [[ScalarHistory; 3]; 3],
    signal_enabled: [bool; 3],
    axis_enabled: [bool; 3],
}

impl PlotHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        let histories = std::array::from_fn(|_| {
            std::array::from_fn(|_| ScalarHistory::new(config.capacity))
        });

        Self {
            histories,
            signal_enabled: [config.raw, config.gravity, config.linear],
            axis_enabled: Axis::ALL.map(|axis| config.axes.contains(axis)),
        }
    }

    /// Record one separated sample on every enabled signal/axis
    pub fn push(&mut self, separation: &Separation) {
        for kind in SignalKind::ALL {
            if !self.signal_enabled[kind.index()] {
                continue;
            }
            let vector = kind.select(separation);
            for axis in Axis::ALL {
                if self.axis_enabled[axis.index()] {
                    self.histories[kind.index()][axis.index()].push(vector.axis(axis));
                }
            }
        }
    }

    pub fn history(&self, kind: SignalKind, axis: Axis) -> &ScalarHistory {
        &self.histories[kind.index()][axis.index()]
    }

    pub fn is_signal_enabled(&self, kind: SignalKind) -> bool {
        self.signal_enabled[kind.index()]
    }

    pub fn is_axis_enabled(&self, axis: Axis) -> bool {
        self.axis_enabled[axis.index()]
    }

    pub fn set_signal_enabled(&mut self, kind: SignalKind, enabled: bool) {
        if !enabled {
            for history in self.histories[kind.index()].iter_mut() {
                history.clear();
            }
        }
        self.signal_enabled[kind.index()] = enabled;
    }

    pub fn set_axis_enabled(&mut self, axis: Axis, enabled: bool) {
        if !enabled {
            for signal in self.histories.iter_mut() {
                signal[axis.index()].clear();
            }
        }
        self.axis_enabled[axis.index()] = enabled;
    }

    /// Change the capacity of every history
    pub fn set_capacity(&mut self, capacity: usize) {
        for history in self.histories.iter_mut().flatten() {
            history.set_capacity(capacity);
        }
    }

    pub fn clear(&mut self) {
        for history in self.histories.iter_mut().flatten() {
            history.clear();
        }
    }
}

impl Default for PlotHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}
