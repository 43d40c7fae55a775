use std::collections::VecDeque;

/// Sliding-window mean filter
///
/// Computes the arithmetic mean of the last N values inserted. Used to track
/// the average magnitude of samples the separator considers static, which in
/// turn pulls the adaptive threshold.
///
/// The window size can be changed at any time. A smaller window is applied
/// on the next insertion, when the oldest values beyond it are evicted.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    window: VecDeque<f32>,
    window_size: usize,
}

impl MovingAverageFilter {
    /// Create a new moving average filter
    ///
    /// # Arguments
    /// * `window_size` - Number of samples to average (clamped to at least 1)
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size + 1),
            window_size,
        }
    }

    /// Add a new value to the window and return the updated average
    ///
    /// Appends the value, evicts the oldest values while the window holds
    /// more than `window_size` entries, and returns the mean of what remains.
    /// The window is never empty after an insertion.
    pub fn insert(&mut self, value: f32) -> f32 {
        self.window.push_back(value);

        while self.window.len() > self.window_size {
            self.window.pop_front();
        }

        let sum: f32 = self.window.iter().sum();
        sum / self.window.len() as f32
    }

    /// Get the current average without adding a new value
    ///
    /// Returns `None` before the first insertion.
    pub fn average(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let sum: f32 = self.window.iter().sum();
        Some(sum / self.window.len() as f32)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Change the window size; takes effect on the next insertion
    pub fn set_window_size(&mut self, window_size: usize) {
        self.window_size = window_size.max(1);
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_WINDOW_SIZE)
    }
}
