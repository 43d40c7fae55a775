use std::collections::VecDeque;

/// Fixed-capacity FIFO of scalar values for plotting
pub struct ScalarHistory {
    buffer: VecDeque<f32>,
    capacity: usize,
}

impl ScalarHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, dropping the oldest ones beyond capacity
    pub fn push(&mut self, value: f32) {
        self.buffer.push_back(value);

        if self.buffer.len() > self.capacity {
            let excess = self.buffer.len() - self.capacity;
            self.buffer.drain(0..excess);
        }
    }

    /// Values in chronological order (oldest to newest)
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.buffer.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values().collect()
    }

    /// Most recent value
    pub fn latest(&self) -> Option<f32> {
        self.buffer.back().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity; shrinking drops the oldest values immediately
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        if self.buffer.len() > self.capacity {
            let excess = self.buffer.len() - self.capacity;
            self.buffer.drain(0..excess);
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ScalarHistory {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_HISTORY_CAPACITY)
    }
}
