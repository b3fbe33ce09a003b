//! Motion history of a saber tip, used to trigger swing sounds.
//!
//! Bounded FIFO of recent tip X positions with hysteresis: a swing fires when
//! the tip leaves the recent [min, max] band by more than the threshold.

use std::fmt;

use ringbuf::{traits::*, HeapRb};

/// Recent tip X positions of one saber
pub struct MotionHistory {
    samples: HeapRb<f64>,
    capacity: usize,
    threshold: f64,
}

impl fmt::Debug for MotionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionHistory")
            .field("len", &self.samples.occupied_len())
            .field("capacity", &self.capacity)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl MotionHistory {
    pub fn new(capacity: usize, threshold: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: HeapRb::new(capacity),
            capacity,
            threshold,
        }
    }

    /// Feed the current tip X, returns `true` when a swing fires
    ///
    /// The first sample only seeds the history. A swing clears the history,
    /// the triggering sample then starts the next one.
    pub fn observe(&mut self, x: f64) -> bool {
        let Some(last) = self.last() else {
            let _ = self.samples.try_push(x);
            return false;
        };

        if self.samples.is_full() {
            let _ = self.samples.try_pop();
        }

        let (min, max) = self.bounds();
        let swing = if x < last {
            x < min - self.threshold
        } else {
            x > max + self.threshold
        };

        if swing {
            self.clear();
        }
        let _ = self.samples.try_push(x);
        swing
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.pop_iter().for_each(drop);
    }

    pub fn len(&self) -> usize {
        self.samples.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest
    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    fn last(&self) -> Option<f64> {
        self.samples.iter().last().copied()
    }

    fn bounds(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
                (min.min(x), max.max(x))
            })
    }
}
