//! Trailing utilization window.

use std::collections::VecDeque;

/// Fixed-length history of per-tick busy fractions.
///
/// With a 2-minute tick and 30 slots the average is the busy fraction of
/// the last hour. Until the window fills, the average covers only the
/// samples recorded so far.
#[derive(Debug, Clone)]
pub struct UtilizationWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl UtilizationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one tick's busy fraction, clamped to [0, 1].
    pub fn record(&mut self, busy_fraction: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(busy_fraction.clamp(0.0, 1.0));
    }

    /// Mean of the recorded samples; 0.0 before the first sample.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_reads_zero() {
        let window = UtilizationWindow::new(30);
        assert_eq!(window.average(), 0.0);
        assert!(window.is_empty());
    }

    #[test]
    fn partial_window_averages_what_it_has() {
        let mut window = UtilizationWindow::new(30);
        window.record(1.0);
        window.record(0.0);
        assert_eq!(window.average(), 0.5);
    }

    #[test]
    fn old_samples_fall_out() {
        let mut window = UtilizationWindow::new(3);
        for _ in 0..3 {
            window.record(1.0);
        }
        for _ in 0..3 {
            window.record(0.0);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 0.0);
    }

    #[test]
    fn samples_are_clamped() {
        let mut window = UtilizationWindow::new(2);
        window.record(3.0);
        window.record(-1.0);
        assert_eq!(window.average(), 0.5);
    }

    #[test]
    fn zero_capacity_holds_one_sample() {
        let mut window = UtilizationWindow::new(0);
        window.record(0.25);
        window.record(0.75);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.average(), 0.75);
    }
}
