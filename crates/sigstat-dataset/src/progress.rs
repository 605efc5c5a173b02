//! Progress reporting for long-running statistics computation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Snapshot sent to a progress callback after each processed pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl Progress {
    /// Completed fraction in `[0, 1]`; 1 when there is nothing to do.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Estimated time left, extrapolated from the average time per item so far.
    ///
    /// `None` until at least one item has completed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        if self.completed == 0 {
            return None;
        }
        let left = self.total.saturating_sub(self.completed);
        Some(self.elapsed.mul_f64(left as f64 / self.completed as f64))
    }
}

/// Shared counter that forwards a [`Progress`] to `sink` on every tick.
pub(crate) struct ProgressTracker<'a> {
    total: usize,
    completed: AtomicUsize,
    start: Instant,
    sink: &'a (dyn Fn(Progress) + Sync),
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(total: usize, sink: &'a (dyn Fn(Progress) + Sync)) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            start: Instant::now(),
            sink,
        }
    }

    pub(crate) fn tick(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        (self.sink)(Progress {
            completed,
            total: self.total,
            elapsed: self.start.elapsed(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn fraction_and_remaining() {
        let p = Progress {
            completed: 25,
            total: 100,
            elapsed: Duration::from_secs(10),
        };
        assert_eq!(p.fraction(), 0.25);
        assert_eq!(p.remaining(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn nothing_done_yet() {
        let p = Progress {
            completed: 0,
            total: 10,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(p.fraction(), 0.0);
        assert_eq!(p.remaining(), None);
    }

    #[test]
    fn empty_run_is_complete() {
        let p = Progress {
            completed: 0,
            total: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn tracker_counts_ticks() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: Progress| seen.lock().unwrap().push(p.completed);
        let tracker = ProgressTracker::new(3, &sink);
        tracker.tick();
        tracker.tick();
        tracker.tick();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
