//! Backpressure monitor - advisory warnings on queue growth
//!
//! A warning fires when the queue length, sampled after a push, is above
//! `warn_above`, lands on a multiple of `step`, and differs from the last
//! length warned about. The watermark is cleared once the length falls at
//! least half a step below it, so a queue hovering around one plateau warns
//! once while a queue that drains and refills warns again. With the default
//! thresholds a queue that reaches 200, drops to 150 and climbs back to 200
//! warns at 200 both times; dropping only to 151 in between keeps it quiet.
//!
//! Nothing here throttles or rejects operations.

use kvdb_core::BackpressureConfig;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Queue-length watchdog
#[derive(Debug)]
pub struct BackpressureMonitor {
    warn_above: usize,
    step: usize,
    /// Last length warned about, 0 when re-armed
    last_warned: AtomicUsize,
}

impl BackpressureMonitor {
    /// Creates a monitor with the given thresholds
    pub fn new(config: &BackpressureConfig) -> Self {
        Self {
            warn_above: config.warn_above,
            step: config.step.max(1),
            last_warned: AtomicUsize::new(0),
        }
    }

    /// Inspect a freshly sampled queue length; returns true if it warned
    pub fn check(&self, queue_len: usize) -> bool {
        let last = self.last_warned.load(Ordering::Relaxed);
        if last != 0 && queue_len.saturating_add(self.rearm_margin()) <= last {
            let _ = self.last_warned.compare_exchange(
                last,
                0,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }

        if queue_len > self.warn_above
            && queue_len % self.step == 0
            && self.last_warned.swap(queue_len, Ordering::Relaxed) != queue_len
        {
            tracing::warn!(queue_len, "KVDB operation queue length = {}", queue_len);
            return true;
        }
        false
    }

    /// Last length warned about, if armed
    pub fn last_warned(&self) -> Option<usize> {
        match self.last_warned.load(Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        }
    }

    fn rearm_margin(&self) -> usize {
        (self.step / 2).max(1)
    }
}

impl Default for BackpressureMonitor {
    fn default() -> Self {
        Self::new(&BackpressureConfig::default())
    }
}
