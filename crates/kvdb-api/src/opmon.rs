//! Operation monitor - per-operation timing and slow-operation warnings

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Aggregated timings for one operation name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpStats {
    /// Completed operations
    pub count: u64,
    /// Operations slower than their threshold
    pub slow: u64,
    /// Sum of all durations
    pub total: Duration,
    /// Longest single duration
    pub max: Duration,
}

impl OpStats {
    /// Mean duration, zero when nothing was recorded
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.count);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Collects operation timings
#[derive(Debug, Default)]
pub struct OpMonitor {
    stats: Mutex<HashMap<&'static str, OpStats>>,
}

impl OpMonitor {
    /// Creates a shared monitor
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Start timing an operation
    pub fn start(self: &Arc<Self>, name: &'static str) -> Operation {
        Operation {
            monitor: Arc::clone(self),
            name,
            started: Instant::now(),
        }
    }

    /// Copy of the current statistics
    pub fn snapshot(&self) -> HashMap<&'static str, OpStats> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Statistics for one operation name
    pub fn stats(&self, name: &str) -> Option<OpStats> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .copied()
    }

    fn record(&self, name: &'static str, elapsed: Duration, slow: bool) {
        let mut stats = self
            .stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = stats.entry(name).or_default();
        entry.count += 1;
        entry.total += elapsed;
        entry.max = entry.max.max(elapsed);
        if slow {
            entry.slow += 1;
        }
    }
}

/// An operation being timed
#[must_use = "an operation is only recorded when finished"]
pub struct Operation {
    monitor: Arc<OpMonitor>,
    name: &'static str,
    started: Instant,
}

impl Operation {
    /// Operation name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the clock and record the duration; warns if it exceeded
    /// `slow_threshold`
    pub fn finish(self, slow_threshold: Duration) -> Duration {
        let elapsed = self.started.elapsed();
        let slow = elapsed > slow_threshold;
        if slow {
            tracing::warn!(
                op = self.name,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = slow_threshold.as_millis() as u64,
                "operation {} is slow",
                self.name
            );
        }
        self.monitor.record(self.name, elapsed, slow);
        elapsed
    }
}
