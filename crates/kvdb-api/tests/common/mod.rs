// Common test utilities for service integration tests
#![allow(dead_code)]

use kvdb::{CallbackQueue, Cursor, Engine, MemoryEngine, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Run callbacks until `done` holds or `timeout` elapses.
/// Returns whether `done` was reached.
pub fn drain_until(callbacks: &CallbackQueue, timeout: Duration, done: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while !done() {
        if Instant::now() >= deadline {
            return false;
        }
        callbacks.wait_and_run(Duration::from_millis(10));
    }
    true
}

/// Memory engine that logs every put key in execution order
pub struct RecordingEngine {
    inner: MemoryEngine,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let engine = Self {
            inner: MemoryEngine::new(),
            log: Arc::clone(&log),
        };
        (engine, log)
    }
}

impl Engine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.log.lock().unwrap().push(key.to_string());
        self.inner.put(key, value)
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        self.inner.find(key)
    }
}

/// Counts calls that overlap with another call in flight
#[derive(Default)]
pub struct OverlapTracker {
    in_flight: AtomicBool,
    pub overlaps: AtomicUsize,
    pub calls: AtomicUsize,
}

impl OverlapTracker {
    fn enter(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_micros(50));
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Engine that reports overlapping backend calls
pub struct TrackedEngine {
    inner: MemoryEngine,
    tracker: Arc<OverlapTracker>,
}

impl TrackedEngine {
    pub fn new(tracker: Arc<OverlapTracker>) -> Self {
        Self {
            inner: MemoryEngine::new(),
            tracker,
        }
    }
}

impl Engine for TrackedEngine {
    fn name(&self) -> &'static str {
        "tracked"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.tracker.enter();
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.tracker.enter();
        self.inner.put(key, value)
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        self.tracker.enter();
        self.inner.find(key)
    }
}

/// Engine whose `get` blocks until released by the test
pub struct GatedEngine {
    inner: MemoryEngine,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Test side of a [`GatedEngine`]
pub struct Gate {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

impl GatedEngine {
    pub fn new() -> (Self, Gate) {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let engine = Self {
            inner: MemoryEngine::new(),
            entered: entered_tx,
            release: release_rx,
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (engine, gate)
    }
}

impl Engine for GatedEngine {
    fn name(&self) -> &'static str {
        "gated"
    }

    fn get(&self, _key: &str) -> Result<Option<String>> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        Ok(None)
    }

    fn put(&mut self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        self.inner.find(key)
    }
}

/// Engine that panics when asked for `key`
pub struct PanickyEngine {
    pub inner: MemoryEngine,
    pub poison_key: &'static str,
}

impl Engine for PanickyEngine {
    fn name(&self) -> &'static str {
        "panicky"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        if key == self.poison_key {
            panic!("engine blew up on {}", key);
        }
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner.put(key, value)
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        self.inner.find(key)
    }
}
