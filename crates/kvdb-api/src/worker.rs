//! Dispatch worker - the single consumer of the operation queue
//!
//! The worker owns the engine. Every backend call happens on the worker
//! thread, one at a time, in queue order. Results never run on this thread:
//! each callback is handed to the scheduler with zero delay. A backend call
//! that panics is reported to its caller as a storage error.

use crate::opmon::OpMonitor;
use crate::queue::OperationQueue;
use crate::request::Request;
use crate::scheduler::CallbackScheduler;
use crate::serve::panic_message;
use kvdb_core::{Engine, Error, Item, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Name of the worker thread
pub const WORKER_THREAD_NAME: &str = "kvdb-worker";

pub(crate) struct Worker {
    queue: Arc<OperationQueue<Request>>,
    engine: Box<dyn Engine>,
    scheduler: Arc<dyn CallbackScheduler>,
    monitor: Arc<OpMonitor>,
    slow_threshold: Duration,
}

impl Worker {
    pub(crate) fn new(
        queue: Arc<OperationQueue<Request>>,
        engine: Box<dyn Engine>,
        scheduler: Arc<dyn CallbackScheduler>,
        monitor: Arc<OpMonitor>,
        slow_threshold: Duration,
    ) -> Self {
        Self {
            queue,
            engine,
            scheduler,
            monitor,
            slow_threshold,
        }
    }

    /// Drain the queue forever
    pub(crate) fn run(&mut self) {
        tracing::info!(engine = self.engine.name(), "kvdb worker started");
        loop {
            let request = self.queue.pop();
            self.process(request);
        }
    }

    /// Execute one request against the engine and schedule its callback
    pub(crate) fn process(&mut self, request: Request) {
        let op = self.monitor.start(request.op_name());
        match request {
            Request::Get { key, on_done } => {
                let engine = &self.engine;
                let result = contain_panic(|| engine.get(&key));
                self.deliver(on_done, result);
            }
            Request::Put {
                key,
                value,
                on_done,
            } => {
                let engine = &mut self.engine;
                let result = contain_panic(|| engine.put(&key, &value));
                self.deliver(on_done, result);
            }
            Request::GetRange {
                begin_key,
                end_key,
                on_done,
            } => {
                let engine = self.engine.as_ref();
                let result = contain_panic(|| scan_range(engine, &begin_key, &end_key));
                self.deliver(on_done, result);
            }
        }
        let _ = op.finish(self.slow_threshold);
    }

    fn deliver<T: Send + 'static>(
        &self,
        on_done: Option<Box<dyn FnOnce(Result<T>) + Send + 'static>>,
        result: Result<T>,
    ) {
        if let Some(callback) = on_done {
            self.scheduler
                .schedule(Duration::ZERO, Box::new(move || callback(result)));
        }
    }
}

/// Run one backend call, turning a panic into `Error::Storage`
fn contain_panic<T>(call: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(panic = %message, "kvdb backend panicked");
            Err(Error::Storage(format!("backend panicked: {}", message)))
        }
    }
}

/// Collect items with `begin_key <= key < end_key`.
///
/// Stops at the first key at or past `end_key` or when the cursor is
/// exhausted. A cursor failure discards everything collected so far.
pub fn scan_range(engine: &dyn Engine, begin_key: &str, end_key: &str) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    if begin_key >= end_key {
        return Ok(items);
    }

    let mut cursor = engine.find(begin_key)?;
    while let Some(item) = cursor.next_item()? {
        if item.key() >= end_key {
            break;
        }
        items.push(item);
    }
    Ok(items)
}
