//! The KVDB service handle.

use crate::backpressure::BackpressureMonitor;
use crate::opmon::OpMonitor;
use crate::queue::OperationQueue;
use crate::request::{GetCallback, GetRangeCallback, PutCallback, Request};
use crate::scheduler::{Callback, CallbackScheduler};
use crate::serve::serve_forever;
use crate::worker::{Worker, WORKER_THREAD_NAME};
use kvdb_core::{Engine, Error, Item, KvdbConfig, Result};
use std::sync::Arc;
use std::time::Duration;

struct Dispatch {
    queue: Arc<OperationQueue<Request>>,
    backpressure: BackpressureMonitor,
}

/// Asynchronous, serialized front end to a storage engine.
///
/// Every operation is queued and executed by a single worker thread in
/// submission order; results come back through the [`CallbackScheduler`]
/// the service was opened with. Cloning the handle shares the same queue and
/// worker.
///
/// Operations have no timeout. A backend call that never returns stalls
/// every operation queued behind it.
///
/// # Examples
///
/// ```rust,no_run
/// use kvdb::{CallbackQueue, KvdbConfig, KvdbService, OpMonitor};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let callbacks = CallbackQueue::new();
/// let kvdb = KvdbService::open(
///     &KvdbConfig::memory(),
///     Arc::new(callbacks.handle()),
///     OpMonitor::new(),
/// )?;
///
/// kvdb.put("player:1", "Alice", |result| result.expect("put failed"));
/// kvdb.get("player:1", |result| {
///     assert_eq!(result.unwrap().as_deref(), Some("Alice"));
/// });
///
/// // Callbacks run here, on the thread that owns `callbacks`
/// callbacks.wait_and_run(Duration::from_secs(1));
/// # Ok::<(), kvdb::Error>(())
/// ```
#[derive(Clone)]
pub struct KvdbService {
    dispatch: Option<Arc<Dispatch>>,
    scheduler: Arc<dyn CallbackScheduler>,
}

impl KvdbService {
    /// Open the backend described by `config` and start the worker.
    ///
    /// With an empty backend kind the service starts disabled and every
    /// operation reports [`Error::Disabled`]. A configured backend that
    /// cannot be opened yields [`Error::Initialization`]; callers are expected
    /// to treat that as fatal.
    pub fn open(
        config: &KvdbConfig,
        scheduler: Arc<dyn CallbackScheduler>,
        monitor: Arc<OpMonitor>,
    ) -> Result<Self> {
        match kvdb_storage::open_engine(config)? {
            Some(engine) => Self::with_engine(engine, config, scheduler, monitor),
            None => {
                tracing::info!("kvdb backend not configured, service disabled");
                Ok(Self::disabled(scheduler))
            }
        }
    }

    /// Start a service around an already opened engine
    pub fn with_engine(
        engine: Box<dyn Engine>,
        config: &KvdbConfig,
        scheduler: Arc<dyn CallbackScheduler>,
        monitor: Arc<OpMonitor>,
    ) -> Result<Self> {
        let queue = Arc::new(OperationQueue::new());
        let mut worker = Worker::new(
            Arc::clone(&queue),
            engine,
            Arc::clone(&scheduler),
            monitor,
            config.slow_threshold(),
        );
        serve_forever(WORKER_THREAD_NAME, move || worker.run())?;

        Ok(Self {
            dispatch: Some(Arc::new(Dispatch {
                queue,
                backpressure: BackpressureMonitor::new(&config.backpressure),
            })),
            scheduler,
        })
    }

    /// A service without a backend
    pub fn disabled(scheduler: Arc<dyn CallbackScheduler>) -> Self {
        Self {
            dispatch: None,
            scheduler,
        }
    }

    /// Whether a backend is attached
    pub fn is_enabled(&self) -> bool {
        self.dispatch.is_some()
    }

    /// Number of operations waiting for the worker
    pub fn queue_len(&self) -> usize {
        self.dispatch.as_ref().map_or(0, |d| d.queue.len())
    }

    /// Queue length of the most recent backpressure warning, `None` once the
    /// queue has drained enough to warn again
    pub fn backpressure_watermark(&self) -> Option<usize> {
        self.dispatch.as_ref().and_then(|d| d.backpressure.last_warned())
    }

    /// Look up `key`; `on_done` receives `Ok(None)` if it is absent
    pub fn get<F>(&self, key: impl Into<String>, on_done: F)
    where
        F: FnOnce(Result<Option<String>>) + Send + 'static,
    {
        let on_done: GetCallback = Box::new(on_done);
        self.submit(Request::Get {
            key: key.into(),
            on_done: Some(on_done),
        });
    }

    /// Store `value` under `key`
    pub fn put<F>(&self, key: impl Into<String>, value: impl Into<String>, on_done: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let on_done: PutCallback = Box::new(on_done);
        self.submit(Request::Put {
            key: key.into(),
            value: value.into(),
            on_done: Some(on_done),
        });
    }

    /// Store `value` under `key` without waiting for the outcome
    pub fn put_detached(&self, key: impl Into<String>, value: impl Into<String>) {
        self.submit(Request::Put {
            key: key.into(),
            value: value.into(),
            on_done: None,
        });
    }

    /// Read every item with `begin_key <= key < end_key`, in key order.
    ///
    /// A cursor failure delivers only the error, never a partial result.
    pub fn get_range<F>(&self, begin_key: impl Into<String>, end_key: impl Into<String>, on_done: F)
    where
        F: FnOnce(Result<Vec<Item>>) + Send + 'static,
    {
        let on_done: GetRangeCallback = Box::new(on_done);
        self.submit(Request::GetRange {
            begin_key: begin_key.into(),
            end_key: end_key.into(),
            on_done: Some(on_done),
        });
    }

    fn submit(&self, request: Request) {
        match &self.dispatch {
            Some(dispatch) => {
                let queue_len = dispatch.queue.push(request);
                dispatch.backpressure.check(queue_len);
            }
            None => self.reject(request),
        }
    }

    fn reject(&self, request: Request) {
        tracing::debug!(?request, "kvdb operation on disabled service");
        let callback: Option<Callback> = match request {
            Request::Get { on_done, .. } => {
                on_done.map(|cb| Box::new(move || cb(Err(Error::Disabled))) as Callback)
            }
            Request::Put { on_done, .. } => {
                on_done.map(|cb| Box::new(move || cb(Err(Error::Disabled))) as Callback)
            }
            Request::GetRange { on_done, .. } => {
                on_done.map(|cb| Box::new(move || cb(Err(Error::Disabled))) as Callback)
            }
        };
        if let Some(callback) = callback {
            self.scheduler.schedule(Duration::ZERO, callback);
        }
    }
}

impl std::fmt::Debug for KvdbService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvdbService")
            .field("enabled", &self.is_enabled())
            .field("queue_len", &self.queue_len())
            .finish()
    }
}
