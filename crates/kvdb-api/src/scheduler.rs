//! Callback scheduling - resuming callers on their own execution context
//!
//! The worker never runs a completion callback itself. It hands each one to a
//! [`CallbackScheduler`], which is responsible for running it later on the
//! thread that owns the caller's state.
//!
//! [`CallbackQueue`] is the reference scheduler: a timer queue that the
//! owning thread drains from its main loop, in the style of a game-server
//! tick. Callbacks with equal deadlines run in submission order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Zero-argument continuation
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Runs callbacks on a designated execution context
pub trait CallbackScheduler: Send + Sync {
    /// Run `callback` on the designated context no earlier than `delay` from now.
    fn schedule(&self, delay: Duration, callback: Callback);
}

struct Scheduled {
    due: Instant,
    seq: u64,
    callback: Callback,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest (due, seq) pops first
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct Pending {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

#[derive(Default)]
struct Shared {
    pending: Mutex<Pending>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Timer queue drained by the thread that created it.
///
/// `CallbackQueue` is `!Send`, so callbacks only ever run on the thread that
/// created it. Other threads submit work through a [`CallbackHandle`].
pub struct CallbackQueue {
    shared: Arc<Shared>,
    _not_send: PhantomData<*const ()>,
}

impl CallbackQueue {
    /// Creates an empty queue owned by the current thread
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            _not_send: PhantomData,
        }
    }

    /// Returns a handle other threads can schedule through
    pub fn handle(&self) -> CallbackHandle {
        CallbackHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of callbacks waiting, due or not
    pub fn len(&self) -> usize {
        self.shared.lock().heap.len()
    }

    /// Returns true if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every callback that is due now; returns how many ran.
    ///
    /// Callbacks run without the internal lock held, so they may schedule
    /// more work; anything they schedule waits for the next call.
    pub fn run_pending(&self) -> usize {
        let now = Instant::now();
        let due: Vec<Callback> = {
            let mut pending = self.shared.lock();
            let mut due = Vec::new();
            while pending.heap.peek().is_some_and(|next| next.due <= now) {
                if let Some(entry) = pending.heap.pop() {
                    due.push(entry.callback);
                }
            }
            due
        };

        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }

    /// Block until at least one callback is due or `timeout` elapses, then
    /// run everything due; returns how many ran.
    pub fn wait_and_run(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        {
            let mut pending = self.shared.lock();
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let wake_at = match pending.heap.peek() {
                    Some(next) if next.due <= now => break,
                    Some(next) => next.due.min(deadline),
                    None => deadline,
                };
                pending = self
                    .shared
                    .ready
                    .wait_timeout(pending, wake_at - now)
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .0;
            }
        }
        self.run_pending()
    }
}

impl Default for CallbackQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable submission side of a [`CallbackQueue`]
#[derive(Clone)]
pub struct CallbackHandle {
    shared: Arc<Shared>,
}

impl CallbackScheduler for CallbackHandle {
    fn schedule(&self, delay: Duration, callback: Callback) {
        let due = Instant::now() + delay;
        {
            let mut pending = self.shared.lock();
            let seq = pending.next_seq;
            pending.next_seq += 1;
            pending.heap.push(Scheduled { due, seq, callback });
        }
        self.shared.ready.notify_one();
    }
}
