//! Long-lived background routines that survive panics.

use kvdb_core::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pause before restarting a routine that panicked
pub const RESTART_DELAY: Duration = Duration::from_millis(100);

/// Run `routine` on a new thread named `name`, restarting it whenever it
/// panics. The thread exits when the routine returns normally.
pub fn serve_forever<F>(name: &str, mut routine: F) -> Result<JoinHandle<()>>
where
    F: FnMut() + Send + 'static,
{
    let thread_name = name.to_string();
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || loop {
            match panic::catch_unwind(AssertUnwindSafe(&mut routine)) {
                Ok(()) => {
                    tracing::debug!(routine = %thread_name, "routine finished");
                    break;
                }
                Err(payload) => {
                    tracing::error!(
                        routine = %thread_name,
                        panic = %panic_message(payload.as_ref()),
                        "routine panicked, restarting"
                    );
                    thread::sleep(RESTART_DELAY);
                }
            }
        })
        .map_err(|e| Error::WorkerUnavailable(format!("failed to spawn {}: {}", name, e)))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
