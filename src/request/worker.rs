use std::future::Future;

use anyhow::{Result, anyhow};
use tokio::task::JoinHandle;

/// One in-flight unit of work, running on its own runtime task.
pub struct RequestTask<T> {
    handle: JoinHandle<Result<T>>,
}

/// Begin executing `work` without blocking the caller.
pub fn submit<T, F>(work: F) -> RequestTask<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    RequestTask {
        handle: tokio::spawn(work),
    }
}

impl<T> RequestTask<T> {
    /// Non-blocking completion poll.
    pub fn is_done(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task and return its result. A panic inside the work
    /// is reported as an error instead of unwinding into the caller.
    pub async fn outcome(self) -> Result<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(anyhow!("request worker failed: {err}")),
        }
    }

    /// Best-effort cancellation: the task is detached, not killed. An
    /// already-dispatched network call keeps running in the background up
    /// to its own timeout, and its eventual result is discarded. Aborting
    /// the task mid-I/O could leak the underlying connection, so we don't.
    pub fn abandon(self) {
        drop(self.handle);
    }
}
