//! Bounded worker pool for pattern matching

use crate::error::{Result, RuntimeError};
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Shared pool that runs match jobs with a deadline.
///
/// Jobs run on the blocking threads of a dedicated tokio runtime, capped at
/// `worker_threads`. The caller blocks until the job finishes or the timeout
/// elapses. On timeout the job's cancellation flag is set and its task is
/// aborted; a queued job never starts, a running job stops at its next check
/// of the flag.
pub struct MatchWorkerPool {
    runtime: Option<Runtime>,
    worker_threads: usize,
}

impl MatchWorkerPool {
    pub fn new(worker_threads: usize) -> Result<Self> {
        let worker_threads = worker_threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(worker_threads)
            .thread_name("docpolicy-match")
            .build()
            .map_err(|e| RuntimeError::WorkerPool(e.to_string()))?;

        tracing::debug!("Started match worker pool with {} threads", worker_threads);
        Ok(Self {
            runtime: Some(runtime),
            worker_threads,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Run `job` on the pool and wait at most `timeout` for its output
    pub fn run_with_timeout<T, F>(&self, timeout: Duration, job: F) -> Result<T>
    where
        F: FnOnce(&AtomicBool) -> T + Send + 'static,
        T: Send + 'static,
    {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| RuntimeError::WorkerPool("pool is shut down".to_string()))?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (sender, receiver) = mpsc::sync_channel(1);

        let handle = runtime.spawn_blocking(move || {
            // The receiver is gone once the caller timed out
            let _ = sender.send(job(&flag));
        });

        match receiver.recv_timeout(timeout) {
            Ok(output) => Ok(output),
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
                handle.abort();
                tracing::warn!("Match job exceeded {:?} and was cancelled", timeout);
                Err(RuntimeError::RegexTimeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(RuntimeError::WorkerPool(
                "match job terminated without a result".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for MatchWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchWorkerPool")
            .field("worker_threads", &self.worker_threads)
            .field("running", &self.runtime.is_some())
            .finish()
    }
}

impl Drop for MatchWorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
