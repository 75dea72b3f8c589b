use crate::errors::ToolError;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fixed-size pool for blocking automation work.
///
/// Each job runs on tokio's blocking threads while holding one of `capacity`
/// permits, so at most `capacity` automation sessions exist at once. A job
/// whose caller stopped waiting keeps its permit until it actually returns.
/// Clones share the same permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    pub const DEFAULT_CAPACITY: usize = 2;

    /// Create a pool; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ::log::debug!("Creating worker pool with {} workers", capacity);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Workers not currently running a job
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }

    /// Refuse new jobs; jobs already running are left to finish
    pub fn shutdown(&self) {
        ::log::info!("Shutting down worker pool");
        self.permits.close();
    }

    /// Run a blocking job on a worker and wait for its result
    pub async fn run<F, T>(&self, job: F) -> Result<T, ToolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ToolError::PoolClosed)?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle.await.map_err(|e| {
            if e.is_panic() {
                ToolError::ExecutionFailure(format!(
                    "tool panicked: {}",
                    panic_message(e.into_panic())
                ))
            } else {
                ToolError::ExecutionFailure(format!("worker task failed: {}", e))
            }
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
