use snaplink_core::{Repository, ShortCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Sizing of the background access-count worker.
#[derive(Debug, Clone, TypedBuilder)]
pub struct AccessConfig {
    /// Pending accesses held before new ones are dropped.
    #[builder(default = 1024)]
    pub queue_capacity: usize,
    /// Accesses drained per round; counts for the same code are coalesced.
    #[builder(default = 64)]
    pub max_batch: usize,
    /// Deadline for each counter update.
    #[builder(default = Duration::from_secs(5))]
    pub store_timeout: Duration,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Handle for recording accesses without waiting on the durable store.
///
/// Accesses go through a bounded queue to a single worker task that flushes
/// coalesced increments to the repository. Recording never blocks: when the
/// queue is full the access is dropped, since the counter is advisory. The
/// worker exits once every `AccessRecorder` clone has been dropped and the
/// queue is drained.
#[derive(Debug, Clone)]
pub struct AccessRecorder {
    tx: mpsc::Sender<ShortCode>,
}

impl AccessRecorder {
    /// Spawns the worker on the current Tokio runtime.
    pub fn spawn<R: Repository>(repository: Arc<R>, config: AccessConfig) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let handle = tokio::spawn(run_worker(repository, rx, config));
        (Self { tx }, handle)
    }

    /// Queues one access of `code`.
    pub fn record(&self, code: &ShortCode) {
        match self.tx.try_send(code.clone()) {
            Ok(()) => trace!(code = %code, "access queued"),
            Err(TrySendError::Full(_)) => {
                debug!(code = %code, "access queue full, dropping access")
            }
            Err(TrySendError::Closed(_)) => {
                debug!(code = %code, "access worker stopped, dropping access")
            }
        }
    }
}

async fn run_worker<R: Repository>(
    repository: Arc<R>,
    mut rx: mpsc::Receiver<ShortCode>,
    config: AccessConfig,
) {
    debug!(
        queue_capacity = config.queue_capacity,
        max_batch = config.max_batch,
        "access worker started"
    );

    let limit = config.max_batch.max(1);
    let mut batch = Vec::with_capacity(limit);

    while rx.recv_many(&mut batch, limit).await > 0 {
        let mut counts: HashMap<ShortCode, u64> = HashMap::with_capacity(batch.len());
        for code in batch.drain(..) {
            *counts.entry(code).or_insert(0) += 1;
        }

        for (code, by) in counts {
            flush_one(repository.as_ref(), &code, by, config.store_timeout).await;
        }
    }

    debug!("access worker stopped");
}

/// Applies one coalesced increment. Failures are logged and the increment is dropped.
async fn flush_one<R: Repository>(repository: &R, code: &ShortCode, by: u64, deadline: Duration) {
    match tokio::time::timeout(deadline, repository.increment_access(code, by)).await {
        Ok(Ok(())) => trace!(code = %code, by, "access count updated"),
        Ok(Err(e)) => warn!(code = %code, by, error = %e, "failed to update access count"),
        Err(_) => warn!(
            code = %code,
            by,
            timeout_ms = deadline.as_millis() as u64,
            "access count update timed out"
        ),
    }
}
