//! Fixed-size pool of download workers draining the work queue

use crate::download::queue::{Pop, WorkQueue};
use crate::download::transfer::Transfer;
use crate::state::{SharedState, TransferState};
use crate::MirrorError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    handles: Vec<(usize, JoinHandle<usize>)>,
}

impl WorkerPool {
    /// Spawns `workers` tasks that pop from `queue` until it is closed
    ///
    /// Each worker records the outcome of every transfer in the shared
    /// counters and marks the item done.
    ///
    /// # Errors
    ///
    /// `MirrorError::Worker` when `workers` is zero.
    pub fn spawn(
        workers: usize,
        queue: Arc<WorkQueue>,
        transfer: Arc<Transfer>,
        state: Arc<SharedState>,
        idle_timeout: Duration,
    ) -> Result<Self, MirrorError> {
        if workers == 0 {
            return Err(MirrorError::Worker(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let handles = (0..workers)
            .map(|worker_id| {
                let handle = tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&transfer),
                    Arc::clone(&state),
                    idle_timeout,
                ));
                (worker_id, handle)
            })
            .collect();

        tracing::debug!("Started {} download workers", workers);
        Ok(Self { queue, handles })
    }

    /// Closes the queue and waits for every worker to exit
    ///
    /// Each worker gets at most `wait`; one that does not exit in time is
    /// logged and aborted. Returns the number of items processed by the
    /// workers that exited cleanly.
    pub async fn shutdown(self, wait: Duration) -> usize {
        self.queue.close();

        let mut processed = 0;
        for (worker_id, mut handle) in self.handles {
            match tokio::time::timeout(wait, &mut handle).await {
                Ok(Ok(count)) => processed += count,
                Ok(Err(e)) => tracing::warn!("Download worker {} ended abnormally: {}", worker_id, e),
                Err(_) => {
                    tracing::warn!(
                        "Download worker {} did not stop within {:?}, abandoning it",
                        worker_id,
                        wait
                    );
                    handle.abort();
                }
            }
        }

        processed
    }
}

/// Worker loop: pop, transfer, record, mark done; exit when the queue closes
async fn run_worker(
    worker_id: usize,
    queue: Arc<WorkQueue>,
    transfer: Arc<Transfer>,
    state: Arc<SharedState>,
    idle_timeout: Duration,
) -> usize {
    let mut processed = 0;

    loop {
        match queue.pop(idle_timeout).await {
            Pop::Item(item) => {
                let _done = queue.done_guard();
                tracing::trace!(
                    "Worker {}: {} -> {}",
                    worker_id,
                    item.remote_url,
                    TransferState::InProgress
                );
                let outcome = transfer.transfer(&item).await;
                if TransferState::InProgress.can_transition_to(outcome) {
                    tracing::debug!("{} -> {}", item.remote_url, outcome);
                    state.counters.record(outcome);
                } else {
                    tracing::warn!(
                        "Transfer of {} ended in non-terminal state {}",
                        item.remote_url,
                        outcome
                    );
                }
                processed += 1;
            }
            Pop::Empty => continue,
            Pop::Closed => break,
        }
    }

    tracing::trace!("Worker {} exiting after {} items", worker_id, processed);
    processed
}
