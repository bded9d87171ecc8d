//! Work queue shared by the walker and the download workers
//!
//! A FIFO of [`WorkItem`]s built on an unbounded tokio channel with:
//! - non-blocking `push`
//! - `pop` with a bounded wait, so idle workers wake up periodically
//! - completion tracking: every popped item is marked done exactly once,
//!   and `join` resolves when nothing pushed is left unfinished
//! - `close` as the shutdown signal: workers drain what is left and then
//!   observe [`Pop::Closed`]

use crate::state::WorkItem;
use crate::MirrorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Result of a bounded-wait pop
#[derive(Debug)]
pub enum Pop {
    /// The next item, which must be marked done once processed
    Item(WorkItem),
    /// Nothing arrived within the wait
    Empty,
    /// The queue was closed and has been drained
    Closed,
}

pub struct WorkQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<WorkItem>>>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<WorkItem>>,
    unfinished: AtomicUsize,
    all_done: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(tx)),
            receiver: tokio::sync::Mutex::new(rx),
            unfinished: AtomicUsize::new(0),
            all_done: Notify::new(),
        }
    }

    /// Appends an item
    ///
    /// # Errors
    ///
    /// `MirrorError::QueueClosed` once [`close`](Self::close) has been called.
    pub fn push(&self, item: WorkItem) -> Result<(), MirrorError> {
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let tx = sender.as_ref().ok_or(MirrorError::QueueClosed)?;

        self.unfinished.fetch_add(1, Ordering::SeqCst);
        if tx.send(item).is_err() {
            self.task_done();
            return Err(MirrorError::QueueClosed);
        }
        Ok(())
    }

    /// Takes the next item, waiting at most `wait`
    pub async fn pop(&self, wait: Duration) -> Pop {
        let recv = async {
            let mut rx = self.receiver.lock().await;
            rx.recv().await
        };

        match tokio::time::timeout(wait, recv).await {
            Ok(Some(item)) => Pop::Item(item),
            Ok(None) => Pop::Closed,
            Err(_) => Pop::Empty,
        }
    }

    /// Marks one popped item as processed
    pub fn task_done(&self) {
        let previous = self
            .unfinished
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.all_done.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("task_done called more times than items were pushed"),
        }
    }

    /// Returns a guard that marks one item done when dropped
    ///
    /// Keeps `join` from hanging if a worker unwinds mid-transfer.
    pub fn done_guard(&self) -> TaskDone<'_> {
        TaskDone { queue: self }
    }

    /// Waits until every pushed item has been marked done
    pub async fn join(&self) {
        loop {
            let notified = self.all_done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.unfinished.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stops accepting items; queued items can still be popped
    pub fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    /// Items pushed but not yet marked done
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::SeqCst)
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one queue item done on drop
pub struct TaskDone<'a> {
    queue: &'a WorkQueue,
}

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}
