//! Download module: the work queue, the worker pool and the transfer unit
//!
//! The walker pushes [`WorkItem`](crate::state::WorkItem)s onto a shared
//! [`WorkQueue`]; a [`WorkerPool`] of fixed size drains it, running each item
//! through [`Transfer`]. Completion is detected solely through the queue's
//! `join`, and shutdown is a single `close` of the queue.

mod pool;
mod queue;
mod transfer;

pub use pool::WorkerPool;
pub use queue::{Pop, TaskDone, WorkQueue};
pub use transfer::{Transfer, PART_SUFFIX};
