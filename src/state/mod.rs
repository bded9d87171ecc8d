//! State module for tracking mirror progress
//!
//! # Components
//!
//! - `TransferState`: Lifecycle of a single discovered file
//! - `WorkItem`: One remote-file-to-local-path transfer
//! - `SharedState`: Visited directories, expected files and outcome counters

mod shared;
mod transfer_state;

// Re-export main types
pub use shared::{CounterSnapshot, Counters, SharedState, WorkItem};
pub use transfer_state::TransferState;
