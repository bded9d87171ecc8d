//! Transfer state definitions for tracking one discovered file
//!
//! Every work item moves `Discovered -> Queued -> InProgress` and ends in one
//! of the terminal states. There is no transition back to `Queued`.
use std::fmt;

/// Represents the current state of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    // ===== Active States =====
    /// File link was found in a listing
    Discovered,

    /// Work item is waiting in the work queue
    Queued,

    /// A worker has popped the item and is transferring it
    InProgress,

    // ===== Terminal States =====
    /// File was fetched and written to its local path
    Downloaded,

    /// Local path already existed, nothing was fetched
    Skipped,

    /// Fetch or write failed
    Failed,
}

impl TransferState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Downloaded | Self::Skipped | Self::Failed)
    }

    /// Checks whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Discovered, Queued)
                | (Queued, InProgress)
                | (InProgress, Downloaded)
                | (InProgress, Skipped)
                | (InProgress, Failed)
        )
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Downloaded => "downloaded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
