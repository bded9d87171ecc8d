//! Run-wide state shared between the walker, the workers and the verifier

use crate::state::TransferState;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use url::Url;

/// One discovered remote-file-to-local-path transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub remote_url: Url,
    pub local_path: PathBuf,
}

impl WorkItem {
    pub fn new(remote_url: Url, local_path: PathBuf) -> Self {
        Self {
            remote_url,
            local_path,
        }
    }
}

/// Transfer outcome counters
///
/// Counters only increase.
#[derive(Debug, Default)]
pub struct Counters {
    downloaded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`Counters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl CounterSnapshot {
    /// Number of files the local tree should hold
    pub fn expected_local(&self) -> u64 {
        self.downloaded + self.skipped
    }

    pub fn total(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

impl Counters {
    /// Records a terminal transfer state; active states are ignored
    pub fn record(&self, state: TransferState) {
        let counter = match state {
            TransferState::Downloaded => &self.downloaded,
            TransferState::Skipped => &self.skipped,
            TransferState::Failed => &self.failed,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            downloaded: self.downloaded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Shared mutable state of a mirror run
///
/// Passed around by `Arc`. Each field carries its own lock so that the walker
/// could later be parallelized without changing callers.
#[derive(Debug, Default)]
pub struct SharedState {
    visited: Mutex<HashSet<Url>>,
    expected: Mutex<Vec<PathBuf>>,
    pub counters: Counters,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a directory URL as scanned
    ///
    /// Returns false if it had already been visited.
    pub fn mark_visited(&self, url: &Url) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        visited.insert(url.clone())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Appends a local path to the expected-files list
    pub fn record_expected(&self, path: PathBuf) {
        self.expected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path);
    }

    /// Copy of every local path recorded so far, in discovery order
    pub fn expected_files(&self) -> Vec<PathBuf> {
        self.expected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
