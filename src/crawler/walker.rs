//! Directory walker - sequential, rate-limited discovery of the remote tree
//!
//! Discovery is deliberately single-task: listings are fetched one at a time,
//! depth-first in the order the server lists them, with the configured delay
//! before each subdirectory. Files found along the way are pushed onto the
//! work queue immediately so downloads overlap with discovery.
//!
//! The walk uses an explicit stack of listing frames instead of recursion,
//! so arbitrarily deep remote trees cannot exhaust the call stack.

use crate::crawler::extractor::LinkExtractor;
use crate::download::WorkQueue;
use crate::state::{SharedState, TransferState, WorkItem};
use crate::url::{is_directory, local_path_for, Scope};
use crate::MirrorError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Totals of one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Listings fetched
    pub directories: usize,
    /// Work items pushed
    pub files: usize,
}

pub struct DirectoryWalker {
    extractor: LinkExtractor,
    scope: Arc<Scope>,
    state: Arc<SharedState>,
    queue: Arc<WorkQueue>,
    output_dir: PathBuf,
    delay: Duration,
}

impl DirectoryWalker {
    pub fn new(
        extractor: LinkExtractor,
        scope: Arc<Scope>,
        state: Arc<SharedState>,
        queue: Arc<WorkQueue>,
        output_dir: PathBuf,
        delay: Duration,
    ) -> Self {
        Self {
            extractor,
            scope,
            state,
            queue,
            output_dir,
            delay,
        }
    }

    /// Discovers the whole tree below `root`
    ///
    /// Each subdirectory is fully processed before the next sibling entry,
    /// exactly as a recursive depth-first walk would.
    ///
    /// # Errors
    ///
    /// Only `MirrorError::QueueClosed`, if the work queue was closed while
    /// discovery was still running. Listing failures are logged and skipped.
    pub async fn process_directory(&self, root: &Url) -> Result<WalkSummary, MirrorError> {
        let mut summary = WalkSummary::default();
        let mut stack: Vec<std::vec::IntoIter<Url>> = Vec::new();

        if let Some(links) = self.scan(root).await {
            summary.directories += 1;
            stack.push(links.into_iter());
        }

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.next(),
                None => break,
            };

            let Some(link) = next else {
                stack.pop();
                continue;
            };

            if is_directory(&link) {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                if let Some(links) = self.scan(&link).await {
                    summary.directories += 1;
                    stack.push(links.into_iter());
                }
            } else {
                self.enqueue_file(link)?;
                summary.files += 1;
            }
        }

        tracing::info!(
            "Discovery finished: {} directories scanned, {} files queued",
            summary.directories,
            summary.files
        );

        Ok(summary)
    }

    /// Claims a directory and fetches its entries
    ///
    /// Returns None when the directory was already visited or is out of scope.
    async fn scan(&self, url: &Url) -> Option<Vec<Url>> {
        if !self.state.mark_visited(url) {
            tracing::trace!("Already scanned {}", url);
            return None;
        }

        if !self.scope.should_download(url) {
            tracing::debug!("Out of scope, not scanning {}", url);
            return None;
        }

        tracing::info!("[scan] {}", url);
        Some(self.extractor.get_links(url).await)
    }

    fn enqueue_file(&self, link: Url) -> Result<(), MirrorError> {
        let local_path = local_path_for(&self.output_dir, &link);
        tracing::debug!(
            "{} ({} -> {}): {}",
            link,
            TransferState::Discovered,
            TransferState::Queued,
            local_path.display()
        );

        self.queue.push(WorkItem::new(link, local_path.clone()))?;
        self.state.record_expected(local_path);
        Ok(())
    }
}
