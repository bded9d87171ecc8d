//! Mirror coordinator - main orchestration logic
//!
//! This module ties the pieces of a mirror run together:
//! - Validating configuration and preparing the output root
//! - Starting the download worker pool
//! - Running discovery on the calling task
//! - Waiting for the work queue to drain and shutting the pool down
//! - Verifying the local tree and producing the final report

use crate::config::{validate, Config};
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::walker::DirectoryWalker;
use crate::download::{Transfer, WorkQueue, WorkerPool};
use crate::output::{verify, MirrorReport};
use crate::state::SharedState;
use crate::url::Scope;
use crate::MirrorError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Main mirror coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    scope: Arc<Scope>,
    output_dir: PathBuf,
    fetcher: Fetcher,
    state: Arc<SharedState>,
    queue: Arc<WorkQueue>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Everything that can fail fatally happens here, before any request is
    /// sent: configuration validation, creating the output root and building
    /// the HTTP client.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Invalid configuration or unusable output directory
    pub fn new(config: Config) -> Result<Self, MirrorError> {
        validate(&config)?;

        let base = Url::parse(&config.mirror.base_url)?;
        let scope = Scope::new(base)?;

        let output_dir = absolute_output_dir(Path::new(&config.mirror.output_dir))?;
        std::fs::create_dir_all(&output_dir).map_err(|source| MirrorError::OutputRoot {
            path: output_dir.clone(),
            source,
        })?;

        let timeout = config.crawler.timeout();
        let client =
            build_http_client(&config.http, timeout).map_err(|source| MirrorError::Http {
                url: scope.base().to_string(),
                source,
            })?;
        let fetcher = Fetcher::new(client, timeout, RetryPolicy::from_config(&config.crawler));

        Ok(Self {
            config: Arc::new(config),
            scope: Arc::new(scope),
            output_dir,
            fetcher,
            state: Arc::new(SharedState::new()),
            queue: Arc::new(WorkQueue::new()),
        })
    }

    /// Absolute directory the mirror tree is written under
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs the mirror to completion
    ///
    /// 1. Spawn the worker pool
    /// 2. Walk the remote tree, queueing every file
    /// 3. Wait until every queued item has been processed
    /// 4. Close the queue and wait (bounded) for the workers to exit
    /// 5. Verify the local tree
    ///
    /// Individual listing and transfer failures never abort the run; they
    /// show up in the report.
    pub async fn run(self) -> Result<MirrorReport, MirrorError> {
        let started_at = Utc::now();
        let crawler = &self.config.crawler;

        tracing::info!("Mirroring {}", self.scope.base());
        tracing::info!("Output directory: {}", self.output_dir.display());
        tracing::info!(
            "Delay: {}s, timeout: {}s, workers: {}, retries: {}",
            crawler.delay,
            crawler.timeout,
            crawler.workers,
            crawler.retries
        );

        let transfer = Arc::new(Transfer::new(self.fetcher.clone()));
        let pool = WorkerPool::spawn(
            crawler.workers,
            Arc::clone(&self.queue),
            transfer,
            Arc::clone(&self.state),
            crawler.idle_timeout(),
        )?;

        let walker = DirectoryWalker::new(
            LinkExtractor::new(self.fetcher.clone(), Arc::clone(&self.scope)),
            Arc::clone(&self.scope),
            Arc::clone(&self.state),
            Arc::clone(&self.queue),
            self.output_dir.clone(),
            crawler.delay(),
        );

        if let Err(e) = walker.process_directory(self.scope.base()).await {
            tracing::error!("Discovery stopped early: {}", e);
        }

        tracing::info!(
            "Waiting for downloads to finish ({} outstanding)",
            self.queue.unfinished()
        );
        self.queue.join().await;

        tracing::info!("Shutting down download workers");
        pool.shutdown(crawler.shutdown_timeout()).await;

        let counters = self.state.counters.snapshot();
        let expected = self.state.expected_files();
        let verification = verify(&self.output_dir, &expected, counters);

        Ok(MirrorReport {
            base_url: self.scope.base().to_string(),
            output_dir: self.output_dir.clone(),
            started_at,
            finished_at: Utc::now(),
            directories_scanned: self.state.visited_count(),
            counters,
            verification,
        })
    }
}

/// Resolves a relative output directory against the current directory
fn absolute_output_dir(dir: &Path) -> Result<PathBuf, MirrorError> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| MirrorError::OutputRoot {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(dir))
}

/// Runs a complete mirror operation
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::load_config;
/// use sumi_mirror::crawler::run_mirror;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// let report = run_mirror(config).await?;
/// println!("{} downloaded", report.counters.downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_mirror(config: Config) -> Result<MirrorReport, MirrorError> {
    Coordinator::new(config)?.run().await
}
