//! Transfer unit - downloads one remote file to one local path
//!
//! The body is streamed into a hidden temporary file next to the target and
//! renamed over the target only after the last chunk has been written. A
//! failed or interrupted transfer therefore never leaves a partial file at the
//! final path, and the skip-if-present check stays sound across runs.

use crate::crawler::{classify_error, Fetcher};
use crate::state::{TransferState, WorkItem};
use crate::MirrorError;
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Write buffer size for streamed bodies
const CHUNK_SIZE: usize = 8192;

/// Suffix of in-flight temporary files
pub const PART_SUFFIX: &str = ".part";

pub struct Transfer {
    fetcher: Fetcher,
}

impl Transfer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Transfers one work item and returns its terminal state
    ///
    /// Never fails: errors are logged and reported as `TransferState::Failed`.
    pub async fn transfer(&self, item: &WorkItem) -> TransferState {
        let name = display_name(&item.local_path);

        if tokio::fs::metadata(&item.local_path).await.is_ok() {
            tracing::info!("Skipped (exists): {}", name);
            return TransferState::Skipped;
        }

        let policy = self.fetcher.retry_policy();
        let mut attempt = 0;
        loop {
            match self.download(item).await {
                Ok(bytes) => {
                    tracing::info!("Downloaded: {} ({} bytes)", name, bytes);
                    return TransferState::Downloaded;
                }
                Err(e) => match policy.retry_delay(attempt, &e) {
                    Some(delay) => {
                        tracing::debug!(
                            "Retrying {} in {:?} (attempt {}): {}",
                            item.remote_url,
                            delay,
                            attempt + 1,
                            e
                        );
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::warn!("Download failed: {} - {}", name, e);
                        return TransferState::Failed;
                    }
                },
            }
        }
    }

    /// One download attempt; returns the number of bytes written
    async fn download(&self, item: &WorkItem) -> Result<u64, MirrorError> {
        let url = &item.remote_url;
        let target = &item.local_path;
        let mut response = self.fetcher.send(url).await?;

        let parent = target.parent().ok_or_else(|| MirrorError::FileIo {
            path: target.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent directory"),
        })?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| file_error(parent, source))?;

        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".")
            .suffix(PART_SUFFIX)
            .tempfile_in(parent)
            .map_err(|source| file_error(parent, source))?
            .into_parts();

        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, tokio::fs::File::from_std(file));
        let mut written = 0u64;

        loop {
            let chunk = tokio::time::timeout(self.fetcher.timeout(), response.chunk())
                .await
                .map_err(|_| MirrorError::Timeout {
                    url: url.to_string(),
                })?
                .map_err(|e| classify_error(url, e))?;
            let Some(chunk) = chunk else {
                break;
            };

            writer
                .write_all(&chunk)
                .await
                .map_err(|source| file_error(&temp_path, source))?;
            written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|source| file_error(&temp_path, source))?;
        let file = writer.into_inner();
        file.sync_all()
            .await
            .map_err(|source| file_error(&temp_path, source))?;
        drop(file);

        temp_path
            .persist(target)
            .map_err(|e| file_error(target, e.error))?;

        Ok(written)
    }
}

fn file_error(path: &Path, source: std::io::Error) -> MirrorError {
    MirrorError::FileIo {
        path: path.to_path_buf(),
        source,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
