//! Completeness verifier
//!
//! Read-only comparison of the files a run expected to have locally against
//! what is actually on disk. Never repairs or deletes anything.

use crate::state::CounterSnapshot;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of comparing the expected and the actual local tree
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Number of files discovered remotely (ExpectedFiles length)
    pub remote_total: usize,

    /// Regular files found under the output directory
    pub local_total: usize,

    /// `downloaded + skipped`
    pub expected_local: u64,

    /// Transfers counted as failed
    pub failed: u64,

    /// Expected files absent from disk, in discovery order (empty on pass)
    pub missing: Vec<PathBuf>,

    /// Local files no discovered URL maps to (0 on pass)
    pub extra: usize,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.local_total as u64 == self.expected_local && self.failed == 0
    }
}

/// Collects every regular file below `root`
///
/// Unreadable entries are logged and skipped. A missing root yields no files.
pub fn collect_local_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                if e.depth() > 0 {
                    tracing::warn!("Skipping unreadable entry during verification: {}", e);
                }
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Verifies the local tree under `output_dir`
///
/// Passes when the number of local files equals `downloaded + skipped` and
/// nothing failed. Otherwise the missing and extra files are computed.
pub fn verify(output_dir: &Path, expected: &[PathBuf], counters: CounterSnapshot) -> VerificationReport {
    let local_files = collect_local_files(output_dir);

    let mut report = VerificationReport {
        remote_total: expected.len(),
        local_total: local_files.len(),
        expected_local: counters.expected_local(),
        failed: counters.failed,
        missing: Vec::new(),
        extra: 0,
    };

    if report.passed() {
        return report;
    }

    let local_set: HashSet<&Path> = local_files.iter().map(PathBuf::as_path).collect();
    report.missing = expected
        .iter()
        .filter(|path| !local_set.contains(path.as_path()))
        .cloned()
        .collect();

    let expected_set: HashSet<&Path> = expected.iter().map(PathBuf::as_path).collect();
    report.extra = local_files
        .iter()
        .filter(|path| !expected_set.contains(path.as_path()))
        .count();

    report
}
