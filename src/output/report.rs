//! Final console report of a mirror run

use crate::output::verifier::VerificationReport;
use crate::state::CounterSnapshot;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// How many missing files are listed by name
pub const MISSING_DISPLAY_LIMIT: usize = 20;

/// Everything a finished run reports
#[derive(Debug, Clone)]
pub struct MirrorReport {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub directories_scanned: usize,
    pub counters: CounterSnapshot,
    pub verification: VerificationReport,
}

impl MirrorReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the transfer summary to stdout
pub fn print_summary(report: &MirrorReport) {
    println!("{}", "-".repeat(50));
    println!("Mirror finished: {}", report.base_url);
    println!("  Output: {}", report.output_dir.display());
    println!(
        "  Started: {}  Finished: {}  ({}s)",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration_seconds()
    );
    println!("  Directories scanned: {}", report.directories_scanned);
    println!("  Downloaded: {} files", report.counters.downloaded);
    println!("  Skipped: {} files (already present)", report.counters.skipped);
    println!("  Failed: {} files", report.counters.failed);
}

/// Prints the verifier result to stdout
pub fn print_verification(report: &MirrorReport) {
    let v = &report.verification;

    println!();
    println!("{}", "=".repeat(50));
    println!("Verifying local mirror...");
    println!("{}", "=".repeat(50));
    println!("Remote files: {}", v.remote_total);
    println!("Local files: {}", v.local_total);
    println!("Expected locally (downloaded + skipped): {}", v.expected_local);
    println!("Failed: {}", v.failed);

    if v.passed() {
        println!("\n✓ Verification passed: the local mirror is complete.");
        return;
    }

    println!("\n✗ Verification failed.");

    if !v.missing.is_empty() {
        println!("\nMissing files ({}):", v.missing.len());
        for line in missing_lines(v, &report.output_dir, MISSING_DISPLAY_LIMIT) {
            println!("{}", line);
        }
    }

    if v.extra > 0 {
        println!("\nExtra files (not in the remote tree): {}", v.extra);
    }
}

/// Numbered missing-file lines, at most `limit`, plus a remainder line
///
/// Paths are shown relative to `root` when possible.
pub fn missing_lines(v: &VerificationReport, root: &Path, limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = v
        .missing
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, path)| {
            let shown = path.strip_prefix(root).unwrap_or(path);
            format!("  {}. {}", i + 1, shown.display())
        })
        .collect();

    if v.missing.len() > limit {
        lines.push(format!("  ... and {} more", v.missing.len() - limit));
    }

    lines
}
