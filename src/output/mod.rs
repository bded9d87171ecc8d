//! Output module for verifying the mirror and reporting results
//!
//! This module handles:
//! - Comparing the expected file list against the local tree
//! - Printing the transfer summary and the verification result

mod report;
mod verifier;

pub use report::{
    missing_lines, print_summary, print_verification, MirrorReport, MISSING_DISPLAY_LIMIT,
};
pub use verifier::{collect_local_files, verify, VerificationReport};
