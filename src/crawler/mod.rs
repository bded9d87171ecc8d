//! Crawler module for discovering the remote tree
//!
//! This module contains the discovery side of a mirror run, including:
//! - HTTP fetching with timeouts and the opt-in retry policy
//! - Directory listing parsing and link extraction
//! - The sequential, rate-limited directory walker
//! - Overall run coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod walker;

pub use coordinator::{run_mirror, Coordinator};
pub use extractor::LinkExtractor;
pub use fetcher::{build_http_client, Fetcher, RetryPolicy};
pub use parser::parse_listing;
pub use walker::{DirectoryWalker, WalkSummary};

pub(crate) use fetcher::classify_error;
