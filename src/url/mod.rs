//! URL handling module for Sumi-Mirror
//!
//! This module provides the mirror's scope boundary, directory detection and
//! the deterministic mapping from remote URLs to local paths.

mod local_path;
mod scope;

// Re-export main functions
pub use local_path::{local_path_for, relative_path};
pub use scope::Scope;

use url::Url;

/// Returns true if the URL denotes a directory listing (its path ends in `/`)
///
/// A server directory linked without a trailing slash is reported as a file.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::is_directory;
/// use url::Url;
///
/// assert!(is_directory(&Url::parse("https://mirror.example/repo/sub/").unwrap()));
/// assert!(!is_directory(&Url::parse("https://mirror.example/repo/sub").unwrap()));
/// ```
pub fn is_directory(url: &Url) -> bool {
    url.path().ends_with('/')
}

/// Returns the network location of a URL: `host` or `host:port`
///
/// Default ports are already elided by the URL parser.
pub fn netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
