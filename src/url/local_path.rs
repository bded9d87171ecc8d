use crate::url::netloc;
use std::path::{Path, PathBuf};
use url::Url;

/// File name used when a URL has an empty path
const INDEX_FILE: &str = "index.html";

/// Maps a remote URL to its path relative to the output directory
///
/// The network location becomes the top segment, followed by every
/// non-empty path segment as-is (percent-encoding is kept), so the whole
/// remote hierarchy including the host is preserved. The mapping is pure:
/// the same URL always yields the same path.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use sumi_mirror::url::relative_path;
/// use url::Url;
///
/// let url = Url::parse("https://mirror.example/repo/sub/file.txt").unwrap();
/// assert_eq!(
///     relative_path(&url),
///     PathBuf::from("mirror.example").join("repo").join("sub").join("file.txt")
/// );
/// ```
pub fn relative_path(url: &Url) -> PathBuf {
    let mut path = PathBuf::from(netloc(url).unwrap_or_default());

    let mut pushed = false;
    if let Some(segments) = url.path_segments() {
        for segment in segments.filter(|s| !s.is_empty() && *s != "." && *s != "..") {
            path.push(segment);
            pushed = true;
        }
    }

    if !pushed {
        path.push(INDEX_FILE);
    }

    path
}

/// Maps a remote URL to its absolute local path under `output_dir`
pub fn local_path_for(output_dir: &Path, url: &Url) -> PathBuf {
    output_dir.join(relative_path(url))
}
