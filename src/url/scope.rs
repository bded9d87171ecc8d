use crate::url::netloc;
use crate::{UrlError, UrlResult};
use url::Url;

/// The host+path boundary of a mirror
///
/// A URL is in scope when it has the same network location (host and port)
/// as the base URL and its path starts with the base path. The comparison is
/// a plain string prefix, so a base of `/repo` also admits `/repository/`;
/// bases normally end in `/`.
#[derive(Debug, Clone)]
pub struct Scope {
    base: Url,
    base_netloc: String,
}

impl Scope {
    /// Creates a scope rooted at `base`
    ///
    /// # Errors
    ///
    /// * `UrlError::InvalidScheme` - base is not http or https
    /// * `UrlError::MissingHost` - base has no host
    pub fn new(base: Url) -> UrlResult<Self> {
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()));
        }

        let base_netloc = netloc(&base).ok_or_else(|| UrlError::MissingHost(base.to_string()))?;

        Ok(Self { base, base_netloc })
    }

    /// The URL the mirror starts from
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns true if `url` is inside the mirror's host+path boundary
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_mirror::url::Scope;
    /// use url::Url;
    ///
    /// let scope = Scope::new(Url::parse("https://mirror.example/repo/").unwrap()).unwrap();
    ///
    /// assert!(scope.should_download(&Url::parse("https://mirror.example/repo/a.txt").unwrap()));
    /// assert!(!scope.should_download(&Url::parse("https://mirror.example/other/").unwrap()));
    /// assert!(!scope.should_download(&Url::parse("https://elsewhere.example/repo/").unwrap()));
    /// ```
    pub fn should_download(&self, url: &Url) -> bool {
        match netloc(url) {
            Some(candidate) => {
                candidate == self.base_netloc && url.path().starts_with(self.base.path())
            }
            None => false,
        }
    }
}
