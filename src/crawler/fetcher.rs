//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building the HTTP client with the configured user agent
//! - Bounded-timeout GET requests for listings and files
//! - Error classification (timeout, transport, non-2xx status)
//! - The opt-in retry policy for transient failures

use crate::config::{CrawlerConfig, HttpConfig};
use crate::MirrorError;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Retry policy for transient request failures
///
/// The default policy never retries. With `max_retries > 0` a transient
/// failure (see [`MirrorError::is_transient`]) is attempted again after
/// `backoff`, doubling for each further attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based), or None if exhausted
    ///
    /// Only transient errors are retried.
    pub fn retry_delay(&self, attempt: u32, error: &MirrorError) -> Option<Duration> {
        if attempt >= self.max_retries || !error.is_transient() {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.backoff.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration (user agent)
/// * `connect_timeout` - Upper bound on establishing a connection
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_mirror::config::HttpConfig;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &HttpConfig,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Classifies a reqwest error for the given URL
pub(crate) fn classify_error(url: &Url, source: reqwest::Error) -> MirrorError {
    if source.is_timeout() {
        MirrorError::Timeout {
            url: url.to_string(),
        }
    } else {
        MirrorError::Http {
            url: url.to_string(),
            source,
        }
    }
}

/// Issues GET requests with a per-request timeout and retry policy
///
/// The timeout bounds sending the request and receiving headers, and each
/// individual body read, never the whole body. Large files are therefore
/// limited by stalls, not by size.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends one GET request and checks for a 2xx status
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - Response with a success status, body not yet read
    /// * `Err(MirrorError::Timeout)` - No response within the timeout
    /// * `Err(MirrorError::Status)` - Non-2xx status
    /// * `Err(MirrorError::Http)` - Transport error
    pub async fn send(&self, url: &Url) -> Result<Response, MirrorError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url.clone()).send())
            .await
            .map_err(|_| MirrorError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Fetches a page body as text, retrying per the policy
    pub async fn fetch_text(&self, url: &Url) -> Result<String, MirrorError> {
        let mut attempt = 0;
        loop {
            let result = match self.send(url).await {
                Ok(response) => self.read_text(url, response).await,
                Err(e) => Err(e),
            };

            match result {
                Err(e) => match self.retry.retry_delay(attempt, &e) {
                    Some(delay) => {
                        tracing::debug!(
                            "Retrying {} in {:?} (attempt {}): {}",
                            url,
                            delay,
                            attempt + 1,
                            e
                        );
                        attempt += 1;
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                ok => return ok,
            }
        }
    }

    async fn read_text(&self, url: &Url, response: Response) -> Result<String, MirrorError> {
        tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| MirrorError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| classify_error(url, e))
    }
}
