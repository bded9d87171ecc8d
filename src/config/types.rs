use serde::Deserialize;
use std::time::Duration;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; sumi-mirror/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// What to mirror and where to put it
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// Directory-listing URL the mirror is rooted at
    #[serde(rename = "base-url", default)]
    pub base_url: String,

    /// Local directory the `<host>/<path>` tree is written under
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            output_dir: default_output_dir(),
        }
    }
}

/// Crawl and download behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause before descending into each subdirectory (seconds)
    #[serde(default = "default_delay")]
    pub delay: f64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of parallel download workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// How long an idle worker waits on the queue before polling again (milliseconds)
    #[serde(rename = "idle-timeout-ms", default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// How long shutdown waits for each worker to exit (milliseconds)
    #[serde(rename = "shutdown-timeout-ms", default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    /// Extra attempts for transient failures; 0 disables retrying
    #[serde(default)]
    pub retries: u32,

    /// Initial delay between retry attempts (milliseconds), doubled each attempt
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            timeout: default_timeout(),
            workers: default_workers(),
            idle_timeout_ms: default_idle_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// HTTP client identification
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_output_dir() -> String {
    "downloads".to_string()
}

fn default_delay() -> f64 {
    0.5
}

fn default_timeout() -> u64 {
    30
}

fn default_workers() -> usize {
    50
}

fn default_idle_timeout_ms() -> u64 {
    5000
}

fn default_shutdown_timeout_ms() -> u64 {
    2000
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
