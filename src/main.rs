//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror site mirror.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_mirror::config::{read_config, validate, Config};
use sumi_mirror::crawler::Coordinator;
use sumi_mirror::output::{print_summary, print_verification};
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: A polite recursive site mirror
///
/// Walks a directory-listing web server one listing at a time, downloads
/// every file below the base URL with a pool of parallel workers into
/// OUTPUT/<host>/<path>, and verifies the local tree afterwards. Files that
/// already exist locally are skipped, so re-running resumes a mirror.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A polite recursive site mirror", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the directory listing to mirror
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Output directory (default: ./downloads)
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Delay before each subdirectory request, in seconds (default: 0.5)
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Per-request timeout in seconds (default: 30)
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Number of parallel download workers (default: 50)
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Retry transient failures this many times (default: 0, no retries)
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and show what would be mirrored without sending requests
    #[arg(long)]
    dry_run: bool,

    /// Exit with a non-zero status when verification fails
    #[arg(long)]
    strict: bool,
}

impl Cli {
    /// Layers command-line flags over the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.mirror.base_url = url.clone();
        }
        if let Some(output) = &self.output {
            config.mirror.output_dir = output.clone();
        }
        if let Some(delay) = self.delay {
            config.crawler.delay = delay;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.timeout = timeout;
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = workers;
        }
        if let Some(retries) = self.retries {
            config.crawler.retries = retries;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let passed = handle_mirror(config).await?;
    if cli.strict && !passed {
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Mirror Dry Run ===\n");

    println!("Mirror:");
    println!("  Base URL: {}", config.mirror.base_url);
    println!("  Output directory: {}", config.mirror.output_dir);
    println!("  Layout: <output>/<host>/<path> (full remote hierarchy)");

    println!("\nCrawler:");
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Timeout: {}s", config.crawler.timeout);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Retries: {}", config.crawler.retries);
    if config.crawler.retries > 0 {
        println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation; returns whether verification passed
async fn handle_mirror(config: Config) -> anyhow::Result<bool> {
    let coordinator = match Coordinator::new(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Cannot start mirror: {}", e);
            return Err(e.into());
        }
    };

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&report);
    print_verification(&report);

    Ok(report.verification.passed())
}
