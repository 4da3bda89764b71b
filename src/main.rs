//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph site mapper.

use anyhow::Context;
use clap::Parser;
use sitegraph::config::{load_config_with_hash, validate, Config};
use sitegraph::output::{generate_markdown_summary, print_pages, print_statistics};
use sitegraph::{parse_seed, Coordinator};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitegraph: a single-host site mapper
///
/// Sitegraph crawls a website from its root page, following only links that
/// stay on the same host, and prints every page it reached together with the
/// links found on it.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version)]
#[command(about = "A single-host site mapper", long_about = None)]
struct Cli {
    /// Root URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages fetched at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Write a markdown summary of the crawl to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Print at most this many pages
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seed and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&cli.url, &config)
    } else {
        handle_crawl(&cli.url, &config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegraph=info,warn"),
            1 => EnvFilter::new("sitegraph=debug,info"),
            2 => EnvFilter::new("sitegraph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file if one was given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.concurrency {
        config.crawler.max_workers = workers;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.request_timeout_ms = timeout_ms;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
    if cli.limit.is_some() {
        config.output.print_limit = cli.limit;
    }

    validate(&config).context("Invalid settings")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and seed, shows what would be crawled
fn handle_dry_run(url: &str, config: &Config) -> anyhow::Result<()> {
    let seed = parse_seed(url).with_context(|| format!("Invalid root URL '{}'", url))?;

    println!("=== Sitegraph Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max workers: {}", config.crawler.max_workers);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.crawler.connect_timeout_ms);
    println!("  Max document size: {} bytes", config.crawler.max_document_bytes);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }
    match config.output.print_limit {
        Some(limit) => println!("  Print limit: {} pages", limit),
        None => println!("  Print limit: (all pages)"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} and every page on {} reachable from it",
        seed,
        seed.host_str().unwrap_or_default()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(url: &str, config: &Config) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(config).context("Failed to set up crawler")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let result = coordinator
        .start(url, cancel)
        .await
        .with_context(|| format!("Crawl of {} could not start", url))?;

    print_pages(&result.pages, config.output.print_limit);
    println!();
    print_statistics(&result.stats);

    if let Some(path) = &config.output.summary_path {
        // start() already accepted the URL, so it parses here too
        let root = parse_seed(url).with_context(|| format!("Invalid root URL '{}'", url))?;
        generate_markdown_summary(&result, &root, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        tracing::info!("Summary written to {}", path);
    }

    Ok(())
}

/// Cancels `cancel` on Ctrl-C or SIGTERM
async fn cancel_on_shutdown(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Could not listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown requested, finishing in-flight fetches");
    cancel.cancel();
}
