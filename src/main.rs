//! Pinout Crawler main entry point
//!
//! This is the command-line interface for the connector catalogue crawler.

use anyhow::Context;
use clap::Parser;
use pinout_crawler::config::{load_config_with_hash, Config};
use pinout_crawler::crawler::run_crawl;
use pinout_crawler::output::{document_path, print_report};
use pinout_crawler::url::program_entry_url;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Pinout Crawler: harvests connector pinouts from electrical reference docs
///
/// Each configured program is crawled from its entry page: the sidebar gives
/// the list of connector pages, every page becomes a record, and the records
/// are written as one JSON document per program.
#[derive(Parser, Debug)]
#[command(name = "pinout-crawler")]
#[command(version)]
#[command(about = "Harvests connector pinout tables", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pinout_crawler=info,warn"),
            1 => EnvFilter::new("pinout_crawler=debug,info"),
            2 => EnvFilter::new("pinout_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows programs, entry pages and output files
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Pinout Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!(
        "  Politeness delay: {}ms",
        config.crawler.politeness_delay_ms
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    if let Some(deadline) = config.crawler.run_deadline_secs {
        println!("  Run deadline: {}s", deadline);
    }
    if let Some(limit) = config.crawler.max_connectors {
        println!("  Max connectors per program: {}", limit);
    }
    println!("  Dedupe links: {}", config.crawler.dedupe_links);

    println!("\nHTTP:");
    println!("  User-Agent: {}", config.http.user_agent);
    println!("  Accept: {}", config.http.accept);

    let root = Url::parse(&config.site.root_url)?;
    let output = Path::new(&config.output.directory);

    println!("\nPrograms ({}):", config.programs.len());
    for program in &config.programs {
        let descriptor = program.descriptor();
        println!("  - {} ({})", descriptor.label(), descriptor.stage_tag);
        println!("    entry:  {}", program_entry_url(&root, program)?);
        println!("    output: {}", document_path(output, &descriptor).display());
        for build in &descriptor.build_info {
            println!("    build:  {}", build);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            on_signal.cancel();
        }
    });

    let report = run_crawl(config, cancel).await.context("crawl failed")?;

    if !quiet {
        print_report(&report);
    }

    if report.succeeded().count() == 0 {
        anyhow::bail!("no program documents were written");
    }

    Ok(())
}
