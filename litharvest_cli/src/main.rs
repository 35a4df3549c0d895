use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod output;
mod terms;

use cli::Cli;
use litharvest_core::sources::arxiv::{ArxivConfig, ArxivFetcher};
use litharvest_core::sources::europe_pmc::{EuropePmcConfig, EuropePmcFetcher};
use litharvest_core::sources::medrxiv::{MedrxivConfig, MedrxivFetcher};
use litharvest_core::{HarvestError, RetryPolicy, SourceFetcher};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no topic files found in {0}")]
    NoTopics(String),
    #[error(transparent)]
    Core(#[from] HarvestError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "litharvest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let topics = terms::load_topics(&cli.terms_dir)?;
    if topics.is_empty() {
        return Err(CliError::NoTopics(cli.terms_dir.display().to_string()));
    }
    std::fs::create_dir_all(&cli.out_dir)?;

    let client = reqwest::Client::builder()
        .user_agent(&cli.user_agent)
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;
    let fetchers = build_fetchers(cli, client);
    if fetchers.is_empty() {
        error!("all sources are disabled, nothing to do");
        return Ok(());
    }

    let mut failed_topics = 0usize;
    for topic in &topics {
        if let Err(e) = harvest_topic(cli, &fetchers, &topic.name, &topic.terms).await {
            error!(topic = %topic.name, error = %e, "topic failed");
            failed_topics += 1;
        }
    }

    info!(
        topics = topics.len(),
        failed = failed_topics,
        "harvest run complete"
    );
    Ok(())
}

/// Construct the enabled fetchers in merge precedence order.
fn build_fetchers(cli: &Cli, client: reqwest::Client) -> Vec<Box<dyn SourceFetcher>> {
    let retry = RetryPolicy {
        max_attempts: cli.retries,
        base_backoff: Duration::from_secs_f64(cli.backoff_secs),
    };

    let mut fetchers: Vec<Box<dyn SourceFetcher>> = Vec::new();
    if !cli.no_arxiv {
        fetchers.push(Box::new(ArxivFetcher::new(
            client.clone(),
            ArxivConfig {
                base_url: cli.arxiv_base_url.clone(),
                max_results: cli.arxiv_max,
                page_size: cli.page_size,
                wrap_width: cli.wrap_width,
                retry: retry.clone(),
                ..ArxivConfig::default()
            },
        )));
    }
    if !cli.no_medrxiv {
        fetchers.push(Box::new(MedrxivFetcher::new(
            client.clone(),
            MedrxivConfig {
                server: cli.medrxiv_server.clone(),
                base_url: cli.medrxiv_base_url.clone(),
                days_back: cli.days_back,
                max_results: cli.medrxiv_max,
                page_size: cli.page_size,
                wrap_width: cli.wrap_width,
                retry: retry.clone(),
            },
        )));
    }
    if !cli.no_europepmc {
        fetchers.push(Box::new(EuropePmcFetcher::new(
            client,
            EuropePmcConfig {
                base_url: cli.europepmc_base_url.clone(),
                days_back: cli.days_back,
                max_results: cli.europepmc_max,
                page_size: cli.page_size,
                wrap_width: cli.wrap_width,
                retry,
                ..EuropePmcConfig::default()
            },
        )));
    }
    fetchers
}

/// Fetch one topic from every enabled source, merge with precedence dedup,
/// and write the per-topic CSV. A failing source contributes nothing but
/// does not sink the topic.
async fn harvest_topic(
    cli: &Cli,
    fetchers: &[Box<dyn SourceFetcher>],
    topic: &str,
    terms: &[String],
) -> Result<()> {
    let mut per_source = Vec::with_capacity(fetchers.len());
    for fetcher in fetchers {
        match fetcher.fetch(topic, terms).await {
            Ok(records) => per_source.push(records),
            Err(e) => {
                error!(topic, source = %fetcher.source(), error = %e, "source failed");
                per_source.push(Vec::new());
            }
        }
    }

    let merged = litharvest_core::aggregate::merge(per_source);
    let path = cli.out_dir.join(format!("{topic}.csv"));
    let rows = output::write_csv(&path, &merged)?;
    info!(topic, rows, path = %path.display(), "saved topic CSV");
    Ok(())
}
