mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

// Use mimalloc to prevent memory bloat under high fetch concurrency.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use mwmbl_core::config::AppConfig;
use mwmbl_coord::{identity::load_or_create_worker_id, CoordinatorClient};
use mwmbl_engine::{run_batch, CrawlEngine};
use mwmbl_fetch::BoundedFetcher;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let config: AppConfig = toml::from_str(&config_str)?;

    let user_id = load_or_create_worker_id()?;

    match cli.command {
        Commands::Crawl { num_threads } => {
            run_crawl_loop(config, user_id, num_threads).await?;
        }
        Commands::Hn => {
            run_board_loop(config, user_id).await?;
        }
    }

    Ok(())
}

/// Spec §4.7/§7: request a batch, crawl it, submit it, and on any
/// iteration-level error log and sleep before retrying — forever.
async fn run_crawl_loop(config: AppConfig, user_id: String, num_threads: Option<usize>) -> Result<()> {
    let fetcher = BoundedFetcher::new(&config.fetch)?;
    let engine = CrawlEngine::new(&fetcher, config.extract.clone(), config.links.clone());
    let coordinator = CoordinatorClient::new(config.coordinator.clone(), user_id)?;
    let concurrency = num_threads.unwrap_or(1).max(1);

    loop {
        if let Err(e) = run_crawl_iteration(&engine, &coordinator, concurrency).await {
            warn!(error = %e, "crawl iteration failed");
            tokio::time::sleep(tokio::time::Duration::from_secs(
                config.coordinator.iteration_error_sleep_seconds,
            ))
            .await;
        }
    }
}

async fn run_crawl_iteration(
    engine: &CrawlEngine<'_>,
    coordinator: &CoordinatorClient,
    concurrency: usize,
) -> Result<(), mwmbl_core::CrawlError> {
    let urls = coordinator.request_batch().await?;
    let results = run_batch(engine, &urls, concurrency).await;
    coordinator.submit_batch(&results).await
}

/// Spec §4.8/§7: walk the board backwards from `maxitem.json`, then on any
/// error log and sleep before restarting the walk.
async fn run_board_loop(config: AppConfig, user_id: String) -> Result<()> {
    use mwmbl_board::{seen::SeenIds, BoardAdapter};

    let coordinator = CoordinatorClient::new(config.coordinator.clone(), user_id)?;
    let seen = SeenIds::open(&config.board.db_path).await?;
    let adapter = BoardAdapter::new(config.board.clone(), config.extract.clone(), coordinator, seen)?;

    loop {
        if let Err(e) = adapter.run_forever().await {
            warn!(error = %e, "board adapter failed");
            tokio::time::sleep(tokio::time::Duration::from_secs(
                config.coordinator.iteration_error_sleep_seconds,
            ))
            .await;
        }
    }
}
