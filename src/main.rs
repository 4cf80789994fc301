//! ledgerdash main entry point

use anyhow::Context;
use clap::Parser;
use ledgerdash_api::start_server;
use ledgerdash_config::Config;
use ledgerdash_core::{
    CalendarDate, Dashboard, DashboardOptions, LedgerCache, LedgerClient, LedgerSettings,
    SystemRunner,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerdash")]
#[command(author = "ledgerdash contributors")]
#[command(version = "0.1.0")]
#[command(
    about = "A financial dashboard backed by the ledger command-line tool",
    long_about = None
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Skip warming the cache before serving
    #[arg(long)]
    no_prefetch: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load(&args.config)
        .inspect_err(|e| eprintln!("{}", e.to_details()))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!(
        "Config loaded: ledger={}, file={}",
        config.ledger.exe_path.display(),
        config
            .ledger
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<ledger default>".to_string())
    );

    let settings = LedgerSettings::from(&config.ledger);
    let client = LedgerClient::new(Arc::new(SystemRunner));
    let cache = LedgerCache::new(client, settings).with_epoch_year(config.dashboard.epoch_year);
    let dashboard = Arc::new(Dashboard::new(
        Arc::new(cache),
        DashboardOptions::from(&config.dashboard),
    ));

    let rt = Runtime::new()?;
    rt.block_on(async {
        if config.dashboard.prefetch_on_start && !args.no_prefetch {
            log::info!("Prefetching {} months of balances", config.dashboard.prefetch_months);
            if let Err(e) = dashboard.prefetch(CalendarDate::today()).await {
                log::warn!("Prefetch incomplete: {}", e);
            }
        }

        start_server(config, dashboard).await
    })
}
