/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Supervised market and liquidity feeds merged into one store
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pumpdash_feed::{
    ClientConfig, ClientFrame, DashboardStore, HttpWalletDirectory, LiquidityFeed, MarketFeed,
    WalletDirectory,
};
use pumpdash_monitor::{FeedSupervisor, MonitorConfig, spawn_observer};

#[derive(Parser, Debug)]
#[command(name = "pumpdash-monitor", version, about = "Headless monitor for the pumpdash live feeds")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting pumpdash-monitor"
    );

    let config = load_config(&args.config_path)?;
    let market_endpoint = config.market_endpoint()?;
    let liquidity_endpoint = config.liquidity_endpoint()?;
    info!(%market_endpoint, %liquidity_endpoint, "configuration loaded");

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let store = DashboardStore::new();
    let directory =
        HttpWalletDirectory::with_config(&config.backend_url, &config.wallets_path, ClientConfig::default())
            .context("build wallet directory client")?;
    match directory.load_into(&store).await {
        Ok(count) => info!(wallet_count = count, "wallet listing loaded"),
        Err(err) => warn!(error = %err, "wallet listing unavailable; balances arrive unmatched"),
    }

    let observer = spawn_observer(store.clone(), shutdown.clone());

    let market = FeedSupervisor::spawn::<MarketFeed>(
        market_endpoint,
        config.session_config(),
        config.reconnect.clone(),
        store.clone(),
        shutdown.child_token(),
    );
    let liquidity = FeedSupervisor::spawn::<LiquidityFeed>(
        liquidity_endpoint,
        config.session_config(),
        config.reconnect.clone(),
        store.clone(),
        shutdown.child_token(),
    );
    info!("feeds started");

    match config.refresh_interval() {
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => market.send(ClientFrame::refresh()),
                }
            }
        }
        None => shutdown.cancelled().await,
    }
    info!("shutdown signal received");

    market.shutdown_and_wait().await;
    liquidity.shutdown_and_wait().await;
    if let Err(err) = observer.await {
        warn!(error = %err, "store observer panicked");
    }
    info!("feeds shutdown complete");

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<MonitorConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    MonitorConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        on_interrupt.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
            }
        });
    }
}
