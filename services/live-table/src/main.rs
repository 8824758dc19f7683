use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context};
use clap::Parser;
use goldpot_execution::{RoundEngine, TableConfig};
use goldpot_types::{Config as RoundConfig, OutboundEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;
use tracing::info;

mod gateway;
mod history;
mod table;

use gateway::AppState;
use history::HistoryLogger;
use table::{Actor, SystemClock};

/// Capacity of the event fan-out; slower clients skip what they miss.
const BROADCAST_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the goldpot stake-weighted round.", long_about = None)]
struct Args {
    /// Host interface to bind.
    #[arg(long, env = "GOLDPOT_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, env = "GOLDPOT_PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding the append-only history logs.
    #[arg(long, env = "GOLDPOT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Static files to serve next to the websocket endpoint.
    #[arg(long, env = "GOLDPOT_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,

    /// Countdown length once quorum is reached.
    #[arg(long, env = "GOLDPOT_ROUND_DURATION_SECS", default_value_t = 60)]
    round_duration_secs: u64,

    #[arg(long, env = "GOLDPOT_MIN_STAKE", default_value_t = 1)]
    min_stake: u64,

    /// Reserved identity allowed to change the configuration.
    #[arg(long, env = "GOLDPOT_ADMIN_NAME", default_value = "admin")]
    admin_name: String,

    #[arg(long, env = "GOLDPOT_TICK_MS", default_value_t = 1_000)]
    tick_ms: u64,

    /// Seed for winner draws. Draws use OS entropy when unset.
    #[arg(long, env = "GOLDPOT_RNG_SEED")]
    rng_seed: Option<u64>,

    #[arg(long, default_value_t = 1_024)]
    mailbox_size: usize,

    #[arg(long, default_value_t = 1_024)]
    history_buffer: usize,

    #[arg(long, env = "GOLDPOT_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,
}

fn build_config(args: &Args) -> anyhow::Result<(TableConfig, table::Config)> {
    let config = RoundConfig {
        duration_seconds: args.round_duration_secs,
        minimum_stake: args.min_stake,
    };
    config
        .validate()
        .map_err(|err| anyhow::anyhow!("invalid round config: {err}"))?;
    let admin_name = args.admin_name.trim().to_string();
    ensure!(!admin_name.is_empty(), "admin_name must not be empty");
    ensure!(args.tick_ms > 0, "tick_ms must be greater than zero");

    Ok((
        TableConfig { config, admin_name },
        table::Config {
            tick_interval: Duration::from_millis(args.tick_ms),
            mailbox_size: args.mailbox_size,
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let (table_config, actor_config) = build_config(&args)?;
    let history = Arc::new(
        HistoryLogger::start(&args.data_dir, args.history_buffer)
            .context("failed to start history logger")?,
    );
    let rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(
        duration_seconds = table_config.config.duration_seconds,
        minimum_stake = table_config.config.minimum_stake,
        admin = %table_config.admin_name,
        data_dir = %args.data_dir.display(),
        "starting table"
    );
    let engine = RoundEngine::new(table_config, history.clone(), rng);
    let (broadcaster, _) = broadcast::channel::<OutboundEvent>(BROADCAST_CAPACITY);
    let (actor, mailbox) = Actor::new(actor_config, engine, SystemClock, broadcaster.clone());
    actor.start();

    let app = gateway::router(AppState::new(mailbox, broadcaster), args.public_dir.clone());
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "live table listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    history.flush().await;
    info!("live table stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
