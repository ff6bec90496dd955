//! Speedrun Standings
//!
//! `standings serve` runs the query API with the refresh scheduler in the
//! background; `standings refresh` runs a single cycle for an external cron.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use speedrun_standings::{
    server, storage::MemoryStore, KvStore, RefreshEngine, RefreshScheduler, SnapshotStore,
    SpeedrunClient, SqliteStore, StalenessPolicy, StandingsConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Snapshot database shared by `serve` and `refresh`
const DEFAULT_DB: &str = "/data/standings.db";

#[derive(Parser, Debug)]
#[command(name = "standings")]
#[command(about = "Speedrun.com IL standings mirror and query server")]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct UpstreamArgs {
    /// speedrun.com API base URL
    #[arg(long, global = true, env = "SPEEDRUN_API_BASE")]
    api_base: Option<String>,

    /// Game id or abbreviation
    #[arg(long, global = true, env = "SPEEDRUN_GAME")]
    game: Option<String>,

    /// Staleness policy: day-of-month or elapsed:<secs>
    #[arg(long, global = true, env = "STALENESS_POLICY")]
    staleness: Option<StalenessPolicy>,

    /// Max concurrent leaderboard fetches
    #[arg(long, global = true, env = "FETCH_CONCURRENCY")]
    fetch_concurrency: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the query API and refresh on an interval
    Serve {
        /// Server port
        #[arg(short, long, default_value = "8080", env = "STANDINGS_PORT")]
        port: u16,

        /// Server host
        #[arg(long, default_value = "0.0.0.0", env = "STANDINGS_HOST")]
        host: String,

        /// SQLite database for the snapshot
        #[arg(long, default_value = DEFAULT_DB, env = "STANDINGS_DB")]
        db: PathBuf,

        /// Keep the snapshot in memory and ignore `--db`
        #[arg(long)]
        in_memory: bool,

        /// Seconds between refresh cycles
        #[arg(long, env = "REFRESH_INTERVAL_SECS")]
        interval_secs: Option<u64>,
    },
    /// Run one refresh cycle and exit
    Refresh {
        /// SQLite database for the snapshot
        #[arg(long, default_value = DEFAULT_DB, env = "STANDINGS_DB")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("speedrun_standings=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = StandingsConfig::from_env().context("Invalid configuration")?;
    apply_overrides(&mut config, cli.upstream);

    match cli.command {
        Command::Serve {
            port,
            host,
            db,
            in_memory,
            interval_secs,
        } => {
            if let Some(secs) = interval_secs {
                config.refresh_interval_secs = secs;
            }
            config.validate()?;
            let db = (!in_memory).then_some(db);
            serve(config, host, port, db).await
        }
        Command::Refresh { db } => {
            config.validate()?;
            let kv: Arc<dyn KvStore> = Arc::new(SqliteStore::open(&db)?);
            let engine = build_engine(&config, kv)?;
            let report = engine.run_cycle().await.context("Refresh cycle failed")?;
            info!(
                "Refreshed {} half: {} fresh + {} retained runs",
                report.plan.refresh, report.fresh_runs, report.retained_runs
            );
            Ok(())
        }
    }
}

fn apply_overrides(config: &mut StandingsConfig, args: UpstreamArgs) {
    if let Some(api_base) = args.api_base {
        config.api_base = api_base;
    }
    if let Some(game) = args.game {
        config.game = game;
    }
    if let Some(staleness) = args.staleness {
        config.staleness = staleness;
    }
    if let Some(n) = args.fetch_concurrency {
        config.fetch_concurrency = n;
    }
}

fn build_engine(
    config: &StandingsConfig,
    kv: Arc<dyn KvStore>,
) -> Result<RefreshEngine<SpeedrunClient, Arc<dyn KvStore>>> {
    let client = SpeedrunClient::from_config(config)?;
    let store = SnapshotStore::with_key(kv, config.snapshot_key.clone());
    Ok(RefreshEngine::new(client, store, config.staleness)
        .with_fetch_concurrency(config.fetch_concurrency))
}

async fn serve(config: StandingsConfig, host: String, port: u16, db: Option<PathBuf>) -> Result<()> {
    info!("Starting Speedrun Standings");
    info!("  Game: {} ({})", config.game, config.api_base);
    info!("  Staleness policy: {}", config.staleness);
    info!("  Refresh interval: {}s", config.refresh_interval_secs);

    let kv: Arc<dyn KvStore> = match &db {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => {
            warn!("--in-memory set, snapshot is not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let engine = build_engine(&config, Arc::clone(&kv))?;
    let scheduler =
        RefreshScheduler::new(Arc::new(engine), config.refresh_interval()).spawn();

    let state = Arc::new(speedrun_standings::api::ApiState::new(
        kv,
        &config.snapshot_key,
    ));

    server::run_server(state, &host, port, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
    })
    .await?;

    scheduler.shutdown();
    let _ = scheduler.task_handle.await;
    Ok(())
}
