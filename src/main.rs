use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use the library instead of redeclaring modules
use isd_stats_cache::{
    cache::StatsCacheEngine,
    config::Config,
    database::{Database, repositories::StatsCacheRecordSeaOrmRepository},
    worker::CacheWorker,
};

/// Requests buffered between the rendering side and the worker
const REQUEST_QUEUE_DEPTH: usize = 64;

#[derive(Parser)]
#[command(name = "isd-stats-cache")]
#[command(version)]
#[command(about = "Persistent statistics cache worker for repository analytics dashboards")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the cache worker until interrupted
    Run,
    /// Print entry count, capacity, and lookup counters
    Stats,
    /// Remove every cached record
    Clear,
    /// Remove cached records, optionally scoped to one community
    Invalidate {
        /// Community identifier to invalidate; removes everything when absent
        #[arg(long)]
        community: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("isd_stats_cache={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting isd-stats-cache v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    info!("Using database: {}", config.database.url);

    let policy = config.cache.resolve()?;
    info!(
        "Cache policy: capacity {}, current-period TTL {}, closed-period TTL {}",
        policy.capacity,
        humantime::format_duration(policy.current_period_ttl),
        humantime::format_duration(policy.closed_period_ttl),
    );

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let repository = StatsCacheRecordSeaOrmRepository::new(database.connection());
    let engine = StatsCacheEngine::new(repository, &policy);

    match cli.command {
        Command::Run => {
            let cancellation_token = CancellationToken::new();
            let (handle, join_handle) = CacheWorker::spawn(
                engine,
                REQUEST_QUEUE_DEPTH,
                cancellation_token.clone(),
            );

            info!("Cache worker running, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received");

            // Drop our handle and cancel so the worker drains and exits
            drop(handle);
            cancellation_token.cancel();
            join_handle.await?;
        }
        Command::Stats => {
            let stats = engine.stats().await?;
            println!(
                "entries: {} / {} (hits {}, misses {}, evictions {})",
                stats.entry_count, stats.capacity, stats.hits, stats.misses, stats.evictions
            );
        }
        Command::Clear => {
            let removed = engine.clear().await?;
            println!("removed {removed} record(s)");
        }
        Command::Invalidate { community } => {
            let removed = engine.invalidate(community.as_deref()).await?;
            println!("removed {removed} record(s)");
        }
    }

    Ok(())
}
