/// Chime scan service - keeps the catalog in sync with the music folders
use chime_metadata::LoftyExtractor;
use chime_scanner::Scanner;
use chime_server::{config::ServerConfig, scheduler::Scheduler};
use chime_storage::SqliteCatalog;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chime-server")]
#[command(about = "Chime media server scan service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic scan scheduler
    Serve,
    /// Run a single scan cycle and exit
    Scan {
        /// Ignore the stored watermark and reconcile every directory
        #[arg(long)]
        full: bool,
    },
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chime_server=info,chime_scanner=info,chime_storage=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve().await?,
        Commands::Scan { full } => scan(full).await?,
        Commands::AddUser { username, admin } => add_user(&username, admin).await?,
        Commands::ListUsers => list_users().await?,
    }

    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    config.validate()?;

    tracing::info!("Starting Chime scan service");
    tracing::info!("Music folder: {}", config.scanner.music_folder.display());
    tracing::info!("Scan interval: {}s", config.scanner.interval_seconds);

    let scheduler = build_scheduler(&config).await?;

    // Stop between directory-level units of work on ctrl-c
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            signal_token.cancel();
        }
    });

    scheduler.run(shutdown).await?;

    Ok(())
}

async fn scan(full: bool) -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    config.validate()?;

    let scheduler = build_scheduler(&config).await?;

    let counters = scheduler
        .scan_once(&CancellationToken::new(), full)
        .await?;
    println!(
        "Scan finished: {} added, {} updated, {} deleted",
        counters.added, counters.updated, counters.deleted
    );

    Ok(())
}

async fn build_scheduler(config: &ServerConfig) -> anyhow::Result<Arc<Scheduler>> {
    let pool = chime_storage::create_pool(&config.storage.database_url).await?;
    chime_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let catalog = Arc::new(SqliteCatalog::new(pool.clone()));
    let extractor = Arc::new(LoftyExtractor::new());
    let scanner = Arc::new(
        Scanner::new(config.scanner.music_folder.clone(), catalog, extractor)
            .batch_size(config.scanner.batch_size),
    );

    Ok(Arc::new(Scheduler::new(
        pool,
        scanner,
        Duration::from_secs(config.scanner.interval_seconds),
    )))
}

async fn add_user(username: &str, admin: bool) -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    let pool = chime_storage::create_pool(&config.storage.database_url).await?;
    chime_storage::run_migrations(&pool).await?;

    let id = chime_storage::users::create(&pool, username, admin).await?;
    println!("Created user {} (id {})", username, id);

    Ok(())
}

async fn list_users() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    let pool = chime_storage::create_pool(&config.storage.database_url).await?;
    chime_storage::run_migrations(&pool).await?;

    let users = chime_storage::users::get_all(&pool).await?;

    println!("Users:");
    for user in users {
        let role = if user.is_admin { "admin" } else { "user" };
        println!("  {} - {} ({})", user.id, user.name, role);
    }

    Ok(())
}
