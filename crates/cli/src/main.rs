mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launchpad_core::DeploymentStatus;
use remote::OpenSshConnector;
use server::{create_router, recovery, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{LaunchpadConfig, CONFIG_FILE, LAUNCHPAD_DIR};

/// How long running deployments get to record their outcome on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Provision Cosmos chains onto a VPS over SSH", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create `.launchpad/` with a default config and an empty database
    Init,
    /// Run the HTTP API
    Serve {
        /// Overrides `[server] port`
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Summarise recorded deployments
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => init().await,
        Some(Commands::Serve { port }) => serve(port).await,
        Some(Commands::Status) => status().await,
        None => serve(None).await,
    }
}

fn launchpad_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(LAUNCHPAD_DIR))
}

async fn init() -> Result<()> {
    let dir = launchpad_dir()?;
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Already initialized at {}", dir.display());
        return Ok(());
    }

    let config = LaunchpadConfig::default();
    config.write(&dir).await?;

    let db_path = config.database_path(&dir);
    let pool = db::create_pool(&format!("sqlite:{}", db_path.display())).await?;
    db::run_migrations(&pool).await?;

    println!();
    println!("Initialized Cosmos Launchpad in {}", dir.display());
    println!();
    println!("Created:");
    println!("  {}/", LAUNCHPAD_DIR);
    println!("  ├── {}", CONFIG_FILE);
    println!("  └── {}", config.database.path.display());
    println!();
    println!("Next steps:");
    println!("  1. Review {}/{}", LAUNCHPAD_DIR, CONFIG_FILE);
    println!("  2. Run 'launchpad serve' to start the API");

    Ok(())
}

async fn serve(port_override: Option<u16>) -> Result<()> {
    let dir = launchpad_dir()?;
    if !dir.exists() {
        println!("No {} directory found, using default configuration.", LAUNCHPAD_DIR);
        println!("Run 'launchpad init' to create one.");
        println!();
        tokio::fs::create_dir_all(&dir).await?;
    }
    let config = LaunchpadConfig::load(&dir).await?;

    init_tracing();

    let db_path = config.database_path(&dir);
    tracing::info!("Database: {}", db_path.display());

    let pool = db::create_pool(&format!("sqlite:{}", db_path.display()))
        .await
        .context("Failed to create database pool")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let connector = OpenSshConnector::new();
    if !connector.is_available().await {
        tracing::warn!("No working `ssh` client found on PATH; deployments will fail to connect");
    }

    let state = AppState::new(pool, Arc::new(connector), config.workflow());
    recovery::recover_interrupted(&state.deployments, &state.logs)
        .await
        .context("Failed to recover interrupted deployments")?;

    let app = create_router(state.clone());

    let port = port_override.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    println!();
    println!("Cosmos Launchpad");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}/api/v1", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    state.launcher.shutdown(SHUTDOWN_GRACE).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn status() -> Result<()> {
    let dir = launchpad_dir()?;
    if !dir.exists() {
        println!("Not a Cosmos Launchpad directory.");
        println!("Run 'launchpad init' to initialize.");
        return Ok(());
    }

    let config = LaunchpadConfig::load(&dir).await?;
    let db_path = config.database_path(&dir);
    if !db_path.exists() {
        println!("Database not initialized ({})", db_path.display());
        return Ok(());
    }

    let pool = db::create_pool(&format!("sqlite:{}", db_path.display())).await?;
    let deployments = db::DeploymentRepository::new(pool);
    let stats = deployments.stats().await?;
    let recent = deployments.list(10, 0).await?;

    println!();
    println!("Database: {}", db_path.display());
    println!(
        "Deployments: {} total, {} completed, {} failed, {} in progress (success rate {})",
        stats.total_deployments,
        stats.successful_deployments,
        stats.failed_deployments,
        stats.pending_deployments,
        stats.success_rate
    );
    println!();

    if recent.is_empty() {
        println!("No deployments yet.");
    } else {
        println!("Recent deployments:");
        for deployment in &recent {
            let icon = match deployment.status {
                DeploymentStatus::Completed => "●",
                DeploymentStatus::Failed => "✗",
                _ => "◐",
            };
            println!(
                "  {} [{}] {} on {}",
                icon, deployment.status, deployment.chain_name, deployment.host
            );
        }
    }

    println!();

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "launchpad=info,server=info,orchestrator=info,tower_http=info".into()
            }),
        )
        .init();
}
