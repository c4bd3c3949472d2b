use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::{routing::get, Extension, Router};
use clap::{Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use mimalloc::MiMalloc;
use runtime::{AppConfig, AuthConfig, CliArgs};
use sea_orm_migration::MigratorTrait;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Used when `server.timeout_sec` is left at 0.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Stockroom Server - inventory tracking API
#[derive(Parser)]
#[command(name = "stockroom-server")]
#[command(about = "Stockroom Server - inventory tracking API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database instead of the configured one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Stockroom Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config).await,
    }
}

/// Open the database pool, honoring `--mock` and relative sqlite paths.
async fn connect_database(config: &AppConfig, args: &CliArgs) -> Result<DbHandle> {
    let (dsn, max_conns, busy_timeout_ms) = if args.mock {
        ("sqlite::memory:".to_string(), None, None)
    } else {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("Database not configured (set database.url or pass --mock)"))?;
        let dsn = db_config.url.trim().to_owned();
        if dsn.is_empty() {
            return Err(anyhow!("Database URL not configured"));
        }
        (dsn, db_config.max_conns, db_config.busy_timeout_ms)
    };

    // Absolutize sqlite DSNs to avoid cwd issues
    let final_dsn = if dsn.starts_with("sqlite://") {
        absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?
    } else {
        dsn
    };

    let connect_opts = ConnectOpts {
        max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: busy_timeout_ms.map(|ms| Duration::from_millis(ms as u64)),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!("Connecting to database: {}", final_dsn);
    let db = DbHandle::connect(&final_dsn, connect_opts)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    Ok(db)
}

/// Wire module routers, shared services, and the middleware stack.
fn build_router(db: &DbHandle, auth_config: &AuthConfig, request_timeout: Duration) -> Router {
    let auth_service = Arc::new(auth::Service::new(Arc::new(
        auth::SeaOrmUsersRepository::new(db.sea()),
    )));
    let inventory_service = Arc::new(inventory::Service::new(Arc::new(
        inventory::SeaOrmItemsRepository::new(db.sea()),
    )));
    let token_service = Arc::new(auth::TokenService::new(
        &auth_config.token_secret,
        auth_config.token_ttl,
    ));

    let api = Router::new()
        .nest("/api/auth", auth::routes(auth_service))
        .nest("/api/items", inventory::routes(inventory_service))
        .route("/api/health", get(api_core::web::health_check))
        .fallback(api_core::web::not_found)
        .layer(Extension(token_service));

    api_core::apply_middleware(api, true, request_timeout)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect_database(&config, &args).await?;

    tracing::info!("Running database migrations");
    let conn = db.sea();
    auth::Migrator::up(&conn, None)
        .await
        .context("Failed to run auth migrations")?;
    inventory::Migrator::up(&conn, None)
        .await
        .context("Failed to run inventory migrations")?;

    let request_timeout = match config.server.timeout_sec {
        0 => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        secs => Duration::from_secs(secs),
    };
    let router = build_router(&db, &config.auth, request_timeout);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read local address")?;
    tracing::info!("Listening on http://{local_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c or SIGTERM so container stops drain cleanly.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("Failed to listen for SIGTERM: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already normalized & created home_dir
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
