use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{run, ClientHub, DbOptions, Registrator, RunOptions, ShutdownOptions};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Adapter to make AppConfig implement modkit::ConfigProvider
struct ModkitConfigAdapter(AppConfig);

impl modkit::ConfigProvider for ModkitConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.module_section(module_name)
    }
}

/// Roster Server - student roster backend with live roster feeds
#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster Server - student roster backend with live roster feeds")]
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

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
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

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);
    apply_ingress_bind_addr(&mut config, args.port.is_some());

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Roster Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

/// The HTTP listener follows `server.host:server.port` unless the ingress
/// section names its own address. An explicit `--port` always wins.
fn apply_ingress_bind_addr(config: &mut AppConfig, port_from_cli: bool) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let section = config
        .modules
        .entry(api_ingress::MODULE_NAME.to_string())
        .or_insert_with(|| serde_json::json!({}));
    if let Some(obj) = section.as_object_mut() {
        if port_from_cli || !obj.contains_key("bind_addr") {
            obj.insert("bind_addr".to_string(), serde_json::Value::String(addr));
        }
    }
}

async fn connect_db(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let url = db_config.resolved_url(base_dir)?;

    let mut opts = ConnectOptions::new(url.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if db_config.is_in_memory() {
        // Every pooled connection would otherwise see its own empty database.
        opts.max_connections(1).min_connections(1);
    } else if let Some(max) = db_config.max_conns {
        opts.max_connections(max);
    }

    tracing::info!("Connecting to database: {}", url);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    if let Some(ms) = db_config.busy_timeout_ms.filter(|_| !db_config.is_in_memory()) {
        use sea_orm::ConnectionTrait;
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {ms}"))
            .await
            .context("failed to set SQLite busy timeout")?;
    }
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    let base_dir = PathBuf::from(&config.server.home_dir);
    let db = match &config.database {
        Some(db_config) => DbOptions::Connection(connect_db(db_config, &base_dir).await?),
        None => {
            tracing::warn!("No database configuration found, running without database");
            DbOptions::None
        }
    };

    let run_options = RunOptions {
        modules_cfg: Arc::new(ModkitConfigAdapter(config)),
        db,
        shutdown: ShutdownOptions::Signals,
        modules: vec![api_ingress::register as Registrator, roster::register],
        client_hub: Arc::new(ClientHub::new()),
    };

    run(run_options).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        let url = db_config.resolved_url(Path::new(&config.server.home_dir))?;
        tracing::info!(url = %url, "database url resolved");
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
