use crate::app::build_service;
use crate::config::AppConfig;
use crate::router::Router;
use crate::routes::api_routes;
use crate::runtime_config::RuntimeConfig;
use crate::server::{HttpServer, ServerHandle};
use crate::store::{PetRepository, SqlitePetStore};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long shutdown waits for handler coroutines to drop their store handle.
const STORE_RELEASE_TIMEOUT: Duration = Duration::from_secs(2);

/// Command-line interface for the pet lookup service.
#[derive(Debug, Parser)]
#[command(name = "pet-lookup", version)]
#[command(about = "Pet lookup HTTP service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP service until SIGINT or SIGTERM
    Serve {
        /// YAML config file (default: config/config.yaml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address and port to bind, overrides the config file
        #[arg(long)]
        addr: Option<String>,

        /// SQLite database file, overrides the config file
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Print the routing table
    Routes,
}

/// Parse the process arguments and run.
///
/// # Errors
///
/// See [`run`].
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Execute a parsed command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the database cannot be
/// opened, or the server fails to start.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            database,
        } => serve(config, addr, database),
        Commands::Routes => {
            let router = Router::new(api_routes()).context("Failed to compile routes")?;
            for line in router.describe_routes() {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn serve(
    config_path: Option<PathBuf>,
    addr: Option<String>,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load(config_path.as_deref()).context("Failed to load config")?;
    if let Some(addr) = addr {
        config.http.addr = addr;
    }
    if let Some(database) = database {
        config.database.path = database;
    }

    let store = SqlitePetStore::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.path.display()))?;
    let store: Arc<dyn PetRepository> = Arc::new(store);

    let runtime = RuntimeConfig::from_env();
    let service = build_service(Arc::clone(&store), &runtime, config.http.metrics)
        .context("Failed to build service")?;

    let handle = HttpServer(service)
        .start(config.http.addr.as_str())
        .with_context(|| format!("Failed to bind {}", config.http.addr))?;

    wait_for_shutdown(handle)?;
    if wait_for_release(&store, STORE_RELEASE_TIMEOUT) {
        info!("Store released");
    } else {
        warn!(
            holders = Arc::strong_count(&store) - 1,
            "Store still referenced by open connections at exit"
        );
    }
    info!("Shutdown complete");
    Ok(())
}

/// Poll until `shared` is the only strong reference left, or `timeout` passes.
///
/// The service, its connection coroutines and the handler coroutine each hold
/// a clone; they drop them as the stopped server winds down.
pub(crate) fn wait_for_release<T: ?Sized>(shared: &Arc<T>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if Arc::strong_count(shared) == 1 {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, addr = %handle.addr(), "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("Server coroutine panicked: {e:?}"))
}
