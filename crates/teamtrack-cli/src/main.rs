//! teamtrack: terminal console for team-task lookups behind an admin key.

mod config;
mod gate;
mod oneshot;
mod session;
mod tui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use session::SessionCache;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use teamtrack_client::{AdminBackend, HttpBackend};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeroize::Zeroizing;

/// Env var holding the admin key for `search` and for seeding the console.
const ADMIN_KEY_ENV: &str = "TEAMTRACK_ADMIN_KEY";

const DEFAULT_FILTER: &str = "teamtrack=info,teamtrack_cli=info,teamtrack_client=info,warn";

/// Look up open team tasks behind an admin key.
#[derive(Parser)]
#[command(name = "teamtrack")]
#[command(about = "Admin console for team-task tracking")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.teamtrack/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and environment
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Issue tracker root used for deep links
    #[arg(long, global = true)]
    tracker: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the backend has an admin key
    Status,

    /// Run one team-task search and print the result
    Search {
        /// Username to look up
        username: String,

        /// Env var to read the admin key from
        #[arg(long, default_value = ADMIN_KEY_ENV)]
        key_env: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    if let Some(url) = cli.backend {
        config.backend_url = url;
    }
    if let Some(url) = cli.tracker {
        config.tracker_url = url;
    }

    match cli.command {
        None => {
            init_file_logging(&config.log_path())?;
            info!(backend = %config.backend_url, "Starting console");
            let backend: Arc<dyn AdminBackend> = Arc::new(build_backend(&config)?);
            let cache = SessionCache::from_env(ADMIN_KEY_ENV);
            tui::run(&config, backend, cache).context("terminal error")?;
        }
        Some(Commands::Status) => {
            init_stderr_logging();
            let backend = build_backend(&config)?;
            oneshot::run_status(&backend, &mut std::io::stdout().lock())?;
        }
        Some(Commands::Search { username, key_env }) => {
            init_stderr_logging();
            let admin_key = Zeroizing::new(
                std::env::var(&key_env).with_context(|| format!("{key_env} is not set"))?,
            );
            if admin_key.trim().is_empty() {
                bail!("{key_env} is empty");
            }
            let backend = build_backend(&config)?;
            oneshot::run_search(
                &backend,
                &config.tracker_url,
                &username,
                admin_key.trim(),
                &mut std::io::stdout().lock(),
            )?;
        }
    }
    Ok(())
}

fn build_backend(config: &Config) -> Result<HttpBackend> {
    HttpBackend::new(&config.backend_url, config.request_timeout())
        .with_context(|| format!("invalid backend URL {}", config.backend_url))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// The console owns the terminal, so its logs go to a file.
fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .init();
}
