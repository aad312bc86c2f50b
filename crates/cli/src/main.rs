//! Luxe CLI - salon bookings and shop from the terminal

mod commands;
mod config;
mod logging;
mod session;
mod state_dir;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use luxe_http::{FileCredentialStore, LuxeClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info, warn};

use crate::config::CliConfig;
use crate::session::Session;
use crate::state_dir::StateDir;

#[derive(Parser)]
#[command(name = "luxe")]
#[command(about = "Book salon services and shop Luxe products")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Directory for the session, saved cart, config and logs
    #[arg(short = 'd', long, global = true, env = "LUXE_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to luxe.toml in the config directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (0 = no timeout), overrides the config file
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = StateDir::resolve(cli.data_dir.clone());
    state_dir.create_directories()?;
    logging::init_logging(cli.log_level.into(), &state_dir.log_path(), cli.no_file_log)?;

    let config_path = cli.config.clone().unwrap_or_else(|| state_dir.config_path());
    let mut config = CliConfig::load(&config_path)?;
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let mut builder = LuxeClient::builder()
        .target(config.api_target())
        .credentials(Arc::new(FileCredentialStore::new(state_dir.data_dir())));
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;
    info!(base_url = client.base_url(), "Starting Luxe CLI");

    let session = Session::open(client, state_dir.snapshot_path())?;
    let mut ctx = Context {
        session,
        payment: config.payment(),
    };

    match cli.command.execute(&mut ctx).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) if commands::requires_sign_in(&e) => {
            if let Err(err) = ctx.session.expire() {
                warn!(error = %err, "Failed to forget signed-in user");
            }
            error!("Session refresh failed: {e}");
            eprintln!("Your session has expired. Run `luxe login` to sign in again.");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Command failed: {e}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
