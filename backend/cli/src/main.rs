mod config_cmd;
mod doctor_cmd;
mod password_cmd;
mod profile_cmd;
mod runtime;
mod sentiment_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ambassador_config::{default_config_path, load_and_prepare, load_config, AmbassadorConfig};

use config_cmd::ConfigCommands;
use profile_cmd::ProfileCommands;
use sentiment_cmd::SentimentCommands;

#[derive(Parser)]
#[command(name = "ambassador")]
#[command(about = "AI Ambassador: a personal assistant that answers for its creator")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $AMBASSADOR_CONFIG or ./ambassador.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the SHA-256 hash of a creator password
    HashPassword {
        password: String,
        /// Write the hash to the configured password file
        #[arg(long)]
        write: bool,
    },
    /// Inspect the stored profile
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// Sentiment log reports
    #[command(subcommand)]
    Sentiment(SentimentCommands),
    /// Inspect the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Query a running server's health endpoint
    Status,
    /// Check the local setup
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Serve { port } => {
            // Logging comes up first so config warnings reach the log.
            let raw = load_config(&config_path).await?;
            logging::init_logger(&raw.logging.dir, &raw.logging.level)?;
            let mut config = load_and_prepare(&config_path).await?;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            run_server(config).await?;
        }
        Commands::HashPassword { password, write } => {
            let config = oneshot_config(&config_path).await?;
            password_cmd::run(&config, &password, write)?;
        }
        Commands::Profile(cmd) => profile_cmd::run(&oneshot_config(&config_path).await?, cmd).await?,
        Commands::Sentiment(cmd) => sentiment_cmd::run(&oneshot_config(&config_path).await?, cmd).await?,
        Commands::Config(cmd) => config_cmd::run(&oneshot_config(&config_path).await?, &config_path, cmd)?,
        Commands::Status => status_cmd::run(&oneshot_config(&config_path).await?).await?,
        Commands::Doctor => {
            init_console_logging();
            doctor_cmd::run(&config_path).await?;
        }
    }

    Ok(())
}

/// One-shot commands log warnings and errors to stderr only.
async fn oneshot_config(path: &Path) -> Result<AmbassadorConfig> {
    init_console_logging();
    load_and_prepare(path).await
}

fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_server(config: AmbassadorConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.gateway.bind, config.gateway.port))?;

    info!(
        addr = %addr,
        profile = %config.storage.profile_path,
        model = %config.model.model,
        "Starting AI Ambassador"
    );

    let state = runtime::gateway_state(&config).await?;
    ambassador_gateway::start_server(addr, state).await
}
