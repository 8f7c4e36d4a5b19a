//! Tether CLI binary.
//!
//! Connects to a game server through the configured protocol bridge and
//! keeps the session alive until `\stop`, Ctrl-C or SIGTERM.
//!
//! Configuration is layered: config file, then environment (a `.env` file
//! in the working directory is honoured), then command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tether::{
    auth::sign_in,
    notify,
    protocol::BridgeFactory,
    runtime, Config, Supervisor, SupervisorConfig, VERSION,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Time allowed for a final quit command to reach the bridge.
const SHUTDOWN_FLUSH: Duration = Duration::from_millis(250);

/// Exit code when startup authentication fails.
const EXIT_AUTH_FAILED: i32 = 1;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version = VERSION)]
#[command(about = "Tether - keeps a game client connected across kicks, restarts and version changes", long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address (host[:port])
    #[arg(short, long)]
    server: Option<String>,

    /// Pin a protocol version instead of walking the ladder
    #[arg(long = "game-version", value_name = "VERSION")]
    game_version: Option<String>,

    /// Disable the anti-idle jump
    #[arg(long)]
    no_jump: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    let program = config
        .bridge
        .program
        .clone()
        .context("No protocol bridge configured; set TETHER_BRIDGE or bridge.program")?;

    tracing::info!("Tether v{VERSION}");
    tracing::info!(server = %config.server.address, auth = %config.auth.mode, "Starting");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let code = rt.block_on(async {
        let credentials = match sign_in(&config.auth).await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::error!(mode = %config.auth.mode, "{e}");
                eprintln!("Authentication failed: {e}");
                return Ok::<_, anyhow::Error>(EXIT_AUTH_FAILED);
            },
        };

        let mut supervisor_config = SupervisorConfig::from_config(&config)?;
        if let Some(credentials) = credentials {
            supervisor_config = supervisor_config.with_credentials(credentials);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let factory = BridgeFactory::new(program, config.bridge.args.clone());
        let supervisor = Supervisor::new(supervisor_config, Box::new(factory), tx)
            .with_notifier(notify::from_config(&config.webhook)?);

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let code = runtime::run(supervisor, rx, stdin).await;
        tokio::time::sleep(SHUTDOWN_FLUSH).await;
        Ok(code)
    })?;

    // Dropping the runtime reaps any bridge process still running
    drop(rt);
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(server) = &cli.server {
        config.server.address.clone_from(server);
    }
    if let Some(version) = &cli.game_version {
        config.server.version = Some(version.parse()?);
    }
    if cli.no_jump {
        config.liveness.enabled = false;
    }

    config.validate()?;
    Ok(config)
}
