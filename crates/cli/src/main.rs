mod auth_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    passgate_config::PassgateConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "passgate", about = "Passgate: OAuth2 login demo server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./passgate.toml or ~/.config/passgate/).
    #[arg(long, global = true, env = "PASSGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the login server.
    Serve {
        /// Address to bind (overrides `server.bind`).
        #[arg(long, env = "PASSGATE_BIND")]
        bind: Option<String>,
        /// Port to listen on (overrides `server.port`).
        #[arg(long, env = "PASSGATE_PORT")]
        port: Option<u16>,
    },
    /// Inspect or clear the cached token.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PassgateConfig> {
    match &cli.config {
        Some(path) => passgate_config::load_config(path),
        None => Ok(passgate_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "passgate starting");
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { bind, port } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let port = port.unwrap_or(config.server.port);
            passgate_gateway::start_server(&config, &bind, port).await
        },
        Commands::Auth { action } => auth_commands::handle_auth(action, &config).await,
    }
}
