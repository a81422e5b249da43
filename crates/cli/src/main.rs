mod config_commands;
mod log_commands;

use std::path::PathBuf;

use {
    chatlog_config::ChatlogConfig,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "chatlog", about = "chatlog: buffered chat-log exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of discovery.
    #[arg(long, global = true, env = "CHATLOG_CONFIG")]
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
    /// Start the HTTP gateway.
    Gateway {
        #[arg(long, env = "CHATLOG_BIND")]
        bind: Option<String>,
        #[arg(long, env = "CHATLOG_PORT")]
        port: Option<u16>,
    },
    /// Append one chat message to a session buffer.
    Buffer(log_commands::BufferArgs),
    /// Merge buffered messages into an export.
    Flush(log_commands::FlushArgs),
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn resolve_config(path: Option<&PathBuf>) -> anyhow::Result<ChatlogConfig> {
    match path {
        Some(path) => chatlog_config::load_config(path),
        None => Ok(chatlog_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chatlog starting");

    let mut config = resolve_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Gateway { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            chatlog_gateway::server::start_gateway(&config).await
        },
        Commands::Buffer(args) => log_commands::handle_buffer(&config, args).await,
        Commands::Flush(args) => log_commands::handle_flush(&config, args).await,
        Commands::Config { action } => {
            config_commands::handle_config(&config, cli.config.as_deref(), action)
        },
    }
}
