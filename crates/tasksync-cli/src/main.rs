use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "tasksync", version, about = "Task list with remote sync and webhooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Keep the task list in sync with the remote table
    Watch(commands::watch::WatchArgs),
    /// Webhook settings (local file, remote table, config defaults)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Send a message to the chat webhook
    Chat(commands::chat::ChatArgs),
}

#[tokio::main]
async fn main() {
    // Tracing is opt-in via RUST_LOG; stdout stays clean for --json output.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action).await,
        Commands::Watch(args) => commands::watch::run(args).await,
        Commands::Settings { action } => commands::settings::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Chat(args) => commands::chat::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
