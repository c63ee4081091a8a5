use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolchat::{transport, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "toolchat")]
#[command(author, version, about = "toolchat - chat with a tool-calling LLM agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server with the chat API and chat page
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory containing an index.html to serve instead of the built-in page
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Config file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Chat with a running server from the terminal
    Chat {
        /// Server URL
        #[arg(short, long)]
        url: Option<String>,

        /// OpenAI API key sent with each message
        #[arg(long)]
        api_key: Option<String>,
    },

    /// List the tools available to the agent
    Tools,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "toolchat=debug,tower_http=debug"
    } else {
        "toolchat=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            config,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }

            tracing::info!(
                "Starting HTTP server on {}:{}, model: {}",
                config.server.host,
                config.server.port,
                config.llm.model
            );
            transport::run_http_server(config).await?;
        }
        Commands::Chat { url, api_key } => {
            let config = Config::load().unwrap_or_default();
            transport::cli::run_chat(&config, url, api_key).await?;
        }
        Commands::Tools => {
            let config = Config::load().unwrap_or_default();
            transport::cli::run_tools(&config);
        }
    }

    Ok(())
}
