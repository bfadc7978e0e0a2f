use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modelhub::cli;

#[derive(Parser)]
#[command(name = "modelhub")]
#[command(about = "Administrative console for a multi-model LLM gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Gateway base URL (overrides configuration)
    #[arg(long, global = true, env = "MODELHUB_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console
    #[command(alias = "tui")]
    Run,

    /// Provider management
    Provider {
        #[command(subcommand)]
        command: ProviderCommands,
    },

    /// Model management
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },

    /// Conversation management
    Conversation {
        #[command(subcommand)]
        command: ConversationCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ProviderCommands {
    /// List all providers
    List,
    /// Show provider details, keys, and quota
    Show {
        /// Provider ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// List all models
    List,
    /// Show a model and its implementations
    Show {
        /// Model ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ConversationCommands {
    /// List all conversations
    List,
    /// Show conversation details
    Show {
        /// Conversation ID
        id: String,
    },
    /// Delete a conversation
    Delete {
        /// Conversation ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Initialize configuration file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // clap already read MODELHUB_API_URL from the environment; an explicit
    // flag wins over both env and config files.
    if let Some(api_url) = &cli.api_url {
        std::env::set_var("MODELHUB_API_URL", api_url);
    }

    match cli.command {
        Some(Commands::Run) | None => {
            cli::run::execute().await?;
        }
        Some(Commands::Provider { command }) => match command {
            ProviderCommands::List => {
                cli::provider::list().await?;
            }
            ProviderCommands::Show { id } => {
                cli::provider::show(&id).await?;
            }
        },
        Some(Commands::Model { command }) => match command {
            ModelCommands::List => {
                cli::model::list().await?;
            }
            ModelCommands::Show { id } => {
                cli::model::show(&id).await?;
            }
        },
        Some(Commands::Conversation { command }) => match command {
            ConversationCommands::List => {
                cli::conversation::list().await?;
            }
            ConversationCommands::Show { id } => {
                cli::conversation::show(&id).await?;
            }
            ConversationCommands::Delete { id } => {
                cli::conversation::delete(&id).await?;
            }
        },
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                cli::config::show().await?;
            }
            ConfigCommands::Path => {
                cli::config::path().await?;
            }
            ConfigCommands::Init => {
                cli::config::init().await?;
            }
        },
        Some(Commands::Version) => {
            println!("modelhub {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
