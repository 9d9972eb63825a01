use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pdfchat_lib::ai_providers::AIProvider;
use pdfchat_lib::commands::{self, chat, credentials};
use pdfchat_lib::config::AppConfig;

#[derive(Parser)]
#[command(name = "pdfchat", version, about = "Chat with a PDF through OpenAI or Anthropic")]
struct Cli {
    /// Config file (default: ~/.pdfchat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage saved API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Start an interactive chat
    Chat {
        /// PDF to load before the first question
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// Ask a single question and exit
    Ask {
        #[arg(long)]
        pdf: Option<PathBuf>,
        question: String,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save a key and make its provider active
    Set {
        #[arg(long)]
        provider: AIProvider,
        /// Read from stdin when omitted
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Show the active provider
    Show,
    /// Forget a provider's key
    Delete {
        #[arg(long)]
        provider: AIProvider,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    pdfchat_lib::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let mut input = commands::stdin_lines();

    match cli.command {
        Command::Key { action } => {
            let store = pdfchat_lib::open_credential_store(&config)?;
            match action {
                KeyAction::Set { provider, api_key } => {
                    credentials::set_key(&store, provider, api_key, &mut input).await?
                }
                KeyAction::Show => credentials::show_key(&store)?,
                KeyAction::Delete { provider } => credentials::delete_key(&store, provider)?,
            }
        }
        Command::Chat { pdf } => {
            let controller = pdfchat_lib::build_controller(&config)?;
            chat::run_chat(&controller, pdf, &mut input).await?;
        }
        Command::Ask { pdf, question } => {
            let controller = pdfchat_lib::build_controller(&config)?;
            chat::ask(&controller, pdf, &question, &mut input).await?;
        }
    }

    Ok(())
}
