//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod model_list;
pub mod oneshot;
pub mod shell;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::auth::{run_auth, run_deauth};
use crate::cli::model_list::list_models;
use crate::cli::oneshot::{run_ask, run_generate, GenerateArgs, ProfileArgs};
use crate::cli::shell::Shell;
use crate::core::config::{Config, ConfigKey};
use crate::core::generation::GenerationClient;
use crate::core::keyring::{KeyringSecretStore, NoSecretStore, SecretStore};
use crate::core::router::ViewRouter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "artrestorer")]
#[command(version = VERSION)]
#[command(about = "AI-assisted, text-based restoration guidance for damaged artworks")]
#[command(
    long_about = "ArtRestorer AI turns structured descriptions of damaged artworks into \
restoration guidance from Google's Gemini models.\n\n\
API key lookup order:\n\
  1. System keyring (set with 'artrestorer auth')\n\
  2. .secrets/secrets.toml    GEMINI_API_KEY = \"...\"\n\
  3. .streamlit/secrets.toml  GEMINI_API_KEY = \"...\"\n\
  4. GEMINI_API_KEY environment variable\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (last fallback)\n\
  GEMINI_BASE_URL   Custom API base URL (optional)\n\
  RUST_LOG          Log filter (default: warn)\n\n\
Run without a subcommand to start the interactive shell; type /help there for commands."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Append diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Do not consult the system keyring for the API key
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Run,
    /// Generate restoration guidance once and print it
    Generate(GenerateArgs),
    /// Ask the art restoration assistant a single question
    Ask {
        #[command(flatten)]
        profile: ProfileArgs,
        /// The question to ask
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// List the text-generation models available to your API key
    Models,
    /// Show API key and model status
    Status,
    /// Store your Gemini API key in the system keyring
    Auth,
    /// Remove the API key from the system keyring
    Deauth {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Set configuration values (prints the configuration when no value is given)
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    crate::logging::init(args.log.as_deref())?;
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.unwrap_or(Commands::Run);

    match command {
        Commands::Auth => run_auth(),
        Commands::Deauth { yes } => run_deauth(yes),
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match (key, value) {
                (Some(key), Some(value)) if !value.is_empty() => {
                    let key: ConfigKey = key.parse()?;
                    let value = value.join(" ");
                    config.set_value(key, &value)?;
                    config.save()?;
                    println!("✅ Set {key} to: {value}");
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            let mut config = Config::load()?;
            config.unset_value(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Status => {
            let config = Config::load()?;
            let generator = bootstrap(&config, args.env_only).await?;
            let status = generator.status();
            for line in status.lines() {
                println!("{line}");
            }
            if status.is_configured() {
                Ok(())
            } else {
                Err("API is not configured".into())
            }
        }
        Commands::Models => {
            let config = Config::load()?;
            let generator = bootstrap(&config, args.env_only).await?;
            list_models(&generator)
        }
        Commands::Generate(generate_args) => {
            let config = Config::load()?;
            let generator = bootstrap(&config, args.env_only).await?;
            run_generate(generator, generate_args, &config.export_dir()).await
        }
        Commands::Ask { profile, question } => {
            let config = Config::load()?;
            let generator = bootstrap(&config, args.env_only).await?;
            run_ask(generator, profile, &question.join(" ")).await
        }
        Commands::Run => {
            let config = Config::load()?;
            let generator = bootstrap(&config, args.env_only).await?;
            run_shell(generator, config.export_dir()).await
        }
    }
}

/// Resolve the key and pick a model for this process. Configuration problems
/// are carried inside the client, not returned here.
async fn bootstrap(config: &Config, env_only: bool) -> Result<GenerationClient, Box<dyn Error>> {
    let base_dir = std::env::current_dir()?;
    let store: Box<dyn SecretStore> = if env_only {
        Box::new(NoSecretStore)
    } else {
        Box::new(KeyringSecretStore::new())
    };
    Ok(GenerationClient::bootstrap(config, store.as_ref(), &base_dir).await)
}

async fn run_shell(generator: GenerationClient, export_dir: PathBuf) -> Result<(), Box<dyn Error>> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut shell = Shell::new(input, std::io::stdout(), ViewRouter::new(generator), export_dir);
    shell.run().await?;
    Ok(())
}
