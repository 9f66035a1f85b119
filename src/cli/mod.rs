//! CLI module for scribelink
//!
//! Command-line interface definitions and handlers for the connector.
//!
//! # Commands
//!
//! - `discover` - Find a working inference server on the network
//! - `health` - Probe known endpoints and show their status
//! - `models` - List models available on an endpoint
//! - `generate` - Generate a structured note from a transcript
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Find a server and remember it
//! scribelink discover
//!
//! # Generate a note from a transcript file
//! scribelink generate visit.txt --model llama3.2:1b
//!
//! # Generate shell completions
//! scribelink completions bash > ~/.bash_completion.d/scribelink
//! ```

pub mod completions;
pub mod config;
pub mod discover;
pub mod generate;
pub mod health;
pub mod models;
pub mod output;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::ConnectorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Scribelink - local LLM connector for veterinary note generation
#[derive(Parser, Debug)]
#[command(
    name = "scribelink",
    version,
    about = "Resilient connector for same-network LLM inference servers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find a working inference server
    Discover(DiscoverArgs),
    /// Probe known endpoints and show their status
    Health(HealthArgs),
    /// List models available on an endpoint
    Models(ModelsArgs),
    /// Generate a structured note from a transcript
    Generate(GenerateArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scribelink.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Override the batch concurrency cap
    #[arg(long, env = "SCRIBELINK_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Skip the quick path and sweep the full catalog
    #[arg(long)]
    pub no_quick: bool,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scribelink.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scribelink.toml")]
    pub config: PathBuf,

    /// Endpoint to query (defaults to the most recent known endpoint)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Transcript file to read ("-" or omitted reads stdin)
    pub transcript: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "scribelink.toml")]
    pub config: PathBuf,

    /// Model to use (defaults to configured/discovered model)
    #[arg(short, long, env = "SCRIBELINK_MODEL")]
    pub model: Option<String>,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Visit type fed into the note template (e.g. "dental checkup")
    #[arg(long)]
    pub visit_type: Option<String>,

    /// Output the full response as JSON instead of just the note text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "scribelink.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration for a CLI run: the file if it exists, defaults
/// otherwise, then environment overrides on top.
pub fn load_config(path: &Path) -> ConnectorConfig {
    let config = match ConnectorConfig::load(Some(path)) {
        Ok(config) => config,
        Err(crate::config::ConfigError::NotFound(_)) => ConnectorConfig::default(),
        Err(e) => {
            eprintln!("Warning: failed to load config: {}", e);
            ConnectorConfig::default()
        }
    };
    config.with_env_overrides()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_discover_defaults() {
        let cli = Cli::try_parse_from(["scribelink", "discover"]).unwrap();
        match cli.command {
            Commands::Discover(args) => {
                assert_eq!(args.config, PathBuf::from("scribelink.toml"));
                assert!(!args.json);
                assert!(!args.no_quick);
                assert!(args.max_concurrent.is_none());
            }
            _ => panic!("Expected Discover command"),
        }
    }

    #[test]
    fn test_cli_parse_discover_with_concurrency() {
        let cli =
            Cli::try_parse_from(["scribelink", "discover", "--max-concurrent", "3"]).unwrap();
        match cli.command {
            Commands::Discover(args) => assert_eq!(args.max_concurrent, Some(3)),
            _ => panic!("Expected Discover command"),
        }
    }

    #[test]
    fn test_cli_parse_health_json() {
        let cli = Cli::try_parse_from(["scribelink", "health", "--json"]).unwrap();
        match cli.command {
            Commands::Health(args) => assert!(args.json),
            _ => panic!("Expected Health command"),
        }
    }

    #[test]
    fn test_cli_parse_generate_with_options() {
        let cli = Cli::try_parse_from([
            "scribelink",
            "generate",
            "visit.txt",
            "--model",
            "llama3.2:1b",
            "--max-tokens",
            "512",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.transcript, Some(PathBuf::from("visit.txt")));
                assert_eq!(args.model.as_deref(), Some("llama3.2:1b"));
                assert_eq!(args.max_tokens, Some(512));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["scribelink", "config", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init(_))
        ));
    }

    #[test]
    fn test_cli_parse_models_with_endpoint() {
        let cli = Cli::try_parse_from([
            "scribelink",
            "models",
            "--endpoint",
            "http://127.0.0.1:11434",
        ])
        .unwrap();
        match cli.command {
            Commands::Models(args) => {
                assert_eq!(args.endpoint.as_deref(), Some("http://127.0.0.1:11434"));
            }
            _ => panic!("Expected Models command"),
        }
    }
}
