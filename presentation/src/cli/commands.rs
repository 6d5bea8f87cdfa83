//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for one-shot results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for riskwatch
#[derive(Parser, Debug)]
#[command(name = "riskwatch")]
#[command(author, version, about = "Local-LLM analyst for a DeFi risk dashboard")]
#[command(long_about = r#"
riskwatch talks to a local Ollama server to explain DeFi dashboard data.
Replies are streamed token by token as the model writes them.

Configuration files are loaded from (in priority order):
1. RISKWATCH_* environment variables (e.g. RISKWATCH_AI__MODEL)
2. --config <path>     Explicit config file
3. ./riskwatch.toml    Project-level config
4. ~/.config/riskwatch/config.toml   Global config

Example:
  riskwatch ping
  riskwatch ask "What is impermanent loss?"
  riskwatch chat --context dashboard.json
  riskwatch report --snapshot aave.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ollama server URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub server_url: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Turn off all AI features
    #[arg(long, global = true)]
    pub disable_ai: bool,

    /// Give up when the server is silent for this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and the resolved settings
    #[arg(long, global = true)]
    pub show_config: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat with the DeFi analyst
    Chat {
        /// JSON file with dashboard data to ground the answers
        #[arg(long, value_name = "FILE")]
        context: Option<PathBuf>,
    },

    /// Ask a single question and stream the answer
    Ask {
        /// The question
        prompt: String,

        /// System prompt (defaults to a generic DeFi assistant)
        #[arg(long, value_name = "TEXT")]
        system: Option<String>,
    },

    /// One-sentence commentary on a market snapshot
    Commentary {
        /// JSON file with the market snapshot
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Risk report for one protocol
    Report {
        /// JSON file with the protocol details
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List the models installed on the server
    Models {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Check that the server is reachable
    Ping,
}
