//! Configuration file loading for riskwatch
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `RISKWATCH_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./riskwatch.toml` or `./.riskwatch.toml`
//! 4. Global: `$XDG_CONFIG_HOME/riskwatch/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAiConfig, FileConfig, FileLoggingConfig, FileReplConfig,
};
pub use loader::ConfigLoader;
