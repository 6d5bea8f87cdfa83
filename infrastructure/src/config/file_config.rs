//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file:
//!
//! ```toml
//! [ai]
//! server_url = "http://localhost:11434"
//! model = "gemma3:12b"
//! enabled = true
//! timeout_seconds = 120
//!
//! [repl]
//! show_progress = true
//! history_file = "~/.local/share/riskwatch/history.txt"
//!
//! [logging]
//! transcript = "riskwatch.conversation.jsonl"
//! ```

use riskwatch_application::{AiSettings, DEFAULT_SERVER_URL};
use riskwatch_domain::{DEFAULT_MODEL, Model};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("ai.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("ai.model cannot be empty")]
    EmptyModelName,

    #[error("ai.server_url cannot be empty")]
    EmptyServerUrl,
}

/// Raw AI configuration from TOML (`[ai]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAiConfig {
    /// Base URL of the Ollama server
    pub server_url: String,
    /// Model name
    pub model: String,
    /// Master switch for all AI features
    pub enabled: bool,
    /// Limit for the connection and for each chunk read
    pub timeout_seconds: Option<u64>,
}

impl Default for FileAiConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            enabled: true,
            timeout_seconds: None,
        }
    }
}

/// Raw REPL configuration from TOML (`[repl]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show a spinner while waiting for the first token
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

/// Raw logging configuration from TOML (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of chat requests and replies; disabled when unset
    pub transcript: Option<String>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub ai: FileAiConfig,
    pub repl: FileReplConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.ai.timeout_seconds == Some(0) {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.ai.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.ai.server_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyServerUrl);
        }
        Ok(())
    }

    /// Convert the `[ai]` section into application settings.
    pub fn ai_settings(&self) -> Result<AiSettings, ConfigValidationError> {
        self.validate()?;
        let model =
            Model::new(self.ai.model.trim()).map_err(|_| ConfigValidationError::EmptyModelName)?;
        Ok(AiSettings::default()
            .with_server_url(self.ai.server_url.trim())
            .with_model(model)
            .with_enabled(self.ai.enabled)
            .with_timeout(self.ai.timeout_seconds.map(Duration::from_secs)))
    }
}
