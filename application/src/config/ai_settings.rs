//! AI settings, i.e. what the analyst features need to reach the model server.
//!
//! [`AiSettings`] is resolved by the infrastructure config loader (files,
//! environment, CLI flags) and handed to the use cases. The `enabled` flag is
//! checked by every consumer before the streaming core is invoked.

use riskwatch_domain::{DomainError, Model};
use std::time::Duration;

/// Default address of a local Ollama server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:11434";

/// Connection and model settings for the AI analyst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    /// Base URL of the model server, without the `/api/...` path.
    pub server_url: String,
    /// Model used for every request.
    pub model: Model,
    /// Master switch for all AI features.
    pub enabled: bool,
    /// Maximum wait for the connection and for each chunk of the reply.
    pub timeout: Option<Duration>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            model: Model::default(),
            enabled: true,
            timeout: None,
        }
    }
}

impl AiSettings {
    // ==================== Builder Methods ====================

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Server URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.server_url.trim().trim_end_matches('/')
    }

    /// Check that the streaming core may be called with these settings.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.enabled {
            return Err(DomainError::AiDisabled);
        }
        if self.base_url().is_empty() {
            return Err(DomainError::EmptyServerUrl);
        }
        Ok(())
    }
}
