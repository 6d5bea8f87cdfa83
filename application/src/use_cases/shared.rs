//! Shared types for the analyst use cases.
//!
//! Every consumer of the streaming core maps a failed session to one of the
//! fixed fallback messages below instead of surfacing the error.

use super::stream_chat::StreamChatError;

/// Shown instead of market commentary when generation fails.
pub const COMMENTARY_FALLBACK: &str = "AI Analysis unavailable (Local LLM offline)";

/// Shown when the model returns an empty commentary.
pub const COMMENTARY_EMPTY: &str = "Market stable. No major anomalies detected.";

/// Shown instead of a protocol risk report when generation fails.
pub const REPORT_FALLBACK: &str = "Could not connect to AI Analyst.";

/// Appended to the chat transcript when a reply fails.
pub const CHAT_FALLBACK: &str = "⚠️ Connection error. Is Ollama running?";

/// Result of a one-off analyst request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalystOutcome {
    /// The model produced the text.
    Generated(String),
    /// The session failed; `text` is the fallback to display.
    Fallback {
        text: String,
        error: StreamChatError,
    },
    /// AI features are switched off; nothing was requested.
    Disabled,
}

impl AnalystOutcome {
    pub(crate) fn fallback(text: &str, error: StreamChatError) -> Self {
        AnalystOutcome::Fallback {
            text: text.to_string(),
            error,
        }
    }

    /// Text to display, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalystOutcome::Generated(text) | AnalystOutcome::Fallback { text, .. } => Some(text),
            AnalystOutcome::Disabled => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, AnalystOutcome::Generated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text() {
        assert_eq!(
            AnalystOutcome::Generated("ok".to_string()).text(),
            Some("ok")
        );
        let fallback = AnalystOutcome::fallback(REPORT_FALLBACK, StreamChatError::Cancelled);
        assert_eq!(fallback.text(), Some("Could not connect to AI Analyst."));
        assert!(!fallback.is_generated());
        assert_eq!(AnalystOutcome::Disabled.text(), None);
    }
}
