//! Protocol frames of the streaming chat endpoint.
//!
//! Each line of the response body is one JSON object:
//!
//! ```text
//! {"model":"gemma3:12b","message":{"role":"assistant","content":"Risk "},"done":false}
//! {"model":"gemma3:12b","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}
//! ```
//!
//! Only `message.content` and `done` drive the stream; the remaining fields are
//! optional and captured for diagnostics.

use crate::core::string::truncate;
use serde::Deserialize;
use thiserror::Error;

/// Longest excerpt of a rejected line kept in a [`FrameParseError`].
const EXCERPT_LEN: usize = 120;

/// One decoded line of the response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProtocolFrame {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub message: Option<FrameMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// In-band error reported by the server while streaming.
    #[serde(default)]
    pub error: Option<String>,
}

/// The `message` object of a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ProtocolFrame {
    /// Parse one line into a frame.
    pub fn parse(line: &str) -> Result<Self, FrameParseError> {
        serde_json::from_str(line).map_err(|e| FrameParseError::Malformed {
            reason: e.to_string(),
            excerpt: truncate(line, EXCERPT_LEN),
        })
    }

    /// The content token carried by this frame, if `message.content` is present.
    pub fn content(&self) -> Option<&str> {
        self.message.as_ref()?.content.as_deref()
    }

    /// Whether this is the terminal frame.
    pub fn is_terminal(&self) -> bool {
        self.done
    }
}

/// A line that could not be parsed as a frame.
///
/// Recovered locally by skipping the line; never fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameParseError {
    #[error("Malformed frame ({reason}): {excerpt}")]
    Malformed { reason: String, excerpt: String },
}
