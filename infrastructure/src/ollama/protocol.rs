//! Ollama HTTP API payloads
//!
//! Only the request side of `/api/chat` lives here; response frames are
//! decoded by the domain stream session.

use riskwatch_domain::ConversationHistory;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: &'a ConversationHistory,
    pub stream: bool,
}

impl<'a> ChatRequestBody<'a> {
    /// Streaming request for the given model and history.
    pub fn streaming(model: &'a str, messages: &'a ConversationHistory) -> Self {
        Self {
            model,
            messages,
            stream: true,
        }
    }
}

/// Response of `GET /api/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

/// One installed model in a [`TagsResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct TagModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
}
