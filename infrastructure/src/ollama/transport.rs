//! HTTP transport to a local Ollama server

use super::error::OllamaError;
use super::protocol::{ChatRequestBody, TagsResponse};
use async_trait::async_trait;
use futures::StreamExt;
use riskwatch_application::ports::chat_transport::{
    ByteStream, ChatRequest, ChatTransport, ModelInfo, TransportError,
};
use std::time::Duration;
use tracing::{debug, info};

/// ChatTransport implementation backed by `reqwest`.
///
/// One `POST /api/chat` per session, no retries. The response body is handed
/// over chunk by chunk exactly as it arrives.
#[derive(Clone)]
pub struct OllamaTransport {
    client: reqwest::Client,
}

impl Default for OllamaTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport that gives up connecting after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, OllamaError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Create a transport with an existing HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn chat_url(server_url: &str) -> String {
        format!("{}/api/chat", server_url.trim_end_matches('/'))
    }

    fn tags_url(server_url: &str) -> String {
        format!("{}/api/tags", server_url.trim_end_matches('/'))
    }

    async fn post_chat(&self, request: &ChatRequest) -> Result<reqwest::Response, OllamaError> {
        let url = Self::chat_url(&request.server_url);
        let body = ChatRequestBody::streaming(request.model.as_str(), &request.messages);
        debug!("POST {} (model {})", url, request.model);

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::from_status(status, &text));
        }
        Ok(response)
    }

    async fn fetch_tags(&self, server_url: &str) -> Result<TagsResponse, OllamaError> {
        let url = Self::tags_url(server_url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(OllamaError::from_status(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| OllamaError::ParseError {
            error: e.to_string(),
            raw: text,
        })
    }
}

#[async_trait]
impl ChatTransport for OllamaTransport {
    async fn open_chat(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        let response = self.post_chat(request).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Read(e.to_string())))
            .boxed())
    }

    async fn list_models(&self, server_url: &str) -> Result<Vec<ModelInfo>, TransportError> {
        let tags = self.fetch_tags(server_url).await?;
        info!("Ollama at {} has {} models", server_url, tags.models.len());
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                name: m.name,
                size: m.size,
                modified_at: m.modified_at,
            })
            .collect())
    }

    async fn check_connection(&self, server_url: &str) -> bool {
        match self.client.get(Self::tags_url(server_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Ollama at {} unreachable: {}", server_url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            OllamaTransport::chat_url("http://localhost:11434/"),
            "http://localhost:11434/api/chat"
        );
        assert_eq!(
            OllamaTransport::tags_url("http://gpu-box:11434"),
            "http://gpu-box:11434/api/tags"
        );
    }
}
