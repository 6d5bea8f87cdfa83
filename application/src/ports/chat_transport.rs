//! Chat transport port
//!
//! Defines the interface for reaching the model server. Implementations
//! (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use riskwatch_domain::{ConversationHistory, Model};
use thiserror::Error;

/// Raw response body of a streaming chat request, chunked as it arrives.
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Errors that can occur while talking to the model server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream read error: {0}")]
    Read(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether the model server answered, but with a non-success status.
    pub fn is_status(&self) -> bool {
        matches!(self, TransportError::Status { .. })
    }
}

/// One streaming chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Base URL of the model server.
    pub server_url: String,
    pub model: Model,
    /// Full history, sent verbatim.
    pub messages: ConversationHistory,
}

/// A model advertised by the model server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub modified_at: Option<String>,
}

/// Connection to the model server
///
/// `open_chat` makes exactly one attempt; retries are the caller's decision.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a streaming chat request and return the response body stream.
    ///
    /// Fails on connection errors and non-success HTTP statuses.
    async fn open_chat(&self, request: &ChatRequest) -> Result<ByteStream, TransportError>;

    /// List the models installed on the server.
    async fn list_models(&self, server_url: &str) -> Result<Vec<ModelInfo>, TransportError>;

    /// Whether the server answers the model listing with a success status.
    async fn check_connection(&self, server_url: &str) -> bool;
}
