//! Error types for the Ollama adapter

use riskwatch_application::ports::chat_transport::TransportError;
use thiserror::Error;

/// Result type alias for Ollama operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Errors that can occur when talking to the Ollama HTTP API
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    ParseError { error: String, raw: String },
}

impl OllamaError {
    /// Build a status error from a non-success response.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        OllamaError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        }
    }
}

impl From<OllamaError> for TransportError {
    fn from(err: OllamaError) -> Self {
        match err {
            OllamaError::Http(e) if e.is_timeout() => TransportError::Timeout,
            OllamaError::Http(e) if e.is_connect() => TransportError::Connection(e.to_string()),
            OllamaError::Http(e) if e.is_body() || e.is_decode() => {
                TransportError::Read(e.to_string())
            }
            OllamaError::Http(e) => TransportError::Connection(e.to_string()),
            OllamaError::Status { status, body } => TransportError::Status { status, body },
            OllamaError::ParseError { error, .. } => TransportError::InvalidResponse(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_transport_status() {
        let err = OllamaError::from_status(
            reqwest::StatusCode::NOT_FOUND,
            "{\"error\":\"model 'foo' not found\"}\n",
        );
        assert_eq!(
            TransportError::from(err),
            TransportError::Status {
                status: 404,
                body: "{\"error\":\"model 'foo' not found\"}".to_string()
            }
        );
    }

    #[test]
    fn test_parse_error_maps_to_invalid_response() {
        let err = OllamaError::ParseError {
            error: "expected value".to_string(),
            raw: "<html>".to_string(),
        };
        assert_eq!(
            TransportError::from(err),
            TransportError::InvalidResponse("expected value".to_string())
        );
    }
}
