//! Ollama adapter
//!
//! Implements ChatTransport for a local Ollama server over HTTP.

pub mod error;
pub mod protocol;
pub mod transport;
