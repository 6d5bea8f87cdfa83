//! Domain layer for riskwatch
//!
//! This crate contains the core types and algorithms of the local-LLM analyst.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! An ordered [`ConversationHistory`] of [`Message`] turns. The model server
//! keeps no state, so the whole history is sent on every call.
//!
//! ## Stream session
//!
//! A streamed reply arrives as newline-delimited JSON in arbitrary byte chunks.
//! [`LineDecoder`] reframes the bytes into lines, [`MessageAssembler`] turns
//! lines into content tokens, and [`StreamSession`] tracks the lifecycle of
//! one exchange.

pub mod conversation;
pub mod core;
pub mod dashboard;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use conversation::entities::{ConversationHistory, Message, Role};
pub use self::core::{
    error::DomainError,
    model::{DEFAULT_MODEL, Model},
};
pub use dashboard::snapshot::{
    AuditStatus, MarketSnapshot, ProtocolDetails, ProtocolMetrics, ProtocolSummary, TvlPoint,
};
pub use prompt::PromptTemplate;
pub use session::{
    assembler::{Completion, CompletionStats, LineOutcome, MessageAssembler},
    decoder::LineDecoder,
    frame::{FrameMessage, FrameParseError, ProtocolFrame},
    state::{ChunkOutcome, SessionState, StreamSession},
    stream::StreamEvent,
};
