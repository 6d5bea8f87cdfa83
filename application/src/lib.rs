//! Application layer for riskwatch
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AiSettings, DEFAULT_SERVER_URL};
pub use ports::{
    chat_transport::{ByteStream, ChatRequest, ChatTransport, ModelInfo, TransportError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
};
pub use use_cases::chat_conversation::{ChatConversation, ChatTurnOutcome, TranscriptEntry};
pub use use_cases::market_commentary::MarketCommentaryUseCase;
pub use use_cases::risk_report::RiskReportUseCase;
pub use use_cases::shared::{
    AnalystOutcome, CHAT_FALLBACK, COMMENTARY_EMPTY, COMMENTARY_FALLBACK, REPORT_FALLBACK,
};
pub use use_cases::stream_chat::{
    ChatStreamEvent, StreamChatError, StreamChatInput, StreamChatUseCase, StreamHandle,
};
