//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat_conversation;
pub mod market_commentary;
pub mod risk_report;
pub mod shared;
pub mod stream_chat;
