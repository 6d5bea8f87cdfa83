//! Conversation domain.
//!
//! - [`entities::Message`]: one turn (`system`, `user` or `assistant`)
//! - [`entities::ConversationHistory`]: ordered turns sent verbatim on each call

pub mod entities;
