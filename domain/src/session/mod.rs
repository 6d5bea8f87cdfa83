//! Chat streaming session domain.
//!
//! - [`decoder::LineDecoder`]: byte chunks to complete lines
//! - [`frame::ProtocolFrame`]: one JSON frame per line
//! - [`assembler::MessageAssembler`]: frames to accumulated text
//! - [`state::StreamSession`]: per-exchange state machine
//! - [`stream::StreamEvent`]: events delivered to streaming consumers

pub mod assembler;
pub mod decoder;
pub mod frame;
pub mod state;
pub mod stream;
