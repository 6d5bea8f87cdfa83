//! Application-level configuration.
//!
//! - [`AiSettings`]: model server address, model, enable flag and timeout

pub mod ai_settings;

pub use ai_settings::{AiSettings, DEFAULT_SERVER_URL};
