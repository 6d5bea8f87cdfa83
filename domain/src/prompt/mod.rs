//! Prompt domain
//!
//! Templates for the chat, market commentary and risk report prompts.

mod template;

pub use template::PromptTemplate;
