//! Interactive chat module
//!
//! Provides a readline-based interactive chat with the DeFi analyst.

mod repl;

pub use repl::ChatRepl;
