//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: a model tag served by the local LLM server
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
