//! Dashboard inputs consumed by the prompt builders.

pub mod snapshot;
