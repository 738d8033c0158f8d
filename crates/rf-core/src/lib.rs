//! rf-core: shared types, errors, and configuration.
//!
//! This crate is the foundational dependency for all other rf-* crates,
//! providing a unified error type with exit-code mapping, media-domain enums,
//! and application configuration.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
