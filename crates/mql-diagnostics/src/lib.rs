//! MQL diagnostics and error handling
//!
//! This crate provides the error handling infrastructure for the MQL engine,
//! including error codes, source locations, and the shared error type.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for MQL operations
pub type Result<T> = std::result::Result<T, MqlError>;
