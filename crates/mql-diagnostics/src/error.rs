//! MQL error types

use crate::{ErrorCode, SourceLocation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main MQL error type
///
/// Malformed input surfaces as a `Parse` or `Bind` value, never a panic.
/// `Evaluation` wraps failures of the backing card repository and internal
/// invariant violations.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum MqlError {
    /// Parse error (grammar mismatch, no partial AST)
    #[error("{code}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        /// The query text that failed to parse
        expression: String,
        location: Option<SourceLocation>,
    },

    /// Bind error (resolution against the project schema failed)
    #[error("{code}: {message}")]
    Bind {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Evaluation error
    #[error("{code}: {message}")]
    Evaluation {
        code: ErrorCode,
        message: String,
    },
}

impl MqlError {
    /// Create a parse error
    pub fn parse(code: ErrorCode, message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            expression: expression.into(),
            location: None,
        }
    }

    /// Create a parse error with a source location
    pub fn parse_at(
        code: ErrorCode,
        message: impl Into<String>,
        expression: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            expression: expression.into(),
            location: Some(location),
        }
    }

    /// Create a bind error
    pub fn bind(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Bind {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Evaluation {
            code,
            message: message.into(),
        }
    }

    /// Attach context to a bind error, leaving other kinds unchanged
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        if let Self::Bind { context, .. } = &mut self {
            *context = Some(ctx.into());
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. } | Self::Bind { code, .. } | Self::Evaluation { code, .. } => {
                *code
            }
        }
    }

    /// Get the human-readable message
    pub fn message(&self) -> &str {
        match self {
            Self::Parse { message, .. }
            | Self::Bind { message, .. }
            | Self::Evaluation { message, .. } => message,
        }
    }

    /// Whether this error is recoverable (parse and bind errors are;
    /// internal invariant violations are not)
    pub fn is_recoverable(&self) -> bool {
        self.code() != crate::MQL0201
    }
}
