//! MQL error codes following a structured numbering system
//!
//! Error code ranges:
//! - MQL0001-MQL0099: Parse errors (syntax)
//! - MQL0100-MQL0199: Bind errors (resolution against the project schema)
//! - MQL0200-MQL0299: Evaluation errors (runtime)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Short description of the error class
    pub const fn description(&self) -> &'static str {
        match self.0 {
            1 => "syntax error",
            2 => "unexpected end of input",
            3 => "unterminated string literal",
            100 => "unknown property",
            101 => "unsupported syntax in this context",
            102 => "value violates a restricted property",
            103 => "missing binding context",
            104 => "unknown team member",
            105 => "unknown card",
            106 => "ambiguous card name",
            107 => "unknown or inapplicable project variable",
            108 => "unknown tree",
            109 => "unparseable date",
            110 => "unparseable number",
            111 => "invalid comparison against NULL",
            200 => "card repository failure",
            201 => "internal invariant violation",
            _ => "unknown error",
        }
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a bind error (0100-0199)
    pub const fn is_bind_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MQL{:04}", self.0)
    }
}

/// Syntax error
pub const MQL0001: ErrorCode = ErrorCode::new(1);
/// Unexpected end of input
pub const MQL0002: ErrorCode = ErrorCode::new(2);
/// Unterminated string literal
pub const MQL0003: ErrorCode = ErrorCode::new(3);
/// Unknown property
pub const MQL0100: ErrorCode = ErrorCode::new(100);
/// Unsupported syntax in this context (e.g. SELECT inside a filter)
pub const MQL0101: ErrorCode = ErrorCode::new(101);
/// Literal violates a locked enumerated property's value set
pub const MQL0102: ErrorCode = ErrorCode::new(102);
/// THIS CARD / CURRENT USER reference without a supplied context
pub const MQL0103: ErrorCode = ErrorCode::new(103);
/// Unknown team member login
pub const MQL0104: ErrorCode = ErrorCode::new(104);
/// Card reference that resolves to no card
pub const MQL0105: ErrorCode = ErrorCode::new(105);
/// Card name shared by more than one card
pub const MQL0106: ErrorCode = ErrorCode::new(106);
/// Unknown project variable, or one not applicable to the property
pub const MQL0107: ErrorCode = ErrorCode::new(107);
/// Unknown tree name
pub const MQL0108: ErrorCode = ErrorCode::new(108);
/// Date literal that matches no accepted format
pub const MQL0109: ErrorCode = ErrorCode::new(109);
/// Numeric literal that does not parse
pub const MQL0110: ErrorCode = ErrorCode::new(110);
/// Ordering comparison against NULL
pub const MQL0111: ErrorCode = ErrorCode::new(111);
/// Card repository failure, propagated unchanged
pub const MQL0200: ErrorCode = ErrorCode::new(200);
/// Internal invariant violation
pub const MQL0201: ErrorCode = ErrorCode::new(201);
