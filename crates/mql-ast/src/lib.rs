//! MQL abstract syntax tree
//!
//! A closed sum type per condition/combinator, built fresh per parse call
//! and immutable afterwards. Comparison values stay raw (`QueryValue`)
//! until the semantic binder resolves them against a project schema; the
//! parser never interprets NULL, TODAY or CURRENT USER.
//!
//! The canonical formatter lives here as `Display` impls: upper-case
//! keywords, preserved identifier/value case, quote-on-demand, and
//! explicit parenthesization when AND/OR are mixed.

mod condition;
mod format;
mod operator;
mod query;

pub use condition::*;
pub use format::{is_reserved_word, quote_if_needed};
pub use operator::*;
pub use query::*;
