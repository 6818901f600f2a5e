//! MQL parser using winnow
//!
//! Recursive descent over a plain `&str` with explicit checkpoint/restore
//! backtracking. Malformed input returns a typed [`MqlError`], never a
//! panic, and callers can probe parseability with [`is_valid_filter`].

mod combinators;
mod condition;
mod query;

use combinators::{Input, at_end};
use mql_ast::Query;
use mql_diagnostics::{MQL0001, MQL0002, MQL0003, MqlError, Result, SourceLocation, Span};

/// Parse a full query (SELECT / FROM TREE / WHERE / GROUP BY / ORDER BY /
/// AS OF, every clause optional; a clause-less string parses as a bare
/// condition)
pub fn parse_query(text: &str) -> Result<Query> {
    if text.trim().is_empty() {
        return Err(MqlError::parse(MQL0002, "empty query", text));
    }
    let mut input: Input<'_> = text;
    match query::query(&mut input) {
        Ok(parsed) => {
            if !at_end(&input) {
                return Err(MqlError::parse_at(
                    MQL0001,
                    format!("unexpected input near '{}'", snippet(input)),
                    text,
                    location_of(text, input),
                ));
            }
            if parsed == Query::default() {
                return Err(syntax_error(text));
            }
            Ok(parsed)
        }
        Err(_) => Err(syntax_error(text)),
    }
}

/// Parse a filter expression: any syntactically valid query whose clauses
/// are limited to FROM TREE and a condition. SELECT, GROUP BY, ORDER BY
/// and AS OF are grammatical but unsupported here; the error names the
/// offending clause.
pub fn parse_filter(text: &str) -> Result<Query> {
    let parsed = parse_query(text)?;
    if let Some(clause) = parsed.offending_filter_clause() {
        return Err(MqlError::bind(
            mql_diagnostics::MQL0101,
            format!("{clause} is not supported in a filter"),
        ));
    }
    Ok(parsed)
}

/// Probe whether a string is a parseable filter, without raising
pub fn is_valid_filter(text: &str) -> bool {
    parse_filter(text).is_ok()
}

fn syntax_error(text: &str) -> MqlError {
    // An odd number of quote characters means a string never closed
    let single = text.matches('\'').count();
    let double = text.matches('"').count();
    if single % 2 == 1 || double % 2 == 1 {
        return MqlError::parse(MQL0003, "unterminated string literal", text);
    }
    MqlError::parse(MQL0001, format!("could not parse '{}'", snippet(text)), text)
}

/// Line/column of the unconsumed remainder within the original text
fn location_of(text: &str, remainder: &str) -> SourceLocation {
    let consumed = text.len() - remainder.trim_start().len();
    SourceLocation::from_span(Span::point(consumed), text)
}

fn snippet(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.char_indices().nth(40) {
        Some((offset, _)) => &trimmed[..offset],
        None => trimmed,
    }
}
