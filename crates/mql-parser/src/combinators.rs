//! Lexical layer for the MQL parser
//!
//! Token-level building blocks over a plain `&str` input: whitespace,
//! case-insensitive keywords, bare words, quoted strings and integers.
//! Bare-word runs join with single spaces, which is how multi-word
//! identifiers and values reach the AST without quoting.

use winnow::ModalResult;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Parser input: a shrinking string slice
pub type Input<'a> = &'a str;

/// Parser result with backtracking support
pub type PResult<T> = ModalResult<T>;

/// A recoverable parse failure at the current position
pub fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

/// An unrecoverable parse failure (stops sibling alternatives)
pub fn cut() -> ErrMode<ContextError> {
    ErrMode::Cut(ContextError::new())
}

/// Promote a backtrack to a cut once a construct is committed
pub(crate) fn commit(err: ErrMode<ContextError>) -> ErrMode<ContextError> {
    match err {
        ErrMode::Backtrack(e) => ErrMode::Cut(e),
        other => other,
    }
}

/// Characters allowed in a bare (unquoted) word
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '/' | '-' | '#' | '@')
}

/// Consume any leading whitespace
pub fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Consume one bare word, skipping leading whitespace
pub fn word<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    ws(input)?;
    take_while(1.., is_word_char).parse_next(input)
}

/// Consume a specific keyword (case-insensitive, whole word)
pub fn keyword(input: &mut Input<'_>, kw: &str) -> PResult<()> {
    let checkpoint = *input;
    match word(input) {
        Ok(w) if w.eq_ignore_ascii_case(kw) => Ok(()),
        _ => {
            *input = checkpoint;
            Err(backtrack())
        }
    }
}

/// Consume a punctuation symbol, skipping leading whitespace
pub fn symbol(input: &mut Input<'_>, sym: &str) -> PResult<()> {
    ws(input)?;
    match input.strip_prefix(sym) {
        Some(rest) => {
            *input = rest;
            Ok(())
        }
        None => Err(backtrack()),
    }
}

/// Peek whether the next token is the given symbol
pub fn peek_symbol(input: &Input<'_>, sym: &str) -> bool {
    input.trim_start().starts_with(sym)
}

/// Consume a quoted string (single or double quotes, doubled-quote escape)
///
/// A missing closing quote is a cut: the input cannot mean anything else.
pub fn quoted_string(input: &mut Input<'_>) -> PResult<String> {
    ws(input)?;
    let quote = match input.chars().next() {
        Some(c @ ('\'' | '"')) => c,
        _ => return Err(backtrack()),
    };
    let mut rest = &input[1..];
    let mut text = String::new();
    loop {
        match rest.find(quote) {
            Some(pos) => {
                text.push_str(&rest[..pos]);
                rest = &rest[pos + 1..];
                if rest.starts_with(quote) {
                    // Doubled quote: literal quote character
                    text.push(quote);
                    rest = &rest[1..];
                } else {
                    *input = rest;
                    return Ok(text);
                }
            }
            None => return Err(cut()),
        }
    }
}

/// Consume an unsigned integer word
pub fn integer(input: &mut Input<'_>) -> PResult<u64> {
    let checkpoint = *input;
    let w = word(input)?;
    match w.parse::<u64>() {
        Ok(n) => Ok(n),
        Err(_) => {
            *input = checkpoint;
            Err(backtrack())
        }
    }
}

/// Consume consecutive bare words (none of which is in the stop set) and
/// join them with single spaces
pub fn joined_words(input: &mut Input<'_>, stop_words: &[&str]) -> PResult<String> {
    let mut words: Vec<&str> = Vec::new();
    loop {
        let checkpoint = *input;
        match word(input) {
            Ok(w) if !stop_words.iter().any(|s| w.eq_ignore_ascii_case(s)) => words.push(w),
            _ => {
                *input = checkpoint;
                break;
            }
        }
    }
    if words.is_empty() {
        Err(backtrack())
    } else {
        Ok(words.join(" "))
    }
}

/// Whether only whitespace remains
pub fn at_end(input: &Input<'_>) -> bool {
    input.trim_start().is_empty()
}
