//! Canonical MQL text formatting
//!
//! The canonical projection upper-cases keywords, preserves user-entered
//! case for identifiers and values, quotes anything that would not survive
//! re-lexing as a bare word, and writes explicit parentheses wherever AND
//! and OR mix. Formatting is idempotent: formatting canonical text again
//! is a no-op.

use crate::{Condition, Query, QueryValue, SortDirection};
use std::borrow::Cow;
use std::fmt;

/// Words with grammatical meaning; a bare identifier or value equal to one
/// of these must be quoted to survive re-parsing
// `number` stays bare: the NUMBER n value form needs a following integer,
// so a lone `number` always re-lexes as an ordinary word
const RESERVED_WORDS: &[&str] = &[
    "select", "where", "from", "tree", "group", "order", "by", "as", "of", "and", "or", "not",
    "in", "tagged", "with", "property", "this", "desc", "asc",
];

/// Check whether a word is reserved in the grammar (case-insensitive)
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| word.eq_ignore_ascii_case(reserved))
}

fn is_bare_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '/' | '-' | '#' | '@')
}

/// Quote a name or value when it would not re-lex as a single bare word:
/// empty strings, anything containing whitespace or punctuation, and
/// reserved words. Embedded single quotes double.
pub fn quote_if_needed(text: &str) -> Cow<'_, str> {
    let needs_quoting =
        text.is_empty() || !text.chars().all(is_bare_char) || is_reserved_word(text);
    if needs_quoting {
        Cow::Owned(format!("'{}'", text.replace('\'', "''")))
    } else {
        Cow::Borrowed(text)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{}", quote_if_needed(text)),
            Self::Variable(name) => write!(f, "({name})"),
            Self::ThisCard => write!(f, "THIS CARD"),
            Self::ThisCardProperty(property) => {
                write!(f, "THIS CARD.{}", quote_if_needed(property))
            }
            Self::CardNumber(number) => write!(f, "NUMBER {number}"),
        }
    }
}

/// Format a child operand, parenthesizing when its combinator differs from
/// the parent's (mixed AND/OR is always written explicitly)
fn fmt_operand(child: &Condition, parent_is_and: bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let needs_parens = match child {
        Condition::Or(_) => parent_is_and,
        Condition::And(_) => !parent_is_and,
        _ => false,
    };
    if needs_parens {
        write!(f, "({child})")
    } else {
        write!(f, "{child}")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(cmp) => {
                write!(f, "{} {} {}", quote_if_needed(&cmp.property), cmp.op, cmp.value)
            }
            Self::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    fmt_operand(child, true, f)?;
                }
                Ok(())
            }
            Self::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    fmt_operand(child, false, f)?;
                }
                Ok(())
            }
            Self::Not(child) => write!(f, "NOT ({child})"),
            Self::In { property, values } => {
                write!(f, "{} IN (", quote_if_needed(property))?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
            Self::InQuery { property, query } => {
                write!(f, "{} IN ({query})", quote_if_needed(property))
            }
            Self::TaggedWith(tag) => write!(f, "TAGGED WITH {}", quote_if_needed(tag)),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_clause = false;
        let mut separator = |f: &mut fmt::Formatter<'_>, wrote: &mut bool| -> fmt::Result {
            if *wrote {
                write!(f, " ")?;
            }
            *wrote = true;
            Ok(())
        };

        if !self.select.is_empty() {
            separator(f, &mut wrote_clause)?;
            write!(f, "SELECT ")?;
            for (i, column) in self.select.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", quote_if_needed(column))?;
            }
        }
        if let Some(tree) = &self.tree {
            separator(f, &mut wrote_clause)?;
            write!(f, "FROM TREE {}", quote_if_needed(tree))?;
        }
        if let Some(condition) = &self.condition {
            separator(f, &mut wrote_clause)?;
            // A bare filter prints without the WHERE keyword
            if self.tree.is_some() || !self.select.is_empty() {
                write!(f, "WHERE {condition}")?;
            } else {
                write!(f, "{condition}")?;
            }
        }
        if !self.group_by.is_empty() {
            separator(f, &mut wrote_clause)?;
            write!(f, "GROUP BY ")?;
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", quote_if_needed(column))?;
            }
        }
        if !self.order_by.is_empty() {
            separator(f, &mut wrote_clause)?;
            write!(f, "ORDER BY ")?;
            for (i, column) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", quote_if_needed(&column.property))?;
                if column.direction == SortDirection::Descending {
                    write!(f, " DESC")?;
                }
            }
        }
        if let Some(as_of) = &self.as_of {
            separator(f, &mut wrote_clause)?;
            write!(f, "AS OF {}", quote_if_needed(as_of))?;
        }
        Ok(())
    }
}
