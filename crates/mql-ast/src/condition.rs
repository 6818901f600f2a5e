//! Condition AST nodes

use crate::{ComparisonOp, Query};
use serde::{Deserialize, Serialize};

/// A raw comparison value, as written in the query text
///
/// Literals stay uninterpreted until bind time: `NULL`, `TODAY` and
/// `CURRENT USER` are ordinary `Literal` values here and become sentinels
/// only when the binder resolves them against the property's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryValue {
    /// Bare or quoted literal text (multi-word bare literals arrive
    /// space-joined from the parser)
    Literal(String),
    /// Parenthesized project-variable reference: `(variable name)`
    Variable(String),
    /// `THIS CARD` self-reference
    ThisCard,
    /// `THIS CARD.property` — the named property of the context card
    ThisCardProperty(String),
    /// `NUMBER n` — a card referenced by number
    CardNumber(u64),
}

impl QueryValue {
    /// The literal text, when this value is a plain literal
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// A single `property op value` comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Property name as written (case preserved)
    pub property: String,
    /// Comparison operator
    pub op: ComparisonOp,
    /// Raw right-hand side
    pub value: QueryValue,
}

impl Comparison {
    /// Create a comparison node
    pub fn new(property: impl Into<String>, op: ComparisonOp, value: QueryValue) -> Self {
        Self {
            property: property.into(),
            op,
            value,
        }
    }
}

/// A condition tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `property op value`
    Comparison(Comparison),
    /// `a AND b AND ...`
    And(Vec<Condition>),
    /// `a OR b OR ...`
    Or(Vec<Condition>),
    /// `NOT (cond)`
    Not(Box<Condition>),
    /// `property IN (v1, v2, ...)` — `NUMBER IN (...)` parses as
    /// membership on the built-in `Number` property
    In {
        property: String,
        values: Vec<QueryValue>,
    },
    /// `property IN (SELECT ...)` nested query
    InQuery {
        property: String,
        query: Box<Query>,
    },
    /// `TAGGED WITH 'tag'`
    TaggedWith(String),
}

impl Condition {
    /// Build a comparison condition
    pub fn compare(property: impl Into<String>, op: ComparisonOp, value: QueryValue) -> Self {
        Self::Comparison(Comparison::new(property, op, value))
    }

    /// Build a conjunction, flattening nested `And` children
    pub fn and(conditions: Vec<Condition>) -> Self {
        let mut flat = Vec::with_capacity(conditions.len());
        for cond in conditions {
            match cond {
                Condition::And(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap()
        } else {
            Self::And(flat)
        }
    }

    /// Build a disjunction, flattening nested `Or` children
    pub fn or(conditions: Vec<Condition>) -> Self {
        let mut flat = Vec::with_capacity(conditions.len());
        for cond in conditions {
            match cond {
                Condition::Or(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap()
        } else {
            Self::Or(flat)
        }
    }

    /// Negate this condition
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}
