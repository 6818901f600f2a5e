//! Compilation of bound filters into concrete predicates
//!
//! This is where symbolic values flatten: TODAY becomes the apply-time
//! date and CURRENT USER becomes the acting user's login. A bound filter
//! can be compiled many times against different [`ApplyContext`]s without
//! re-binding.

use crate::{BoundCondition, BoundFilter, BoundQuery, BoundValue};
use chrono::NaiveDate;
use mql_ast::ComparisonOp;
use mql_diagnostics::{MQL0103, MqlError, Result};
use rust_decimal::Decimal;

/// Apply-time context: the values symbolic sentinels flatten to
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    /// The date TODAY resolves to
    pub today: NaiveDate,
    /// The login CURRENT USER resolves to, when an acting user exists
    pub current_user: Option<&'a str>,
}

impl<'a> ApplyContext<'a> {
    /// Create a context fixed at a given date
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            current_user: None,
        }
    }

    /// Create a context at the local wall-clock date
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Supply the acting user's login
    pub fn with_current_user(mut self, login: &'a str) -> Self {
        self.current_user = Some(login);
        self
    }
}

/// A fully concrete comparison value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// NULL: matches unset property values
    Null,
    /// Text, compared case-insensitively
    Text(String),
    /// Number, compared within the project's epsilon
    Number(Decimal),
    /// Calendar date
    Date(NaiveDate),
    /// Card reference, by number
    CardNumber(u64),
}

/// A concrete predicate over card property values
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// All children hold
    And(Vec<Predicate>),
    /// Any child holds
    Or(Vec<Predicate>),
    /// Child does not hold
    Not(Box<Predicate>),
    /// `column op value`
    Compare {
        column: String,
        op: ComparisonOp,
        value: ScalarValue,
    },
    /// Column value is one of an explicit set. An empty set matches
    /// nothing; constant-false conditions lower to this shape.
    In {
        column: String,
        values: Vec<ScalarValue>,
    },
    /// Column value appears in the result column of a nested query
    Subquery {
        column: String,
        query: Box<CompiledQuery>,
    },
    /// The card carries a tag
    Tagged(String),
}

/// A compiled query: tree scope, optional result column, predicate
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Tree scope, canonical spelling
    pub tree: Option<String>,
    /// Result column for nested queries; `None` for plain filters
    pub column: Option<String>,
    /// Predicate, when the filter has a condition
    pub predicate: Option<Predicate>,
}

/// Flatten a bound filter into a concrete, matchable query
pub fn compile_filter(filter: &BoundFilter, apply: &ApplyContext<'_>) -> Result<CompiledQuery> {
    let predicate = filter
        .condition
        .as_ref()
        .map(|condition| compile_condition(condition, apply))
        .transpose()?;
    Ok(CompiledQuery {
        tree: filter.tree.clone(),
        column: None,
        predicate,
    })
}

/// Flatten a bound condition into a predicate
pub fn compile_condition(
    condition: &BoundCondition,
    apply: &ApplyContext<'_>,
) -> Result<Predicate> {
    match condition {
        BoundCondition::Constant { property, value } => {
            // An empty membership set matches nothing
            let never = Predicate::In {
                column: property.clone(),
                values: Vec::new(),
            };
            Ok(if *value {
                Predicate::Not(Box::new(never))
            } else {
                never
            })
        }
        BoundCondition::Comparison {
            property,
            op,
            value,
            ..
        } => Ok(Predicate::Compare {
            column: property.clone(),
            op: *op,
            value: flatten(value, apply)?,
        }),
        BoundCondition::In {
            property, values, ..
        } => Ok(Predicate::In {
            column: property.clone(),
            values: values
                .iter()
                .map(|value| flatten(value, apply))
                .collect::<Result<_>>()?,
        }),
        BoundCondition::And(children) => Ok(Predicate::And(compile_all(children, apply)?)),
        BoundCondition::Or(children) => Ok(Predicate::Or(compile_all(children, apply)?)),
        BoundCondition::Not(inner) => {
            Ok(Predicate::Not(Box::new(compile_condition(inner, apply)?)))
        }
        BoundCondition::Tagged(tag) => Ok(Predicate::Tagged(tag.clone())),
        BoundCondition::NestedIn {
            property, subquery, ..
        } => Ok(Predicate::Subquery {
            column: property.clone(),
            query: Box::new(compile_subquery(subquery, apply)?),
        }),
    }
}

fn compile_all(children: &[BoundCondition], apply: &ApplyContext<'_>) -> Result<Vec<Predicate>> {
    children
        .iter()
        .map(|child| compile_condition(child, apply))
        .collect()
}

fn compile_subquery(subquery: &BoundQuery, apply: &ApplyContext<'_>) -> Result<CompiledQuery> {
    let predicate = subquery
        .condition
        .as_ref()
        .map(|condition| compile_condition(condition, apply))
        .transpose()?;
    Ok(CompiledQuery {
        tree: subquery.tree.clone(),
        column: Some(subquery.column.clone()),
        predicate,
    })
}

fn flatten(value: &BoundValue, apply: &ApplyContext<'_>) -> Result<ScalarValue> {
    match value {
        BoundValue::Null => Ok(ScalarValue::Null),
        BoundValue::Text(text) => Ok(ScalarValue::Text(text.clone())),
        BoundValue::Number(number) => Ok(ScalarValue::Number(*number)),
        BoundValue::Date(date) => Ok(ScalarValue::Date(*date)),
        BoundValue::Today => Ok(ScalarValue::Date(apply.today)),
        BoundValue::User(login) => Ok(ScalarValue::Text(login.clone())),
        BoundValue::CurrentUser => apply
            .current_user
            .map(|login| ScalarValue::Text(login.to_string()))
            .ok_or_else(|| {
                MqlError::bind(MQL0103, "CURRENT USER was used without an acting user")
            }),
        BoundValue::Card(number) => Ok(ScalarValue::CardNumber(*number)),
    }
}
