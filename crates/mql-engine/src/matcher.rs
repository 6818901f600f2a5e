//! Predicate evaluation over cards
//!
//! The matcher interprets a [`CompiledQuery`] directly against cards; it
//! plays the role a SQL WHERE clause plays in the hosted product. Stored
//! values are strings, so comparison re-types them against the schema:
//! numbers within the project epsilon, dates via the accepted formats,
//! enumerated values by ordinal rank, everything else case-insensitively.

use crate::{CompiledQuery, Predicate, ScalarValue};
use mql_ast::ComparisonOp;
use mql_diagnostics::{MQL0201, MqlError, Result};
use mql_model::{Card, CardRepository, Project, parse_date, parse_number};
use std::cmp::Ordering;

/// Whether a card satisfies a compiled query
pub fn matches_card(
    card: &Card,
    query: &CompiledQuery,
    project: &Project,
    repository: &dyn CardRepository,
) -> Result<bool> {
    if let Some(tree_name) = &query.tree {
        let tree = project.find_tree(tree_name).ok_or_else(|| {
            MqlError::evaluation(
                MQL0201,
                format!("tree '{tree_name}' vanished between bind and evaluation"),
            )
        })?;
        if !tree.contains(card.number) {
            return Ok(false);
        }
    }
    match &query.predicate {
        Some(predicate) => matches_predicate(card, predicate, project, repository),
        None => Ok(true),
    }
}

/// Filter a candidate set down to the cards a query matches
pub fn filter_cards<'a>(
    cards: Vec<&'a Card>,
    query: &CompiledQuery,
    project: &Project,
    repository: &dyn CardRepository,
) -> Result<Vec<&'a Card>> {
    let mut matched = Vec::with_capacity(cards.len());
    for card in cards {
        if matches_card(card, query, project, repository)? {
            matched.push(card);
        }
    }
    Ok(matched)
}

fn matches_predicate(
    card: &Card,
    predicate: &Predicate,
    project: &Project,
    repository: &dyn CardRepository,
) -> Result<bool> {
    match predicate {
        Predicate::And(children) => {
            for child in children {
                if !matches_predicate(card, child, project, repository)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(children) => {
            for child in children {
                if matches_predicate(card, child, project, repository)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(inner) => Ok(!matches_predicate(card, inner, project, repository)?),
        Predicate::Compare { column, op, value } => {
            Ok(compare(project, column, card.value_of(column).as_deref(), *op, value))
        }
        Predicate::In { column, values } => {
            let stored = card.value_of(column);
            Ok(values
                .iter()
                .any(|value| compare(project, column, stored.as_deref(), ComparisonOp::Equal, value)))
        }
        Predicate::Subquery { column, query } => {
            let Some(stored) = card.value_of(column) else {
                return Ok(false);
            };
            let select = query.column.as_deref().ok_or_else(|| {
                MqlError::evaluation(MQL0201, "nested query compiled without a result column")
            })?;
            for candidate in repository.scan()? {
                if !matches_card(candidate, query, project, repository)? {
                    continue;
                }
                if let Some(selected) = candidate.value_of(select)
                    && values_equal(&stored, &selected)
                {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Tagged(tag) => Ok(card.has_tag(tag)),
    }
}

/// Compare a stored string value against a scalar under a property's type
/// rules
fn compare(
    project: &Project,
    column: &str,
    stored: Option<&str>,
    op: ComparisonOp,
    value: &ScalarValue,
) -> bool {
    if let ScalarValue::Null = value {
        return match op {
            ComparisonOp::Equal => stored.is_none(),
            ComparisonOp::NotEqual => stored.is_some(),
            // Binding rejects ordering against NULL; unreachable via the
            // public pipeline
            _ => false,
        };
    }
    let Some(stored) = stored else {
        // An unset value differs from every concrete value
        return op == ComparisonOp::NotEqual;
    };
    match ordering_of(project, column, stored, value) {
        Some(ordering) => op.holds_for(ordering),
        None => op == ComparisonOp::NotEqual,
    }
}

/// The ordering of a stored value relative to a scalar, `None` when the
/// stored value does not retype
fn ordering_of(
    project: &Project,
    column: &str,
    stored: &str,
    value: &ScalarValue,
) -> Option<Ordering> {
    match value {
        ScalarValue::Null => None,
        ScalarValue::Number(number) => {
            let stored = parse_number(stored)?;
            if (stored - number).abs() <= project.numeric_epsilon {
                Some(Ordering::Equal)
            } else {
                Some(stored.cmp(number))
            }
        }
        ScalarValue::Date(date) => parse_date(stored).map(|stored| stored.cmp(date)),
        ScalarValue::CardNumber(number) => {
            stored.parse::<u64>().ok().map(|stored| stored.cmp(number))
        }
        ScalarValue::Text(text) => {
            // Enumerated properties order by ordinal rank, never lexically
            if let Some(definition) = project.find_property(column)
                && definition.is_enumerated()
                && let Some(stored_rank) = definition.ordinal_rank(stored, project.numeric_epsilon)
                && let Some(value_rank) = definition.ordinal_rank(text, project.numeric_epsilon)
            {
                return Some(stored_rank.cmp(&value_rank));
            }
            Some(
                stored
                    .to_lowercase()
                    .cmp(&text.to_lowercase()),
            )
        }
    }
}

/// Loose equality between two stored string values: numeric when both
/// parse, case-insensitive text otherwise
fn values_equal(left: &str, right: &str) -> bool {
    match (parse_number(left), parse_number(right)) {
        (Some(left), Some(right)) => left == right,
        _ => left.eq_ignore_ascii_case(right),
    }
}
