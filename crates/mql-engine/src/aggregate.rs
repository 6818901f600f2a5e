//! Tree-aware aggregate evaluation
//!
//! Aggregates reduce a scope of cards drawn from a tree around a context
//! card. Parameter handling is deliberately permissive: an unrecognized
//! aggregate type or a property that does not exist degrades to COUNT
//! with a log line rather than failing, because these parameters arrive
//! from stored page markup that outlives schema edits.

use crate::{
    ApplyContext, BindContext, BoundFilter, bind_condition, compile_filter, filter_cards,
};
use log::debug;
use mql_ast::Condition;
use mql_diagnostics::{MQL0108, MQL0201, MqlError, Result};
use mql_model::{Card, Project, PropertyKind, parse_date, parse_number};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// The aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateType {
    /// Number of cards in scope
    Count,
    /// Sum of a numeric property
    Sum,
    /// Average of a numeric property
    Avg,
    /// Minimum of a property
    Min,
    /// Maximum of a property
    Max,
}

impl AggregateType {
    /// Parse an aggregate type name, case-insensitively
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Canonical name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// A validated aggregate: function plus target property
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    /// The function to apply
    pub kind: AggregateType,
    /// Target property, canonical spelling; `None` for COUNT
    pub property: Option<String>,
}

impl AggregateSpec {
    /// Build a spec from raw parameters.
    ///
    /// An unrecognized type name falls back to COUNT, as does a target
    /// property missing from the schema. COUNT discards any property.
    pub fn from_params(kind: &str, property: Option<&str>, project: &Project) -> Self {
        let Some(kind) = AggregateType::parse(kind) else {
            debug!("unrecognized aggregate type '{kind}'; falling back to COUNT");
            return Self::count();
        };
        if kind == AggregateType::Count {
            return Self::count();
        }
        match property.and_then(|name| project.find_property(name)) {
            Some(definition) => Self {
                kind,
                property: Some(definition.name.clone()),
            },
            None => {
                debug!(
                    "aggregate property {property:?} does not exist; falling back to COUNT"
                );
                Self::count()
            }
        }
    }

    /// A plain COUNT
    pub const fn count() -> Self {
        Self {
            kind: AggregateType::Count,
            property: None,
        }
    }
}

/// Which cards around the context card an aggregate reduces over
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateScope {
    /// Direct children of the context card in the tree
    Children,
    /// Every transitive descendant of the context card
    AllDescendants,
    /// Descendants that also match a condition; `THIS CARD` inside the
    /// condition refers to the context card
    Condition(Condition),
}

/// Evaluate an aggregate over a tree scope around a context card.
///
/// Returns the display string for the result. `None` renders as blank:
/// SUM over no cards, or MIN/MAX where every card leaves the property
/// unset. AVG over no cards is `"0"`.
pub fn evaluate_aggregate(
    spec: &AggregateSpec,
    scope: &AggregateScope,
    tree_name: &str,
    context_card: &Card,
    ctx: &BindContext<'_>,
    apply: &ApplyContext<'_>,
) -> Result<Option<String>> {
    if spec.kind != AggregateType::Count && spec.property.is_none() {
        return Err(MqlError::evaluation(
            MQL0201,
            format!("{} aggregate constructed without a target property", spec.kind.as_str()),
        ));
    }
    let tree = ctx
        .project
        .find_tree(tree_name)
        .ok_or_else(|| MqlError::bind(MQL0108, format!("tree '{tree_name}' does not exist")))?;

    let in_scope: BTreeSet<u64> = match scope {
        AggregateScope::Children => tree.children_of(context_card.number).into_iter().collect(),
        AggregateScope::AllDescendants | AggregateScope::Condition(_) => {
            tree.descendants_of(context_card.number).into_iter().collect()
        }
    };

    // One bulk fetch, reduced in memory
    let mut candidates: Vec<&Card> = ctx
        .repository
        .scan()?
        .into_iter()
        .filter(|card| in_scope.contains(&card.number))
        .collect();

    if let AggregateScope::Condition(condition) = scope {
        let scoped = ctx.with_this_card(context_card);
        let bound = bind_condition(condition, &scoped)?;
        let compiled = compile_filter(
            &BoundFilter {
                tree: None,
                condition: Some(bound),
            },
            apply,
        )?;
        candidates = filter_cards(candidates, &compiled, ctx.project, ctx.repository)?;
    }

    Ok(reduce(spec, &candidates, ctx.project))
}

fn reduce(spec: &AggregateSpec, cards: &[&Card], project: &Project) -> Option<String> {
    let property = spec.property.as_deref();
    match spec.kind {
        AggregateType::Count => Some(cards.len().to_string()),
        AggregateType::Sum => {
            if cards.is_empty() {
                return None;
            }
            Some(format_decimal(sum_of(cards, property?)))
        }
        AggregateType::Avg => {
            if cards.is_empty() {
                return Some("0".to_string());
            }
            // Unset values contribute zero to the sum but still count in
            // the denominator
            let average = sum_of(cards, property?) / Decimal::from(cards.len());
            Some(format_decimal(average.round_dp(project.precision)))
        }
        AggregateType::Min => extremum(cards, property?, project, Extremum::Min),
        AggregateType::Max => extremum(cards, property?, project, Extremum::Max),
    }
}

fn sum_of(cards: &[&Card], property: &str) -> Decimal {
    cards
        .iter()
        .filter_map(|card| card.value_of(property))
        .filter_map(|value| parse_number(&value))
        .sum()
}

#[derive(Clone, Copy, PartialEq)]
enum Extremum {
    Min,
    Max,
}

/// MIN/MAX over the set values of a property. Numeric properties compare
/// numerically, enumerated text by ordinal rank, dates as dates, plain
/// text case-insensitively. All-unset yields `None`.
fn extremum(
    cards: &[&Card],
    property: &str,
    project: &Project,
    which: Extremum,
) -> Option<String> {
    let definition = project.find_property(property)?;
    let values: Vec<String> = cards
        .iter()
        .filter_map(|card| card.value_of(property))
        .collect();
    if values.is_empty() {
        return None;
    }
    if definition.kind.is_numeric() {
        let numbers = values.iter().filter_map(|value| parse_number(value));
        let result = match which {
            Extremum::Min => numbers.min(),
            Extremum::Max => numbers.max(),
        };
        return result.map(format_decimal);
    }
    if definition.is_enumerated() {
        let ranks = values
            .iter()
            .filter_map(|value| definition.ordinal_rank(value, project.numeric_epsilon));
        let rank = match which {
            Extremum::Min => ranks.min(),
            Extremum::Max => ranks.max(),
        };
        return rank.map(|rank| definition.ranked_values()[rank].to_string());
    }
    if definition.kind == PropertyKind::Date {
        let dates = values.iter().filter_map(|value| parse_date(value));
        let result = match which {
            Extremum::Min => dates.min(),
            Extremum::Max => dates.max(),
        };
        return result.map(|date| date.to_string());
    }
    let mut sorted = values;
    sorted.sort_by_key(|value| value.to_lowercase());
    match which {
        Extremum::Min => sorted.first().cloned(),
        Extremum::Max => sorted.last().cloned(),
    }
}

fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
