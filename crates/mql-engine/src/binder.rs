//! Semantic binding: resolving a raw condition tree against a project
//!
//! Binding attaches schema knowledge to the syntax tree: property names
//! resolve to definitions, literals become typed values, variables flatten
//! to their current values, and ordering comparisons over enumerated
//! properties lower to explicit membership over the ordinal ranks that
//! qualify. TODAY and CURRENT USER stay symbolic; they flatten later,
//! against an [`ApplyContext`](crate::ApplyContext).

use chrono::NaiveDate;
use log::debug;
use mql_ast::{Comparison, ComparisonOp, Condition, Query, QueryValue};
use mql_diagnostics::{
    MQL0100, MQL0101, MQL0102, MQL0103, MQL0104, MQL0105, MQL0106, MQL0107, MQL0108, MQL0109,
    MQL0110, MQL0111, MqlError, Result,
};
use mql_model::{
    Card, CardRepository, Project, PropertyDefinition, PropertyKind, parse_date, parse_number,
};
use rust_decimal::Decimal;

/// Everything a bind needs from its surroundings
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    /// The project schema to resolve against
    pub project: &'a Project,
    /// Card store, consulted for card-reference literals
    pub repository: &'a dyn CardRepository,
    /// The card a `THIS CARD` reference points at
    pub this_card: Option<&'a Card>,
}

impl<'a> BindContext<'a> {
    /// Create a context with no context card
    pub fn new(project: &'a Project, repository: &'a dyn CardRepository) -> Self {
        Self {
            project,
            repository,
            this_card: None,
        }
    }

    /// Supply the card `THIS CARD` resolves to
    pub fn with_this_card(mut self, card: &'a Card) -> Self {
        self.this_card = Some(card);
        self
    }
}

/// A comparison value after resolution against the property's type
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// Explicit NULL, or an unset variable / unset context-card property
    Null,
    /// Text value
    Text(String),
    /// Numeric value
    Number(Decimal),
    /// Date value
    Date(NaiveDate),
    /// Symbolic TODAY, flattened at apply time
    Today,
    /// A team member, by login
    User(String),
    /// Symbolic CURRENT USER, flattened at apply time
    CurrentUser,
    /// A card reference, by number
    Card(u64),
}

impl BoundValue {
    const fn is_symbolic(&self) -> bool {
        matches!(self, Self::Today | Self::CurrentUser)
    }
}

/// A condition tree after binding
#[derive(Debug, Clone, PartialEq)]
pub enum BoundCondition {
    /// A condition that degraded to a known truth value (e.g. an ordering
    /// comparison past the end of a value list). Keeps the property name
    /// so compilation still has a column to anchor on.
    Constant { property: String, value: bool },
    /// A typed comparison
    Comparison {
        property: String,
        kind: PropertyKind,
        op: ComparisonOp,
        value: BoundValue,
    },
    /// Membership in an explicit value set
    In {
        property: String,
        kind: PropertyKind,
        values: Vec<BoundValue>,
    },
    /// Conjunction
    And(Vec<BoundCondition>),
    /// Disjunction
    Or(Vec<BoundCondition>),
    /// Negation
    Not(Box<BoundCondition>),
    /// Tag membership
    Tagged(String),
    /// Membership in the result column of a nested query
    NestedIn {
        property: String,
        kind: PropertyKind,
        subquery: Box<BoundQuery>,
    },
}

/// A bound nested query: one result column over an optional tree scope
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    /// Tree scope, canonical spelling
    pub tree: Option<String>,
    /// The single selected column, canonical spelling
    pub column: String,
    /// Bound condition, when present
    pub condition: Option<BoundCondition>,
}

/// A bound filter: tree scope plus condition
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFilter {
    /// Tree scope, canonical spelling
    pub tree: Option<String>,
    /// Bound condition, when present
    pub condition: Option<BoundCondition>,
}

/// Bind a parsed query as a filter.
///
/// Rejects report-only clauses (SELECT, GROUP BY, ORDER BY, AS OF) and
/// resolves the tree scope and condition against the project schema.
pub fn bind_filter(query: &Query, ctx: &BindContext<'_>) -> Result<BoundFilter> {
    if let Some(clause) = query.offending_filter_clause() {
        return Err(MqlError::bind(
            MQL0101,
            format!("{clause} is not supported in a filter"),
        ));
    }
    let tree = query
        .tree
        .as_deref()
        .map(|name| resolve_tree(name, ctx))
        .transpose()?;
    let condition = query
        .condition
        .as_ref()
        .map(|condition| bind_condition(condition, ctx))
        .transpose()?;
    Ok(BoundFilter { tree, condition })
}

/// Bind a condition tree against the project schema
pub fn bind_condition(condition: &Condition, ctx: &BindContext<'_>) -> Result<BoundCondition> {
    match condition {
        Condition::Comparison(comparison) => bind_comparison(comparison, ctx),
        Condition::And(children) => Ok(BoundCondition::And(bind_all(children, ctx)?)),
        Condition::Or(children) => Ok(BoundCondition::Or(bind_all(children, ctx)?)),
        Condition::Not(inner) => Ok(BoundCondition::Not(Box::new(bind_condition(inner, ctx)?))),
        Condition::In { property, values } => bind_membership(property, values, ctx),
        Condition::InQuery { property, query } => bind_nested(property, query, ctx),
        Condition::TaggedWith(tag) => Ok(BoundCondition::Tagged(tag.clone())),
    }
}

fn bind_all(children: &[Condition], ctx: &BindContext<'_>) -> Result<Vec<BoundCondition>> {
    children
        .iter()
        .map(|child| bind_condition(child, ctx))
        .collect()
}

fn bind_comparison(comparison: &Comparison, ctx: &BindContext<'_>) -> Result<BoundCondition> {
    let definition = resolve_property(&comparison.property, ctx)?;
    let value = resolve_value(definition, &comparison.value, ctx)?;
    finish_comparison(definition, comparison.op, value, ctx)
}

fn finish_comparison(
    definition: &PropertyDefinition,
    op: ComparisonOp,
    value: BoundValue,
    ctx: &BindContext<'_>,
) -> Result<BoundCondition> {
    if value == BoundValue::Null && op.is_ordering() {
        return Err(MqlError::bind(
            MQL0111,
            format!(
                "NULL only supports '=' and '!='; '{}' {op} NULL is not a valid comparison",
                definition.name
            ),
        ));
    }
    if matches!(value, BoundValue::Card(_)) && definition.kind != PropertyKind::CardRelationship {
        return Err(MqlError::bind(
            MQL0101,
            format!(
                "'{}' is not a card relationship property and cannot compare against a card",
                definition.name
            ),
        ));
    }
    if definition.is_enumerated() && !matches!(value, BoundValue::Null) && !value.is_symbolic() {
        return lower_enumerated(definition, op, value, ctx);
    }
    Ok(BoundCondition::Comparison {
        property: definition.name.clone(),
        kind: definition.kind,
        op,
        value,
    })
}

/// Rewrite a comparison over an enumerated property in terms of the
/// ordinal ranks of its value list.
///
/// Equality canonicalizes to the stored spelling. Ordering enumerates the
/// ranks that satisfy the operator: `Status > open` over
/// `[new, open, closed]` becomes `Status = closed`, and the low side of
/// the order (`<`, `<=`) also admits NULL. An empty qualifying set
/// degrades to a constant-false condition.
fn lower_enumerated(
    definition: &PropertyDefinition,
    op: ComparisonOp,
    value: BoundValue,
    ctx: &BindContext<'_>,
) -> Result<BoundCondition> {
    let epsilon = ctx.project.numeric_epsilon;
    let literal = match &value {
        BoundValue::Text(text) => text.clone(),
        BoundValue::Number(number) => number.to_string(),
        BoundValue::Date(date) => date.to_string(),
        BoundValue::User(login) => login.clone(),
        // Card references and symbolic values never carry a value list
        _ => {
            return Ok(BoundCondition::Comparison {
                property: definition.name.clone(),
                kind: definition.kind,
                op,
                value,
            });
        }
    };
    let boundary = definition.ordinal_rank(&literal, epsilon);

    if op.is_equality() {
        let value = check_against_list(definition, &literal, value, boundary)?;
        return Ok(BoundCondition::Comparison {
            property: definition.name.clone(),
            kind: definition.kind,
            op,
            value,
        });
    }

    let ranked = definition.ranked_values();
    let qualifying: Vec<&str> = match boundary {
        Some(boundary) => ranked
            .iter()
            .enumerate()
            .filter(|(rank, _)| op.holds_for(rank.cmp(&boundary)))
            .map(|(_, element)| *element)
            .collect(),
        // A numeric literal between list elements still orders against them
        None if definition.kind.is_numeric() => {
            let Some(literal) = parse_number(&literal) else {
                return Err(MqlError::bind(
                    MQL0110,
                    format!("'{literal}' is not a number"),
                ));
            };
            ranked
                .iter()
                .filter(|element| {
                    let element = parse_number(element).unwrap_or_default();
                    op.holds_for(element.cmp(&literal))
                })
                .copied()
                .collect()
        }
        // A text literal outside the list has no rank to order against
        None => {
            debug!(
                "'{literal}' is not in the value list of '{}'; '{op}' degrades to constant false",
                definition.name
            );
            return Ok(BoundCondition::Constant {
                property: definition.name.clone(),
                value: false,
            });
        }
    };

    // The low side of the order also admits unset values
    let mut values: Vec<BoundValue> = Vec::with_capacity(qualifying.len() + 1);
    if matches!(op, ComparisonOp::Less | ComparisonOp::LessOrEqual) {
        values.push(BoundValue::Null);
    }
    for element in qualifying {
        values.push(list_element_value(definition, element));
    }

    if values.is_empty() {
        debug!(
            "no value of '{}' satisfies '{op} {literal}'; degrading to constant false",
            definition.name
        );
        return Ok(BoundCondition::Constant {
            property: definition.name.clone(),
            value: false,
        });
    }
    if values.len() == 1 {
        return Ok(BoundCondition::Comparison {
            property: definition.name.clone(),
            kind: definition.kind,
            op: ComparisonOp::Equal,
            value: values.remove(0),
        });
    }
    Ok(BoundCondition::In {
        property: definition.name.clone(),
        kind: definition.kind,
        values,
    })
}

/// Canonicalize an equality/membership value against a value list, or
/// reject it when the list is locked
fn check_against_list(
    definition: &PropertyDefinition,
    literal: &str,
    value: BoundValue,
    rank: Option<usize>,
) -> Result<BoundValue> {
    match rank {
        Some(rank) => Ok(list_element_value(definition, definition.ranked_values()[rank])),
        None if definition.is_restricted() => {
            let allowed = definition.ranked_values().join(", ");
            Err(MqlError::bind(
                MQL0102,
                format!(
                    "'{literal}' is not a valid value for restricted property '{}'; allowed values are: {allowed}",
                    definition.name
                ),
            ))
        }
        None => Ok(value),
    }
}

fn list_element_value(definition: &PropertyDefinition, element: &str) -> BoundValue {
    if definition.kind.is_numeric() {
        parse_number(element)
            .map(BoundValue::Number)
            .unwrap_or_else(|| BoundValue::Text(element.to_string()))
    } else {
        BoundValue::Text(element.to_string())
    }
}

fn bind_membership(
    property: &str,
    values: &[QueryValue],
    ctx: &BindContext<'_>,
) -> Result<BoundCondition> {
    let definition = resolve_property(property, ctx)?;
    let epsilon = ctx.project.numeric_epsilon;
    let mut bound = Vec::with_capacity(values.len());
    for value in values {
        let mut value = resolve_value(definition, value, ctx)?;
        if definition.is_enumerated()
            && !matches!(value, BoundValue::Null)
            && !value.is_symbolic()
        {
            let literal = match &value {
                BoundValue::Text(text) => text.clone(),
                BoundValue::Number(number) => number.to_string(),
                _ => String::new(),
            };
            let rank = definition.ordinal_rank(&literal, epsilon);
            value = check_against_list(definition, &literal, value, rank)?;
        }
        bound.push(value);
    }
    Ok(BoundCondition::In {
        property: definition.name.clone(),
        kind: definition.kind,
        values: bound,
    })
}

fn bind_nested(property: &str, query: &Query, ctx: &BindContext<'_>) -> Result<BoundCondition> {
    let definition = resolve_property(property, ctx)?;
    if query.select.len() != 1 {
        return Err(MqlError::bind(
            MQL0101,
            "a nested SELECT must select exactly one property",
        ));
    }
    if !query.group_by.is_empty() || !query.order_by.is_empty() || query.as_of.is_some() {
        return Err(MqlError::bind(
            MQL0101,
            "a nested SELECT supports only SELECT, FROM TREE and WHERE",
        ));
    }
    let column = resolve_property(&query.select[0], ctx)?.name.clone();
    let tree = query
        .tree
        .as_deref()
        .map(|name| resolve_tree(name, ctx))
        .transpose()?;
    let condition = query
        .condition
        .as_ref()
        .map(|condition| bind_condition(condition, ctx))
        .transpose()?;
    Ok(BoundCondition::NestedIn {
        property: definition.name.clone(),
        kind: definition.kind,
        subquery: Box::new(BoundQuery {
            tree,
            column,
            condition,
        }),
    })
}

/// Resolve a raw comparison value against a property definition
fn resolve_value(
    definition: &PropertyDefinition,
    value: &QueryValue,
    ctx: &BindContext<'_>,
) -> Result<BoundValue> {
    match value {
        QueryValue::Literal(text) => resolve_literal(definition, text, ctx),
        QueryValue::Variable(name) => {
            let variable = ctx.project.find_variable(name).ok_or_else(|| {
                MqlError::bind(MQL0107, format!("project variable ({name}) does not exist"))
            })?;
            if !variable.is_applicable_to(&definition.name) {
                return Err(MqlError::bind(
                    MQL0107,
                    format!(
                        "project variable ({name}) is not applicable to property '{}'",
                        definition.name
                    ),
                ));
            }
            match &variable.value {
                Some(text) => resolve_literal(definition, text, ctx),
                None => Ok(BoundValue::Null),
            }
        }
        QueryValue::ThisCard => {
            let card = this_card(ctx)?;
            Ok(BoundValue::Card(card.number))
        }
        QueryValue::ThisCardProperty(property) => {
            let card = this_card(ctx)?;
            resolve_property(property, ctx)?;
            match card.value_of(property) {
                Some(text) => resolve_literal(definition, &text, ctx),
                None => Ok(BoundValue::Null),
            }
        }
        QueryValue::CardNumber(number) => {
            if ctx.repository.find_by_number(*number)?.is_none() {
                return Err(MqlError::bind(
                    MQL0105,
                    format!("card #{number} does not exist"),
                ));
            }
            Ok(BoundValue::Card(*number))
        }
    }
}

/// Resolve a literal under a property's type rules.
///
/// `null` is NULL for every kind. `today` (dates) and `current user`
/// (user properties) bind symbolically. Card relationship literals
/// resolve by card name through the repository.
fn resolve_literal(
    definition: &PropertyDefinition,
    text: &str,
    ctx: &BindContext<'_>,
) -> Result<BoundValue> {
    if text.eq_ignore_ascii_case("null") {
        return Ok(BoundValue::Null);
    }
    match definition.kind {
        PropertyKind::Text | PropertyKind::Enumerated => Ok(BoundValue::Text(text.to_string())),
        PropertyKind::Numeric | PropertyKind::Formula => parse_number(text)
            .map(BoundValue::Number)
            .ok_or_else(|| MqlError::bind(MQL0110, format!("'{text}' is not a number"))),
        PropertyKind::Date => {
            if text.eq_ignore_ascii_case("today") {
                Ok(BoundValue::Today)
            } else {
                parse_date(text).map(BoundValue::Date).ok_or_else(|| {
                    MqlError::bind(
                        MQL0109,
                        format!("'{text}' is not a date the engine recognizes"),
                    )
                })
            }
        }
        PropertyKind::User => {
            if text.eq_ignore_ascii_case("current user") {
                Ok(BoundValue::CurrentUser)
            } else {
                ctx.project
                    .find_member(text)
                    .map(|member| BoundValue::User(member.login.clone()))
                    .ok_or_else(|| {
                        MqlError::bind(MQL0104, format!("'{text}' is not a project member"))
                    })
            }
        }
        PropertyKind::CardRelationship => {
            let matches = ctx.repository.find_by_name(text)?;
            match matches.len() {
                0 => Err(MqlError::bind(
                    MQL0105,
                    format!("no card is named '{text}'"),
                )),
                1 => Ok(BoundValue::Card(matches[0].number)),
                _ => Err(MqlError::bind(
                    MQL0106,
                    format!("more than one card is named '{text}'"),
                )),
            }
        }
    }
}

fn resolve_property<'a>(
    name: &str,
    ctx: &BindContext<'a>,
) -> Result<&'a PropertyDefinition> {
    ctx.project.find_property(name).ok_or_else(|| {
        MqlError::bind(MQL0100, format!("card property '{name}' does not exist"))
    })
}

fn resolve_tree(name: &str, ctx: &BindContext<'_>) -> Result<String> {
    ctx.project
        .find_tree(name)
        .map(|tree| tree.name.clone())
        .ok_or_else(|| MqlError::bind(MQL0108, format!("tree '{name}' does not exist")))
}

fn this_card<'a>(ctx: &BindContext<'a>) -> Result<&'a Card> {
    ctx.this_card.ok_or_else(|| {
        MqlError::bind(MQL0103, "THIS CARD was used without a card context")
    })
}
