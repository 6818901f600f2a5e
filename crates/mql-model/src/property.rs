//! Property definitions and value resolution rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Accepted date formats, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %b %Y", "%d %B %Y"];

/// Parse a date literal with flexible-format heuristics
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

/// Parse a numeric literal as a decimal
pub fn parse_number(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

/// The type tag of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Free text
    Text,
    /// Decimal number (optionally with a managed value list)
    Numeric,
    /// Calendar date
    Date,
    /// Text with an explicit ordered value list
    Enumerated,
    /// A team member, stored by login
    User,
    /// A reference to another card, stored by card number
    CardRelationship,
    /// A computed numeric property
    Formula,
}

impl PropertyKind {
    /// Whether values of this kind compare numerically
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric | Self::Formula)
    }
}

/// An ordered list of allowed values for an enumerated property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList {
    /// Allowed values in their defined order
    pub values: Vec<String>,
    /// Whether the list is locked: literals outside it are an error
    pub restricted: bool,
}

/// A property definition on the project schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Property name (display case)
    pub name: String,
    /// Type tag
    pub kind: PropertyKind,
    /// Ordered allowed-value list, present for enumerated properties and
    /// managed numeric lists
    pub value_list: Option<ValueList>,
}

impl PropertyDefinition {
    /// Define a property with no value list
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value_list: None,
        }
    }

    /// Attach an ordered value list
    pub fn with_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.value_list = Some(ValueList {
            values: values.into_iter().map(Into::into).collect(),
            restricted: false,
        });
        self
    }

    /// Lock the value list (restricted property)
    pub fn restricted(mut self) -> Self {
        if let Some(list) = &mut self.value_list {
            list.restricted = true;
        }
        self
    }

    /// Whether this property carries a value list
    pub fn is_enumerated(&self) -> bool {
        self.value_list.is_some()
    }

    /// Whether the value list is locked
    pub fn is_restricted(&self) -> bool {
        self.value_list.as_ref().is_some_and(|list| list.restricted)
    }

    /// The value list in ranking order: defined order for text lists,
    /// numeric order for numeric-flagged lists. Never lexical.
    pub fn ranked_values(&self) -> Vec<&str> {
        let Some(list) = &self.value_list else {
            return Vec::new();
        };
        let mut ranked: Vec<&str> = list.values.iter().map(String::as_str).collect();
        if self.kind.is_numeric() {
            ranked.sort_by(|a, b| {
                let left = parse_number(a).unwrap_or_default();
                let right = parse_number(b).unwrap_or_default();
                left.cmp(&right)
            });
        }
        ranked
    }

    /// Whether a stored list element matches a literal: case-insensitive
    /// for text lists, within `epsilon` for numeric lists (so `1.00`
    /// matches a stored `1`)
    pub fn value_matches(&self, element: &str, literal: &str, epsilon: Decimal) -> bool {
        if self.kind.is_numeric() {
            match (parse_number(element), parse_number(literal)) {
                (Some(left), Some(right)) => (left - right).abs() <= epsilon,
                _ => false,
            }
        } else {
            element.eq_ignore_ascii_case(literal)
        }
    }

    /// The ordinal rank of a literal within the value list, if it matches
    /// an element
    pub fn ordinal_rank(&self, literal: &str, epsilon: Decimal) -> Option<usize> {
        self.ranked_values()
            .iter()
            .position(|element| self.value_matches(element, literal, epsilon))
    }
}
