//! Project variables

use crate::PropertyKind;
use serde::{Deserialize, Serialize};

/// A named, project-scoped typed constant, bindable into queries with the
/// parenthesized `(name)` syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVariable {
    /// Variable name as displayed (matched case-insensitively)
    pub name: String,
    /// Data type of the bound value
    pub kind: PropertyKind,
    /// Current value; `None` binds as NULL
    pub value: Option<String>,
    /// Properties this variable may bind against; empty means any
    pub applicable_properties: Vec<String>,
}

impl ProjectVariable {
    /// Create a variable with a value
    pub fn new(name: impl Into<String>, kind: PropertyKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: Some(value.into()),
            applicable_properties: Vec::new(),
        }
    }

    /// Create an unset variable (binds as NULL)
    pub fn unset(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: None,
            applicable_properties: Vec::new(),
        }
    }

    /// Restrict the variable to a set of properties
    pub fn applicable_to<S: Into<String>>(mut self, properties: impl IntoIterator<Item = S>) -> Self {
        self.applicable_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the variable may bind against the named property
    pub fn is_applicable_to(&self, property: &str) -> bool {
        self.applicable_properties.is_empty()
            || self
                .applicable_properties
                .iter()
                .any(|name| name.eq_ignore_ascii_case(property))
    }
}
