//! Query AST: clause structure around a condition tree

use crate::{Condition, SortDirection};
use serde::{Deserialize, Serialize};

/// One column of an ORDER BY clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByColumn {
    /// Property name as written
    pub property: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl OrderByColumn {
    /// Ascending order on a property
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on a property
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// A parsed query: optional clauses around an optional condition
///
/// A bare condition string parses to a `Query` whose only populated field
/// is `condition`; that shape is what filter-only contexts accept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// SELECT columns (empty when absent)
    pub select: Vec<String>,
    /// FROM TREE scope: restricts candidates to members of the named tree
    pub tree: Option<String>,
    /// WHERE condition (or the whole text, for bare filter strings)
    pub condition: Option<Condition>,
    /// GROUP BY columns
    pub group_by: Vec<String>,
    /// ORDER BY columns
    pub order_by: Vec<OrderByColumn>,
    /// AS OF date literal, kept raw until bind
    pub as_of: Option<String>,
}

impl Query {
    /// A query consisting of a single condition
    pub fn filter(condition: Condition) -> Self {
        Self {
            condition: Some(condition),
            ..Self::default()
        }
    }

    /// Whether this query is acceptable in a filter-only context
    /// (no SELECT, GROUP BY, ORDER BY or AS OF)
    pub fn is_filter_only(&self) -> bool {
        self.offending_filter_clause().is_none()
    }

    /// The first clause that disqualifies this query from filter-only
    /// contexts, if any
    pub fn offending_filter_clause(&self) -> Option<&'static str> {
        if !self.select.is_empty() {
            Some("SELECT")
        } else if !self.group_by.is_empty() {
            Some("GROUP BY")
        } else if !self.order_by.is_empty() {
            Some("ORDER BY")
        } else if self.as_of.is_some() {
            Some("AS OF")
        } else {
            None
        }
    }
}
