//! MQL comparison operators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators between a property and a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Equality (`=`)
    Equal,
    /// Inequality (`!=`)
    NotEqual,
    /// Strictly greater (`>`)
    Greater,
    /// Strictly less (`<`)
    Less,
    /// Greater or equal (`>=`)
    GreaterOrEqual,
    /// Less or equal (`<=`)
    LessOrEqual,
}

impl ComparisonOp {
    /// The operator's surface syntax
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }

    /// Whether this is `=` or `!=`
    pub const fn is_equality(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }

    /// Whether this is an ordering operator (`>`, `<`, `>=`, `<=`)
    pub const fn is_ordering(&self) -> bool {
        !self.is_equality()
    }

    /// The logically negated operator
    pub const fn negated(&self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::Greater => Self::LessOrEqual,
            Self::Less => Self::GreaterOrEqual,
            Self::GreaterOrEqual => Self::Less,
            Self::LessOrEqual => Self::Greater,
        }
    }

    /// Apply this operator to an ordering between two ranks
    pub fn holds_for(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Self::Equal => ordering == Equal,
            Self::NotEqual => ordering != Equal,
            Self::Greater => ordering == Greater,
            Self::Less => ordering == Less,
            Self::GreaterOrEqual => ordering != Less,
            Self::LessOrEqual => ordering != Greater,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction in an ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending (the default, left implicit in canonical text)
    #[default]
    Ascending,
    /// Descending (`DESC`)
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn negation_is_involutive() {
        for op in [
            ComparisonOp::Equal,
            ComparisonOp::NotEqual,
            ComparisonOp::Greater,
            ComparisonOp::Less,
            ComparisonOp::GreaterOrEqual,
            ComparisonOp::LessOrEqual,
        ] {
            assert_eq!(op.negated().negated(), op);
        }
    }

    #[test]
    fn holds_for_respects_bounds() {
        assert!(ComparisonOp::GreaterOrEqual.holds_for(Ordering::Equal));
        assert!(ComparisonOp::GreaterOrEqual.holds_for(Ordering::Greater));
        assert!(!ComparisonOp::Greater.holds_for(Ordering::Equal));
        assert!(ComparisonOp::LessOrEqual.holds_for(Ordering::Less));
    }
}
