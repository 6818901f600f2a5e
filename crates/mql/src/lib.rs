//! MQL: a query language over cards
//!
//! This crate ties the pipeline together:
//! - Parsing query and filter text into a syntax tree
//! - Canonical formatting back to text
//! - Binding against a project schema
//! - Compiling bound filters into matchable predicates
//! - Tree-aware aggregate evaluation
//!
//! # Example
//!
//! ```
//! use mql::{ApplyContext, BindContext, CardRepository};
//! use mql::model::{Card, InMemoryCards, Project, PropertyDefinition, PropertyKind};
//!
//! # fn main() -> mql::Result<()> {
//! let project = Project::new("demo").with_property(PropertyDefinition::new(
//!     "Status",
//!     PropertyKind::Text,
//! ));
//! let cards = InMemoryCards::new()
//!     .with_card(Card::new(1, "Login page", "Story").with_property("Status", "open"));
//!
//! let query = mql::parse_filter("status = open")?;
//! let ctx = BindContext::new(&project, &cards);
//! let bound = mql::bind_filter(&query, &ctx)?;
//! let compiled = mql::compile_filter(&bound, &ApplyContext::for_today())?;
//! let matched = mql::filter_cards(cards.scan()?, &compiled, &project, &cards)?;
//! assert_eq!(matched.len(), 1);
//! # Ok(())
//! # }
//! ```

// Re-export the member crates under stable module names
pub use mql_ast as ast;
pub use mql_diagnostics as diagnostics;
pub use mql_engine as engine;
pub use mql_model as model;
pub use mql_parser as parser;

// Convenience re-exports
pub use mql_ast::{Condition, Query};
pub use mql_diagnostics::{ErrorCode, MqlError, Result};
pub use mql_engine::{
    AggregateScope, AggregateSpec, ApplyContext, BindContext, bind_condition, bind_filter,
    compile_filter, evaluate_aggregate, filter_cards, matches_card,
};
pub use mql_model::CardRepository;
pub use mql_parser::{is_valid_filter, parse_filter, parse_query};

/// Parse a query and render it back in canonical form
pub fn format_query(text: &str) -> Result<String> {
    Ok(parse_query(text)?.to_string())
}

/// Parse a filter and render it back in canonical form
pub fn format_filter(text: &str) -> Result<String> {
    Ok(parse_filter(text)?.to_string())
}
