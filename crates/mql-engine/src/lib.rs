//! MQL engine: semantic binding, condition compilation and aggregation
//!
//! The engine is a pure, synchronous computation over an immutable schema
//! snapshot. Ambient state (the project, the acting user, the card a query
//! runs against) is threaded explicitly: [`BindContext`] at bind time,
//! [`ApplyContext`] when symbolic TODAY / CURRENT USER values flatten at
//! filter-apply time.

mod aggregate;
mod binder;
mod compiler;
mod matcher;

pub use aggregate::*;
pub use binder::*;
pub use compiler::*;
pub use matcher::*;
