//! Project schema snapshot for the MQL engine
//!
//! Everything the binder and evaluator know about a project: property
//! definitions with ordered value lists, project variables, team members,
//! tree configurations, cards, and the opaque synchronous repository the
//! engine scans. The engine reads a snapshot and never mutates it; callers
//! re-bind after schema edits.

mod card;
mod project;
mod property;
mod repository;
mod tree;
mod user;
mod variable;

pub use card::*;
pub use project::*;
pub use property::*;
pub use repository::*;
pub use tree::*;
pub use user::*;
pub use variable::*;
