//! Statement generation: conditions, ordering and DML text.

mod condition;
pub mod statement;

pub use condition::{build, Criteria, OrderBy, Predicate, Where};
