//! Query execution module
//!
//! This module contains predicates, join algorithms, the database registry
//! and the session that runs shell statements against it.

pub mod database;
pub mod join;
pub mod predicate;
pub mod session;

pub use database::Database;
pub use join::{JoinInputs, JoinStrategy};
pub use predicate::{All, CompareOp, Condition, Predicate};
pub use session::{QueryResult, Session};
