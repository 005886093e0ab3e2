//! KeelDB - A minimal in-memory relational engine written in Rust
//!
//! This library provides:
//! - Schemas with primary-key, unique and not-null columns
//! - Tables with hash indexes and predicate select/update/delete
//! - Nested-loop and index-assisted inner joins
//! - JSON snapshots
//! - A small SQL shell dialect (lexer, parser, session)

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use catalog::{Column, DataType, Schema, TableBuilder};
pub use config::ShellConfig;
pub use error::{Constraint, Error, Result};
pub use executor::{All, CompareOp, Condition, Database, Predicate, QueryResult, Session};
pub use storage::{Row, Table, Value};
