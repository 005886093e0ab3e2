//! Catalog module
//!
//! This module contains schema definitions, data types and the table builder.

pub mod builder;
pub mod schema;
pub mod types;

pub use builder::TableBuilder;
pub use schema::{Column, Schema};
pub use types::DataType;
