//! Storage engine module
//!
//! This module contains the in-memory storage components:
//! - Values and rows
//! - Primary-key and uniqueness indexes
//! - Tables
//! - JSON snapshots

pub mod index;
pub mod snapshot;
pub mod table;
pub mod value;

pub use index::{PrimaryKeyIndex, TableIndexes};
pub use table::Table;
pub use value::{Row, Value};
