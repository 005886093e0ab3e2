//! Data types for KeelDB
//!
//! This module defines the closed set of column types the engine can store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Whole numbers (64-bit)
    Integer,
    /// Character strings
    Text,
    /// Double-precision floating point; also accepts whole numbers
    Float,
    /// TRUE / FALSE
    Boolean,
}

impl DataType {
    /// Parse a type name as written in a column definition
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" | "BIGINT" => Some(DataType::Integer),
            "TEXT" | "VARCHAR" | "STRING" => Some(DataType::Text),
            "FLOAT" | "REAL" | "DOUBLE" => Some(DataType::Float),
            "BOOL" | "BOOLEAN" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}
