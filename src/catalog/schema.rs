//! Schema definitions for KeelDB
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this the primary key?
    pub primary_key: bool,
    /// Is this column unique?
    pub unique: bool,
    /// Must every row carry a non-null value?
    pub not_null: bool,
}

impl Column {
    /// Create a new nullable column without constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            not_null: false,
        }
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        if pk {
            self.not_null = true;
        }
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set not-null flag
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// A primary key is implicitly NOT NULL
    pub fn is_required(&self) -> bool {
        self.not_null || self.primary_key
    }

    /// A primary key is implicitly UNIQUE
    pub fn is_unique(&self) -> bool {
        self.unique || self.primary_key
    }

    /// Constraint keywords, in declaration order
    pub fn constraint_labels(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.primary_key {
            flags.push("PRIMARY KEY");
        }
        if self.unique {
            flags.push("UNIQUE");
        }
        if self.not_null {
            flags.push("NOT NULL");
        }
        flags
    }
}

/// Table schema - the ordered, fixed set of columns of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<Column>", into = "Vec<Column>")]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Create a schema from a list of columns
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let name_to_index = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.name.clone(), i))
            .collect();
        Self {
            columns,
            name_to_index,
        }
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// The first column flagged as primary key, if any
    pub fn primary_key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The first column name declared more than once, if any
    pub fn duplicate_column(&self) -> Option<&str> {
        if self.name_to_index.len() == self.columns.len() {
            return None;
        }
        self.columns
            .iter()
            .enumerate()
            .find(|(i, c)| self.name_to_index.get(&c.name) != Some(i))
            .map(|(_, c)| c.name.as_str())
    }
}

impl From<Vec<Column>> for Schema {
    fn from(columns: Vec<Column>) -> Self {
        Schema::from_columns(columns)
    }
}

impl From<Schema> for Vec<Column> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}
