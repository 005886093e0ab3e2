//! Fluent table construction

use super::schema::Column;
use super::types::DataType;
use crate::error::Result;
use crate::executor::Database;
use crate::storage::Table;

/// Builder for creating tables with a fluent API
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Start building a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a nullable column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    /// Add a primary key column (INTEGER PRIMARY KEY)
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.columns
            .push(Column::new(name, DataType::Integer).primary_key(true));
        self
    }

    /// Add a NOT NULL column
    pub fn column_not_null(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns
            .push(Column::new(name, data_type).not_null(true));
        self
    }

    /// Add a UNIQUE column
    pub fn column_unique(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column::new(name, data_type).unique(true));
        self
    }

    /// Add a fully specified column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Build the empty table
    pub fn build(self) -> Table {
        Table::new(self.name, self.columns)
    }

    /// Build the table and register it in a database
    pub fn create_in(self, db: &mut Database) -> Result<()> {
        db.create_table(self.build())
    }
}
