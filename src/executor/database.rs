//! Database: a named registry of tables
//!
//! Callers fetch a table by name and operate on it directly; joins live here
//! because they resolve two table names.

use super::join::{JoinInputs, JoinStrategy};
use crate::error::{Error, Result};
use crate::storage::{snapshot, Row, Table};
use indexmap::IndexMap;
use std::path::Path;
use tracing::debug;

/// Default database name
pub const DEFAULT_DATABASE: &str = "main";

/// An owned set of tables, keyed by case-sensitive name
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    /// Tables in creation order
    tables: IndexMap<String, Table>,
}

impl Database {
    /// Create an empty database
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
        }
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a table
    pub fn create_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return Err(Error::TableAlreadyExists(table.name().to_string()));
        }
        if let Some(column) = table.schema().duplicate_column() {
            return Err(Error::DuplicateColumn(column.to_string(), table.name().to_string()));
        }
        debug!(table = table.name(), columns = table.schema().column_count(), "table created");
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name for mutation
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Drop a table, returning it
    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        let table = self
            .tables
            .shift_remove(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        debug!(table = name, rows = table.len(), "table dropped");
        Ok(table)
    }

    /// List all table names, in creation order
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Iterate over the tables, in creation order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Inner join by nested-loop scan
    pub fn inner_join(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
        project: Option<&[&str]>,
    ) -> Result<Vec<Row>> {
        self.join_with(left, right, left_column, right_column, project, |_| {
            JoinStrategy::NestedLoop
        })
    }

    /// Inner join that probes the right primary-key index when joining on it.
    ///
    /// Produces exactly the rows of [`Database::inner_join`], in the same order.
    pub fn inner_join_optimized(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
        project: Option<&[&str]>,
    ) -> Result<Vec<Row>> {
        self.join_with(left, right, left_column, right_column, project, |inputs| {
            inputs.best_strategy()
        })
    }

    fn join_with(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
        project: Option<&[&str]>,
        choose: impl FnOnce(&JoinInputs<'_>) -> JoinStrategy,
    ) -> Result<Vec<Row>> {
        let inputs = JoinInputs::new(
            self.table(left)?,
            self.table(right)?,
            left_column,
            right_column,
        )?;
        let strategy = choose(&inputs);
        debug!(left, right, ?strategy, "inner join");
        let rows = inputs.execute(strategy);
        match project {
            Some(columns) => inputs.project(rows, columns),
            None => Ok(rows),
        }
    }

    /// Write the whole database as a JSON snapshot
    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        snapshot::save(self, path.as_ref())
    }

    /// Restore a database from a JSON snapshot
    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        snapshot::load(path.as_ref())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataType, TableBuilder};
    use crate::row;
    use crate::storage::Value;

    fn sample() -> Database {
        let mut db = Database::new("test");
        TableBuilder::new("users")
            .primary_key("id")
            .column("dept_id", DataType::Integer)
            .create_in(&mut db)
            .unwrap();
        TableBuilder::new("departments")
            .primary_key("id")
            .column("name", DataType::Text)
            .create_in(&mut db)
            .unwrap();

        let users = db.table_mut("users").unwrap();
        users.insert(row! { "id" => 1, "dept_id" => 10 }).unwrap();
        users.insert(row! { "id" => 2, "dept_id" => 20 }).unwrap();
        let departments = db.table_mut("departments").unwrap();
        departments.insert(row! { "id" => 10, "name" => "Eng" }).unwrap();
        departments.insert(row! { "id" => 20, "name" => "Sales" }).unwrap();
        db
    }

    #[test]
    fn test_create_and_get_table() {
        let db = sample();
        assert_eq!(db.name(), "test");
        assert_eq!(db.list_tables(), vec!["users", "departments"]);
        assert_eq!(db.table("users").unwrap().len(), 2);
        assert!(matches!(db.table("Users"), Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_table_already_exists() {
        let mut db = sample();
        let result = TableBuilder::new("users").primary_key("id").create_in(&mut db);
        assert!(matches!(result, Err(Error::TableAlreadyExists(_))));
        assert_eq!(db.table("users").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let mut db = sample();
        let result = TableBuilder::new("t")
            .column("a", DataType::Integer)
            .column("a", DataType::Text)
            .create_in(&mut db);
        assert!(matches!(
            result,
            Err(Error::DuplicateColumn(ref c, ref t)) if c == "a" && t == "t"
        ));
        assert!(!db.has_table("t"));
    }

    #[test]
    fn test_drop_table() {
        let mut db = sample();
        let dropped = db.drop_table("users").unwrap();
        assert_eq!(dropped.name(), "users");
        assert!(!db.has_table("users"));
        assert!(matches!(db.drop_table("users"), Err(Error::TableNotFound(_))));

        let join = db.inner_join("users", "departments", "dept_id", "id", None);
        assert!(matches!(join, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_inner_join_scenario() {
        let db = sample();
        let rows = db
            .inner_join("users", "departments", "dept_id", "id", None)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            row! {
                "users.id" => 1,
                "users.dept_id" => 10,
                "departments.id" => 10,
                "departments.name" => "Eng",
            }
        );
        assert_eq!(rows[1]["departments.name"], Value::from("Sales"));

        let optimized = db
            .inner_join_optimized("users", "departments", "dept_id", "id", None)
            .unwrap();
        assert_eq!(rows, optimized);
    }

    #[test]
    fn test_inner_join_projection() {
        let db = sample();
        let rows = db
            .inner_join_optimized(
                "users",
                "departments",
                "dept_id",
                "id",
                Some(&["users.id", "name"][..]),
            )
            .unwrap();
        assert_eq!(rows[1], row! { "users.id" => 2, "name" => "Sales" });
    }
}
