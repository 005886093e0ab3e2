//! Primary-key and uniqueness indexes
//!
//! A table keeps one primary-key index (key value to row position) and one
//! uniqueness set per UNIQUE column other than the primary key. Both are
//! derived entirely from the row sequence and can be rebuilt from it.

use super::value::{Row, Value};
use crate::catalog::Schema;
use crate::error::{Constraint, Result};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Primary-key value to current row position
#[derive(Debug, Clone)]
pub struct PrimaryKeyIndex {
    column: String,
    positions: HashMap<Value, usize>,
}

impl PrimaryKeyIndex {
    /// The indexed column
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Position of the row holding `key`
    pub fn get(&self, key: &Value) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Check if `key` is in use
    pub fn contains(&self, key: &Value) -> bool {
        self.positions.contains_key(key)
    }
}

/// All index structures of one table
#[derive(Debug, Clone)]
pub struct TableIndexes {
    primary: Option<PrimaryKeyIndex>,
    unique: IndexMap<String, HashSet<Value>>,
}

impl TableIndexes {
    /// Create empty indexes for a schema
    pub fn new(schema: &Schema) -> Self {
        let primary = schema.primary_key_column().map(|col| PrimaryKeyIndex {
            column: col.name.clone(),
            positions: HashMap::new(),
        });
        let pk_name = primary.as_ref().map(|pk| pk.column.clone());
        let unique = schema
            .columns()
            .iter()
            .filter(|col| col.is_unique() && Some(&col.name) != pk_name.as_ref())
            .map(|col| (col.name.clone(), HashSet::new()))
            .collect();
        Self { primary, unique }
    }

    /// The primary-key index, if the table has a primary key
    pub fn primary(&self) -> Option<&PrimaryKeyIndex> {
        self.primary.as_ref()
    }

    /// Check whether a non-null value is already used in a unique column
    pub fn unique_contains(&self, column: &str, value: &Value) -> bool {
        self.unique
            .get(column)
            .map_or(false, |set| set.contains(value))
    }

    /// Check a row against the indexes without mutating them.
    ///
    /// Fails with the first primary-key or uniqueness collision.
    pub fn check(&self, row: &Row) -> Result<()> {
        if let Some(pk) = &self.primary {
            if let Some(key) = row.get(&pk.column) {
                if pk.contains(key) {
                    return Err(Constraint::DuplicatePrimaryKey(key.to_string()).into());
                }
            }
        }
        for column in self.unique.keys() {
            if let Some(value) = row.get(column) {
                if !value.is_null() && self.unique_contains(column, value) {
                    return Err(Constraint::DuplicateUniqueValue(column.clone()).into());
                }
            }
        }
        Ok(())
    }

    /// Register a row stored at `position`; the row must already pass [`check`].
    ///
    /// [`check`]: TableIndexes::check
    pub fn insert(&mut self, row: &Row, position: usize) {
        if let Some(pk) = &mut self.primary {
            if let Some(key) = row.get(&pk.column) {
                pk.positions.insert(key.clone(), position);
            }
        }
        for (column, set) in self.unique.iter_mut() {
            if let Some(value) = row.get(column) {
                if !value.is_null() {
                    set.insert(value.clone());
                }
            }
        }
    }

    /// Check and register in one step
    pub fn try_insert(&mut self, row: &Row, position: usize) -> Result<()> {
        self.check(row)?;
        self.insert(row, position);
        Ok(())
    }

    /// Forget every entry contributed by `row`
    pub fn remove(&mut self, row: &Row) {
        if let Some(pk) = &mut self.primary {
            if let Some(key) = row.get(&pk.column) {
                pk.positions.remove(key);
            }
        }
        for (column, set) in self.unique.iter_mut() {
            if let Some(value) = row.get(column) {
                set.remove(value);
            }
        }
    }

    /// Recompute every index from the row sequence
    pub fn rebuild(&mut self, rows: &[Row]) {
        if let Some(pk) = &mut self.primary {
            pk.positions.clear();
        }
        for set in self.unique.values_mut() {
            set.clear();
        }
        for (position, row) in rows.iter().enumerate() {
            self.insert(row, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::error::Error;
    use crate::row;

    fn schema() -> Schema {
        Schema::from_columns(vec![
            Column::new("id", DataType::Integer).primary_key(true),
            Column::new("email", DataType::Text).unique(true),
            Column::new("age", DataType::Integer),
        ])
    }

    #[test]
    fn test_index_layout() {
        let indexes = TableIndexes::new(&schema());
        assert_eq!(indexes.primary().unwrap().column(), "id");
        assert_eq!(indexes.unique.keys().collect::<Vec<_>>(), vec!["email"]);
    }

    #[test]
    fn test_check_and_insert() {
        let mut indexes = TableIndexes::new(&schema());
        indexes
            .try_insert(&row! { "id" => 1, "email" => "a@x.com", "age" => 3 }, 0)
            .unwrap();

        let dup_pk = indexes.check(&row! { "id" => 1, "email" => "b@x.com", "age" => 3 });
        assert!(matches!(
            dup_pk,
            Err(Error::ConstraintViolation(Constraint::DuplicatePrimaryKey(_)))
        ));

        let dup_email = indexes.check(&row! { "id" => 2, "email" => "a@x.com", "age" => 3 });
        assert!(matches!(
            dup_email,
            Err(Error::ConstraintViolation(Constraint::DuplicateUniqueValue(ref c))) if c == "email"
        ));

        // NULLs never collide
        indexes
            .try_insert(&row! { "id" => 2, "email" => Value::Null, "age" => 3 }, 1)
            .unwrap();
        indexes
            .try_insert(&row! { "id" => 3, "email" => Value::Null, "age" => 3 }, 2)
            .unwrap();
        assert_eq!(indexes.primary().unwrap().get(&Value::Integer(3)), Some(2));
    }

    #[test]
    fn test_remove_and_rebuild() {
        let mut indexes = TableIndexes::new(&schema());
        let rows = vec![
            row! { "id" => 10, "email" => "a", "age" => 1 },
            row! { "id" => 20, "email" => "b", "age" => 2 },
        ];
        indexes.rebuild(&rows);
        assert_eq!(indexes.primary().unwrap().get(&Value::Integer(20)), Some(1));

        indexes.remove(&rows[0]);
        assert!(!indexes.unique_contains("email", &Value::from("a")));
        assert!(!indexes.primary().unwrap().contains(&Value::Integer(10)));

        indexes.rebuild(&rows[1..]);
        assert_eq!(indexes.primary().unwrap().get(&Value::Integer(20)), Some(0));
        assert!(!indexes.primary().unwrap().contains(&Value::Integer(10)));
    }
}
