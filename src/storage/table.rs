//! Table storage for KeelDB
//!
//! A table owns its schema, the row sequence in insertion order and the
//! indexes derived from it. Every mutation validates first and only then
//! touches rows and indexes, so a failed call leaves the table unchanged.

use super::index::TableIndexes;
use super::value::{Row, Value};
use crate::catalog::{Column, Schema};
use crate::error::{Constraint, Error, Result};
use crate::executor::Predicate;
use tracing::trace;

/// A table combining schema, rows and indexes
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    name: String,
    /// Fixed column layout
    schema: Schema,
    /// Rows in insertion order
    rows: Vec<Row>,
    /// Primary-key and uniqueness indexes
    indexes: TableIndexes,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let schema = Schema::from_columns(columns);
        let indexes = TableIndexes::new(&schema);
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            indexes,
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Name of the primary-key column, if any
    pub fn primary_key(&self) -> Option<&str> {
        self.indexes.primary().map(|pk| pk.column())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows in insertion order
    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Validate a candidate row for insertion.
    ///
    /// Returns the full row in schema order, with omitted nullable columns
    /// set to NULL and whole numbers widened for FLOAT columns.
    pub fn validate(&self, row: Row) -> Result<Row> {
        let candidate = self.complete_row(row)?;
        self.indexes.check(&candidate)?;
        Ok(candidate)
    }

    /// Insert a row, returning its position
    pub fn insert(&mut self, row: Row) -> Result<usize> {
        let row = self.validate(row)?;
        let position = self.rows.len();
        self.indexes.insert(&row, position);
        self.rows.push(row);
        trace!(table = %self.name, position, "row inserted");
        Ok(position)
    }

    /// Select all rows, in insertion order
    pub fn select_all(&self) -> Vec<Row> {
        self.rows.clone()
    }

    /// Select the rows matching a predicate (full scan)
    pub fn select_where<P: Predicate + ?Sized>(&self, predicate: &P) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|row| predicate.evaluate(row))
            .cloned()
            .collect()
    }

    /// Fetch one row through the primary-key index
    pub fn get_by_primary_key(&self, key: &Value) -> Result<Option<Row>> {
        Ok(self.position_of(key)?.map(|position| self.rows[position].clone()))
    }

    /// Borrow the row holding `key`; `None` also when there is no primary key
    pub(crate) fn lookup(&self, key: &Value) -> Option<&Row> {
        let position = self.position_of(key).ok().flatten()?;
        self.rows.get(position)
    }

    /// Project rows to the named columns; an empty list or `*` keeps them whole
    pub fn select_columns<S: AsRef<str>>(&self, rows: Vec<Row>, columns: &[S]) -> Result<Vec<Row>> {
        let columns: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
        if columns.is_empty() || columns.contains(&"*") {
            return Ok(rows);
        }
        if let Some(unknown) = columns.iter().find(|c| !self.schema.has_column(c)) {
            return Err(Error::ColumnNotFound(unknown.to_string(), self.name.clone()));
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&name| {
                        let value = row.get(name).cloned().unwrap_or(Value::Null);
                        (name.to_string(), value)
                    })
                    .collect()
            })
            .collect())
    }

    /// Overwrite `assignments` on every row matching the predicate.
    ///
    /// The batch is all-or-nothing: every candidate row is checked against a
    /// staged copy of the indexes before any row is replaced. Returns the
    /// number of matched rows.
    pub fn update<P: Predicate + ?Sized>(&mut self, assignments: &Row, predicate: &P) -> Result<usize> {
        let assignments = self.check_assignments(assignments)?;

        let matched: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate.evaluate(row))
            .map(|(position, _)| position)
            .collect();
        if matched.is_empty() {
            return Ok(0);
        }

        let mut staged = self.indexes.clone();
        for &position in &matched {
            staged.remove(&self.rows[position]);
        }
        let mut replacements = Vec::with_capacity(matched.len());
        for &position in &matched {
            let mut candidate = self.rows[position].clone();
            for (column, value) in &assignments {
                candidate.insert(column.clone(), value.clone());
            }
            staged.try_insert(&candidate, position)?;
            replacements.push((position, candidate));
        }

        self.indexes = staged;
        for (position, candidate) in replacements {
            self.rows[position] = candidate;
        }
        trace!(table = %self.name, count = matched.len(), "rows updated");
        Ok(matched.len())
    }

    /// Remove every row matching the predicate, returning how many went
    pub fn delete<P: Predicate + ?Sized>(&mut self, predicate: &P) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate.evaluate(row));
        let removed = before - self.rows.len();
        if removed > 0 {
            // positions shifted
            self.indexes.rebuild(&self.rows);
            trace!(table = %self.name, removed, "rows deleted");
        }
        removed
    }

    /// Remove the row holding `key`; false if no row has it
    pub fn delete_by_primary_key(&mut self, key: &Value) -> Result<bool> {
        let Some(position) = self.position_of(key)? else {
            return Ok(false);
        };
        self.rows.remove(position);
        self.indexes.rebuild(&self.rows);
        trace!(table = %self.name, position, "row deleted by primary key");
        Ok(true)
    }

    /// Human-readable column listing, used by DESCRIBE
    pub fn describe(&self) -> String {
        let mut info = format!("Table: {}\n", self.name);
        info.push_str(&format!("{:<20} {:<10} {}\n", "Column", "Type", "Constraints"));
        for col in self.schema.columns() {
            let flags = col.constraint_labels();
            let flags = if flags.is_empty() {
                "-".to_string()
            } else {
                flags.join(", ")
            };
            info.push_str(&format!(
                "{:<20} {:<10} {}\n",
                col.name,
                col.data_type.to_string(),
                flags
            ));
        }
        info.push_str(&format!("Total rows: {}\n", self.rows.len()));
        info
    }

    fn position_of(&self, key: &Value) -> Result<Option<usize>> {
        let pk = self
            .indexes
            .primary()
            .ok_or_else(|| Error::NoPrimaryKey(self.name.clone()))?;
        let Some(column) = self.schema.get_column(pk.column()) else {
            return Ok(None);
        };
        Ok(key
            .probe_key(column.data_type)
            .and_then(|probe| pk.get(&probe)))
    }

    /// Fill in omitted columns and type-check every value
    fn complete_row(&self, mut row: Row) -> Result<Row> {
        if let Some(unknown) = row.keys().find(|k| !self.schema.has_column(k)) {
            return Err(Error::ColumnNotFound(unknown.clone(), self.name.clone()));
        }
        let mut complete = Row::with_capacity(self.schema.column_count());
        for col in self.schema.columns() {
            let value = match row.swap_remove(&col.name) {
                Some(value) => self.check_value(col, value)?,
                None if col.is_required() => {
                    return Err(Constraint::MissingRequiredColumn(col.name.clone()).into())
                }
                None => Value::Null,
            };
            complete.insert(col.name.clone(), value);
        }
        Ok(complete)
    }

    /// Type-check a partial row of assignments
    fn check_assignments(&self, assignments: &Row) -> Result<Row> {
        assignments
            .iter()
            .map(|(name, value)| {
                let col = self
                    .schema
                    .get_column(name)
                    .ok_or_else(|| Error::ColumnNotFound(name.clone(), self.name.clone()))?;
                Ok((name.clone(), self.check_value(col, value.clone())?))
            })
            .collect()
    }

    fn check_value(&self, col: &Column, value: Value) -> Result<Value> {
        if value.is_null() && col.is_required() {
            return Err(Constraint::NullValue(col.name.clone()).into());
        }
        // JSON snapshots cannot represent NaN or infinities
        let finite = !matches!(value, Value::Float(f) if !f.is_finite());
        value
            .coerce_to(col.data_type)
            .filter(|_| finite)
            .ok_or_else(|| Error::TypeMismatch {
                column: col.name.clone(),
                expected: col.data_type.to_string(),
                found: value.describe(),
            })
    }
}
