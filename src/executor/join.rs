//! Two-table inner joins
//!
//! Both algorithms emit rows keyed `<table>.<column>`, left columns first,
//! ordered by left row, then by right row within each left row.

use crate::error::{Error, Result};
use crate::storage::{Row, Table, Value};

/// How the right-hand side was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Scan every right row for every left row
    NestedLoop,
    /// Probe the right table's primary-key index once per left row
    PrimaryKeyLookup,
}

/// Two resolved tables and their join columns
#[derive(Debug, Clone, Copy)]
pub struct JoinInputs<'a> {
    pub left: &'a Table,
    pub right: &'a Table,
    pub left_column: &'a str,
    pub right_column: &'a str,
}

impl<'a> JoinInputs<'a> {
    /// Resolve the join columns, failing if either is missing
    pub fn new(
        left: &'a Table,
        right: &'a Table,
        left_column: &'a str,
        right_column: &'a str,
    ) -> Result<Self> {
        for (table, column) in [(left, left_column), (right, right_column)] {
            if !table.schema().has_column(column) {
                return Err(Error::ColumnNotFound(
                    column.to_string(),
                    table.name().to_string(),
                ));
            }
        }
        Ok(Self {
            left,
            right,
            left_column,
            right_column,
        })
    }

    /// The index lookup applies only when joining on the right primary key
    pub fn best_strategy(&self) -> JoinStrategy {
        if self.right.primary_key() == Some(self.right_column) {
            JoinStrategy::PrimaryKeyLookup
        } else {
            JoinStrategy::NestedLoop
        }
    }

    /// Run the join with the given strategy
    pub fn execute(&self, strategy: JoinStrategy) -> Vec<Row> {
        match strategy {
            JoinStrategy::NestedLoop => self.nested_loop(),
            JoinStrategy::PrimaryKeyLookup => self.primary_key_lookup(),
        }
    }

    /// O(n·m) double scan
    fn nested_loop(&self) -> Vec<Row> {
        let mut result = Vec::new();
        for left_row in self.left.rows() {
            let key = join_value(left_row, self.left_column);
            for right_row in self.right.rows() {
                if key.join_eq(join_value(right_row, self.right_column)) {
                    result.push(self.joined_row(left_row, right_row));
                }
            }
        }
        result
    }

    /// O(n) probe of the right primary key; falls back when it does not apply
    fn primary_key_lookup(&self) -> Vec<Row> {
        if self.best_strategy() != JoinStrategy::PrimaryKeyLookup {
            return self.nested_loop();
        }
        let mut result = Vec::new();
        for left_row in self.left.rows() {
            let key = join_value(left_row, self.left_column);
            // the index narrows to one candidate; join_eq keeps the match exact
            if let Some(right_row) = self.right.lookup(key) {
                if key.join_eq(join_value(right_row, self.right_column)) {
                    result.push(self.joined_row(left_row, right_row));
                }
            }
        }
        result
    }

    fn joined_row(&self, left_row: &Row, right_row: &Row) -> Row {
        let mut joined = Row::with_capacity(left_row.len() + right_row.len());
        for (table, row) in [(self.left, left_row), (self.right, right_row)] {
            for column in table.schema().column_names() {
                let value = row.get(column).cloned().unwrap_or(Value::Null);
                joined.insert(format!("{}.{}", table.name(), column), value);
            }
        }
        joined
    }

    /// Qualified output keys, in output order
    pub fn output_columns(&self) -> Vec<String> {
        [self.left, self.right]
            .iter()
            .flat_map(|table| {
                table
                    .schema()
                    .column_names()
                    .into_iter()
                    .map(move |column| format!("{}.{}", table.name(), column))
            })
            .collect()
    }

    /// Reduce joined rows to the requested names.
    ///
    /// A name matches a qualified key directly or, failing that, the single
    /// key whose column part equals it. An empty list or `*` keeps rows whole.
    pub fn project<S: AsRef<str>>(&self, rows: Vec<Row>, columns: &[S]) -> Result<Vec<Row>> {
        let columns: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
        if columns.is_empty() || columns.contains(&"*") {
            return Ok(rows);
        }
        let available = self.output_columns();
        let plan = columns
            .iter()
            .map(|&name| Ok((name.to_string(), resolve_output(&available, name)?)))
            .collect::<Result<Vec<(String, String)>>>()?;

        Ok(rows
            .into_iter()
            .map(|row| {
                plan.iter()
                    .map(|(name, source)| {
                        let value = row.get(source).cloned().unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect())
    }
}

fn join_value<'r>(row: &'r Row, column: &str) -> &'r Value {
    const NULL: &Value = &Value::Null;
    row.get(column).unwrap_or(NULL)
}

fn resolve_output(available: &[String], name: &str) -> Result<String> {
    if available.iter().any(|key| key == name) {
        return Ok(name.to_string());
    }
    let suffix = format!(".{}", name);
    let mut candidates = available.iter().filter(|key| key.ends_with(&suffix));
    match (candidates.next(), candidates.next()) {
        (Some(key), None) => Ok(key.clone()),
        (Some(_), Some(_)) => Err(Error::AmbiguousColumn(name.to_string())),
        (None, _) => Err(Error::ColumnNotFound(
            name.to_string(),
            "join result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::row;

    fn users() -> Table {
        let mut table = Table::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(true),
                Column::new("name", DataType::Text),
                Column::new("dept_id", DataType::Integer),
            ],
        );
        table.insert(row! { "id" => 1, "name" => "Ann", "dept_id" => 10 }).unwrap();
        table.insert(row! { "id" => 2, "name" => "Ben", "dept_id" => 20 }).unwrap();
        table.insert(row! { "id" => 3, "name" => "Cat", "dept_id" => 10 }).unwrap();
        table.insert(row! { "id" => 4, "name" => "Dov", "dept_id" => Value::Null }).unwrap();
        table
    }

    fn depts() -> Table {
        let mut table = Table::new(
            "depts",
            vec![
                Column::new("id", DataType::Float).primary_key(true),
                Column::new("name", DataType::Text),
            ],
        );
        table.insert(row! { "id" => 20, "name" => "Sales" }).unwrap();
        table.insert(row! { "id" => 10, "name" => "Eng" }).unwrap();
        table
    }

    #[test]
    fn test_strategies_agree() {
        let (users, depts) = (users(), depts());
        let inputs = JoinInputs::new(&users, &depts, "dept_id", "id").unwrap();
        assert_eq!(inputs.best_strategy(), JoinStrategy::PrimaryKeyLookup);

        let naive = inputs.execute(JoinStrategy::NestedLoop);
        let indexed = inputs.execute(JoinStrategy::PrimaryKeyLookup);
        assert_eq!(naive, indexed);

        let names: Vec<_> = naive.iter().map(|r| r["users.name"].to_string()).collect();
        assert_eq!(names, vec!["Ann", "Ben", "Cat"]);
        assert_eq!(naive[0]["depts.id"], Value::Float(10.0));
    }

    #[test]
    fn test_reverse_join_falls_back() {
        let (users, depts) = (users(), depts());
        let inputs = JoinInputs::new(&depts, &users, "id", "dept_id").unwrap();
        assert_eq!(inputs.best_strategy(), JoinStrategy::NestedLoop);

        let rows = inputs.execute(JoinStrategy::PrimaryKeyLookup);
        assert_eq!(rows, inputs.execute(JoinStrategy::NestedLoop));
        let order: Vec<_> = rows.iter().map(|r| r["users.id"].clone()).collect();
        assert_eq!(order, vec![Value::Integer(2), Value::Integer(1), Value::Integer(3)]);
    }

    #[test]
    fn test_unknown_join_column() {
        let (users, depts) = (users(), depts());
        let result = JoinInputs::new(&users, &depts, "dept", "id");
        assert!(matches!(result, Err(Error::ColumnNotFound(ref c, _)) if c == "dept"));
    }

    #[test]
    fn test_projection() {
        let (users, depts) = (users(), depts());
        let inputs = JoinInputs::new(&users, &depts, "dept_id", "id").unwrap();
        let rows = inputs.execute(JoinStrategy::NestedLoop);

        let projected = inputs
            .project(rows.clone(), &["users.name", "dept_id"])
            .unwrap();
        assert_eq!(projected[1], row! { "users.name" => "Ben", "dept_id" => 20 });

        assert!(matches!(
            inputs.project(rows.clone(), &["name"]),
            Err(Error::AmbiguousColumn(_))
        ));
        assert!(matches!(
            inputs.project(rows.clone(), &["salary"]),
            Err(Error::ColumnNotFound(_, _))
        ));
        assert_eq!(inputs.project(rows.clone(), &["*"]).unwrap(), rows);
    }
}
