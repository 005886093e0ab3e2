//! Statement execution for the command shell
//!
//! A [`Session`] owns a [`Database`] and runs parsed statements against it
//! through the same public operations library callers use.

use super::database::Database;
use super::join::JoinInputs;
use super::predicate::{All, Condition, Predicate};
use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::sql::Parser;
use crate::storage::{Row, Table, Value};
use serde::Serialize;
use tracing::debug;

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE)
    pub affected_rows: usize,
    /// Message
    pub message: Option<String>,
}

impl QueryResult {
    /// Create a new empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: None,
        }
    }

    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            affected_rows: count,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result holding rows
    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            ..Self::empty()
        }
    }

    /// Format the result for a terminal: an ASCII table for row results,
    /// otherwise the message.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return match &self.message {
                Some(msg) => format!("{}\n", msg),
                None => String::new(),
            };
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c).map_or_else(|| "NULL".to_string(), |v| v.to_string()))
                    .collect()
            })
            .collect();

        // Calculate column widths
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let separator: String = widths
            .iter()
            .map(|w| "-".repeat(*w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let separator = format!("+{}+\n", separator);

        let mut output = String::new();
        output.push_str(&separator);
        let header: String = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", header));
        output.push_str(&separator);

        for row in &cells {
            let line: String = row
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!(" {:>width$} ", v, width = *w))
                .collect::<Vec<_>>()
                .join("|");
            output.push_str(&format!("|{}|\n", line));
        }
        if !cells.is_empty() {
            output.push_str(&separator);
        }

        output.push_str(&format!("{} row(s) returned\n", self.rows.len()));
        output
    }
}

/// Runs shell statements against an owned database
#[derive(Debug, Default)]
pub struct Session {
    db: Database,
}

impl Session {
    /// Create a session over an existing database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Parse and run one statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let mut statements = Parser::new(sql)?.parse_all()?;
        if statements.len() != 1 {
            return Err(Error::ParseError(format!(
                "expected one statement, found {}",
                statements.len()
            )));
        }
        let stmt = statements.remove(0);
        self.execute_statement(stmt)
    }

    /// Parse and run every statement in `sql`, stopping at the first error
    pub fn execute_batch(&mut self, sql: &str) -> Result<Vec<QueryResult>> {
        let mut results = Vec::new();
        self.execute_each(sql, |result| results.push(result))?;
        Ok(results)
    }

    /// Parse `sql`, then run its statements in order, handing each result to
    /// `on_result` as soon as it is produced.
    ///
    /// Nothing runs if `sql` fails to parse. On an execution error the
    /// statements before it stay applied and their results have already been
    /// delivered. Returns the number of statements run.
    pub fn execute_each<F>(&mut self, sql: &str, mut on_result: F) -> Result<usize>
    where
        F: FnMut(QueryResult),
    {
        let statements = Parser::new(sql)?.parse_all()?;
        let count = statements.len();
        for stmt in statements {
            on_result(self.execute_statement(stmt)?);
        }
        Ok(count)
    }

    /// Run an already parsed statement
    pub fn execute_statement(&mut self, stmt: Statement) -> Result<QueryResult> {
        match stmt {
            Statement::CreateTable(s) => self.execute_create_table(s),
            Statement::DropTable(name) => {
                self.db.drop_table(&name)?;
                Ok(QueryResult::with_message(format!("Table '{}' dropped", name)))
            }
            Statement::Insert(s) => self.execute_insert(s),
            Statement::Select(s) => self.execute_select(s),
            Statement::Update(s) => self.execute_update(s),
            Statement::Delete(s) => self.execute_delete(s),
            Statement::ShowTables => {
                let rows = self
                    .db
                    .list_tables()
                    .into_iter()
                    .map(|name| crate::row! { "table" => name })
                    .collect();
                Ok(QueryResult::with_rows(vec!["table".to_string()], rows))
            }
            Statement::Describe(name) => {
                let table = self.db.table(&name)?;
                Ok(QueryResult::with_message(table.describe().trim_end()))
            }
        }
    }

    fn execute_create_table(&mut self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let name = stmt.table_name;
        self.db.create_table(Table::new(name.clone(), stmt.columns))?;
        Ok(QueryResult::with_message(format!("Table '{}' created", name)))
    }

    fn execute_insert(&mut self, stmt: InsertStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;
        let columns: Vec<String> = match stmt.columns {
            Some(columns) => columns,
            None => table
                .schema()
                .columns()
                .iter()
                .map(|c: &Column| c.name.clone())
                .collect(),
        };

        let mut count = 0;
        for values in stmt.values {
            if values.len() != columns.len() {
                return Err(Error::ExecutionError(format!(
                    "expected {} values, got {}",
                    columns.len(),
                    values.len()
                )));
            }
            let row: Row = columns.iter().cloned().zip(values).collect();
            table.insert(row)?;
            count += 1;
        }

        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} row(s) inserted", count),
        ))
    }

    fn execute_select(&self, stmt: SelectStatement) -> Result<QueryResult> {
        if let Some(join) = stmt.join {
            return self.execute_join(stmt.from, join, stmt.columns, stmt.where_clause);
        }

        let table = self.db.table(&stmt.from)?;
        let filter = stmt.where_clause.map(|c| unqualify(c, &stmt.from));
        let rows = match &filter {
            Some(cond) => match primary_key_equality(table, cond) {
                Some(key) => table.get_by_primary_key(key)?.into_iter().collect(),
                None => table.select_where(cond),
            },
            None => table.select_all(),
        };

        let columns: Vec<String> = stmt
            .columns
            .iter()
            .map(|c| strip_qualifier(c, &stmt.from).to_string())
            .collect();
        let rows = table.select_columns(rows, &columns)?;
        let columns = if columns.is_empty() {
            table.schema().column_names().into_iter().map(String::from).collect()
        } else {
            columns
        };
        Ok(QueryResult::with_rows(columns, rows))
    }

    fn execute_join(
        &self,
        from: String,
        join: JoinClause,
        columns: Vec<String>,
        filter: Option<Condition>,
    ) -> Result<QueryResult> {
        let rows = self.db.inner_join_optimized(
            &from,
            &join.table_name,
            &join.left_column,
            &join.right_column,
            None,
        )?;
        let rows: Vec<Row> = match &filter {
            Some(cond) => rows.into_iter().filter(|row| cond.evaluate(row)).collect(),
            None => rows,
        };

        let inputs = JoinInputs::new(
            self.db.table(&from)?,
            self.db.table(&join.table_name)?,
            &join.left_column,
            &join.right_column,
        )?;
        let rows = inputs.project(rows, &columns)?;
        let columns = if columns.is_empty() {
            inputs.output_columns()
        } else {
            columns
        };
        Ok(QueryResult::with_rows(columns, rows))
    }

    fn execute_update(&mut self, stmt: UpdateStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;
        let assignments: Row = stmt.assignments.into_iter().collect();
        let count = match stmt.where_clause {
            Some(cond) => table.update(&assignments, &unqualify(cond, &stmt.table_name))?,
            None => table.update(&assignments, &All)?,
        };
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} row(s) updated", count),
        ))
    }

    fn execute_delete(&mut self, stmt: DeleteStatement) -> Result<QueryResult> {
        let table = self.db.table_mut(&stmt.table_name)?;
        let count = match stmt.where_clause.map(|c| unqualify(c, &stmt.table_name)) {
            Some(cond) => match primary_key_equality(table, &cond).cloned() {
                Some(key) => {
                    debug!(table = %stmt.table_name, "delete by primary key");
                    usize::from(table.delete_by_primary_key(&key)?)
                }
                None => table.delete(&cond),
            },
            None => table.delete(&All),
        };
        Ok(QueryResult::with_affected_rows(
            count,
            format!("{} row(s) deleted", count),
        ))
    }
}

/// `pk = literal` where the literal already has the key column's type
fn primary_key_equality<'c>(table: &Table, cond: &'c Condition) -> Option<&'c Value> {
    let (column, value) = cond.as_equality()?;
    let pk = table.schema().primary_key_column()?;
    if pk.name != column {
        return None;
    }
    (value.coerce_to(pk.data_type).as_ref() == Some(value) && !value.is_null()).then_some(value)
}

fn strip_qualifier<'a>(column: &'a str, table: &str) -> &'a str {
    column
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(column)
}

/// Rewrite `table.column` references to plain column names
fn unqualify(cond: Condition, table: &str) -> Condition {
    match cond {
        Condition::Compare { column, op, value } => Condition::Compare {
            column: strip_qualifier(&column, table).to_string(),
            op,
            value,
        },
        Condition::IsNull { column, negated } => Condition::IsNull {
            column: strip_qualifier(&column, table).to_string(),
            negated,
        },
        Condition::And(l, r) => unqualify(*l, table).and(unqualify(*r, table)),
        Condition::Or(l, r) => unqualify(*l, table).or(unqualify(*r, table)),
        Condition::Not(inner) => Condition::Not(Box::new(unqualify(*inner, table))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Constraint;
    use crate::row;

    fn session() -> Session {
        let mut session = Session::default();
        session
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, \
                     email TEXT UNIQUE, dept_id INTEGER);
                 CREATE TABLE departments (id INTEGER PRIMARY KEY, name TEXT);
                 INSERT INTO users VALUES (1, 'Alice', 'alice@x.io', 10), (2, 'Bob', NULL, 20);
                 INSERT INTO users (id, name, dept_id) VALUES (3, 'Carol', 10);
                 INSERT INTO departments VALUES (10, 'Eng'), (20, 'Sales');",
            )
            .unwrap();
        session
    }

    #[test]
    fn test_create_insert_select() {
        let mut s = session();
        let result = s.execute("SELECT * FROM users WHERE dept_id = 10").unwrap();
        assert_eq!(result.columns, vec!["id", "name", "email", "dept_id"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1]["email"], Value::Null);

        let result = s.execute("SELECT users.name FROM users WHERE users.id = 2").unwrap();
        assert_eq!(result.rows, vec![row! { "name" => "Bob" }]);
    }

    #[test]
    fn test_insert_errors() {
        let mut s = session();
        assert!(matches!(
            s.execute("INSERT INTO users VALUES (4, 'Dan')"),
            Err(Error::ExecutionError(_))
        ));
        assert!(matches!(
            s.execute("INSERT INTO users (id, name) VALUES (1, 'Again')"),
            Err(Error::ConstraintViolation(Constraint::DuplicatePrimaryKey(_)))
        ));
        assert!(matches!(
            s.execute("INSERT INTO users (id, name) VALUES (5, NULL)"),
            Err(Error::ConstraintViolation(Constraint::NullValue(_)))
        ));
        assert!(matches!(
            s.execute("INSERT INTO users (id, name) VALUES ('x', 'Eve')"),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(s.database().table("users").unwrap().len(), 3);
    }

    #[test]
    fn test_execute_each_delivers_results_before_an_error() {
        let mut s = session();
        let mut seen = Vec::new();
        let result = s.execute_each(
            "INSERT INTO users (id, name) VALUES (4, 'Dan');
             SELECT name FROM users WHERE id = 4;
             INSERT INTO users (id, name) VALUES (4, 'Again');
             INSERT INTO users (id, name) VALUES (5, 'Eve');",
            |r| seen.push(r),
        );
        assert!(matches!(
            result,
            Err(Error::ConstraintViolation(Constraint::DuplicatePrimaryKey(_)))
        ));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].affected_rows, 1);
        assert_eq!(seen[1].rows, vec![row! { "name" => "Dan" }]);

        let users = s.database().table("users").unwrap();
        assert_eq!(users.len(), 4);
        assert!(users.get_by_primary_key(&Value::Integer(5)).unwrap().is_none());

        // a parse error runs nothing
        let mut calls = 0;
        assert!(s
            .execute_each("DELETE FROM users; SELEC 1;", |_| calls += 1)
            .is_err());
        assert_eq!(calls, 0);
        assert_eq!(s.database().table("users").unwrap().len(), 4);
    }

    #[test]
    fn test_duplicate_columns_and_number_limits() {
        let mut s = Session::default();
        assert!(matches!(
            s.execute("CREATE TABLE t (a INT, a TEXT)"),
            Err(Error::ParseError(_))
        ));
        assert!(!s.database().has_table("t"));

        s.execute("CREATE TABLE m (n INTEGER PRIMARY KEY, f FLOAT NOT NULL)")
            .unwrap();
        s.execute("INSERT INTO m VALUES (-9223372036854775808, -2.5)")
            .unwrap();
        let huge = format!("INSERT INTO m VALUES (1, 1{}.0)", "0".repeat(400));
        assert!(matches!(s.execute(&huge), Err(Error::InvalidNumber(_))));

        let result = s.execute("SELECT * FROM m WHERE n = -9223372036854775808").unwrap();
        assert_eq!(
            result.rows,
            vec![row! { "n" => i64::MIN, "f" => -2.5 }]
        );
    }

    #[test]
    fn test_update_and_delete() {
        let mut s = session();
        let result = s.execute("UPDATE users SET dept_id = 30 WHERE dept_id = 10").unwrap();
        assert_eq!(result.affected_rows, 2);

        // all-or-nothing on conflicting unique values
        assert!(s.execute("UPDATE users SET email = 'same@x.io'").is_err());
        let bob = s.execute("SELECT email FROM users WHERE id = 2").unwrap();
        assert_eq!(bob.rows[0]["email"], Value::Null);

        let result = s.execute("DELETE FROM users WHERE id = 1").unwrap();
        assert_eq!(result.affected_rows, 1);
        let result = s.execute("DELETE FROM users WHERE id = 1").unwrap();
        assert_eq!(result.affected_rows, 0);
        let result = s.execute("DELETE FROM users WHERE email IS NULL").unwrap();
        assert_eq!(result.affected_rows, 2);
        assert!(s.database().table("users").unwrap().is_empty());
    }

    #[test]
    fn test_join_select() {
        let mut s = session();
        let result = s
            .execute(
                "SELECT users.name, departments.name FROM users \
                 JOIN departments ON users.dept_id = departments.id \
                 WHERE departments.name = 'Eng'",
            )
            .unwrap();
        assert_eq!(result.columns, vec!["users.name", "departments.name"]);
        assert_eq!(
            result.rows,
            vec![
                row! { "users.name" => "Alice", "departments.name" => "Eng" },
                row! { "users.name" => "Carol", "departments.name" => "Eng" },
            ]
        );

        let all = s
            .execute("SELECT * FROM users INNER JOIN departments ON departments.id = users.dept_id")
            .unwrap();
        assert_eq!(all.rows.len(), 3);
        assert_eq!(all.columns.len(), 6);

        assert!(matches!(
            s.execute("SELECT name FROM users JOIN departments ON dept_id = id"),
            Err(Error::AmbiguousColumn(_))
        ));
    }

    #[test]
    fn test_show_describe_drop() {
        let mut s = session();
        let tables = s.execute("SHOW TABLES").unwrap();
        assert_eq!(tables.rows.len(), 2);
        assert_eq!(tables.rows[0]["table"], Value::from("users"));

        let desc = s.execute("DESCRIBE users").unwrap();
        assert!(desc.message.unwrap().contains("PRIMARY KEY"));

        s.execute("DROP TABLE departments").unwrap();
        assert!(matches!(
            s.execute("SELECT * FROM departments"),
            Err(Error::TableNotFound(_))
        ));
        assert!(matches!(
            s.execute("SHOW TABLES; SHOW TABLES"),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_render() {
        let mut s = session();
        let result = s.execute("SELECT id, name FROM users WHERE id <= 2").unwrap();
        let text = result.render();
        assert!(text.starts_with("+----+-------+\n"));
        assert!(text.contains("|  1 | Alice |"));
        assert!(text.ends_with("2 row(s) returned\n"));

        let message = QueryResult::with_affected_rows(3, "3 row(s) inserted");
        assert_eq!(message.render(), "3 row(s) inserted\n");
        assert_eq!(QueryResult::empty().render(), "");
    }
}
