//! Shell Abstract Syntax Tree (AST)
//!
//! Statements carry literal values and engine predicates directly; there is
//! no expression evaluation beyond what [`Condition`] supports.

use crate::catalog::Column;
use crate::executor::Condition;
use crate::storage::Value;

/// A shell statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(String),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// SHOW TABLES
    ShowTables,
    /// DESCRIBE table
    Describe(String),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub columns: Vec<Column>,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    /// Explicit column list; `None` means every column in schema order
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Value>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Projected column names; empty for `*`
    pub columns: Vec<String>,
    pub from: String,
    pub join: Option<JoinClause>,
    pub where_clause: Option<Condition>,
}

/// `[INNER] JOIN <table> ON <left> = <right>`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table_name: String,
    /// Join column on the FROM table
    pub left_column: String,
    /// Join column on the joined table
    pub right_column: String,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub assignments: Vec<(String, Value)>,
    pub where_clause: Option<Condition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub where_clause: Option<Condition>,
}
