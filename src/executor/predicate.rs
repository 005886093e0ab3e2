//! Row predicates
//!
//! Selection, update and deletion take any [`Predicate`]: plain closures over
//! a row, or a [`Condition`] parsed from a WHERE clause.

use crate::storage::{Row, Value};
use std::cmp::Ordering;

/// Evaluate a row snapshot to true or false
pub trait Predicate {
    fn evaluate(&self, row: &Row) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Row) -> bool,
{
    fn evaluate(&self, row: &Row) -> bool {
        self(row)
    }
}

/// Matches every row
#[derive(Debug, Clone, Copy, Default)]
pub struct All;

impl Predicate for All {
    fn evaluate(&self, _row: &Row) -> bool {
        true
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::NotEq => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtEq => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::GtEq => ordering != Ordering::Less,
        }
    }
}

/// A boolean condition over column values
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> literal`; NULL or incomparable operands never match
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    /// `column IS NULL` / `column IS NOT NULL`
    IsNull { column: String, negated: bool },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Shorthand for `column <op> value`
    pub fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// If this is exactly `column = literal`, return both
    pub fn as_equality(&self) -> Option<(&str, &Value)> {
        match self {
            Condition::Compare {
                column,
                op: CompareOp::Eq,
                value,
            } => Some((column, value)),
            _ => None,
        }
    }
}

impl Predicate for Condition {
    fn evaluate(&self, row: &Row) -> bool {
        match self {
            Condition::Compare { column, op, value } => resolve(row, column)
                .and_then(|field| field.compare(value))
                .map_or(false, |ordering| op.holds(ordering)),
            Condition::IsNull { column, negated } => {
                let is_null = resolve(row, column).map_or(true, Value::is_null);
                is_null != *negated
            }
            Condition::And(left, right) => left.evaluate(row) && right.evaluate(row),
            Condition::Or(left, right) => left.evaluate(row) || right.evaluate(row),
            Condition::Not(inner) => !inner.evaluate(row),
        }
    }
}

/// Look up a column by exact key or, in a joined row, by the single
/// qualified key `<table>.<name>`.
pub fn resolve<'r>(row: &'r Row, name: &str) -> Option<&'r Value> {
    if let Some(value) = row.get(name) {
        return Some(value);
    }
    let suffix = format!(".{}", name);
    let mut matches = row.iter().filter(|(key, _)| key.ends_with(&suffix));
    match (matches.next(), matches.next()) {
        (Some((_, value)), None) => Some(value),
        _ => None,
    }
}
