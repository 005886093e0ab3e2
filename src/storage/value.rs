//! Value and Row types for KeelDB
//!
//! This module defines how data values and rows are represented in memory.

use crate::catalog::DataType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A row: column name to value, keys kept in schema order.
///
/// Equality ignores key order.
pub type Row = IndexMap<String, Value>;

/// Build a [`Row`] from `name => value` pairs.
///
/// ```
/// use keeldb::{row, Value};
/// let r = row! { "id" => 1, "name" => "Alice", "email" => Value::Null };
/// assert_eq!(r["id"], Value::Integer(1));
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::storage::Row::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::storage::Row::new();
        $( row.insert(($name).to_string(), $crate::storage::Value::from($value)); )+
        row
    }};
}

/// A value in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// Text value
    Text(String),
}

// Floats compare by bit pattern so values can key the hash indexes
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
        }
    }

    /// Type name plus literal, for error messages
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Text(s) => format!("TEXT '{}'", s),
            other => format!("{} {}", other.type_name(), other),
        }
    }

    /// The value as stored in a column of `data_type`, or `None` on a type mismatch.
    ///
    /// NULL passes for every type; whole numbers widen into FLOAT columns.
    pub fn coerce_to(&self, data_type: DataType) -> Option<Value> {
        match (self, data_type) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Integer(_), DataType::Integer)
            | (Value::Float(_), DataType::Float)
            | (Value::Text(_), DataType::Text)
            | (Value::Boolean(_), DataType::Boolean) => Some(self.clone()),
            (Value::Integer(i), DataType::Float) => Some(Value::Float(*i as f64)),
            _ => None,
        }
    }

    /// The index key under which a column of `data_type` would store a value
    /// equal to this one.
    ///
    /// Unlike [`Value::coerce_to`] this also narrows integral floats, so a
    /// FLOAT probe can find an INTEGER key.
    pub fn probe_key(&self, data_type: DataType) -> Option<Value> {
        match (self, data_type) {
            (Value::Float(f), DataType::Integer) => {
                let narrowed = *f as i64;
                ((narrowed as f64).to_bits() == f.to_bits()).then_some(Value::Integer(narrowed))
            }
            (Value::Null, _) => None,
            _ => self.coerce_to(data_type),
        }
    }

    /// Join equality: NULL never matches, INTEGER and FLOAT match only when
    /// they denote exactly the same number.
    pub fn join_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                (*i as f64).to_bits() == f.to_bits() && *f as i64 == *i
            }
            (a, b) => a == b,
        }
    }

    /// Compare two values (for WHERE clauses)
    ///
    /// NULL and values of incompatible types have no ordering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
