//! Error types for KeelDB
//!
//! This module defines all error types used throughout the engine, the shell
//! parser and snapshot persistence.

use thiserror::Error;

/// A rejected mutation: a not-null, primary-key or uniqueness rule was breached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Constraint {
    /// A required column was omitted from an inserted row
    #[error("column '{0}' is required but missing")]
    MissingRequiredColumn(String),
    /// A required column was given an explicit NULL
    #[error("column '{0}' cannot be NULL")]
    NullValue(String),
    /// The primary-key value is already used by another row
    #[error("primary key {0} already exists")]
    DuplicatePrimaryKey(String),
    /// The value is already used in a UNIQUE column
    #[error("duplicate value in unique column '{0}'")]
    DuplicateUniqueValue(String),
}

/// The main error type for KeelDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Lexer error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Parse error: unexpected end of input, expected {0}")]
    UnexpectedEof(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Catalog error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Catalog error: column '{0}' not found in '{1}'")]
    ColumnNotFound(String, String),

    #[error("Catalog error: column '{0}' is declared more than once in '{1}'")]
    DuplicateColumn(String, String),

    #[error("Catalog error: column '{0}' is ambiguous")]
    AmbiguousColumn(String),

    #[error("Catalog error: table '{0}' has no primary key")]
    NoPrimaryKey(String),

    // ========== Type Errors ==========
    #[error("Type error: column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    // ========== Execution Errors ==========
    #[error("Execution error: constraint violation - {0}")]
    ConstraintViolation(Constraint),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error describes a bad request rather than a process fault.
    ///
    /// Presentation layers report these back to the user verbatim.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::IoError(_) | Error::Serialization(_))
    }
}

impl From<Constraint> for Error {
    fn from(constraint: Constraint) -> Self {
        Error::ConstraintViolation(constraint)
    }
}

/// Result type alias for KeelDB operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "Catalog error: table 'users' not found");

        let err = Error::from(Constraint::DuplicateUniqueValue("email".to_string()));
        assert_eq!(
            err.to_string(),
            "Execution error: constraint violation - duplicate value in unique column 'email'"
        );
        assert_eq!(
            Constraint::NullValue("name".to_string()).to_string(),
            "column 'name' cannot be NULL"
        );
        assert_eq!(
            Error::DuplicateColumn("a".to_string(), "t".to_string()).to_string(),
            "Catalog error: column 'a' is declared more than once in 't'"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::NoPrimaryKey("logs".to_string()).is_client_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert!(!Error::from(io).is_client_error());
    }
}
