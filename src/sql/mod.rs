//! Shell statement parsing
//!
//! A small SQL dialect over the engine API: DDL, DML with WHERE conditions,
//! a two-table inner join and table introspection.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use parser::Parser;
