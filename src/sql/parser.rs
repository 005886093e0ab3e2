//! Shell Parser
//!
//! This module parses shell tokens into an AST.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::{Column, DataType};
use crate::error::{Error, Result};
use crate::executor::{CompareOp, Condition};
use crate::storage::Value;

/// Statement parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from statement text
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        Ok(stmt)
    }

    /// Parse multiple statements
    pub fn parse_all(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.check(&Token::Semicolon) {
                self.advance();
                continue;
            }
            statements.push(self.parse()?);
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop(),
            Token::Show => {
                self.advance();
                self.expect(&Token::Tables)?;
                Ok(Statement::ShowTables)
            }
            Token::Describe => {
                self.advance();
                self.expect_identifier().map(Statement::Describe)
            }
            Token::Eof => Err(Error::UnexpectedEof("a statement".to_string())),
            _ => Err(Error::UnexpectedToken {
                expected: "SELECT, INSERT, UPDATE, DELETE, CREATE, DROP, SHOW, or DESCRIBE"
                    .to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = if self.check(&Token::Asterisk) {
            self.advance();
            Vec::new()
        } else {
            let mut columns = vec![self.parse_column_ref()?];
            while self.check(&Token::Comma) {
                self.advance();
                columns.push(self.parse_column_ref()?);
            }
            columns
        };

        self.expect(&Token::From)?;
        let from = self.expect_identifier()?;

        let join = if self.check(&Token::Inner) || self.check(&Token::Join) {
            Some(self.parse_join(&from)?)
        } else {
            None
        };

        let where_clause = self.parse_where()?;

        Ok(SelectStatement {
            columns,
            from,
            join,
            where_clause,
        })
    }

    fn parse_join(&mut self, from: &str) -> Result<JoinClause> {
        if self.check(&Token::Inner) {
            self.advance();
        }
        self.expect(&Token::Join)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::On)?;

        let first = self.parse_qualified()?;
        self.expect(&Token::Eq)?;
        let second = self.parse_qualified()?;

        // `ON right.x = left.y` names the joined table first
        let swapped = from != table_name
            && first.0.as_deref() == Some(table_name.as_str())
            && second.0.as_deref().map_or(true, |q| q == from);
        let (left, right) = if swapped {
            (second, first)
        } else {
            (first, second)
        };

        for (qualifier, _) in [&left, &right] {
            if let Some(q) = qualifier {
                if q != from && *q != table_name {
                    return Err(Error::TableNotFound(q.clone()));
                }
            }
        }

        Ok(JoinClause {
            table_name,
            left_column: left.1,
            right_column: right.1,
        })
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        // Optional column list
        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;

        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = vec![self.parse_literal()?];
            while self.check(&Token::Comma) {
                self.advance();
                row.push(self.parse_literal()?);
            }
            self.expect(&Token::RParen)?;
            values.push(row);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push((column, value));

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;

        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    // ========== CREATE / DROP ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;

        let mut columns = vec![self.parse_column_def()?];
        while self.check(&Token::Comma) {
            self.advance();
            columns.push(self.parse_column_def()?);
        }

        self.expect(&Token::RParen)?;

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::ParseError(format!(
                    "column '{}' is declared more than once in table '{}'",
                    column.name, table_name
                )));
            }
        }

        let primary_keys = columns.iter().filter(|c| c.primary_key).count();
        if primary_keys > 1 {
            return Err(Error::ParseError(format!(
                "table '{}' declares {} primary keys",
                table_name, primary_keys
            )));
        }

        Ok(CreateTableStatement {
            table_name,
            columns,
        })
    }

    fn parse_column_def(&mut self) -> Result<Column> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut column = Column::new(name, data_type);

        // Parse column constraints
        loop {
            if self.check(&Token::Not) {
                self.advance();
                self.expect(&Token::Null)?;
                column = column.not_null(true);
            } else if self.check(&Token::Null) {
                self.advance();
            } else if self.check(&Token::Primary) {
                self.advance();
                self.expect(&Token::Key)?;
                column = column.primary_key(true);
            } else if self.check(&Token::Unique) {
                self.advance();
                column = column.unique(true);
            } else {
                break;
            }
        }

        Ok(column)
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let name = self.expect_identifier()?;
        let data_type = DataType::from_name(&name)
            .ok_or_else(|| Error::ParseError(format!("unknown data type '{}'", name)))?;

        // VARCHAR(255) and friends: the length is accepted and ignored
        if self.check(&Token::LParen) {
            self.advance();
            self.expect_integer()?;
            self.expect(&Token::RParen)?;
        }

        Ok(data_type)
    }

    fn parse_drop(&mut self) -> Result<Statement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;
        self.expect_identifier().map(Statement::DropTable)
    }

    // ========== WHERE Conditions ==========

    fn parse_where(&mut self) -> Result<Option<Condition>> {
        if self.check(&Token::Where) {
            self.advance();
            self.parse_or_condition().map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_or_condition(&mut self) -> Result<Condition> {
        let mut left = self.parse_and_condition()?;

        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and_condition()?;
            left = left.or(right);
        }

        Ok(left)
    }

    fn parse_and_condition(&mut self) -> Result<Condition> {
        let mut left = self.parse_not_condition()?;

        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_not_condition()?;
            left = left.and(right);
        }

        Ok(left)
    }

    fn parse_not_condition(&mut self) -> Result<Condition> {
        if self.check(&Token::Not) {
            self.advance();
            let inner = self.parse_not_condition()?;
            Ok(Condition::Not(Box::new(inner)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Condition> {
        if self.check(&Token::LParen) {
            self.advance();
            let inner = self.parse_or_condition()?;
            self.expect(&Token::RParen)?;
            return Ok(inner);
        }

        let column = self.parse_column_ref()?;

        // IS NULL / IS NOT NULL
        if self.check(&Token::Is) {
            self.advance();
            let negated = if self.check(&Token::Not) {
                self.advance();
                true
            } else {
                false
            };
            self.expect(&Token::Null)?;
            return Ok(Condition::IsNull { column, negated });
        }

        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Neq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Lte => CompareOp::LtEq,
            Token::Gt => CompareOp::Gt,
            Token::Gte => CompareOp::GtEq,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "comparison operator or IS".to_string(),
                    found: format!("{}", self.current()),
                })
            }
        };
        self.advance();
        let value = self.parse_literal()?;

        Ok(Condition::Compare { column, op, value })
    }

    // ========== Terminals ==========

    fn parse_literal(&mut self) -> Result<Value> {
        let value = match self.current() {
            Token::IntegerLiteral(n) => Value::Integer(*n),
            Token::FloatLiteral(n) => Value::Float(*n),
            Token::StringLiteral(s) => Value::Text(s.clone()),
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            Token::Null => Value::Null,
            Token::Eof => return Err(Error::UnexpectedEof("a literal".to_string())),
            other => {
                return Err(Error::UnexpectedToken {
                    expected: "literal".to_string(),
                    found: format!("{}", other),
                })
            }
        };
        self.advance();
        Ok(value)
    }

    /// `name` or `table.name`, split into qualifier and name
    fn parse_qualified(&mut self) -> Result<(Option<String>, String)> {
        let first = self.expect_identifier()?;
        if self.check(&Token::Dot) {
            self.advance();
            let name = self.expect_identifier()?;
            Ok((Some(first), name))
        } else {
            Ok((None, first))
        }
    }

    /// `name` or `table.name`, kept as written
    fn parse_column_ref(&mut self) -> Result<String> {
        Ok(match self.parse_qualified()? {
            (Some(table), name) => format!("{}.{}", table, name),
            (None, name) => name,
        })
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![self.expect_identifier()?];

        while self.check(&Token::Comma) {
            self.advance();
            identifiers.push(self.expect_identifier()?);
        }

        Ok(identifiers)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else if self.is_at_end() {
            Err(Error::UnexpectedEof(format!("{}", token)))
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("{}", token),
                found: format!("{}", self.current()),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            Token::Eof => Err(Error::UnexpectedEof("identifier".to_string())),
            other => Err(Error::UnexpectedToken {
                expected: "identifier".to_string(),
                found: format!("{}", other),
            }),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            other => Err(Error::UnexpectedToken {
                expected: "integer".to_string(),
                found: format!("{}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Statement {
        Parser::new(sql).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_create_table() {
        let stmt = parse(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email TEXT UNIQUE,
                score REAL
            )",
        );

        match stmt {
            Statement::CreateTable(s) => {
                assert_eq!(s.table_name, "users");
                assert_eq!(s.columns.len(), 4);
                assert!(s.columns[0].primary_key);
                assert!(s.columns[0].is_required());
                assert_eq!(s.columns[1].data_type, DataType::Text);
                assert!(s.columns[1].not_null);
                assert!(s.columns[2].unique);
                assert_eq!(s.columns[3].data_type, DataType::Float);
            }
            _ => panic!("Expected CREATE TABLE statement"),
        }
    }

    #[test]
    fn test_parse_create_rejects_bad_types() {
        let result = Parser::new("CREATE TABLE t (id BLOB)").unwrap().parse();
        assert!(matches!(result, Err(Error::ParseError(_))));

        let result = Parser::new("CREATE TABLE t (a INT PRIMARY KEY, b INT PRIMARY KEY)")
            .unwrap()
            .parse();
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_create_rejects_duplicate_columns() {
        let result = Parser::new("CREATE TABLE t (a INT, a TEXT)").unwrap().parse();
        match result {
            Err(Error::ParseError(msg)) => assert!(msg.contains("'a'"), "{}", msg),
            other => panic!("expected parse error, got {:?}", other),
        }

        // names are case-sensitive
        assert!(Parser::new("CREATE TABLE t (a INT, A TEXT)").unwrap().parse().is_ok());
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse("INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, NULL)");

        match stmt {
            Statement::Insert(s) => {
                assert_eq!(s.table_name, "users");
                assert_eq!(s.columns, Some(vec!["id".to_string(), "name".to_string()]));
                assert_eq!(s.values.len(), 2);
                assert_eq!(s.values[0][1], Value::from("Alice"));
                assert_eq!(s.values[1][1], Value::Null);
            }
            _ => panic!("Expected INSERT statement"),
        }
    }

    #[test]
    fn test_parse_select_with_where() {
        let stmt = parse("SELECT id, name FROM users WHERE age >= 18 AND NOT name IS NULL;");

        match stmt {
            Statement::Select(s) => {
                assert_eq!(s.columns, vec!["id", "name"]);
                assert_eq!(s.from, "users");
                let expected = Condition::compare("age", CompareOp::GtEq, 18).and(
                    Condition::Not(Box::new(Condition::IsNull {
                        column: "name".to_string(),
                        negated: false,
                    })),
                );
                assert_eq!(s.where_clause, Some(expected));
            }
            _ => panic!("Expected SELECT statement"),
        }
    }

    #[test]
    fn test_condition_precedence() {
        let stmt = parse("DELETE FROM t WHERE a = 1 OR b = 2 AND (c = 3 OR d <> 4)");

        match stmt {
            Statement::Delete(s) => {
                let a = Condition::compare("a", CompareOp::Eq, 1);
                let b = Condition::compare("b", CompareOp::Eq, 2);
                let c = Condition::compare("c", CompareOp::Eq, 3);
                let d = Condition::compare("d", CompareOp::NotEq, 4);
                assert_eq!(s.where_clause, Some(a.or(b.and(c.or(d)))));
            }
            _ => panic!("Expected DELETE statement"),
        }
    }

    #[test]
    fn test_parse_join() {
        let stmt = parse(
            "SELECT users.name, departments.name FROM users \
             INNER JOIN departments ON departments.id = users.dept_id",
        );

        match stmt {
            Statement::Select(s) => {
                assert_eq!(s.columns, vec!["users.name", "departments.name"]);
                let join = s.join.unwrap();
                assert_eq!(join.table_name, "departments");
                assert_eq!(join.left_column, "dept_id");
                assert_eq!(join.right_column, "id");
            }
            _ => panic!("Expected SELECT statement"),
        }

        let result = Parser::new("SELECT * FROM a JOIN b ON c.x = b.y").unwrap().parse();
        assert!(matches!(result, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_parse_update_and_misc() {
        match parse("UPDATE users SET age = 31, active = TRUE WHERE id = 1") {
            Statement::Update(s) => {
                assert_eq!(s.assignments.len(), 2);
                assert_eq!(s.assignments[1], ("active".to_string(), Value::Boolean(true)));
                assert!(s.where_clause.unwrap().as_equality().is_some());
            }
            _ => panic!("Expected UPDATE statement"),
        }

        assert_eq!(parse("SHOW TABLES"), Statement::ShowTables);
        assert_eq!(parse("DESC users"), Statement::Describe("users".to_string()));
        assert_eq!(parse("DROP TABLE users"), Statement::DropTable("users".to_string()));

        let all = Parser::new("SHOW TABLES; DESCRIBE t;").unwrap().parse_all().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Parser::new("SELECT FROM").unwrap().parse(),
            Err(Error::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::new("INSERT INTO t VALUES (1").unwrap().parse(),
            Err(Error::UnexpectedEof(_))
        ));
    }
}
