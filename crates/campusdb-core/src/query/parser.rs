/// Parser for pseudo-SQL statements
///
/// Converts a stream of tokens into a typed [`Statement`]. The grammar is
/// deliberately small:
///
/// ```text
/// SELECT ( * | col, ... ) FROM table [WHERE col = operand]
/// INSERT INTO table (col, ...) [VALUES (?, ...)]
/// UPDATE table SET col = operand, ... [WHERE col = operand]
/// DELETE FROM table [WHERE col = operand]
/// ```
///
/// A WHERE clause holds exactly one equality; AND/OR, ORDER BY, LIMIT and
/// joins are rejected rather than ignored. Column names may be any bare word,
/// keywords included, since records are open field maps.
use super::ast::*;
use super::lexer::{Lexeme, Lexer, LexerError, Token};
use crate::value::Value;
use std::fmt;

/// Parser for pseudo-SQL statements
pub struct Parser {
    input: String,
    tokens: Vec<Lexeme>,
    position: usize,
}

impl Parser {
    /// Create a new parser from statement text
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.lexemes().map_err(ParseError::LexerError)?;
        Ok(Self {
            input: input.trim().to_string(),
            tokens,
            position: 0,
        })
    }

    /// Parse the statement
    pub fn parse(&mut self) -> Result<Statement, ParseError> {
        let statement = match self.current_token() {
            Token::Select => Statement::Select(self.parse_select()?),
            Token::Insert => Statement::Insert(self.parse_insert()?),
            Token::Update => Statement::Update(self.parse_update()?),
            Token::Delete => Statement::Delete(self.parse_delete()?),
            _ => return Err(ParseError::UnsupportedOperation(self.input.clone())),
        };

        self.parse_end()?;
        Ok(statement)
    }

    fn parse_select(&mut self) -> Result<Select, ParseError> {
        self.expect_token(Token::Select)?;

        let projection = if self.current_token() == &Token::Asterisk {
            self.advance();
            Projection::All
        } else {
            Projection::Columns(self.parse_column_list("column name or *")?)
        };

        self.expect_token(Token::From)?;
        let table = self.parse_word("table name")?;
        let predicate = self.parse_where()?;

        Ok(Select {
            projection,
            table,
            predicate,
        })
    }

    fn parse_insert(&mut self) -> Result<Insert, ParseError> {
        self.expect_token(Token::Insert)?;
        if self.current_token() != &Token::Into {
            return Err(ParseError::InvalidInsert("expected INTO".to_string()));
        }
        self.advance();

        let table = self
            .parse_word("table name")
            .map_err(|_| ParseError::InvalidInsert("missing table name".to_string()))?;

        if self.current_token() != &Token::LeftParen {
            return Err(ParseError::InvalidInsert(
                "missing column list".to_string(),
            ));
        }
        self.advance();
        let columns = self.parse_column_list("column name")?;
        self.expect_token(Token::RightParen)?;

        if self.current_token() == &Token::Values {
            self.advance();
            self.expect_token(Token::LeftParen)?;
            loop {
                match self.current_token() {
                    Token::Placeholder => self.advance(),
                    Token::RightParen => break,
                    _ => {
                        return Err(ParseError::InvalidInsert(
                            "literal VALUES are not supported; bind values as parameters"
                                .to_string(),
                        ))
                    }
                }
                if self.current_token() == &Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect_token(Token::RightParen)?;
        }

        Ok(Insert { table, columns })
    }

    fn parse_update(&mut self) -> Result<Update, ParseError> {
        self.expect_token(Token::Update)?;

        let table = self
            .parse_word("table name")
            .map_err(|_| ParseError::InvalidUpdate("missing table name".to_string()))?;

        if self.current_token() != &Token::Set {
            return Err(ParseError::InvalidUpdate("missing SET clause".to_string()));
        }
        self.advance();

        let mut assignments = Vec::new();
        loop {
            let (column, value) = self
                .parse_equality()
                .map_err(|e| ParseError::InvalidUpdate(format!("malformed assignment: {}", e)))?;
            assignments.push(Assignment { column, value });

            if self.current_token() == &Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        let predicate = self.parse_where()?;

        Ok(Update {
            table,
            assignments,
            predicate,
        })
    }

    fn parse_delete(&mut self) -> Result<Delete, ParseError> {
        self.expect_token(Token::Delete)?;
        self.expect_token(Token::From)?;
        let table = self.parse_word("table name")?;
        let predicate = self.parse_where()?;

        Ok(Delete { table, predicate })
    }

    fn parse_where(&mut self) -> Result<Option<Predicate>, ParseError> {
        if self.current_token() != &Token::Where {
            return Ok(None);
        }

        self.advance();
        let (column, value) = self.parse_equality()?;

        // A quoted '?' is still a placeholder in a WHERE clause.
        let value = match value {
            Operand::Literal(Value::String(s)) if s == "?" => Operand::Placeholder,
            other => other,
        };

        Ok(Some(Predicate { column, value }))
    }

    /// `column = operand`, where the first `=` separates the two sides.
    fn parse_equality(&mut self) -> Result<(String, Operand), ParseError> {
        let column = self.parse_column("column name")?;
        self.expect_token(Token::Eq)?;
        let value = self.parse_operand()?;
        Ok((column, value))
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let operand = match self.current_token().clone() {
            Token::Placeholder => Operand::Placeholder,
            Token::String(s) | Token::Word(s) => Operand::Literal(Value::String(s)),
            Token::Integer(i) => Operand::Literal(Value::Integer(i)),
            Token::Float(f) => Operand::Literal(Value::Float(f)),
            Token::Boolean(b) => Operand::Literal(Value::Boolean(b)),
            Token::Null => Operand::Literal(Value::Null),
            token => {
                return Err(ParseError::UnexpectedToken {
                    expected: "value or ?".to_string(),
                    found: token,
                })
            }
        };
        self.advance();
        Ok(operand)
    }

    fn parse_word(&mut self, expected: &str) -> Result<String, ParseError> {
        if let Token::Word(name) = self.current_token().clone() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_token().clone(),
            })
        }
    }

    /// Any bare word, keywords and numbers included, in its source spelling.
    fn parse_column(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.tokens[self.position].word.clone() {
            Some(word) => {
                self.advance();
                Ok(word)
            }
            None => Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_token().clone(),
            }),
        }
    }

    fn parse_column_list(&mut self, expected: &str) -> Result<Vec<String>, ParseError> {
        let mut words = Vec::new();
        loop {
            words.push(self.parse_column(expected)?);

            if self.current_token() == &Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        Ok(words)
    }

    fn parse_end(&mut self) -> Result<(), ParseError> {
        if self.current_token() == &Token::Semicolon {
            self.advance();
        }

        match self.current_token() {
            Token::Eof => Ok(()),
            token if token.is_unsupported_clause() => {
                Err(ParseError::UnsupportedClause(token.to_string()))
            }
            token => Err(ParseError::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: token.clone(),
            }),
        }
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.position].token
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{}", expected),
                found: self.current_token().clone(),
            })
        }
    }
}

/// Parser errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    LexerError(LexerError),
    /// Leading keyword is not SELECT, INSERT, UPDATE or DELETE
    UnsupportedOperation(String),
    InvalidInsert(String),
    InvalidUpdate(String),
    /// AND, OR, ORDER BY, LIMIT, JOIN and friends
    UnsupportedClause(String),
    UnexpectedToken { expected: String, found: Token },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LexerError(e) => write!(f, "Lexer error: {}", e),
            ParseError::UnsupportedOperation(query) => {
                write!(f, "Unsupported SQL operation in query: {}", query)
            }
            ParseError::InvalidInsert(msg) => write!(f, "Invalid INSERT statement: {}", msg),
            ParseError::InvalidUpdate(msg) => write!(f, "Invalid UPDATE statement: {}", msg),
            ParseError::UnsupportedClause(keyword) => write!(
                f,
                "{} is not supported; a WHERE clause holds a single equality",
                keyword
            ),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "Expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ParseError {}
