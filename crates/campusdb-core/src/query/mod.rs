/// Statement parsing
///
/// Lexer, typed statement tree and parser for the pseudo-SQL subset the
/// store understands.
/// Typed statement tree
#[allow(missing_docs)]
pub mod ast;
/// Statement lexer
#[allow(missing_docs)]
pub mod lexer;
/// Statement parser
#[allow(missing_docs)]
pub mod parser;

// Re-export main types
pub use ast::*;
pub use lexer::{Lexeme, Lexer, LexerError, Token};
pub use parser::{ParseError, Parser};

/// Parses one statement.
pub fn parse(input: &str) -> Result<Statement, ParseError> {
    Parser::new(input)?.parse()
}
