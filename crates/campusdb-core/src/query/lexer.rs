/// Lexer for tokenizing pseudo-SQL statements
///
/// Words are whitespace-delimited runs of text; a word is a keyword when it
/// matches one case-insensitively, and a number only when it reads back to
/// exactly the same text. Everything else stays a bare word so values such as
/// `student-1` or `2024-01-01` keep their spelling.
use std::fmt;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Statement keywords
    Select,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    From,
    Where,

    // Keywords outside the grammar, lexed so the parser can name them
    And,
    Or,
    Not,
    Order,
    Group,
    Limit,
    Join,

    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,

    // Identifiers and bare values
    Word(String),

    // Punctuation
    Asterisk,    // *
    Comma,       // ,
    LeftParen,   // (
    RightParen,  // )
    Eq,          // =
    Placeholder, // ?
    Semicolon,   // ;

    // End of input
    Eof,
}

impl Token {
    /// Whether the token is a keyword outside the supported grammar.
    pub fn is_unsupported_clause(&self) -> bool {
        matches!(
            self,
            Token::And | Token::Or | Token::Not | Token::Order | Token::Group | Token::Limit | Token::Join
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "SELECT"),
            Token::Insert => write!(f, "INSERT"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Update => write!(f, "UPDATE"),
            Token::Set => write!(f, "SET"),
            Token::Delete => write!(f, "DELETE"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Order => write!(f, "ORDER"),
            Token::Group => write!(f, "GROUP"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Join => write!(f, "JOIN"),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Float(fl) => write!(f, "{}", fl),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => write!(f, "NULL"),
            Token::Word(w) => write!(f, "{}", w),
            Token::Asterisk => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Eq => write!(f, "="),
            Token::Placeholder => write!(f, "?"),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "end of statement"),
        }
    }
}

/// A token together with the bare word it was read from.
///
/// `word` is `None` for punctuation and quoted strings. Keywords keep their
/// source spelling here so a field named `group` or `values` can still be
/// used where a column name is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub word: Option<String>,
}

impl From<Token> for Lexeme {
    fn from(token: Token) -> Self {
        Self { token, word: None }
    }
}

/// Lexer state
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.next_lexeme().map(|lexeme| lexeme.token)
    }

    /// Get the next token with its source word
    pub fn next_lexeme(&mut self) -> Result<Lexeme, LexerError> {
        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(Token::Eof.into());
        }

        let ch = self.current_char();

        let single = match ch {
            '*' => Some(Token::Asterisk),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            '=' => Some(Token::Eq),
            '?' => Some(Token::Placeholder),
            ';' => Some(Token::Semicolon),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token.into());
        }

        if ch == '\'' || ch == '"' {
            return self.read_string(ch).map(Lexeme::from);
        }

        Ok(self.read_word())
    }

    /// Tokenize entire input into vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        Ok(self
            .lexemes()?
            .into_iter()
            .map(|lexeme| lexeme.token)
            .collect())
    }

    /// Tokenize entire input, keeping each token's source word
    pub fn lexemes(&mut self) -> Result<Vec<Lexeme>, LexerError> {
        let mut lexemes = Vec::new();
        loop {
            let lexeme = self.next_lexeme()?;
            let done = lexeme.token == Token::Eof;
            lexemes.push(lexeme);
            if done {
                break;
            }
        }
        Ok(lexemes)
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let open = self.position;
        self.advance(); // skip opening quote
        let start = self.position;

        while self.position < self.input.len() && self.current_char() != quote {
            self.advance();
        }

        if self.position >= self.input.len() {
            return Err(LexerError::UnterminatedString(open));
        }

        let string: String = self.input[start..self.position].iter().collect();
        self.advance(); // skip closing quote

        Ok(Token::String(string))
    }

    fn read_word(&mut self) -> Lexeme {
        let start = self.position;

        while self.position < self.input.len() && is_word_char(self.current_char()) {
            self.advance();
        }

        let text: String = self.input[start..self.position].iter().collect();

        let token = match text.to_uppercase().as_str() {
            "SELECT" => Token::Select,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "UPDATE" => Token::Update,
            "SET" => Token::Set,
            "DELETE" => Token::Delete,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "ORDER" => Token::Order,
            "GROUP" => Token::Group,
            "LIMIT" => Token::Limit,
            "JOIN" => Token::Join,
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            "NULL" => Token::Null,
            _ => read_number(&text).unwrap_or_else(|| Token::Word(text.clone())),
        };

        Lexeme {
            token,
            word: Some(text),
        }
    }
}

fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '*' | ',' | '(' | ')' | '=' | '?' | ';' | '\'' | '"')
}

/// Reads `text` as a number only if printing the number gives `text` back.
fn read_number(text: &str) -> Option<Token> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(i) = text.parse::<i64>() {
        if i.to_string() == text {
            return Some(Token::Integer(i));
        }
        return None;
    }

    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.to_string() == text => Some(Token::Float(f)),
        _ => None,
    }
}

/// Lexer errors
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    /// Quote opened at the given character offset is never closed
    UnterminatedString(usize),
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnterminatedString(at) => {
                write!(f, "Unterminated string literal starting at {}", at)
            }
        }
    }
}

impl std::error::Error for LexerError {}
