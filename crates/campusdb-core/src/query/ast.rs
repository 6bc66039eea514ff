/// Typed statement tree
///
/// One statement touches one table and filters on at most one equality
/// predicate.
use crate::value::Value;
use std::fmt;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

/// Statement verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl Statement {
    /// The statement verb
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
        }
    }

    /// The target table
    pub fn table(&self) -> &str {
        match self {
            Statement::Select(s) => &s.table,
            Statement::Insert(s) => &s.table,
            Statement::Update(s) => &s.table,
            Statement::Delete(s) => &s.table,
        }
    }

    /// Number of `?` slots in the statement text
    pub fn placeholder_count(&self) -> usize {
        let predicate = |p: &Option<Predicate>| {
            p.as_ref()
                .map_or(0, |p| usize::from(p.value == Operand::Placeholder))
        };
        match self {
            Statement::Select(s) => predicate(&s.predicate),
            Statement::Insert(s) => s.columns.len(),
            Statement::Update(s) => {
                s.assignments
                    .iter()
                    .filter(|a| a.value == Operand::Placeholder)
                    .count()
                    + predicate(&s.predicate)
            }
            Statement::Delete(s) => predicate(&s.predicate),
        }
    }
}

/// SELECT ... FROM table [WHERE predicate]
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub projection: Projection,
    pub table: String,
    pub predicate: Option<Predicate>,
}

/// SELECT list. Parsed for display only: rows are returned whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// SELECT *
    All,
    /// SELECT a, b
    Columns(Vec<String>),
}

/// INSERT INTO table (columns) [VALUES (?, ...)]
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
}

/// UPDATE table SET assignments [WHERE predicate]
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<Predicate>,
}

/// DELETE FROM table [WHERE predicate]
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub predicate: Option<Predicate>,
}

/// column = operand inside SET
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Operand,
}

/// WHERE column = operand
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Operand,
}

/// Right-hand side of `=`
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `?`, bound to a positional parameter at execution
    Placeholder,
    /// Value written in the statement text
    Literal(Value),
}

// Display implementations for logging and error messages

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{}", s),
            Statement::Insert(s) => write!(f, "{}", s),
            Statement::Update(s) => write!(f, "{}", s),
            Statement::Delete(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Select => write!(f, "SELECT"),
            StatementKind::Insert => write!(f, "INSERT"),
            StatementKind::Update => write!(f, "UPDATE"),
            StatementKind::Delete => write!(f, "DELETE"),
        }
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.projection, self.table)?;
        if let Some(ref predicate) = self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        Ok(())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::All => write!(f, "*"),
            Projection::Columns(columns) => write!(f, "{}", columns.join(", ")),
        }
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = vec!["?"; self.columns.len()];
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            slots.join(", ")
        )
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", assignment.column, assignment.value)?;
        }
        if let Some(ref predicate) = self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        Ok(())
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(ref predicate) = self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Placeholder => write!(f, "?"),
            Operand::Literal(Value::String(s)) => write!(f, "'{}'", s),
            Operand::Literal(Value::Null) => write!(f, "NULL"),
            Operand::Literal(v) => write!(f, "{}", v),
        }
    }
}
