//! Lookup operands and emitted predicates.

use std::fmt;

use crate::sql::dialect::SqlDialect;
use crate::types::Operand;

/// A column reference, optionally qualified by its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Table name or alias
    pub table: Option<String>,
    /// Column name
    pub name: String,
}

impl Column {
    /// Unqualified column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Column qualified by a table name or alias.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Parse `table.column` or `column`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((table, name)) => Self::qualified(table, name),
            None => Self::new(text),
        }
    }

    /// Render the quoted column reference.
    pub fn to_sql(&self, dialect: &dyn SqlDialect) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", dialect.quote_name(table), dialect.quote_name(&self.name)),
            None => dialect.quote_name(&self.name),
        }
    }
}

/// One side of a lookup: a column or a literal operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Reference to a stored-representation column
    Column(Column),
    /// Literal value, bound as a parameter
    Value(Operand),
}

impl Expr {
    /// Shorthand for a column expression.
    pub fn column(name: &str) -> Self {
        Expr::Column(Column::parse(name))
    }

    /// Shorthand for a literal expression.
    pub fn value(operand: impl Into<Operand>) -> Self {
        Expr::Value(operand.into())
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Column(column)
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Text: a stored representation or a `LIKE` pattern
    Text(String),
    /// Boolean
    Bool(bool),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(text) => write!(f, "'{}'", text),
            SqlParam::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// A comparison predicate with its positional parameters.
///
/// The caller assembles the final statement and binds `params` in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// SQL fragment with positional placeholders
    pub sql: String,
    /// Parameters in placeholder order
    pub params: Vec<SqlParam>,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(sql: String, params: Vec<SqlParam>) -> Self {
        Self { sql, params }
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
