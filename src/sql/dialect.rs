//! SQL dialect hooks used by lookup predicates.
//!
//! A dialect supplies the few database-specific fragments a prefix match
//! needs: the placeholder token, identifier quoting, `LIKE` escaping, and the
//! two forms of the startswith operator (against a bound pattern and against
//! another SQL expression).

/// Database-specific SQL fragments for prefix matching.
pub trait SqlDialect {
    /// Short dialect name.
    fn name(&self) -> &'static str;

    /// Positional placeholder for one bound parameter.
    fn placeholder(&self) -> &'static str;

    /// Escape character used in `LIKE` patterns.
    fn like_escape(&self) -> char {
        '\\'
    }

    /// Quote an identifier.
    fn quote_name(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Neutralize `LIKE` wildcards and the escape character in `value`.
    fn escape_like(&self, value: &str) -> String {
        let escape = self.like_escape();
        let mut escaped = String::with_capacity(value.len());

        for ch in value.chars() {
            if ch == escape || ch == '%' || ch == '_' {
                escaped.push(escape);
            }
            escaped.push(ch);
        }

        escaped
    }

    /// Startswith operator whose pattern is a bound parameter.
    ///
    /// The parameter must already be escaped and carry its trailing `%`.
    fn startswith_operator(&self) -> String;

    /// Startswith operator whose prefix is the SQL expression `rhs_sql`.
    ///
    /// The expression is escaped in SQL before the wildcard is appended.
    fn startswith_pattern(&self, rhs_sql: &str) -> String;
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self) -> &'static str {
        "?"
    }

    fn startswith_operator(&self) -> String {
        format!("LIKE {} ESCAPE '\\'", self.placeholder())
    }

    fn startswith_pattern(&self, rhs_sql: &str) -> String {
        format!(
            "LIKE REPLACE(REPLACE(REPLACE({}, '\\', '\\\\'), '%', '\\%'), '_', '\\_') || '%' ESCAPE '\\'",
            rhs_sql
        )
    }
}

/// PostgreSQL, with `%s` placeholders as used by client libraries that
/// interpolate parameters positionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self) -> &'static str {
        "%s"
    }

    fn startswith_operator(&self) -> String {
        format!("LIKE {}", self.placeholder())
    }

    fn startswith_pattern(&self, rhs_sql: &str) -> String {
        format!(
            "LIKE REPLACE(REPLACE(REPLACE({}, E'\\\\', E'\\\\\\\\'), E'%', E'\\\\%'), E'_', E'\\\\_') || '%'",
            rhs_sql
        )
    }
}

/// Look up a built-in dialect by name.
pub fn dialect_by_name(name: &str) -> Option<Box<dyn SqlDialect>> {
    match name.to_ascii_lowercase().as_str() {
        "sqlite" | "sqlite3" => Some(Box::new(SqliteDialect)),
        "postgres" | "postgresql" => Some(Box::new(PostgresDialect)),
        _ => None,
    }
}
