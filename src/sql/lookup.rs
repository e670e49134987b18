//! Lookup predicates for IP columns.
//!
//! Every lookup is a prefix match between stored representations:
//!
//! - `subnets`: `lhs LIKE escape(rhs) + '%'`
//! - `supernets`: `rhs LIKE escape(lhs) + '%'`
//! - `isprivate`: `(lhs LIKE p0 + '%' OR ... OR lhs LIKE pN + '%') = rhs`
//!
//! `subnets` and `supernets` are the same containment test with the
//! container and contained sides exchanged. Either side may be a column or
//! a literal; a literal container is escaped and bound as the pattern, a
//! column container is escaped in SQL.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::core::matcher::{normalize_rhs, private_network_reprs};
use crate::error::IpFieldError;
use crate::sql::dialect::SqlDialect;
use crate::sql::expr::{Expr, Predicate, SqlParam};
use crate::types::Operand;

/// Relationships that can be queried on an IP column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKind {
    /// Column lies within the operand
    Subnets,
    /// Column contains the operand
    Supernets,
    /// Column lies within a private range (compared against a boolean)
    IsPrivate,
}

impl LookupKind {
    /// All lookup kinds.
    pub const ALL: [LookupKind; 3] = [LookupKind::Subnets, LookupKind::Supernets, LookupKind::IsPrivate];

    /// Lookup name as written in filters (`field__subnets`).
    pub fn name(self) -> &'static str {
        match self {
            LookupKind::Subnets => "subnets",
            LookupKind::Supernets => "supernets",
            LookupKind::IsPrivate => "isprivate",
        }
    }

    /// Built-in predicate builder for this kind.
    pub fn default_handler(self) -> LookupHandler {
        match self {
            LookupKind::Subnets => subnets,
            LookupKind::Supernets => supernets,
            LookupKind::IsPrivate => is_private,
        }
    }
}

impl FromStr for LookupKind {
    type Err = IpFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| IpFieldError::InvalidOperand(format!("Unsupported lookup '{}'", s)))
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a predicate from `(dialect, lhs, rhs)`.
pub type LookupHandler = fn(&dyn SqlDialect, &Expr, &Expr) -> Result<Predicate, IpFieldError>;

/// Render the side whose value must start with the pattern.
fn compile_subject(
    dialect: &dyn SqlDialect,
    expr: &Expr,
    params: &mut Vec<SqlParam>,
) -> Result<String, IpFieldError> {
    match expr {
        Expr::Column(column) => Ok(column.to_sql(dialect)),
        Expr::Value(operand) => {
            params.push(SqlParam::Text(normalize_rhs(operand)?));
            Ok(dialect.placeholder().to_string())
        }
    }
}

/// Render the startswith operator for the side that supplies the prefix.
fn compile_pattern(
    dialect: &dyn SqlDialect,
    expr: &Expr,
    params: &mut Vec<SqlParam>,
) -> Result<String, IpFieldError> {
    match expr {
        Expr::Column(column) => Ok(dialect.startswith_pattern(&column.to_sql(dialect))),
        Expr::Value(operand) => {
            let repr = normalize_rhs(operand)?;
            // escape before appending the wildcard
            let mut pattern = dialect.escape_like(&repr);
            pattern.push('%');
            params.push(SqlParam::Text(pattern));
            Ok(dialect.startswith_operator())
        }
    }
}

/// Predicate that holds when `container` contains `contained`.
pub fn contains(
    dialect: &dyn SqlDialect,
    container: &Expr,
    contained: &Expr,
) -> Result<Predicate, IpFieldError> {
    let mut params = Vec::with_capacity(2);
    let subject = compile_subject(dialect, contained, &mut params)?;
    let operator = compile_pattern(dialect, container, &mut params)?;

    Ok(Predicate::new(format!("{} {}", subject, operator), params))
}

/// `lhs` lies within `rhs`.
pub fn subnets(dialect: &dyn SqlDialect, lhs: &Expr, rhs: &Expr) -> Result<Predicate, IpFieldError> {
    contains(dialect, rhs, lhs)
}

/// `lhs` contains `rhs`.
pub fn supernets(dialect: &dyn SqlDialect, lhs: &Expr, rhs: &Expr) -> Result<Predicate, IpFieldError> {
    contains(dialect, lhs, rhs)
}

/// Whether `lhs` lies within a private range equals the boolean `rhs`.
pub fn is_private(dialect: &dyn SqlDialect, lhs: &Expr, rhs: &Expr) -> Result<Predicate, IpFieldError> {
    let reprs = private_network_reprs();
    let mut params = Vec::with_capacity(reprs.len() * 2 + 1);
    let mut clauses = Vec::with_capacity(reprs.len());

    for repr in reprs {
        let subject = compile_subject(dialect, lhs, &mut params)?;
        let mut pattern = dialect.escape_like(repr);
        pattern.push('%');
        params.push(SqlParam::Text(pattern));
        clauses.push(format!("{} {}", subject, dialect.startswith_operator()));
    }

    let rhs_sql = match rhs {
        Expr::Value(Operand::Bool(value)) => {
            params.push(SqlParam::Bool(*value));
            dialect.placeholder().to_string()
        }
        Expr::Column(column) => column.to_sql(dialect),
        Expr::Value(other) => {
            return Err(IpFieldError::InvalidOperand(format!(
                "isprivate requires a boolean, got {}",
                other.kind_name()
            )));
        }
    };

    Ok(Predicate::new(format!("({}) = {}", clauses.join(" OR "), rhs_sql), params))
}

/// Explicit mapping from lookup kind to predicate builder.
///
/// Each field owns one; only the kinds registered on it can be queried.
#[derive(Clone)]
pub struct LookupRegistry {
    handlers: BTreeMap<LookupKind, LookupHandler>,
}

impl LookupRegistry {
    /// Registry with no lookups.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registry with the built-in handlers for `kinds`.
    pub fn with_kinds(kinds: &[LookupKind]) -> Self {
        let mut registry = Self::new();
        for kind in kinds {
            registry.register(*kind, kind.default_handler());
        }
        registry
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(&mut self, kind: LookupKind, handler: LookupHandler) -> Option<LookupHandler> {
        self.handlers.insert(kind, handler)
    }

    /// Handler registered for `kind`.
    pub fn handler(&self, kind: LookupKind) -> Option<LookupHandler> {
        self.handlers.get(&kind).copied()
    }

    /// Whether `kind` is registered.
    pub fn supports(&self, kind: LookupKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Registered kinds, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = LookupKind> + '_ {
        self.handlers.keys().copied()
    }

    /// Build the predicate for `kind`.
    pub fn build(
        &self,
        kind: LookupKind,
        dialect: &dyn SqlDialect,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Predicate, IpFieldError> {
        let handler = self.handler(kind).ok_or_else(|| {
            IpFieldError::InvalidOperand(format!("Unsupported lookup '{}' for this field", kind))
        })?;

        let predicate = handler(dialect, lhs, rhs)?;
        debug!(
            lookup = %kind,
            dialect = dialect.name(),
            params = predicate.param_count(),
            "built lookup predicate"
        );
        Ok(predicate)
    }

    /// Build the predicate for a lookup given by name.
    pub fn build_by_name(
        &self,
        name: &str,
        dialect: &dyn SqlDialect,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Predicate, IpFieldError> {
        self.build(name.parse()?, dialect, lhs, rhs)
    }
}

impl Default for LookupRegistry {
    fn default() -> Self {
        Self::with_kinds(&LookupKind::ALL)
    }
}

impl fmt::Debug for LookupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::{PostgresDialect, SqliteDialect};

    #[test]
    fn test_lookup_names() {
        for kind in LookupKind::ALL {
            assert_eq!(kind.name().parse::<LookupKind>().unwrap(), kind);
        }
        assert!("contains".parse::<LookupKind>().is_err());
    }

    #[test]
    fn test_subnets_with_literal() {
        let predicate = subnets(&SqliteDialect, &Expr::column("field"), &Expr::value("192.168.0.0/16")).unwrap();

        assert_eq!(predicate.sql, "\"field\" LIKE ? ESCAPE '\\'");
        assert_eq!(predicate.params, vec![SqlParam::Text("41100000010101000%".to_string())]);
    }

    #[test]
    fn test_supernets_with_literal() {
        let predicate = supernets(&SqliteDialect, &Expr::column("field"), &Expr::value("192.168.1.0/24")).unwrap();

        assert_eq!(
            predicate.sql,
            "? LIKE REPLACE(REPLACE(REPLACE(\"field\", '\\', '\\\\'), '%', '\\%'), '_', '\\_') || '%' ESCAPE '\\'"
        );
        assert_eq!(
            predicate.params,
            vec![SqlParam::Text("4110000001010100000000001".to_string())]
        );
    }

    #[test]
    fn test_subnets_with_column_on_both_sides() {
        let predicate = subnets(
            &PostgresDialect,
            &Expr::column("inner.net"),
            &Expr::column("outer.net"),
        )
        .unwrap();

        assert!(predicate.sql.starts_with("\"inner\".\"net\" LIKE REPLACE("));
        assert!(predicate.sql.contains("\"outer\".\"net\""));
        assert!(predicate.params.is_empty());
    }

    #[test]
    fn test_is_private_shape() {
        let predicate = is_private(&SqliteDialect, &Expr::column("field"), &Expr::value(true)).unwrap();

        assert_eq!(predicate.sql.matches(" OR ").count(), 4);
        assert!(predicate.sql.starts_with("(\"field\" LIKE ? ESCAPE '\\' OR "));
        assert!(predicate.sql.ends_with(") = ?"));
        assert_eq!(predicate.params.len(), 6);
        assert_eq!(predicate.params[1], SqlParam::Text("400001010%".to_string()));
        assert_eq!(predicate.params[5], SqlParam::Bool(true));
    }

    #[test]
    fn test_is_private_with_literal_lhs() {
        let predicate = is_private(&PostgresDialect, &Expr::value("10.1.2.3"), &Expr::value(false)).unwrap();

        // one subject and one pattern per private range, then the boolean
        assert_eq!(predicate.params.len(), 11);
        assert_eq!(predicate.params[10], SqlParam::Bool(false));
    }

    #[test]
    fn test_is_private_against_boolean_column() {
        let predicate = is_private(&SqliteDialect, &Expr::column("netfield"), &Expr::column("boolfield")).unwrap();
        assert!(predicate.sql.ends_with(") = \"boolfield\""));
        assert_eq!(predicate.params.len(), 5);
    }

    #[test]
    fn test_is_private_rejects_non_boolean() {
        let err = is_private(&SqliteDialect, &Expr::column("field"), &Expr::value("10.0.0.0/8")).unwrap_err();
        assert!(matches!(err, IpFieldError::InvalidOperand(_)));
    }

    #[test]
    fn test_invalid_operand_rejected_before_sql() {
        let err = subnets(&SqliteDialect, &Expr::column("field"), &Expr::value("192.168.1.0.1")).unwrap_err();
        assert!(matches!(err, IpFieldError::InvalidOperand(_)));
    }

    #[test]
    fn test_registry_restricts_kinds() {
        let registry = LookupRegistry::with_kinds(&[LookupKind::IsPrivate]);

        assert!(registry.supports(LookupKind::IsPrivate));
        assert!(!registry.supports(LookupKind::Supernets));
        assert!(registry
            .build(LookupKind::Supernets, &SqliteDialect, &Expr::column("f"), &Expr::value("10.0.0.0/8"))
            .is_err());
        assert!(registry
            .build_by_name("isprivate", &SqliteDialect, &Expr::column("f"), &Expr::value(true))
            .is_ok());
    }

    #[test]
    fn test_registry_override() {
        fn always_true(_: &dyn SqlDialect, _: &Expr, _: &Expr) -> Result<Predicate, IpFieldError> {
            Ok(Predicate::new("1 = 1".to_string(), Vec::new()))
        }

        let mut registry = LookupRegistry::default();
        assert!(registry.register(LookupKind::Subnets, always_true).is_some());

        let predicate = registry
            .build(LookupKind::Subnets, &SqliteDialect, &Expr::column("f"), &Expr::value("10.0.0.0/8"))
            .unwrap();
        assert_eq!(predicate.sql, "1 = 1");
        assert_eq!(format!("{:?}", registry), "{Subnets, Supernets, IsPrivate}");
    }
}
