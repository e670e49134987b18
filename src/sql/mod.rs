//! SQL emission for IP column lookups.
//!
//! This module contains the query-side pieces:
//! - Dialect hooks for placeholders, quoting and `LIKE` escaping
//! - Column and operand expressions, emitted predicates
//! - Lookup builders and the per-field lookup registry

pub mod dialect;
pub mod expr;
pub mod lookup;

// Re-export main functionality
pub use dialect::{dialect_by_name, PostgresDialect, SqlDialect, SqliteDialect};
pub use expr::{Column, Expr, Predicate, SqlParam};
pub use lookup::{LookupHandler, LookupKind, LookupRegistry};
