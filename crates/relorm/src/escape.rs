//! Identifier quoting and literal formatting for the active dialect.
//!
//! [`Escaper`] is a cheap, clonable handle meant to be moved into raw-SQL closures:
//!
//! ```ignore
//! let esc = qb.escaper();
//! qb.update_for::<User>()
//!     .set_raw("likesCount", move || format!("{} + 1", esc.escape("likesCount")));
//! ```
//!
//! Escaping is not idempotent: escaping an already-quoted name quotes it again.

use crate::dialect::{Dialect, DialectKind};
use crate::error::OrmResult;
use crate::ident::Ident;
use crate::value::Value;
use std::sync::Arc;

/// Dialect-bound escaping helpers.
#[derive(Clone, Debug)]
pub struct Escaper {
    dialect: Arc<dyn Dialect>,
}

impl Escaper {
    /// Wrap a dialect.
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    /// Quote a single column, table or alias name.
    pub fn escape(&self, name: &str) -> String {
        self.dialect.escape_identifier(name)
    }

    /// Quote a dotted path (`schema.table`), validating each part.
    pub fn escape_path(&self, path: &str) -> OrmResult<String> {
        Ok(Ident::parse(path)?.to_sql(self.dialect.as_ref()))
    }

    /// Format a value as an inline literal.
    pub fn escape_value(&self, value: impl Into<Value>) -> String {
        self.dialect.escape_value(&value.into())
    }

    /// Render the dialect's substring call.
    pub fn substring(&self, expr: &str, start: usize, len: usize) -> String {
        self.dialect.substring(expr, start, len)
    }

    /// The active backend.
    pub fn kind(&self) -> DialectKind {
        self.dialect.kind()
    }

    /// The underlying strategy object.
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }
}
