//! SQL dialect strategies.
//!
//! A [`Dialect`] is chosen once (when a [`DataSource`](crate::DataSource) is built) and
//! consulted by the compilers for everything that differs across backends: identifier
//! quoting, placeholder syntax, literal formatting, RETURNING support and function names.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identity of a built-in backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum DialectKind {
    /// PostgreSQL (`$1`, `"ident"`)
    #[default]
    Postgres,
    /// MySQL / MariaDB (`?`, `` `ident` ``)
    Mysql,
    /// SQLite (`?`, `"ident"`)
    Sqlite,
    /// Microsoft SQL Server (`@0`, `[ident]`)
    SqlServer,
    /// Oracle (`:1`, `"ident"`)
    Oracle,
}

impl DialectKind {
    /// All built-in kinds.
    pub const ALL: [DialectKind; 5] = [
        DialectKind::Postgres,
        DialectKind::Mysql,
        DialectKind::Sqlite,
        DialectKind::SqlServer,
        DialectKind::Oracle,
    ];

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::Mysql => "mysql",
            DialectKind::Sqlite => "sqlite",
            DialectKind::SqlServer => "sqlserver",
            DialectKind::Oracle => "oracle",
        }
    }

    /// Instantiate the strategy object for this backend.
    pub fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::Postgres => Arc::new(Postgres),
            DialectKind::Mysql => Arc::new(Mysql),
            DialectKind::Sqlite => Arc::new(Sqlite),
            DialectKind::SqlServer => Arc::new(SqlServer),
            DialectKind::Oracle => Arc::new(Oracle),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::Mysql),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            "sqlserver" | "mssql" => Ok(DialectKind::SqlServer),
            "oracle" => Ok(DialectKind::Oracle),
            other => Err(OrmError::Config(format!("unknown dialect '{other}'"))),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = OrmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How bound parameters are written into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...`; a name used twice reuses its index.
    Dollar,
    /// `?` per occurrence; a name used twice is sent twice.
    Question,
    /// `@0, @1, ...`; a name used twice reuses its index.
    AtIndex,
    /// `:1, :2, ...`; a name used twice reuses its index.
    ColonIndex,
}

impl PlaceholderStyle {
    /// Whether each occurrence consumes its own value.
    pub const fn is_positional(self) -> bool {
        matches!(self, PlaceholderStyle::Question)
    }

    /// Render the placeholder for a 1-based ordinal.
    pub fn render(self, ordinal: usize) -> String {
        match self {
            PlaceholderStyle::Dollar => format!("${ordinal}"),
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::AtIndex => format!("@{}", ordinal - 1),
            PlaceholderStyle::ColonIndex => format!(":{ordinal}"),
        }
    }
}

/// Where a RETURNING-style clause goes in an UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningPosition {
    /// `UPDATE .. SET .. WHERE .. RETURNING cols`
    AfterWhere,
    /// `UPDATE .. SET .. OUTPUT INSERTED.cols WHERE ..`
    BeforeWhere,
}

/// Backend-specific SQL syntax.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Backend identity, for callers that must branch on it.
    fn kind(&self) -> DialectKind;

    /// Opening and closing identifier quote characters.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Placeholder syntax for bound parameters.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Whether UPDATE can return the modified rows.
    fn supports_returning(&self) -> bool;

    /// Placement of the returning clause when supported.
    fn returning_position(&self) -> ReturningPosition {
        ReturningPosition::AfterWhere
    }

    /// Name of the substring function.
    fn substring_function(&self) -> &'static str {
        "SUBSTR"
    }

    /// Whether the driver tolerates re-binding a name with a value of a different type.
    fn tolerates_rebinding(&self) -> bool {
        true
    }

    /// Quote an identifier, doubling any embedded closing quote character.
    fn escape_identifier(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(open);
        for ch in name.chars() {
            if ch == close {
                out.push(close);
            }
            out.push(ch);
        }
        out.push(close);
        out
    }

    /// Render a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    /// Render a string literal.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Render a binary literal.
    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("X'{}'", hex(value))
    }

    /// Render NaN or an infinity. Backends with no such literal get `NULL`.
    fn non_finite_literal(&self, value: f64) -> String {
        let _ = value;
        "NULL".to_string()
    }

    /// Format a value for inline use (raw/debug paths only; normal values are bound).
    fn escape_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => self.boolean_literal(*v).to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Real(v) if !v.is_finite() => self.non_finite_literal(f64::from(*v)),
            Value::Double(v) if !v.is_finite() => self.non_finite_literal(*v),
            Value::Real(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Text(v) => self.string_literal(v),
            Value::Bytes(v) => self.bytes_literal(v),
            Value::Uuid(v) => self.string_literal(&v.to_string()),
            Value::Date(v) => self.string_literal(&v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => {
                self.string_literal(&v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::TimestampTz(v) => {
                self.string_literal(&v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
            }
            Value::Json(v) => self.string_literal(&v.to_string()),
        }
    }

    /// Render a substring call: `<fn>(expr, start, len)`.
    fn substring(&self, expr: &str, start: usize, len: usize) -> String {
        format!("{}({expr}, {start}, {len})", self.substring_function())
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex(value))
    }

    fn non_finite_literal(&self, value: f64) -> String {
        let spelled = if value.is_nan() {
            "NaN"
        } else if value > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        };
        format!("'{spelled}'::float8")
    }
}

/// MySQL / MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Dialect for Mysql {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    // SQLite stores NaN as NULL; 9e999 overflows to infinity.
    fn non_finite_literal(&self, value: f64) -> String {
        if value.is_nan() {
            "NULL".to_string()
        } else if value > 0.0 {
            "9e999".to_string()
        } else {
            "-9e999".to_string()
        }
    }
}

/// Microsoft SQL Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn kind(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn quote_chars(&self) -> (char, char) {
        ('[', ']')
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::AtIndex
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn returning_position(&self) -> ReturningPosition {
        ReturningPosition::BeforeWhere
    }

    fn substring_function(&self) -> &'static str {
        "SUBSTRING"
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn string_literal(&self, value: &str) -> String {
        format!("N'{}'", value.replace('\'', "''"))
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("0x{}", hex(value))
    }
}

/// Oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Dialect for Oracle {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::ColonIndex
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn tolerates_rebinding(&self) -> bool {
        false
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("HEXTORAW('{}')", hex(value))
    }

    fn non_finite_literal(&self, value: f64) -> String {
        if value.is_nan() {
            "BINARY_DOUBLE_NAN".to_string()
        } else if value > 0.0 {
            "BINARY_DOUBLE_INFINITY".to_string()
        } else {
            "-BINARY_DOUBLE_INFINITY".to_string()
        }
    }
}

/// Resolve a dialect from its name (see [`DialectKind::from_str`]).
pub fn dialect_for(name: &str) -> OrmResult<Arc<dyn Dialect>> {
    Ok(name.parse::<DialectKind>()?.dialect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_identifier_escapes_postgres() {
        assert_eq!(Postgres.escape_identifier("simple"), "\"simple\"");
        assert_eq!(Postgres.escape_identifier("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(
            Postgres.escape_identifier("multi\"\"quotes"),
            "\"multi\"\"\"\"quotes\""
        );
    }

    #[test]
    fn quote_identifier_escapes_mysql() {
        assert_eq!(Mysql.escape_identifier("simple"), "`simple`");
        assert_eq!(Mysql.escape_identifier("with`backtick"), "`with``backtick`");
    }

    #[test]
    fn quote_identifier_escapes_sqlserver() {
        assert_eq!(SqlServer.escape_identifier("likesCount"), "[likesCount]");
        assert_eq!(SqlServer.escape_identifier("a]b"), "[a]]b]");
        // Only the closing bracket is doubled.
        assert_eq!(SqlServer.escape_identifier("a[b"), "[a[b]");
    }

    #[test]
    fn placeholders_per_style() {
        assert_eq!(PlaceholderStyle::Dollar.render(2), "$2");
        assert_eq!(PlaceholderStyle::Question.render(2), "?");
        assert_eq!(PlaceholderStyle::AtIndex.render(1), "@0");
        assert_eq!(PlaceholderStyle::ColonIndex.render(3), ":3");
        assert!(PlaceholderStyle::Question.is_positional());
        assert!(!PlaceholderStyle::Dollar.is_positional());
    }

    #[test]
    fn substring_differs_on_sqlserver() {
        for kind in DialectKind::ALL {
            let d = kind.dialect();
            let expected = if kind == DialectKind::SqlServer {
                "SUBSTRING('Dima Zotov', 1, 4)"
            } else {
                "SUBSTR('Dima Zotov', 1, 4)"
            };
            assert_eq!(d.substring("'Dima Zotov'", 1, 4), expected);
        }
    }

    #[test]
    fn escape_value_literals() {
        assert_eq!(Postgres.escape_value(&Value::Text("it's".into())), "'it''s'");
        assert_eq!(Mysql.escape_value(&Value::Text("a\\b".into())), "'a\\\\b'");
        assert_eq!(SqlServer.escape_value(&Value::Text("x".into())), "N'x'");
        assert_eq!(Postgres.escape_value(&Value::Bool(true)), "TRUE");
        assert_eq!(Sqlite.escape_value(&Value::Bool(true)), "1");
        assert_eq!(Postgres.escape_value(&Value::Null), "NULL");
        assert_eq!(Postgres.escape_value(&Value::Int(-3)), "-3");
        assert_eq!(Mysql.escape_value(&Value::Bytes(vec![0xde, 0xad])), "X'DEAD'");
        assert_eq!(
            Postgres.escape_value(&Value::Bytes(vec![0x01])),
            "'\\x01'::bytea"
        );
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(Postgres.escape_value(&Value::Double(f64::NAN)), "'NaN'::float8");
        assert_eq!(
            Postgres.escape_value(&Value::Real(f32::NEG_INFINITY)),
            "'-Infinity'::float8"
        );
        assert_eq!(Sqlite.escape_value(&Value::Double(f64::INFINITY)), "9e999");
        assert_eq!(Sqlite.escape_value(&Value::Double(f64::NAN)), "NULL");
        assert_eq!(
            Oracle.escape_value(&Value::Double(f64::INFINITY)),
            "BINARY_DOUBLE_INFINITY"
        );
        assert_eq!(Mysql.escape_value(&Value::Double(f64::NAN)), "NULL");
        assert_eq!(SqlServer.escape_value(&Value::Real(f32::INFINITY)), "NULL");
        assert_eq!(Postgres.escape_value(&Value::Double(1.5)), "1.5");
    }

    #[test]
    fn returning_capabilities() {
        assert!(Postgres.supports_returning());
        assert!(Sqlite.supports_returning());
        assert!(!Mysql.supports_returning());
        assert!(!Oracle.supports_returning());
        assert_eq!(SqlServer.returning_position(), ReturningPosition::BeforeWhere);
    }

    #[test]
    fn parse_kind() {
        assert_eq!("PostgreSQL".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!("mssql".parse::<DialectKind>().unwrap(), DialectKind::SqlServer);
        assert!("db2".parse::<DialectKind>().is_err());
        assert_eq!(dialect_for("sqlite").unwrap().kind(), DialectKind::Sqlite);
    }
}
