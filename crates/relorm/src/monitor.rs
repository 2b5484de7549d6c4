//! SQL logging through `tracing`.
//!
//! [`SqlLogger`] emits one event per executed statement under the `relorm.sql` target:
//! the SQL (optionally truncated) before the round trip, then the affected-row count and
//! elapsed time, or the driver error at `WARN`.

use crate::config::LoggingOptions;
use crate::dialect::DialectKind;
use crate::error::{OrmError, OrmResult};
use std::time::Duration;
use tracing::Level;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A `tracing`-based logger for executed SQL.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Whether anything is emitted.
    pub enabled: bool,
    /// Tracing event level for statements.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLogger {
    /// Create a logger with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a logger from configuration.
    pub fn from_options(options: &LoggingOptions) -> OrmResult<Self> {
        let level = options
            .level
            .parse::<Level>()
            .map_err(|_| OrmError::Config(format!("invalid log level '{}'", options.level)))?;
        Ok(Self {
            enabled: options.enabled,
            level,
            max_sql_length: options.max_sql_length,
        })
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Emit nothing.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn before(&self, dialect: DialectKind, sql: &str, param_count: usize) {
        if !self.enabled {
            return;
        }

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "relorm.sql",
            dialect = %dialect,
            param_count,
            sql = %sql,
            "executing"
        );
    }

    pub(crate) fn after(&self, rows_affected: u64, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        tracing::debug!(
            target: "relorm.sql",
            rows_affected,
            elapsed_ms = elapsed.as_millis() as u64,
            "executed"
        );
    }

    pub(crate) fn failed(&self, sql: &str, error: &OrmError, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        let sql = self.truncate_sql(sql);
        tracing::warn!(
            target: "relorm.sql",
            error = %error,
            sql = %sql,
            elapsed_ms = elapsed.as_millis() as u64,
            "statement failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_on_char_boundary() {
        let sql = "UPDATE \"użytkownik\" SET x = 1";
        // Byte 10 falls inside the two-byte 'ż'.
        let cut = truncate_sql_bytes(sql, 10);
        assert_eq!(cut, "UPDATE \"u");
        assert_eq!(truncate_sql_bytes("short", 100), "short");
    }

    #[test]
    fn test_builder_methods() {
        let logger = SqlLogger::new().level(Level::INFO).max_sql_length(5);
        assert_eq!(logger.truncate_sql("UPDATE x"), "UPDAT...");
        let logger = logger.no_truncate().disabled();
        assert_eq!(logger.truncate_sql("UPDATE x"), "UPDATE x");
        assert!(!logger.enabled);
    }

    #[test]
    fn test_from_options() {
        let opts = LoggingOptions {
            enabled: true,
            level: "info".to_string(),
            max_sql_length: None,
        };
        let logger = SqlLogger::from_options(&opts).unwrap();
        assert_eq!(logger.level, Level::INFO);

        let bad = LoggingOptions {
            level: "loud".to_string(),
            ..opts
        };
        assert!(matches!(SqlLogger::from_options(&bad), Err(OrmError::Config(_))));
    }
}
