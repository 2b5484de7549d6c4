//! Execution boundary between compiled statements and a database connection.

use crate::dialect::DialectKind;
use crate::error::{OrmError, OrmResult};
use crate::qb::CompiledQuery;
use crate::value::Value;
use tokio_postgres::types::ToSql;

/// Something that can run a compiled statement.
///
/// Implemented for Postgres clients and transactions, for pooled clients (feature
/// `pool`) and for [`DataSource`](crate::DataSource). Errors from the underlying driver
/// are returned unchanged.
pub trait Executor: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// The dialect this connection speaks, when known.
    ///
    /// Compiled statements for a different dialect are rejected before I/O.
    fn dialect_kind(&self) -> Option<DialectKind> {
        None
    }
}

fn as_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

impl Executor for tokio_postgres::Client {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let refs = as_refs(params);
        tokio_postgres::Client::execute(self, sql, &refs)
            .await
            .map_err(OrmError::from)
    }

    fn dialect_kind(&self) -> Option<DialectKind> {
        Some(DialectKind::Postgres)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let refs = as_refs(params);
        tokio_postgres::Transaction::execute(self, sql, &refs)
            .await
            .map_err(OrmError::from)
    }

    fn dialect_kind(&self) -> Option<DialectKind> {
        Some(DialectKind::Postgres)
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let client: &tokio_postgres::Client = self;
        Executor::execute(client, sql, params).await
    }

    fn dialect_kind(&self) -> Option<DialectKind> {
        Some(DialectKind::Postgres)
    }
}

impl CompiledQuery {
    /// Run the statement on `conn`.
    pub async fn execute(&self, conn: &impl Executor) -> OrmResult<u64> {
        if let Some(kind) = conn.dialect_kind() {
            if kind != self.dialect {
                return Err(OrmError::validation(format!(
                    "statement compiled for {} cannot run on a {kind} connection",
                    self.dialect
                )));
            }
        }
        conn.execute(&self.sql, self.params.values()).await
    }
}
