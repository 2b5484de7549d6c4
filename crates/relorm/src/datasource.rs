//! Data source: a connection bundled with its dialect, metadata and SQL logger.

use crate::client::Executor;
use crate::config::DataSourceOptions;
use crate::dialect::{Dialect, DialectKind};
use crate::error::{OrmError, OrmResult};
use crate::escape::Escaper;
use crate::metadata::{Entity, EntityRef, MetadataResolver};
use crate::monitor::SqlLogger;
use crate::qb::QueryBuilder;
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// A connection plus everything needed to build statements for it.
///
/// The dialect strategy is chosen once, here. Builders created from a data source
/// share it, and executing through the data source logs every statement.
pub struct DataSource<C> {
    client: C,
    dialect: Arc<dyn Dialect>,
    resolver: Arc<dyn MetadataResolver>,
    logger: SqlLogger,
    options: DataSourceOptions,
}

impl<C> fmt::Debug for DataSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("dialect", &self.dialect.kind())
            .field("logger", &self.logger)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C: Executor> DataSource<C> {
    /// Wrap `client` using the dialect named in `options`.
    ///
    /// Fails when the client reports a different dialect.
    pub fn new(
        client: C,
        options: DataSourceOptions,
        resolver: impl MetadataResolver + 'static,
    ) -> OrmResult<Self> {
        let dialect = options.dialect.dialect();
        Self::with_dialect(client, options, dialect, Arc::new(resolver))
    }

    /// Wrap `client` with a caller-provided dialect strategy.
    pub fn with_dialect(
        client: C,
        options: DataSourceOptions,
        dialect: Arc<dyn Dialect>,
        resolver: Arc<dyn MetadataResolver>,
    ) -> OrmResult<Self> {
        if let Some(kind) = client.dialect_kind() {
            if kind != dialect.kind() {
                return Err(OrmError::Config(format!(
                    "dialect {} does not match the {kind} connection",
                    dialect.kind()
                )));
            }
        }
        let logger = SqlLogger::from_options(&options.logging)?;
        tracing::debug!(target: "relorm", dialect = %dialect.kind(), "data source ready");
        Ok(Self {
            client,
            dialect,
            resolver,
            logger,
            options,
        })
    }

    /// Replace the SQL logger.
    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    /// A fresh, unscoped query builder.
    pub fn create_query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.dialect.clone(), self.resolver.clone())
            .with_strict_parameters(self.options.strict_parameters)
    }

    /// Repository for entity `E`.
    pub fn repository<E: Entity>(&self) -> Repository<'_, E, C> {
        Repository {
            source: self,
            _entity: PhantomData,
        }
    }

    /// An escaping handle for the active dialect.
    pub fn escaper(&self) -> Escaper {
        Escaper::new(self.dialect.clone())
    }

    /// The active dialect.
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// The metadata resolver.
    pub fn resolver(&self) -> &Arc<dyn MetadataResolver> {
        &self.resolver
    }

    /// The options this data source was built with.
    pub fn options(&self) -> &DataSourceOptions {
        &self.options
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Unwrap the client.
    pub fn into_client(self) -> C {
        self.client
    }
}

impl<C: Executor> Executor for DataSource<C> {
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.logger.before(self.dialect.kind(), sql, params.len());
        let start = Instant::now();
        match self.client.execute(sql, params).await {
            Ok(rows) => {
                self.logger.after(rows, start.elapsed());
                Ok(rows)
            }
            Err(e) => {
                self.logger.failed(sql, &e, start.elapsed());
                Err(e)
            }
        }
    }

    fn dialect_kind(&self) -> Option<DialectKind> {
        Some(self.dialect.kind())
    }
}

/// Entity-bound access to a [`DataSource`].
pub struct Repository<'a, E, C> {
    source: &'a DataSource<C>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, C: Executor> Repository<'_, E, C> {
    /// A query builder scoped to `E`'s table under `alias`.
    ///
    /// The table is resolved once here; `update()` on the returned builder reuses it.
    pub fn create_query_builder(&self, alias: &str) -> OrmResult<QueryBuilder> {
        self.source
            .create_query_builder()
            .scoped(EntityRef::of::<E>(), alias)
    }

    /// The entity this repository is bound to.
    pub fn entity(&self) -> EntityRef {
        EntityRef::of::<E>()
    }
}
