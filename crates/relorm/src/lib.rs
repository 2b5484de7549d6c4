//! # relorm
//!
//! The UPDATE core of an ORM query builder, for several SQL dialects.
//!
//! ## Features
//!
//! - **Bound by default**: literal values always become placeholders, never inline text
//! - **Raw escape hatch**: closures returning SQL for function calls and self-references
//! - **Dialect strategies**: quoting, placeholders, RETURNING and function names chosen once per data source
//! - **Metadata-driven**: property names are mapped to columns through a [`MetadataResolver`]
//! - **Fail fast**: every compile error is raised before any I/O
//! - **Logged execution**: statements are traced under the `relorm.sql` target
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use relorm::{params, DataSource, DataSourceOptions, MetadataRegistry};
//!
//! let ds = DataSource::new(client, DataSourceOptions::default(), MetadataRegistry::new().register::<User>())?;
//!
//! let updated = ds
//!     .create_query_builder()
//!     .update_for::<User>()
//!     .set(params! { "name" => "Dima Zotov" })
//!     .where_("name = :name", params! { "name" => "Alex Messer" })
//!     .execute(&ds)
//!     .await?;
//! ```
//!
//! An UPDATE with no WHERE condition updates every row of the table.

#[macro_use]
mod macros;

pub mod client;
pub mod config;
pub mod datasource;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod ident;
pub mod metadata;
pub mod monitor;
pub mod qb;
pub mod value;

pub use client::Executor;
pub use config::{DataSourceOptions, LoggingOptions};
pub use datasource::{DataSource, Repository};
pub use dialect::{Dialect, DialectKind, PlaceholderStyle, ReturningPosition, dialect_for};
pub use error::{OrmError, OrmResult};
pub use escape::Escaper;
pub use ident::Ident;
pub use metadata::{
    ColumnMetadata, Entity, EntityMetadata, EntityRef, MetadataRegistry, MetadataResolver,
    TableName,
};
pub use monitor::SqlLogger;
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{
    CompiledQuery, Connector, ParameterBinding, Params, Predicate, QueryBuilder, RawSql, Scope,
    UpdateQb, ValueExpr, raw, raw_sql,
};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_options, create_pool_with_config};
