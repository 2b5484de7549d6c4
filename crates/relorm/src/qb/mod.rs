//! Query builder: UPDATE statements with bound parameters, raw SQL escape hatches and
//! per-dialect rendering.
//!
//! # Usage
//!
//! ```ignore
//! use relorm::{params, raw, DialectKind};
//!
//! // Explicit entity target
//! ds.create_query_builder()
//!     .update_for::<User>()
//!     .set(params! { "name" => "Dima Zotov" })
//!     .where_("name = :name", params! { "name" => "Alex Messer" })
//!     .execute(&ds)
//!     .await?;
//!
//! // Raw SQL for the new value, escaping through the active dialect
//! let qb = ds.create_query_builder();
//! let esc = qb.escaper();
//! qb.update_for::<User>()
//!     .set_raw("likesCount", move || format!("{} + 1", esc.escape("likesCount")))
//!     .where_sql("likesCount = 1")
//!     .execute(&ds)
//!     .await?;
//!
//! // Target inherited from a repository scope
//! ds.repository::<User>()
//!     .create_query_builder("myUser")?
//!     .update()
//!     .set(params! { "name" => "Dima Zotov" })
//!     .where_("myUser.name = :name", params! { "name" => "Alex Messer" })
//!     .execute(&ds)
//!     .await?;
//! ```

mod expr;
mod param;
mod predicate;
mod update;

pub use expr::{Params, RawSql, ValueExpr, raw, raw_sql};
pub use param::{CompiledQuery, ParamBinder, ParameterBinding, Placeholder, SqlBuf};
pub use predicate::{Connector, Predicate};
pub use update::UpdateQb;

use crate::dialect::{Dialect, DialectKind};
use crate::error::OrmResult;
use crate::escape::Escaper;
use crate::metadata::{Entity, EntityRef, MetadataResolver, TableName};
use std::fmt;
use std::sync::Arc;
use update::Target;

/// Entity, physical table and alias a builder is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Entity the scope was created for.
    pub entity: EntityRef,
    /// Physical table, resolved once when the scope was created.
    pub table: TableName,
    /// Alias usable as `alias.property` in templates.
    pub alias: String,
}

/// Entry point for building statements against one dialect and metadata resolver.
#[derive(Clone)]
pub struct QueryBuilder {
    dialect: Arc<dyn Dialect>,
    resolver: Arc<dyn MetadataResolver>,
    strict_parameters: Option<bool>,
    scope: Option<Scope>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("dialect", &self.dialect.kind())
            .field("strict_parameters", &self.strict_parameters)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl QueryBuilder {
    /// Create an unscoped builder.
    pub fn new(dialect: Arc<dyn Dialect>, resolver: Arc<dyn MetadataResolver>) -> Self {
        Self {
            dialect,
            resolver,
            strict_parameters: None,
            scope: None,
        }
    }

    /// Override the binder's collision policy (default: the dialect decides).
    pub fn strict_parameters(mut self, strict: bool) -> Self {
        self.strict_parameters = Some(strict);
        self
    }

    pub(crate) fn with_strict_parameters(mut self, strict: Option<bool>) -> Self {
        self.strict_parameters = strict;
        self
    }

    /// Bind this builder to an entity under `alias`. The table is resolved here, once.
    pub fn scoped(mut self, entity: EntityRef, alias: &str) -> OrmResult<Self> {
        let table = self.resolver.resolve_table(&entity)?;
        self.scope = Some(Scope {
            entity,
            table,
            alias: alias.to_string(),
        });
        Ok(self)
    }

    /// The enclosing scope, if any.
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// The scope's alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.scope.as_ref().map(|s| s.alias.as_str())
    }

    /// Quote an identifier for the active dialect.
    pub fn escape(&self, name: &str) -> String {
        self.dialect.escape_identifier(name)
    }

    /// An escaping handle that can be moved into raw-SQL closures.
    pub fn escaper(&self) -> Escaper {
        Escaper::new(self.dialect.clone())
    }

    /// The active dialect.
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Identity of the active dialect.
    pub fn dialect_kind(&self) -> DialectKind {
        self.dialect.kind()
    }

    fn update_with(&self, target: Target) -> UpdateQb {
        UpdateQb::new(
            self.dialect.clone(),
            self.resolver.clone(),
            self.strict_parameters,
            target,
        )
    }

    /// UPDATE the table of the enclosing scope.
    ///
    /// Without a scope the returned builder fails to compile with
    /// [`OrmError::NoTarget`](crate::OrmError::NoTarget).
    pub fn update(&self) -> UpdateQb {
        match &self.scope {
            Some(scope) => self.update_with(Target::Scoped(scope.clone())),
            None => self.update_with(Target::Unbound),
        }
    }

    /// UPDATE the table mapped to `E`.
    pub fn update_for<E: Entity>(&self) -> UpdateQb {
        self.update_entity(EntityRef::of::<E>())
    }

    /// UPDATE the table mapped to a named entity.
    pub fn update_entity(&self, entity: EntityRef) -> UpdateQb {
        self.update_with(Target::Entity(entity))
    }

    /// UPDATE a physical table; SET keys are used as column names.
    pub fn update_table(&self, table: &str) -> UpdateQb {
        self.update_with(Target::Table(table.to_string()))
    }
}
