//! UPDATE statement builder.

use crate::client::Executor;
use crate::dialect::{Dialect, ReturningPosition};
use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::metadata::{EntityRef, MetadataResolver};
use crate::qb::Scope;
use crate::qb::expr::{Params, RawSql, ValueExpr, raw};
use crate::qb::param::{CompiledQuery, ParamBinder, SqlBuf};
use crate::qb::predicate::{Connector, Predicate, PredicateContext};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// What the statement updates.
#[derive(Clone, Debug)]
pub(crate) enum Target {
    /// Nothing given and no enclosing scope.
    Unbound,
    /// An entity resolved through the metadata resolver at compile time.
    Entity(EntityRef),
    /// A physical table; property names are used as column names.
    Table(String),
    /// Inherited from a repository-scoped builder (table already resolved).
    Scoped(Scope),
}

/// UPDATE query builder.
///
/// Created from a [`QueryBuilder`](crate::QueryBuilder). Compiling is pure and can be
/// repeated; [`execute`](UpdateQb::execute) consumes the builder, so a statement that
/// has been executed cannot be executed again. Build a new one per statement.
pub struct UpdateQb {
    dialect: Arc<dyn Dialect>,
    resolver: Arc<dyn MetadataResolver>,
    strict_parameters: Option<bool>,
    target: Target,
    set_fields: Vec<(String, ValueExpr)>,
    where_clauses: Vec<(Connector, Predicate)>,
    returning_cols: Vec<String>,
}

impl fmt::Debug for UpdateQb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQb")
            .field("dialect", &self.dialect.kind())
            .field("target", &self.target)
            .field("set_fields", &self.set_fields)
            .field("where_clauses", &self.where_clauses)
            .field("returning_cols", &self.returning_cols)
            .finish_non_exhaustive()
    }
}

impl UpdateQb {
    pub(crate) fn new(
        dialect: Arc<dyn Dialect>,
        resolver: Arc<dyn MetadataResolver>,
        strict_parameters: Option<bool>,
        target: Target,
    ) -> Self {
        Self {
            dialect,
            resolver,
            strict_parameters,
            target,
            set_fields: Vec::new(),
            where_clauses: Vec::new(),
            returning_cols: Vec::new(),
        }
    }

    // ==================== SET ====================

    /// Assign every entry of `values`. Keys are entity property names.
    pub fn set(mut self, values: Params) -> Self {
        for (property, value) in values {
            self.push_set(property, value);
        }
        self
    }

    /// Assign one property.
    pub fn set_value(mut self, property: &str, value: impl Into<ValueExpr>) -> Self {
        self.push_set(property.to_string(), value.into());
        self
    }

    /// Assign an optional value (None => skip).
    pub fn set_opt<T: Into<Value>>(self, property: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set_value(property, ValueExpr::from(v.into())),
            None => self,
        }
    }

    /// Assign the SQL produced by `f`, inlined verbatim.
    ///
    /// The closure receives nothing; move in an [`Escaper`](crate::Escaper) if the
    /// expression needs to reference a column.
    pub fn set_raw<F>(self, property: &str, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.set_value(property, raw(f))
    }

    fn push_set(&mut self, property: String, value: ValueExpr) {
        match self.set_fields.iter_mut().find(|(p, _)| *p == property) {
            Some((_, slot)) => *slot = value,
            None => self.set_fields.push((property, value)),
        }
    }

    // ==================== WHERE ====================

    /// Add a template condition. Repeated calls are combined with AND.
    pub fn where_(self, condition: &str, params: Params) -> Self {
        self.and_where(condition, params)
    }

    /// Add a condition that references no parameters.
    pub fn where_sql(self, condition: &str) -> Self {
        self.and_where(condition, Params::new())
    }

    /// Add a template condition joined with AND.
    pub fn and_where(mut self, condition: &str, params: Params) -> Self {
        self.where_clauses.push((Connector::And, template(condition, params)));
        self
    }

    /// Add a template condition joined with OR.
    ///
    /// Everything before it is grouped first: `a`, `or_where(b)`, `and_where(c)`
    /// renders as `((a) OR (b)) AND (c)`.
    pub fn or_where(mut self, condition: &str, params: Params) -> Self {
        self.where_clauses.push((Connector::Or, template(condition, params)));
        self
    }

    /// Add the SQL produced by `f`. Repeated calls are combined with AND.
    pub fn where_raw<F>(self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.and_where_raw(f)
    }

    /// Add the SQL produced by `f`, joined with AND.
    pub fn and_where_raw<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.where_clauses
            .push((Connector::And, Predicate::Raw(RawSql::Deferred(Arc::new(f)))));
        self
    }

    /// Add equality criteria on entity properties, joined with AND.
    pub fn where_criteria(mut self, criteria: Params) -> Self {
        self.where_clauses
            .push((Connector::And, Predicate::Criteria(criteria)));
        self
    }

    /// Add an already-built predicate.
    pub fn and_predicate(mut self, predicate: Predicate) -> Self {
        self.where_clauses.push((Connector::And, predicate));
        self
    }

    /// Drop every WHERE condition added so far.
    pub fn clear_where(mut self) -> Self {
        self.where_clauses.clear();
        self
    }

    // ==================== RETURNING ====================

    /// Return the given properties from the updated rows.
    pub fn returning(mut self, properties: &[&str]) -> Self {
        self.returning_cols = properties.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Return every column of the updated rows.
    pub fn returning_all(mut self) -> Self {
        self.returning_cols = vec!["*".to_string()];
        self
    }

    // ==================== Build ====================

    /// Whether the statement has any WHERE condition.
    pub fn has_where(&self) -> bool {
        !self.where_clauses.is_empty()
    }

    /// Quoted table, entity and alias for the target.
    ///
    /// Resolved table names are quoted part by part as they are. Only the string given
    /// to `update_table` is parsed as a dotted path.
    fn resolve_target(&self) -> OrmResult<(String, Option<EntityRef>, Option<&str>)> {
        let dialect = self.dialect.as_ref();
        match &self.target {
            Target::Unbound => Err(OrmError::no_target(
                "UPDATE has no target: pass an entity or table, or build from a repository",
            )),
            Target::Entity(entity) => {
                let table = self.resolver.resolve_table(entity)?;
                Ok((table.to_sql(dialect), Some(entity.clone()), None))
            }
            Target::Table(table) => Ok((Ident::parse(table)?.to_sql(dialect), None, None)),
            Target::Scoped(scope) => Ok((
                scope.table.to_sql(dialect),
                Some(scope.entity.clone()),
                Some(scope.alias.as_str()),
            )),
        }
    }

    /// Compile to SQL and parameters without touching the database.
    ///
    /// WHERE is compiled before SET so user parameter names are claimed first and
    /// generated SET names (`upd_<column>`) step around them. Placeholders are still
    /// numbered in the order they appear in the SQL.
    pub fn compile(&self) -> OrmResult<CompiledQuery> {
        let (table, entity, alias) = self.resolve_target()?;

        if self.set_fields.is_empty() {
            return Err(OrmError::validation("UpdateQb: SET clause cannot be empty"));
        }

        let dialect = self.dialect.as_ref();
        let ctx = PredicateContext {
            dialect,
            resolver: self.resolver.as_ref(),
            entity: entity.as_ref(),
            alias,
        };
        let strict = self
            .strict_parameters
            .unwrap_or(!dialect.tolerates_rebinding());
        let mut binder = ParamBinder::new(strict);

        // WHERE
        let mut where_sql = SqlBuf::new();
        let grouped = self.where_clauses.len() > 1;
        let mut previous: Option<Connector> = None;
        for (i, (connector, predicate)) in self.where_clauses.iter().enumerate() {
            if i > 0 {
                // A change of connector closes the group on the left.
                if i > 1 && previous != Some(*connector) {
                    let mut nested = SqlBuf::new();
                    nested.push_str("(").append(where_sql).push_str(")");
                    where_sql = nested;
                }
                where_sql.push_str(connector.as_sql());
                previous = Some(*connector);
            }
            if grouped {
                where_sql.push_str("(");
            }
            predicate.compile(&ctx, &mut binder, &mut where_sql)?;
            if grouped {
                where_sql.push_str(")");
            }
        }

        // SET
        let mut columns: Vec<(String, &ValueExpr)> = Vec::with_capacity(self.set_fields.len());
        for (property, value) in &self.set_fields {
            let column = ctx.column(property)?;
            match columns.iter_mut().find(|(c, _)| *c == column) {
                Some(slot) => slot.1 = value,
                None => columns.push((column, value)),
            }
        }

        let mut set_sql = SqlBuf::new();
        for (i, (column, value)) in columns.iter().enumerate() {
            if i > 0 {
                set_sql.push_str(", ");
            }
            set_sql
                .push_str(&dialect.escape_identifier(column))
                .push_str(" = ");
            match value {
                ValueExpr::Literal(v) => {
                    let p = binder.bind_generated(&format!("upd_{column}"), v.clone());
                    set_sql.push_param(p);
                }
                ValueExpr::Null => {
                    let p = binder.bind_generated(&format!("upd_{column}"), Value::Null);
                    set_sql.push_param(p);
                }
                ValueExpr::Raw(raw) => {
                    set_sql.push_str(&raw.render());
                }
                ValueExpr::List(_) => {
                    return Err(OrmError::validation(format!(
                        "cannot assign a list to column '{column}'"
                    )));
                }
            }
        }

        // RETURNING
        let returning = if self.returning_cols.is_empty() {
            None
        } else {
            if !dialect.supports_returning() {
                return Err(OrmError::validation(format!(
                    "RETURNING is not supported by {}",
                    dialect.kind()
                )));
            }
            let prefix = match dialect.returning_position() {
                ReturningPosition::AfterWhere => "",
                ReturningPosition::BeforeWhere => "INSERTED.",
            };
            let mut cols = Vec::with_capacity(self.returning_cols.len());
            for property in &self.returning_cols {
                if property == "*" {
                    cols.push(format!("{prefix}*"));
                } else {
                    let column = ctx.column(property)?;
                    cols.push(format!("{prefix}{}", dialect.escape_identifier(&column)));
                }
            }
            Some(cols.join(", "))
        };

        let mut sql = SqlBuf::new();
        sql.push_str("UPDATE ")
            .push_str(&table)
            .push_str(" SET ")
            .append(set_sql);
        if let Some(cols) = &returning {
            if dialect.returning_position() == ReturningPosition::BeforeWhere {
                sql.push_str(" OUTPUT ").push_str(cols);
            }
        }
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ").append(where_sql);
        }
        if let Some(cols) = &returning {
            if dialect.returning_position() == ReturningPosition::AfterWhere {
                sql.push_str(" RETURNING ").push_str(cols);
            }
        }

        let (text, params) = binder.finalize(&sql, dialect.placeholder_style());
        tracing::trace!(
            target: "relorm.sql",
            dialect = %dialect.kind(),
            params = ?binder.names().collect::<Vec<_>>(),
            "compiled UPDATE"
        );

        Ok(CompiledQuery {
            sql: text,
            params,
            dialect: dialect.kind(),
        })
    }

    /// Get the built SQL string (for debugging).
    pub fn to_sql(&self) -> OrmResult<String> {
        Ok(self.compile()?.sql)
    }

    /// Compile and run the statement, returning the affected-row count.
    ///
    /// Compile errors are returned before any I/O. Driver errors pass through unchanged.
    pub async fn execute(self, conn: &impl Executor) -> OrmResult<u64> {
        let compiled = self.compile()?;
        compiled.execute(conn).await
    }
}

fn template(condition: &str, params: Params) -> Predicate {
    Predicate::Template {
        sql: condition.to_string(),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::metadata::{EntityMetadata, MetadataRegistry};
    use crate::params;
    use crate::qb::expr::raw_sql;

    fn registry() -> Arc<dyn MetadataResolver> {
        Arc::new(MetadataRegistry::new().register_metadata(
            EntityMetadata::new("User", "user")
                .property("id")
                .property("name")
                .column("likesCount", "likes_count"),
        ))
    }

    fn update(kind: DialectKind, target: Target) -> UpdateQb {
        UpdateQb::new(kind.dialect(), registry(), None, target)
    }

    fn user(kind: DialectKind) -> UpdateQb {
        update(kind, Target::Entity(EntityRef::named("User")))
    }

    #[test]
    fn test_simple_update() {
        let q = user(DialectKind::Postgres)
            .set(params! { "name" => "Dima Zotov" })
            .where_("name = :name", params! { "name" => "Alex Messer" })
            .compile()
            .unwrap();
        assert_eq!(q.sql, "UPDATE \"user\" SET \"name\" = $1 WHERE name = $2");
        assert_eq!(
            q.params.values(),
            &[Value::from("Dima Zotov"), Value::from("Alex Messer")]
        );
        assert_eq!(q.params.get("upd_name"), Some(&Value::from("Dima Zotov")));
        assert_eq!(q.params.get("name"), Some(&Value::from("Alex Messer")));
    }

    #[test]
    fn test_update_multiple_set_resolves_columns() {
        let sql = user(DialectKind::Postgres)
            .set_value("name", "Alice")
            .set_value("likesCount", 3i32)
            .where_criteria(params! { "id" => 1i64 })
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"user\" SET \"name\" = $1, \"likes_count\" = $2 WHERE \"id\" = $3"
        );
    }

    #[test]
    fn test_update_with_raw() {
        let esc = crate::Escaper::new(DialectKind::Postgres.dialect());
        let q = user(DialectKind::Postgres)
            .set_raw("likesCount", move || format!("{} + 1", esc.escape("likes_count")))
            .where_("likes_count = 1", params! {})
            .compile()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"user\" SET \"likes_count\" = \"likes_count\" + 1 WHERE likes_count = 1"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_literal_never_inlined() {
        let q = user(DialectKind::Mysql)
            .set_value("name", "'; DROP TABLE user; --")
            .compile()
            .unwrap();
        assert_eq!(q.sql, "UPDATE `user` SET `name` = ?");
        assert!(!q.sql.contains("DROP"));
    }

    #[test]
    fn test_no_where_updates_all_rows() {
        let qb = user(DialectKind::Sqlite).set_value("name", Option::<String>::None);
        assert!(!qb.has_where());
        let q = qb.compile().unwrap();
        assert_eq!(q.sql, "UPDATE \"user\" SET \"name\" = ?");
        assert_eq!(q.params.values(), &[Value::Null]);
    }

    #[test]
    fn test_empty_set_is_validation_error() {
        let err = user(DialectKind::Postgres)
            .where_("id = 1", params! {})
            .compile()
            .unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn test_unbound_target() {
        let err = update(DialectKind::Postgres, Target::Unbound)
            .set_value("name", "x")
            .compile()
            .unwrap_err();
        assert!(err.is_no_target());
    }

    #[test]
    fn test_unknown_property_fails_compile() {
        let err = user(DialectKind::Postgres)
            .set_value("nickname", "x")
            .compile()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnknownProperty { .. }));
    }

    #[test]
    fn test_table_target_uses_names_verbatim() {
        let sql = update(DialectKind::Postgres, Target::Table("public.users".into()))
            .set_value("status", "inactive")
            .where_("id = :id", params! { "id" => 1i64 })
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"public\".\"users\" SET \"status\" = $1 WHERE id = $2"
        );
    }

    #[test]
    fn test_later_set_replaces_earlier() {
        let q = user(DialectKind::Postgres)
            .set_value("name", "first")
            .set_value("likesCount", 1i32)
            .set(params! { "name" => "second" })
            .compile()
            .unwrap();
        assert_eq!(q.sql, "UPDATE \"user\" SET \"name\" = $1, \"likes_count\" = $2");
        assert_eq!(q.params.values()[0], Value::from("second"));
    }

    #[test]
    fn test_mixed_connectors_group_from_the_left() {
        let sql = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_("id = :a", params! { "a" => 1i32 })
            .or_where("id = :b", params! { "b" => 2i32 })
            .and_where_raw(|| "name IS NOT NULL".to_string())
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"user\" SET \"name\" = $1 WHERE ((id = $2) OR (id = $3)) AND (name IS NOT NULL)"
        );

        let sql = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_sql("id = 1")
            .or_where("id = 2", params! {})
            .or_where("id = 3", params! {})
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"user\" SET \"name\" = $1 WHERE (id = 1) OR (id = 2) OR (id = 3)"
        );
    }

    #[test]
    fn test_repeated_where_is_anded() {
        let q = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_("id = :id", params! { "id" => 1i32 })
            .where_("name = :n", params! { "n" => "a" })
            .where_raw(|| "likes_count > 0".to_string())
            .where_criteria(params! { "likesCount" => 3i32 })
            .compile()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"user\" SET \"name\" = $1 WHERE (id = $2) AND (name = $3) \
             AND (likes_count > 0) AND (\"likes_count\" = $4)"
        );
        assert_eq!(
            q.params.values(),
            &[Value::from("x"), Value::Int(1), Value::from("a"), Value::Int(3)]
        );
    }

    #[test]
    fn test_clear_where() {
        let qb = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_sql("id = 1")
            .clear_where();
        assert!(!qb.has_where());
        assert_eq!(qb.to_sql().unwrap(), "UPDATE \"user\" SET \"name\" = $1");

        let sql = qb.where_sql("id = 2").to_sql().unwrap();
        assert_eq!(sql, "UPDATE \"user\" SET \"name\" = $1 WHERE id = 2");
    }

    #[test]
    fn test_repeated_spread_replaces_list() {
        let q = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_("id IN (:...ids)", params! { "ids" => ValueExpr::list([1i32, 2, 3]) })
            .and_where("id IN (:...ids)", params! { "ids" => ValueExpr::list([4i32]) })
            .compile()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"user\" SET \"name\" = $1 WHERE (id IN ($2)) AND (id IN ($2))"
        );
        assert_eq!(q.params.values(), &[Value::from("x"), Value::Int(4)]);
    }

    #[test]
    fn test_spread_element_and_user_name_both_bound() {
        let q = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_(
                "id IN (:...ids) OR id = :ids_0",
                params! { "ids" => ValueExpr::list([1i32, 2]), "ids_0" => 99i32 },
            )
            .compile()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"user\" SET \"name\" = $1 WHERE id IN ($2, $3) OR id = $4"
        );
        assert_eq!(
            q.params.values(),
            &[Value::from("x"), Value::Int(1), Value::Int(2), Value::Int(99)]
        );
    }

    #[test]
    fn test_unusual_physical_table_names_are_quoted() {
        let resolver: Arc<dyn MetadataResolver> = Arc::new(
            MetadataRegistry::new()
                .register_metadata(EntityMetadata::new("OrderItem", "order-items").property("qty"))
                .register_metadata(EntityMetadata::new("Profile", "user profile").property("bio"))
                .register_metadata(EntityMetadata::new("Code", "2fa_codes").property("used"))
                .register_metadata(
                    EntityMetadata::new("Audit", "audit.log")
                        .schema("ops")
                        .property("seen"),
                ),
        );
        let compile = |kind: DialectKind, entity: &str, property: &str| {
            UpdateQb::new(
                kind.dialect(),
                resolver.clone(),
                None,
                Target::Entity(EntityRef::named(entity)),
            )
            .set_value(property, 1i32)
            .to_sql()
            .unwrap()
        };

        assert_eq!(
            compile(DialectKind::Postgres, "OrderItem", "qty"),
            "UPDATE \"order-items\" SET \"qty\" = $1"
        );
        assert_eq!(
            compile(DialectKind::Mysql, "Profile", "bio"),
            "UPDATE `user profile` SET `bio` = ?"
        );
        assert_eq!(
            compile(DialectKind::SqlServer, "Code", "used"),
            "UPDATE [2fa_codes] SET [used] = @0"
        );
        assert_eq!(
            compile(DialectKind::Postgres, "Audit", "seen"),
            "UPDATE \"ops\".\"audit.log\" SET \"seen\" = $1"
        );
    }

    #[test]
    fn test_shared_param_object_last_write_wins() {
        // The SET side uses generated names, so a user name equal to one never clashes.
        let q = user(DialectKind::Postgres)
            .set_value("name", "new")
            .where_("name = :upd_name", params! { "upd_name" => "old" })
            .compile()
            .unwrap();
        assert_eq!(q.params.get("upd_name"), Some(&Value::from("old")));
        assert_eq!(q.params.get("upd_name_1"), Some(&Value::from("new")));
        assert_eq!(q.params.values(), &[Value::from("new"), Value::from("old")]);
    }

    #[test]
    fn test_strict_binding_on_oracle() {
        let err = user(DialectKind::Oracle)
            .set_value("name", "x")
            .where_("id = :v", params! { "v" => 1i32 })
            .and_where("name = :v", params! { "v" => "text" })
            .compile()
            .unwrap_err();
        assert!(matches!(err, OrmError::DuplicateParameter { .. }));

        // Same kind is fine, and the override can disable the check.
        let ok = user(DialectKind::Oracle)
            .set_value("name", "x")
            .where_("id = :v", params! { "v" => 1i32 })
            .and_where("id = :v", params! { "v" => 2i64 })
            .compile()
            .unwrap();
        assert_eq!(ok.sql, "UPDATE \"user\" SET \"name\" = :1 WHERE (id = :2) AND (id = :2)");

        let mut relaxed = user(DialectKind::Oracle);
        relaxed.strict_parameters = Some(false);
        assert!(
            relaxed
                .set_value("name", "x")
                .where_("id = :v", params! { "v" => 1i32 })
                .and_where("name = :v", params! { "v" => "text" })
                .compile()
                .is_ok()
        );
    }

    #[test]
    fn test_returning_per_dialect() {
        let pg = user(DialectKind::Postgres)
            .set_value("name", "x")
            .where_("id = :id", params! { "id" => 1i32 })
            .returning(&["id", "likesCount"])
            .to_sql()
            .unwrap();
        assert_eq!(
            pg,
            "UPDATE \"user\" SET \"name\" = $1 WHERE id = $2 RETURNING \"id\", \"likes_count\""
        );

        let ms = user(DialectKind::SqlServer)
            .set_value("name", "x")
            .where_("id = :id", params! { "id" => 1i32 })
            .returning_all()
            .to_sql()
            .unwrap();
        assert_eq!(
            ms,
            "UPDATE [user] SET [name] = @0 OUTPUT INSERTED.* WHERE id = @1"
        );

        let err = user(DialectKind::Mysql)
            .set_value("name", "x")
            .returning_all()
            .compile()
            .unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn test_list_in_set_rejected() {
        let err = user(DialectKind::Postgres)
            .set_value("name", ValueExpr::list(["a", "b"]))
            .compile()
            .unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }

    #[test]
    fn test_raw_param_value_in_where() {
        let q = user(DialectKind::Postgres)
            .set_value("name", raw_sql("SUBSTR('Dima Zotov', 1, 4)"))
            .where_(
                "name = :name",
                params! { "name" => raw_sql("SUBSTR('Alex Messer', 1, 5)") },
            )
            .compile()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"user\" SET \"name\" = SUBSTR('Dima Zotov', 1, 4) WHERE name = SUBSTR('Alex Messer', 1, 5)"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_compile_is_repeatable() {
        let qb = user(DialectKind::Postgres).set_value("name", "x");
        assert_eq!(qb.compile().unwrap(), qb.compile().unwrap());
    }
}
