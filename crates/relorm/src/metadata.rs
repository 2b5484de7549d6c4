//! Entity metadata: logical property names to physical table/column names.
//!
//! The query builder never derives physical names itself; it asks a
//! [`MetadataResolver`]. [`MetadataRegistry`] is the in-process implementation.

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A mapped property of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Property name used in builder calls.
    pub property: String,
    /// Physical column name.
    pub column: String,
}

/// Physical table name with an optional schema.
///
/// Both parts are taken literally: no character is special, and rendering quotes each
/// part with the dialect's identifier quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    /// Schema (or database) qualifier.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableName {
    /// An unqualified table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// A schema-qualified table.
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Render with the dialect's identifier quoting.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                dialect.escape_identifier(schema),
                dialect.escape_identifier(&self.name)
            ),
            None => dialect.escape_identifier(&self.name),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Table and column mapping for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    /// Entity name (what [`EntityRef`] refers to).
    pub name: String,
    /// Physical table name, used verbatim.
    pub table: String,
    /// Schema the table lives in.
    pub schema: Option<String>,
    /// Mapped columns.
    pub columns: Vec<ColumnMetadata>,
}

impl EntityMetadata {
    /// Start describing an entity stored in `table`.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            schema: None,
            columns: Vec::new(),
        }
    }

    /// Qualify the table with a schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// The physical table.
    pub fn table_name(&self) -> TableName {
        TableName {
            schema: self.schema.clone(),
            name: self.table.clone(),
        }
    }

    /// Map `property` to a differently-named `column`.
    pub fn column(mut self, property: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.push(ColumnMetadata {
            property: property.into(),
            column: column.into(),
        });
        self
    }

    /// Map a property whose column has the same name.
    pub fn property(self, property: &str) -> Self {
        self.column(property, property)
    }

    /// Look up the column for a property.
    pub fn find_column(&self, property: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.property == property)
    }
}

/// Implemented by types that describe a mapped table.
///
/// # Example
/// ```ignore
/// struct User;
///
/// impl Entity for User {
///     const NAME: &'static str = "User";
///
///     fn metadata() -> EntityMetadata {
///         EntityMetadata::new(Self::NAME, "user")
///             .property("id")
///             .property("name")
///             .column("likesCount", "likes_count")
///     }
/// }
/// ```
pub trait Entity {
    /// Entity name.
    const NAME: &'static str;

    /// Mapping for this entity.
    fn metadata() -> EntityMetadata;
}

/// Reference to an entity by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef(Cow<'static, str>);

impl EntityRef {
    /// Reference a statically known entity type.
    pub fn of<E: Entity>() -> Self {
        Self(Cow::Borrowed(E::NAME))
    }

    /// Reference an entity by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The entity name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps logical entity/property names to physical table/column names.
pub trait MetadataResolver: Send + Sync {
    /// Physical table for an entity.
    fn resolve_table(&self, entity: &EntityRef) -> OrmResult<TableName>;

    /// Physical column name for an entity property.
    fn resolve_column(&self, entity: &EntityRef, property: &str) -> OrmResult<String>;
}

/// Thread-safe registry of entity metadata.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entities: RwLock<HashMap<String, Arc<EntityMetadata>>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type.
    pub fn register<E: Entity>(self) -> Self {
        self.register_metadata(E::metadata())
    }

    /// Register metadata directly. Re-registering a name replaces it.
    pub fn register_metadata(self, metadata: EntityMetadata) -> Self {
        self.insert(metadata);
        self
    }

    /// Register metadata through a shared reference.
    pub fn insert(&self, metadata: EntityMetadata) {
        let mut entities = self
            .entities
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entities.insert(metadata.name.clone(), Arc::new(metadata));
    }

    /// Fetch metadata for an entity.
    pub fn get(&self, entity: &EntityRef) -> OrmResult<Arc<EntityMetadata>> {
        let entities = self
            .entities
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entities
            .get(entity.name())
            .cloned()
            .ok_or_else(|| OrmError::UnknownEntity(entity.name().to_string()))
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities
            .read()
            .map(|e| e.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataResolver for MetadataRegistry {
    fn resolve_table(&self, entity: &EntityRef) -> OrmResult<TableName> {
        Ok(self.get(entity)?.table_name())
    }

    fn resolve_column(&self, entity: &EntityRef, property: &str) -> OrmResult<String> {
        let meta = self.get(entity)?;
        meta.find_column(property)
            .map(|c| c.column.clone())
            .ok_or_else(|| OrmError::UnknownProperty {
                entity: entity.name().to_string(),
                property: property.to_string(),
            })
    }
}

impl<R: MetadataResolver + ?Sized> MetadataResolver for Arc<R> {
    fn resolve_table(&self, entity: &EntityRef) -> OrmResult<TableName> {
        (**self).resolve_table(entity)
    }

    fn resolve_column(&self, entity: &EntityRef, property: &str) -> OrmResult<String> {
        (**self).resolve_column(entity, property)
    }
}
