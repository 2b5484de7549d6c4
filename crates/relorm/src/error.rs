//! Error types for relorm

use thiserror::Error;

/// Result type alias for relorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement compilation and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// The target table could not be resolved (no explicit entity and no enclosing scope)
    #[error("No target: {0}")]
    NoTarget(String),

    /// A template references a `:name` that the parameter object does not provide
    #[error("Unresolved parameter ':{name}'")]
    UnresolvedParameter { name: String },

    /// A parameter name was re-bound with a conflicting type on a strict dialect
    #[error("Duplicate parameter ':{name}': already bound as {existing}, cannot rebind as {incoming}")]
    DuplicateParameter {
        name: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// The metadata resolver does not know the entity
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The metadata resolver does not know the property on the entity
    #[error("Unknown property '{property}' on entity '{entity}'")]
    UnknownProperty { entity: String, property: String },

    /// Builder state is invalid (empty SET, unsupported clause, bad identifier, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Postgres driver error, passed through unchanged
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Error raised by any other driver behind an `Executor`, passed through unchanged
    #[error("Driver error: {0}")]
    Driver(Box<dyn std::error::Error + Send + Sync>),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration loading or parsing error
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl OrmError {
    /// Create a no-target error
    pub fn no_target(message: impl Into<String>) -> Self {
        Self::NoTarget(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unresolved parameter error
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedParameter { name: name.into() }
    }

    /// Wrap an arbitrary driver error
    pub fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Driver(Box::new(err))
    }

    /// Whether this error was raised while compiling (before any I/O).
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::NoTarget(_)
                | Self::UnresolvedParameter { .. }
                | Self::DuplicateParameter { .. }
                | Self::UnknownEntity(_)
                | Self::UnknownProperty { .. }
                | Self::Validation(_)
        )
    }

    /// Whether this error came from the driver during execution.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Driver(_))
    }

    /// Check if this is a no-target error
    pub fn is_no_target(&self) -> bool {
        matches!(self, Self::NoTarget(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
