//! Values that can appear on the right-hand side of SET or inside a WHERE template.

use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A raw SQL fragment, inserted into the statement verbatim.
///
/// The deferred form is a zero-argument closure evaluated at compile time. Anything it
/// needs (an [`Escaper`](crate::Escaper), say) must be moved in when it is created.
#[derive(Clone)]
pub enum RawSql {
    /// Fixed SQL text.
    Text(String),
    /// SQL produced when the statement is compiled.
    Deferred(Arc<dyn Fn() -> String + Send + Sync>),
}

impl RawSql {
    /// Evaluate to SQL text.
    pub fn render(&self) -> String {
        match self {
            RawSql::Text(sql) => sql.clone(),
            RawSql::Deferred(f) => f(),
        }
    }
}

impl fmt::Debug for RawSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawSql::Text(sql) => f.debug_tuple("Text").field(sql).finish(),
            RawSql::Deferred(_) => f.debug_tuple("Deferred").field(&"<fn>").finish(),
        }
    }
}

/// Build a deferred raw fragment from a closure.
///
/// ```ignore
/// let kind = qb.dialect_kind();
/// qb.update_for::<User>().set_value("name", raw(move || {
///     if kind == DialectKind::SqlServer { "SUBSTRING('Dima Zotov', 1, 4)" } else { "SUBSTR('Dima Zotov', 1, 4)" }.to_string()
/// }));
/// ```
pub fn raw<F>(f: F) -> ValueExpr
where
    F: Fn() -> String + Send + Sync + 'static,
{
    ValueExpr::Raw(RawSql::Deferred(Arc::new(f)))
}

/// Build a raw fragment from fixed text.
pub fn raw_sql(sql: impl Into<String>) -> ValueExpr {
    ValueExpr::Raw(RawSql::Text(sql.into()))
}

/// Right-hand side of an assignment or a named template parameter.
#[derive(Clone, Debug)]
pub enum ValueExpr {
    /// Bound as a parameter.
    Literal(Value),
    /// Bound as a NULL parameter.
    Null,
    /// Inlined as SQL text.
    Raw(RawSql),
    /// Expanded into one parameter per element (`:...name` in templates).
    List(Vec<Value>),
}

impl ValueExpr {
    /// Build a list parameter.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        ValueExpr::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether this expression is raw SQL.
    pub fn is_raw(&self) -> bool {
        matches!(self, ValueExpr::Raw(_))
    }
}

impl From<Value> for ValueExpr {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ValueExpr::Null,
            v => ValueExpr::Literal(v),
        }
    }
}

impl From<RawSql> for ValueExpr {
    fn from(raw: RawSql) -> Self {
        ValueExpr::Raw(raw)
    }
}

impl<T: Into<Value>> From<Option<T>> for ValueExpr {
    fn from(value: Option<T>) -> Self {
        value.map_or(ValueExpr::Null, |v| ValueExpr::from(v.into()))
    }
}

macro_rules! impl_from_for_value_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ValueExpr {
                fn from(v: $ty) -> Self {
                    ValueExpr::from(Value::from(v))
                }
            }
        )*
    };
}

impl_from_for_value_expr!(
    bool,
    i8,
    i16,
    u8,
    i32,
    u16,
    i64,
    u32,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    uuid::Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    serde_json::Value,
);

/// Named values, in insertion order.
///
/// Used both as the SET map and as template parameters. Setting a name twice keeps
/// its original position and replaces the value.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: Vec<(String, ValueExpr)>,
}

impl Params {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ValueExpr>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a named value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ValueExpr>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&ValueExpr> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueExpr)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Params {
    type Item = (String, ValueExpr);
    type IntoIter = std::vec::IntoIter<(String, ValueExpr)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<ValueExpr>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_expr_from_scalars() {
        assert!(matches!(ValueExpr::from("a"), ValueExpr::Literal(Value::Text(_))));
        assert!(matches!(ValueExpr::from(Option::<i32>::None), ValueExpr::Null));
        assert!(matches!(ValueExpr::from(Value::Null), ValueExpr::Null));
        assert!(matches!(ValueExpr::from(Some(3i64)), ValueExpr::Literal(Value::BigInt(3))));
    }

    #[test]
    fn test_raw_is_deferred() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let expr = raw(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            "NOW()".to_string()
        });
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        match expr {
            ValueExpr::Raw(r) => assert_eq!(r.render(), "NOW()"),
            other => panic!("expected raw, got {other:?}"),
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_params_replace_keeps_position() {
        let params = Params::new()
            .set("a", 1i32)
            .set("b", 2i32)
            .set("a", 3i32);
        let names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(matches!(params.get("a"), Some(ValueExpr::Literal(Value::Int(3)))));
    }

    #[test]
    fn test_list_and_collect() {
        let list = ValueExpr::list([1i32, 2, 3]);
        assert!(matches!(list, ValueExpr::List(ref v) if v.len() == 3));

        let params: Params = [("x", 1i32), ("y", 2i32)].into_iter().collect();
        assert_eq!(params.len(), 2);
    }
}
