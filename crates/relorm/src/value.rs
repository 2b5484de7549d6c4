//! Dialect-neutral bound values.
//!
//! [`Value`] is what the parameter binder stores and what an [`Executor`](crate::Executor)
//! receives. It converts from the usual Rust scalars and implements `ToSql` so the
//! Postgres client can bind it directly.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A dynamically-typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// 16-bit signed integer
    SmallInt(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    BigInt(i64),
    /// 32-bit floating point
    Real(f32),
    /// 64-bit floating point
    Double(f64),
    /// Text string
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID
    Uuid(uuid::Uuid),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
    /// Timestamp with time zone (UTC)
    TimestampTz(DateTime<Utc>),
    /// JSON document
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the SQL type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Real(_) => "REAL",
            Value::Double(_) => "DOUBLE",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BLOB",
            Value::Uuid(_) => "UUID",
            Value::Date(_) => "DATE",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::TimestampTz(_) => "TIMESTAMPTZ",
            Value::Json(_) => "JSON",
        }
    }

    /// Whether two values may share one strictly-typed binding slot.
    ///
    /// NULL is compatible with everything; integer widths are compatible with each other.
    pub(crate) fn same_kind(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return true;
        }
        let int = |v: &Value| matches!(v, Value::SmallInt(_) | Value::Int(_) | Value::BigInt(_));
        let float = |v: &Value| matches!(v, Value::Real(_) | Value::Double(_));
        if int(self) && int(other) || float(self) && float(other) {
            return true;
        }
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i8 => SmallInt,
    i16 => SmallInt,
    u8 => SmallInt,
    i32 => Int,
    u16 => Int,
    i64 => BigInt,
    u32 => BigInt,
    f32 => Real,
    f64 => Double,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    uuid::Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    serde_json::Value => Json,
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::OID => u32::try_from(v)?.to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::SmallInt(v) => int_to_sql(i64::from(*v), ty, out),
            Value::Int(v) => int_to_sql(i64::from(*v), ty, out),
            Value::BigInt(v) => int_to_sql(*v, ty, out),
            Value::Real(v) => float_to_sql(f64::from(*v), ty, out),
            Value::Double(v) => float_to_sql(*v, ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampTz(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_primitives() {
        assert_eq!(Value::from(1i32), Value::Int(1));
        assert_eq!(Value::from(7i64), Value::BigInt(7));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(Option::<i32>::None), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::Text(String::new()).type_name(), "TEXT");
        assert_eq!(Value::Json(serde_json::json!({})).type_name(), "JSON");
    }

    #[test]
    fn same_kind_rules() {
        assert!(Value::Int(1).same_kind(&Value::BigInt(2)));
        assert!(Value::Null.same_kind(&Value::Text("a".into())));
        assert!(Value::Real(1.0).same_kind(&Value::Double(2.0)));
        assert!(!Value::Int(1).same_kind(&Value::Text("1".into())));
    }

    #[test]
    fn int_narrowing_rejects_overflow() {
        let mut buf = BytesMut::new();
        assert!(Value::BigInt(1 << 40).to_sql(&Type::INT4, &mut buf).is_err());
        assert!(Value::BigInt(42).to_sql(&Type::INT4, &mut buf).is_ok());
    }

    #[test]
    fn null_is_null() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::TEXT, &mut buf),
            Ok(IsNull::Yes)
        ));
    }
}
