//! Cell values held by a [`RowSet`](crate::RowSet).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One cell of a row-set.
///
/// Loaded CSV cells are `Text` (or `Null` when empty); the join key and the
/// decoded indicator columns are `Integer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// Build a text cell, mapping the empty string to `Null`.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() { Self::Null } else { Self::Text(field.to_owned()) }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match *self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "rusqlite-types")]
mod sqlite_types {
    use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

    use super::Value;

    impl ToSql for Value {
        fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
            Ok(match self {
                Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
                Self::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
                Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            })
        }
    }

    impl FromSql for Value {
        fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
            match value {
                ValueRef::Null => Ok(Self::Null),
                ValueRef::Integer(i) => Ok(Self::Integer(i)),
                ValueRef::Real(f) => Ok(Self::Text(f.to_string())),
                ValueRef::Text(_) => value.as_str().map(|s| Self::Text(s.to_owned())),
                ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
            }
        }
    }
}
