//! Parameter values bound to query placeholders.

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};

/// A positional parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Binding {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Binding::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Binding {
    fn from(value: &str) -> Self {
        Binding::Text(value.to_string())
    }
}

impl From<String> for Binding {
    fn from(value: String) -> Self {
        Binding::Text(value)
    }
}

impl From<i64> for Binding {
    fn from(value: i64) -> Self {
        Binding::Integer(value)
    }
}

impl From<f64> for Binding {
    fn from(value: f64) -> Self {
        Binding::Real(value)
    }
}

impl ToSql for Binding {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Binding::Null => ToSqlOutput::Owned(Value::Null),
            Binding::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Binding::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            Binding::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}
