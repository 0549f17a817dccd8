//! Schema introspection used when an entity declares no searchable columns.

use crate::error::{Result, SiftError};
use rusqlite::Connection;
use std::collections::HashMap;

/// Lists the columns of a table in schema order.
pub trait SchemaIntrospector {
    fn list_columns(&self, table: &str) -> Result<Vec<String>>;
}

impl<T: SchemaIntrospector + ?Sized> SchemaIntrospector for &T {
    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        (**self).list_columns(table)
    }
}

impl SchemaIntrospector for Connection {
    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| SiftError::schema(table, "Failed to prepare column listing", Some(e)))?;

        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| SiftError::schema(table, "Failed to list columns", Some(e)))?;

        if columns.is_empty() {
            return Err(SiftError::schema(table, "table not found or has no columns", None));
        }

        Ok(columns)
    }
}

/// Column listings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: HashMap<String, Vec<String>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
        self
    }
}

impl SchemaIntrospector for StaticSchema {
    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        match self.tables.get(table) {
            Some(columns) if !columns.is_empty() => Ok(columns.clone()),
            _ => Err(SiftError::schema(table, "table not found or has no columns", None)),
        }
    }
}

/// Looks tables up under a connection's table prefix.
#[derive(Debug)]
pub struct PrefixedSchema<'a, S: ?Sized> {
    schema: &'a S,
    prefix: &'a str,
}

impl<'a, S: SchemaIntrospector + ?Sized> PrefixedSchema<'a, S> {
    pub fn new(schema: &'a S, prefix: &'a str) -> Self {
        Self { schema, prefix }
    }
}

impl<S: SchemaIntrospector + ?Sized> SchemaIntrospector for PrefixedSchema<'_, S> {
    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        if self.prefix.is_empty() {
            return self.schema.list_columns(table);
        }
        self.schema.list_columns(&format!("{}{}", self.prefix, table))
    }
}
