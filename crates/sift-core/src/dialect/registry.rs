//! Connection registry: which driver backs which named connection.

use super::Dialect;
use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Reports the active dialect for an entity's connection.
pub trait DialectResolver {
    /// Dialect of the named connection, or of the default connection.
    fn dialect(&self, connection: Option<&str>) -> Dialect;

    /// Table prefix configured for the connection.
    fn table_prefix(&self, _connection: Option<&str>) -> &str {
        ""
    }
}

/// A fixed dialect with no table prefix.
impl DialectResolver for Dialect {
    fn dialect(&self, _connection: Option<&str>) -> Dialect {
        *self
    }
}

impl<T: DialectResolver + ?Sized> DialectResolver for &T {
    fn dialect(&self, connection: Option<&str>) -> Dialect {
        (**self).dialect(connection)
    }

    fn table_prefix(&self, connection: Option<&str>) -> &str {
        (**self).table_prefix(connection)
    }
}

/// Settings of one named connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub driver: String,
    #[serde(default)]
    pub prefix: String,
}

/// Named connections plus the default one.
///
/// ```json
/// {
///     "default": "main",
///     "connections": { "main": { "driver": "mysql", "prefix": "app_" } }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionRegistry {
    pub default: String,
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

impl ConnectionRegistry {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            connections: HashMap::new(),
        }
    }

    /// Parse a registry from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let registry: ConnectionRegistry = serde_json::from_str(json)?;
        Ok(registry)
    }

    /// Register a connection.
    pub fn with_connection(
        mut self,
        name: impl Into<String>,
        driver: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        self.connections.insert(
            name.into(),
            ConnectionConfig {
                driver: driver.into(),
                prefix: prefix.into(),
            },
        );
        self
    }

    /// Look up a connection, falling back to the default name.
    pub fn connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let name = name.unwrap_or(&self.default);
        let found = self.connections.get(name);
        if found.is_none() {
            warn!("Connection '{}' is not registered", name);
        }
        found
    }
}

impl DialectResolver for ConnectionRegistry {
    fn dialect(&self, connection: Option<&str>) -> Dialect {
        self.connection(connection)
            .map(|c| Dialect::from_driver(&c.driver))
            .unwrap_or_default()
    }

    fn table_prefix(&self, connection: Option<&str>) -> &str {
        self.connection(connection)
            .map(|c| c.prefix.as_str())
            .unwrap_or("")
    }
}
