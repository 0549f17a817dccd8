//! SQL dialects and the capabilities relevance search depends on.
//!
//! The pipeline never asks "which dialect is this" more than once: the
//! dialect is resolved to a [`DialectCapabilities`] descriptor at the start
//! of each search and that descriptor is passed to every stage.

mod registry;

pub use registry::{ConnectionConfig, ConnectionRegistry, DialectResolver};

use tracing::warn;

/// SQL backends with known relevance search behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
    SqlServer,
    /// Any other driver. Uses the conservative strategy.
    #[default]
    Generic,
}

/// Comparison operator used for the wildcard matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOperator {
    Like,
    ILike,
}

impl LikeOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LikeOperator::Like => "LIKE",
            LikeOperator::ILike => "ILIKE",
        }
    }
}

/// How rows multiplied by joins are collapsed back to one per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupByStrategy {
    /// `GROUP BY table.primary_key`
    PrimaryKey,
    /// Every column of the table, for backends that reject selecting
    /// columns not covered by the GROUP BY.
    AllColumns,
}

/// Per-call strategy descriptor derived from a [`Dialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectCapabilities {
    pub dialect: Dialect,
    /// HAVING may reference the `relevance` select alias.
    pub alias_in_having: bool,
    pub like_operator: LikeOperator,
    pub group_by: GroupByStrategy,
}

impl Dialect {
    /// Map a connection driver name to a dialect.
    ///
    /// Unknown drivers map to [`Dialect::Generic`] with a warning, since the
    /// generic strategy can silently change which rows qualify.
    pub fn from_driver(driver: &str) -> Self {
        match driver.to_lowercase().as_str() {
            "mysql" | "mariadb" => Dialect::MySql,
            "pgsql" | "postgres" | "postgresql" => Dialect::Postgres,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "sqlsrv" | "mssql" | "sqlserver" => Dialect::SqlServer,
            other => {
                warn!(
                    "Unknown database driver '{}', using generic relevance search strategy",
                    other
                );
                Dialect::Generic
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "pgsql",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlsrv",
            Dialect::Generic => "generic",
        }
    }

    pub fn capabilities(&self) -> DialectCapabilities {
        DialectCapabilities {
            dialect: *self,
            alias_in_having: matches!(self, Dialect::MySql),
            like_operator: match self {
                Dialect::Postgres => LikeOperator::ILike,
                _ => LikeOperator::Like,
            },
            group_by: match self {
                Dialect::SqlServer => GroupByStrategy::AllColumns,
                _ => GroupByStrategy::PrimaryKey,
            },
        }
    }

    /// Quote an identifier used as a subquery alias.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            Dialect::MySql | Dialect::Sqlite => format!("`{}`", identifier.replace('`', "``")),
            Dialect::SqlServer => format!("[{}]", identifier.replace(']', "]]")),
            Dialect::Postgres | Dialect::Generic => {
                format!("\"{}\"", identifier.replace('"', "\"\""))
            }
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
