//! Resolves searchable columns, joins and grouping from an entity's config.

use crate::config::{JoinKeys, ScoringConfig, SearchConfig};
use crate::dialect::{DialectCapabilities, GroupByStrategy};
use crate::error::{Result, SiftError};
use crate::schema::SchemaIntrospector;
use tracing::debug;

/// A searchable column expression and its relevance weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedColumn {
    pub column: String,
    pub weight: f64,
}

impl WeightedColumn {
    pub fn new(column: impl Into<String>, weight: f64) -> Self {
        Self {
            column: column.into(),
            weight,
        }
    }
}

/// GROUP BY columns before the joined-table heuristic is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    /// Configured by the entity; used verbatim.
    Explicit(Vec<String>),
    /// Derived from the dialect's strategy; joined columns are added later.
    Base(Vec<String>),
}

/// Configured columns in order, or every schema column with weight 1.
pub fn resolve_columns<S>(
    config: &SearchConfig,
    table: &str,
    schema: &S,
) -> Result<Vec<WeightedColumn>>
where
    S: SchemaIntrospector + ?Sized,
{
    config.validate()?;

    if let Some(columns) = &config.columns {
        return Ok(columns
            .iter()
            .map(|(column, weight)| WeightedColumn::new(column, *weight))
            .collect());
    }

    debug!("No searchable columns configured for {}, reading schema", table);
    let columns = schema.list_columns(table)?;
    if columns.is_empty() {
        return Err(SiftError::config(format!(
            "no searchable columns for table {}",
            table
        )));
    }

    Ok(columns
        .into_iter()
        .map(|column| WeightedColumn::new(column, 1.0))
        .collect())
}

/// Configured joins in order, after checking both keys are present.
pub fn resolve_joins(config: &SearchConfig) -> Result<Vec<(String, JoinKeys)>> {
    config
        .joins
        .iter()
        .map(|(table, keys)| {
            if keys.local.trim().is_empty() {
                return Err(SiftError::InvalidJoin {
                    table: table.to_string(),
                    message: "local key is empty".to_string(),
                });
            }
            if keys.foreign.trim().is_empty() {
                return Err(SiftError::InvalidJoin {
                    table: table.to_string(),
                    message: "foreign key is empty".to_string(),
                });
            }
            Ok((table.to_string(), keys.clone()))
        })
        .collect()
}

/// Sum of the weights divided by four.
pub fn default_threshold(columns: &[WeightedColumn]) -> f64 {
    columns.iter().map(|c| c.weight).sum::<f64>() / ScoringConfig::THRESHOLD_DIVISOR
}

/// Grouping columns for the entity under the given dialect.
pub fn resolve_group_by<S>(
    config: &SearchConfig,
    table: &str,
    primary_key: &str,
    capabilities: &DialectCapabilities,
    schema: &S,
) -> Result<GroupBy>
where
    S: SchemaIntrospector + ?Sized,
{
    if let Some(columns) = &config.group_by {
        return Ok(GroupBy::Explicit(columns.clone()));
    }

    let columns = match capabilities.group_by {
        GroupByStrategy::PrimaryKey => vec![format!("{}.{}", table, primary_key)],
        GroupByStrategy::AllColumns => match &config.table_columns {
            Some(columns) => columns.clone(),
            None => schema
                .list_columns(table)?
                .into_iter()
                .map(|column| format!("{}.{}", table, column))
                .collect(),
        },
    };

    Ok(GroupBy::Base(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::schema::StaticSchema;

    fn schema() -> StaticSchema {
        StaticSchema::new().with_table("posts", ["id", "title", "body"])
    }

    #[test]
    fn test_configured_columns() {
        let config = SearchConfig::new().column("title", 10.0).column("body", 2.0);
        let columns = resolve_columns(&config, "posts", &schema()).unwrap();
        assert_eq!(
            columns,
            vec![WeightedColumn::new("title", 10.0), WeightedColumn::new("body", 2.0)]
        );
    }

    #[test]
    fn test_schema_fallback() {
        let columns = resolve_columns(&SearchConfig::new(), "posts", &schema()).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "body"]);
        assert!(columns.iter().all(|c| c.weight == 1.0));
    }

    #[test]
    fn test_schema_failure_is_fatal() {
        let err = resolve_columns(&SearchConfig::new(), "users", &schema()).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_invalid_weight_is_fatal() {
        let config = SearchConfig::new().column("title", 0.0);
        assert!(resolve_columns(&config, "posts", &schema()).is_err());
    }

    #[test]
    fn test_joins() {
        let config = SearchConfig::new()
            .join("users", "posts.user_id", "users.id")
            .join("tags", "posts.tag_id", "tags.id");
        let joins = resolve_joins(&config).unwrap();
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].0, "users");
        assert_eq!(joins[1].1, JoinKeys::new("posts.tag_id", "tags.id"));

        assert!(resolve_joins(&SearchConfig::new()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_join() {
        let config = SearchConfig::new().join("users", "posts.user_id", " ");
        let err = resolve_joins(&config).unwrap_err();
        assert!(matches!(err, SiftError::InvalidJoin { ref table, .. } if table == "users"));
    }

    #[test]
    fn test_default_threshold() {
        let columns = vec![WeightedColumn::new("title", 10.0), WeightedColumn::new("body", 2.0)];
        assert_eq!(default_threshold(&columns), 3.0);
        assert_eq!(default_threshold(&[WeightedColumn::new("a", 1.0)]), 0.25);
    }

    #[test]
    fn test_group_by_primary_key() {
        let caps = Dialect::MySql.capabilities();
        let group =
            resolve_group_by(&SearchConfig::new(), "posts", "id", &caps, &schema()).unwrap();
        assert_eq!(group, GroupBy::Base(vec!["posts.id".to_string()]));
    }

    #[test]
    fn test_group_by_all_columns() {
        let caps = Dialect::SqlServer.capabilities();

        let configured = SearchConfig::new().table_columns(["posts.id", "posts.title"]);
        let group = resolve_group_by(&configured, "posts", "id", &caps, &schema()).unwrap();
        assert_eq!(
            group,
            GroupBy::Base(vec!["posts.id".to_string(), "posts.title".to_string()])
        );

        let group =
            resolve_group_by(&SearchConfig::new(), "posts", "id", &caps, &schema()).unwrap();
        assert_eq!(
            group,
            GroupBy::Base(vec![
                "posts.id".to_string(),
                "posts.title".to_string(),
                "posts.body".to_string()
            ])
        );
    }

    #[test]
    fn test_group_by_override() {
        let caps = Dialect::SqlServer.capabilities();
        let config = SearchConfig::new().group_by(["posts.slug"]);
        let group = resolve_group_by(&config, "posts", "id", &caps, &schema()).unwrap();
        assert_eq!(group, GroupBy::Explicit(vec!["posts.slug".to_string()]));
    }
}
