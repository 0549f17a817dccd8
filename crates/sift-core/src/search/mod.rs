//! Relevance search over a query builder.
//!
//! A search runs five stages, each in its own module:
//!
//! 1. [`columns`] resolves searchable columns, joins and grouping.
//! 2. [`tokenize`] splits the search text into words.
//! 3. [`score`] builds the weighted CASE expression and its bindings.
//! 4. [`assemble`] attaches score, filter, ordering and grouping to a copy
//!    of the caller's query.
//! 5. [`merge`] installs that copy as the FROM subquery of the caller's query.
//!
//! All per-call state (words, terms, bindings) lives on the stack of a single
//! [`RelevanceSearch::search`] call.

pub mod assemble;
pub mod columns;
pub mod merge;
pub mod score;
pub mod tokenize;

pub use columns::{GroupBy, WeightedColumn};
pub use score::{MatchStrength, ScoreExpression, ScoreTerm};
pub use tokenize::tokenize;

use crate::config::{ScoringConfig, SearchConfig};
use crate::dialect::DialectResolver;
use crate::error::{Result, SiftError};
use crate::query::QueryBuilder;
use crate::schema::{PrefixedSchema, SchemaIntrospector};
use assemble::{assemble, prepare_base, Assembly};
use columns::{default_threshold, resolve_columns, resolve_group_by, resolve_joins};
use merge::{merge_into, subquery_alias};
use tracing::debug;

/// An entity that can be relevance-searched.
pub trait Searchable {
    fn table_name(&self) -> &str;

    fn primary_key(&self) -> &str {
        ScoringConfig::DEFAULT_PRIMARY_KEY
    }

    /// Named connection, or `None` for the registry's default.
    fn connection_name(&self) -> Option<&str> {
        None
    }

    fn search_config(&self) -> &SearchConfig;
}

/// A plain [`Searchable`] definition.
#[derive(Debug, Clone)]
pub struct Entity {
    table: String,
    primary_key: String,
    connection: Option<String>,
    config: SearchConfig,
}

impl Entity {
    pub fn new(table: impl Into<String>, config: SearchConfig) -> Self {
        Self {
            table: table.into(),
            primary_key: ScoringConfig::DEFAULT_PRIMARY_KEY.to_string(),
            connection: None,
            config,
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }
}

impl Searchable for Entity {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    fn search_config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Builds relevance-ranked queries.
///
/// ```
/// use sift_core::{Dialect, Entity, RelevanceSearch, SearchConfig, SelectQuery, StaticSchema};
/// use sift_core::query::QueryBuilder;
///
/// let posts = Entity::new("posts", SearchConfig::new().column("title", 10.0).column("body", 2.0));
/// let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
///
/// let query = search.search(&posts, SelectQuery::new("posts"), "hello world", None).unwrap();
/// assert!(query.to_sql().contains("having relevance > 3 order by relevance desc) as `posts`"));
/// assert_eq!(query.bindings().len(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct RelevanceSearch<R, S> {
    resolver: R,
    schema: S,
}

impl<R, S> RelevanceSearch<R, S>
where
    R: DialectResolver,
    S: SchemaIntrospector,
{
    pub fn new(resolver: R, schema: S) -> Self {
        Self { resolver, schema }
    }

    /// Rank `query`'s rows by how well they match `text`.
    ///
    /// Rows scoring at or below `threshold` (default: sum of weights / 4) are
    /// dropped. A threshold that is NaN or infinite is a configuration error.
    /// Empty text returns `query` with the entity's joins applied and nothing
    /// else.
    ///
    /// The `order by relevance desc` lives inside the subquery only; order the
    /// returned query by `relevance` to get ranked rows. SQL Server rejects
    /// ORDER BY in a derived table without TOP or OFFSET, so queries built for
    /// [`Dialect::SqlServer`](crate::dialect::Dialect::SqlServer) need the
    /// host builder to add one of them to the subquery.
    pub fn search<Q, E>(
        &self,
        entity: &E,
        query: Q,
        text: &str,
        threshold: Option<f64>,
    ) -> Result<Q>
    where
        Q: QueryBuilder,
        E: Searchable + ?Sized,
    {
        self.search_restricted(entity, query, text, threshold, |_| {})
    }

    /// Like [`search`](Self::search), with `restriction` applied to the scored
    /// subquery after joins and before scoring.
    pub fn search_restricted<Q, E, F>(
        &self,
        entity: &E,
        mut query: Q,
        text: &str,
        threshold: Option<f64>,
        restriction: F,
    ) -> Result<Q>
    where
        Q: QueryBuilder,
        E: Searchable + ?Sized,
        F: FnOnce(&mut Q),
    {
        if let Some(threshold) = threshold {
            if !threshold.is_finite() {
                return Err(SiftError::config(format!(
                    "threshold must be a finite number, got {}",
                    threshold
                )));
            }
        }

        let table = entity.table_name();
        let config = entity.search_config();
        let connection = entity.connection_name();
        let capabilities = self.resolver.dialect(connection).capabilities();
        let prefix = self.resolver.table_prefix(connection);
        let schema = PrefixedSchema::new(&self.schema, prefix);
        let joins = resolve_joins(config)?;

        query.set_table_prefix(prefix);

        if text.is_empty() {
            prepare_base(&mut query, table, &joins);
            return Ok(query);
        }

        let columns = resolve_columns(config, table, &schema)?;
        let group_by = resolve_group_by(
            config,
            table,
            entity.primary_key(),
            &capabilities,
            &schema,
        )?;
        let words = tokenize(text);
        let score = ScoreExpression::build(&columns, &words, capabilities.like_operator);
        let threshold = threshold.unwrap_or_else(|| default_threshold(&columns));

        let mut scored = query.clone();
        prepare_base(&mut scored, table, &joins);
        restriction(&mut scored);
        assemble(
            &mut scored,
            &Assembly {
                score: &score,
                threshold,
                columns: &columns,
                joins: &joins,
                group_by: &group_by,
                capabilities,
            },
        );

        debug!(
            "Relevance search on {} ({}): {} words, {} terms, {} bindings, threshold {}",
            table,
            capabilities.dialect,
            words.len(),
            score.terms().len(),
            scored.bindings().len(),
            threshold
        );

        let alias = subquery_alias(capabilities.dialect, query.table());
        merge_into(&mut query, &scored, &alias);

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{ConnectionRegistry, Dialect};
    use crate::query::{Binding, BindingSlot, SelectQuery};
    use crate::schema::StaticSchema;

    fn posts() -> Entity {
        Entity::new(
            "posts",
            SearchConfig::new().column("title", 10.0).column("body", 2.0),
        )
    }

    fn texts(bindings: &[Binding]) -> Vec<&str> {
        bindings.iter().filter_map(Binding::as_text).collect()
    }

    #[test]
    fn test_end_to_end_mysql() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let query = search
            .search(&posts(), SelectQuery::new("posts"), "hello world", None)
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.starts_with("select * from (select posts.*, (case when LOWER(title) LIKE ?"));
        assert!(sql.contains("(case when LOWER(body) LIKE ? then 2 else 0 end) as relevance"));
        assert!(sql.contains("as relevance from posts group by posts.id"));
        assert!(sql.ends_with("having relevance > 3 order by relevance desc) as `posts`"));
        assert_eq!(sql.matches("case when").count(), 12);

        let bindings = query.bindings();
        assert_eq!(bindings.len(), 12);
        let per_column = ["hello", "hello%", "%hello%", "world", "world%", "%world%"];
        assert_eq!(&texts(&bindings)[..6], &per_column);
        assert_eq!(&texts(&bindings)[6..], &per_column);
        assert_eq!(query.slot_bindings(BindingSlot::From).len(), 12);
    }

    #[test]
    fn test_end_to_end_postgres() {
        let search = RelevanceSearch::new(Dialect::Postgres, StaticSchema::new());
        let query = search
            .search(&posts(), SelectQuery::new("posts"), "hello world", None)
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("LOWER(title) ILIKE ?"));
        assert!(!sql.contains("relevance >"));
        assert!(sql.contains("then 2 else 0 end) > 3 order by relevance desc) as \"posts\""));
        assert_eq!(sql.matches('?').count(), 24);

        let bindings = query.bindings();
        assert_eq!(bindings.len(), 24);
        assert_eq!(bindings[..12], bindings[12..]);
    }

    #[test]
    fn test_custom_threshold() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let query = search
            .search(&posts(), SelectQuery::new("posts"), "hello", Some(42.5))
            .unwrap();
        assert!(query.to_sql().contains("having relevance > 42.5 order by"));
    }

    #[test]
    fn test_empty_text_returns_base_query() {
        let entity = Entity::new(
            "posts",
            SearchConfig::new()
                .column("title", 1.0)
                .join("users", "posts.user_id", "users.id"),
        );
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let query = search.search(&entity, SelectQuery::new("posts"), "", None).unwrap();

        assert_eq!(
            query.to_sql(),
            "select posts.* from posts left join users on posts.user_id = users.id"
        );
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn test_empty_text_still_checks_joins() {
        let entity = Entity::new("posts", SearchConfig::new().join("users", "", "users.id"));
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let err = search
            .search(&entity, SelectQuery::new("posts"), "", None)
            .unwrap_err();
        assert!(matches!(err, SiftError::InvalidJoin { .. }));
    }

    #[test]
    fn test_schema_fallback_columns() {
        let entity = Entity::new("posts", SearchConfig::new());
        let schema = StaticSchema::new().with_table("posts", ["id", "title"]);
        let search = RelevanceSearch::new(Dialect::MySql, schema);
        let query = search
            .search(&entity, SelectQuery::new("posts"), "x", None)
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("LOWER(id) LIKE ? then 15 else"));
        assert!(sql.contains("LOWER(title) LIKE ? then 1 else"));
        assert!(sql.contains("having relevance > 0.5"));
    }

    #[test]
    fn test_schema_failure_propagates() {
        let entity = Entity::new("posts", SearchConfig::new());
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let err = search
            .search(&entity, SelectQuery::new("posts"), "x", None)
            .unwrap_err();
        assert!(matches!(err, SiftError::Schema { .. }));
    }

    #[test]
    fn test_caller_query_is_not_scored_in_place() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let base = SelectQuery::new("posts");
        let before = base.clone();
        let _ = search.search(&posts(), base.clone(), "hello", None).unwrap();
        assert_eq!(base, before);
    }

    #[test]
    fn test_identical_searches_match() {
        let search = RelevanceSearch::new(Dialect::Postgres, StaticSchema::new());
        let mut base = SelectQuery::new("posts");
        base.where_raw("posts.draft = ?", [Binding::Integer(0)]);

        let first = search.search(&posts(), base.clone(), "a b", None).unwrap();
        let second = search.search(&posts(), base.clone(), "a b", None).unwrap();

        assert_eq!(first.to_sql(), second.to_sql());
        assert_eq!(first.bindings(), second.bindings());
    }

    #[test]
    fn test_caller_where_bindings_follow_subquery() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let mut base = SelectQuery::new("posts");
        base.where_raw("posts.draft = ?", [Binding::Integer(0)]);
        base.limit(20);

        let query = search.search(&posts(), base, "a", None).unwrap();
        let sql = query.to_sql();
        assert!(sql.ends_with(") as `posts` where posts.draft = ? limit 20"));

        // the copy inside the subquery carries the caller's condition too
        let bindings = query.bindings();
        assert_eq!(bindings.len(), 6 + 1 + 1);
        assert_eq!(bindings[6], Binding::Integer(0));
        assert_eq!(bindings[7], Binding::Integer(0));
        assert_eq!(sql.matches('?').count(), bindings.len());
    }

    #[test]
    fn test_restriction_lands_in_subquery() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let query = search
            .search_restricted(&posts(), SelectQuery::new("posts"), "a", None, |q| {
                q.where_raw("posts.user_id = ?", [Binding::Integer(7)]);
            })
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("from posts where posts.user_id = ? group by posts.id"));
        assert!(!sql.ends_with("?"));
        assert_eq!(query.bindings().last(), Some(&Binding::Integer(7)));
    }

    #[test]
    fn test_registry_prefix_and_connection() {
        let registry = ConnectionRegistry::new("main")
            .with_connection("main", "mysql", "")
            .with_connection("archive", "sqlsrv", "old_");
        let entity = Entity::new(
            "posts",
            SearchConfig::new()
                .column("title", 10.0)
                .column("body", 2.0)
                .table_columns(["posts.post_id", "posts.title"]),
        )
        .with_connection("archive")
        .with_primary_key("post_id");

        let search = RelevanceSearch::new(&registry, StaticSchema::new());
        let query = search
            .search(&entity, SelectQuery::new("posts"), "a", None)
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("from old_posts as posts group by posts.post_id, posts.title having"));
        assert!(sql.ends_with(") as [posts]"));
        assert_eq!(query.bindings().len(), 12);
    }

    #[test]
    fn test_prefixed_schema_lookup() {
        let registry = ConnectionRegistry::new("main").with_connection("main", "sqlsrv", "app_");
        let schema = StaticSchema::new().with_table("app_posts", ["id", "title"]);
        let entity = Entity::new("posts", SearchConfig::new());

        let search = RelevanceSearch::new(&registry, schema);
        let query = search
            .search(&entity, SelectQuery::new("posts"), "a", None)
            .unwrap();

        let sql = query.to_sql();
        assert!(sql.contains("LOWER(title) LIKE ?"));
        assert!(sql.contains("from app_posts as posts group by posts.id, posts.title having"));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        for threshold in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = search
                .search(&posts(), SelectQuery::new("posts"), "hello", Some(threshold))
                .unwrap_err();
            assert!(matches!(err, SiftError::Config { .. }), "{}", threshold);
        }
    }

    #[test]
    fn test_zero_and_negative_thresholds_allowed() {
        let search = RelevanceSearch::new(Dialect::MySql, StaticSchema::new());
        let query = search
            .search(&posts(), SelectQuery::new("posts"), "hello", Some(-1.5))
            .unwrap();
        assert!(query.to_sql().contains("having relevance > -1.5 order by"));

        let query = search
            .search(&posts(), SelectQuery::new("posts"), "hello", Some(0.0))
            .unwrap();
        assert!(query.to_sql().contains("having relevance > 0 order by"));
    }
}
