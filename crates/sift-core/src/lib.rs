//! Sift Core - weighted fuzzy relevance search synthesized as SQL.
//!
//! Given an entity's searchable columns and weights, this crate rewrites a
//! query builder so that rows are scored by how well those columns match the
//! words of a search string, rows under a threshold are dropped, and the rest
//! are ordered by descending relevance. The query is only built here; running
//! it is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use sift_core::{Dialect, Entity, RelevanceSearch, SearchConfig, SelectQuery, StaticSchema};
//! use sift_core::query::QueryBuilder;
//!
//! let posts = Entity::new(
//!     "posts",
//!     SearchConfig::new()
//!         .column("posts.title", 10.0)
//!         .column("users.name", 2.0)
//!         .join("users", "posts.user_id", "users.id"),
//! );
//!
//! let search = RelevanceSearch::new(Dialect::Postgres, StaticSchema::new());
//! let mut query = SelectQuery::new("posts");
//! query.limit(20);
//!
//! let query = search.search(&posts, query, "rust parser", None)?;
//! println!("{}", query.to_sql());
//! # Ok::<(), sift_core::SiftError>(())
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod query;
pub mod schema;
pub mod search;

// Re-export commonly used types
pub use config::{JoinKeys, OrderedMap, ScoringConfig, SearchConfig};
pub use dialect::{
    ConnectionConfig, ConnectionRegistry, Dialect, DialectCapabilities, DialectResolver,
    GroupByStrategy, LikeOperator,
};
pub use error::{Result, SiftError};
pub use query::{Binding, BindingSlot, Order, QueryBuilder, SelectQuery};
pub use schema::{PrefixedSchema, SchemaIntrospector, StaticSchema};
pub use search::{Entity, RelevanceSearch, Searchable};
