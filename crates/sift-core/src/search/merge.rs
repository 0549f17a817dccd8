//! Splices a scored query into the caller's query as its FROM subquery.

use crate::dialect::Dialect;
use crate::query::{BindingSlot, QueryBuilder};

/// Alias of the subquery: the table name the query's clauses refer to,
/// quoted for the dialect. A connection prefix never reaches the alias.
pub fn subquery_alias(dialect: Dialect, table: &str) -> String {
    dialect.quote_identifier(table)
}

/// Make `scored` the FROM target of `original` and import its bindings.
///
/// The alias keeps the table name, so clauses already on `original`
/// (`posts.published = ?`, limits, eager loads) keep resolving against it.
pub fn merge_into<Q: QueryBuilder>(original: &mut Q, scored: &Q, alias: &str) {
    original.from_raw(&format!("({}) as {}", scored.to_sql(), alias));
    original.merge_bindings(scored, BindingSlot::From);
}
