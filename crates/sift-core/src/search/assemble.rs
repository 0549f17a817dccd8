//! Attaches the score expression, threshold, ordering, grouping and bindings
//! to a query builder.

use super::columns::{GroupBy, WeightedColumn};
use super::score::ScoreExpression;
use crate::config::{JoinKeys, ScoringConfig};
use crate::dialect::DialectCapabilities;
use crate::query::{BindingSlot, Order, QueryBuilder};

/// Everything the assembler adds to a prepared query.
#[derive(Debug, Clone)]
pub struct Assembly<'a> {
    pub score: &'a ScoreExpression,
    pub threshold: f64,
    pub columns: &'a [WeightedColumn],
    pub joins: &'a [(String, JoinKeys)],
    pub group_by: &'a GroupBy,
    pub capabilities: DialectCapabilities,
}

/// Select the entity's own columns and apply the configured left joins.
pub fn prepare_base<Q: QueryBuilder>(query: &mut Q, table: &str, joins: &[(String, JoinKeys)]) {
    let own_columns = format!("{}.*", table);
    query.select(&[own_columns.as_str()]);

    for (joined, keys) in joins {
        query.left_join(joined, &keys.local, &keys.foreign);
    }
}

/// Add the relevance column, its HAVING filter, ordering, grouping and bindings.
///
/// Dialects that cannot reference the `relevance` alias in HAVING get the
/// full expression repeated there, and the bindings registered a second time
/// for the HAVING clause.
pub fn assemble<Q: QueryBuilder>(query: &mut Q, assembly: &Assembly<'_>) {
    let alias = ScoringConfig::RELEVANCE_ALIAS;
    let expression = assembly.score.to_sql();

    query.select_raw(&format!("{} as {}", expression, alias));

    let comparator = if assembly.capabilities.alias_in_having {
        alias
    } else {
        expression.as_str()
    };
    query.having_raw(&format!("{} > {}", comparator, assembly.threshold));

    query.order_by(alias, Order::Desc);

    for column in group_columns(assembly.group_by, assembly.columns, assembly.joins) {
        query.group_by(&column);
    }

    let bindings = assembly.score.bindings();
    if !assembly.capabilities.alias_in_having {
        for binding in &bindings {
            query.add_binding(binding.clone(), BindingSlot::Having);
        }
    }
    for binding in bindings {
        query.add_binding(binding, BindingSlot::Select);
    }
}

/// Final GROUP BY list.
///
/// A searched column is added once for every joined table whose name it
/// contains as a substring, so `users.name` matches a join on `user` as
/// well as one on `users`.
pub fn group_columns(
    group_by: &GroupBy,
    columns: &[WeightedColumn],
    joins: &[(String, JoinKeys)],
) -> Vec<String> {
    match group_by {
        GroupBy::Explicit(explicit) => explicit.clone(),
        GroupBy::Base(base) => {
            let mut group = base.clone();
            for column in columns {
                for (joined, _) in joins {
                    if column.column.contains(joined.as_str()) {
                        group.push(column.column.clone());
                    }
                }
            }
            group
        }
    }
}
