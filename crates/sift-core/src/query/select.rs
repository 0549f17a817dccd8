//! A minimal SELECT builder implementing [`QueryBuilder`].

use super::{Binding, BindingSlot, Order, QueryBuilder};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum FromClause {
    Table(String),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    table: String,
    first: String,
    second: String,
}

/// SELECT statement builder rendering lower-case SQL with `?` placeholders.
///
/// ```
/// use sift_core::query::{Binding, Order, QueryBuilder, SelectQuery};
///
/// let mut query = SelectQuery::new("posts");
/// query.where_raw("published = ?", [Binding::from("yes")]);
/// query.order_by("created_at", Order::Desc);
/// query.limit(10);
///
/// assert_eq!(
///     query.to_sql(),
///     "select * from posts where published = ? order by created_at desc limit 10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    prefix: String,
    from: FromClause,
    columns: Vec<String>,
    joins: Vec<Join>,
    wheres: Vec<String>,
    groups: Vec<String>,
    havings: Vec<String>,
    orders: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    eager_loads: Vec<String>,
    bindings: BTreeMap<BindingSlot, Vec<Binding>>,
}

impl SelectQuery {
    /// Start a query positioned against `table`.
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            from: FromClause::Table(table.clone()),
            table,
            prefix: String::new(),
            columns: Vec::new(),
            joins: Vec::new(),
            wheres: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            eager_loads: Vec::new(),
            bindings: BTreeMap::new(),
        }
    }

    /// Add a raw WHERE condition; conditions are combined with `and`.
    pub fn where_raw<I>(&mut self, expression: &str, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Binding>,
    {
        self.wheres.push(expression.to_string());
        for binding in bindings {
            self.add_binding(binding, BindingSlot::Where);
        }
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Mark a relation for eager loading. Markers are carried along with the
    /// query for the host ORM and never rendered.
    pub fn with(&mut self, relation: impl Into<String>) -> &mut Self {
        self.eager_loads.push(relation.into());
        self
    }

    pub fn eager_loads(&self) -> &[String] {
        &self.eager_loads
    }

    /// Bindings registered for a single clause.
    pub fn slot_bindings(&self, slot: BindingSlot) -> &[Binding] {
        self.bindings.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_columns(&self) -> &[String] {
        &self.groups
    }

    pub fn having_clauses(&self) -> &[String] {
        &self.havings
    }

    pub fn select_columns(&self) -> &[String] {
        &self.columns
    }

    /// `app_posts as posts` under prefix `app_`, or `posts` without one.
    fn physical(&self, table: &str) -> String {
        if self.prefix.is_empty() {
            table.to_string()
        } else {
            format!("{}{} as {}", self.prefix, table, table)
        }
    }
}

impl QueryBuilder for SelectQuery {
    fn table(&self) -> &str {
        &self.table
    }

    fn select(&mut self, columns: &[&str]) {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
    }

    fn select_raw(&mut self, expression: &str) {
        self.columns.push(expression.to_string());
    }

    fn left_join(&mut self, table: &str, first: &str, second: &str) {
        self.joins.push(Join {
            table: table.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    fn group_by(&mut self, column: &str) {
        self.groups.push(column.to_string());
    }

    fn having_raw(&mut self, expression: &str) {
        self.havings.push(expression.to_string());
    }

    fn order_by(&mut self, column: &str, order: Order) {
        self.orders.push((column.to_string(), order));
    }

    fn add_binding(&mut self, value: Binding, slot: BindingSlot) {
        self.bindings.entry(slot).or_default().push(value);
    }

    fn to_sql(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let from = match &self.from {
            FromClause::Table(table) => self.physical(table),
            FromClause::Raw(expression) => expression.clone(),
        };

        let mut sql = format!("select {} from {}", columns, from);

        for join in &self.joins {
            sql.push_str(&format!(
                " left join {} on {} = {}",
                self.physical(&join.table),
                join.first,
                join.second
            ));
        }

        if !self.wheres.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&self.wheres.join(" and "));
        }

        if !self.groups.is_empty() {
            sql.push_str(" group by ");
            sql.push_str(&self.groups.join(", "));
        }

        if !self.havings.is_empty() {
            sql.push_str(" having ");
            sql.push_str(&self.havings.join(" and "));
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|(column, order)| format!("{} {}", column, order.as_sql()))
                .collect();
            sql.push_str(" order by ");
            sql.push_str(&orders.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" limit {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" offset {}", offset));
        }

        sql
    }

    fn bindings(&self) -> Vec<Binding> {
        self.bindings.values().flatten().cloned().collect()
    }

    fn from_raw(&mut self, expression: &str) {
        self.from = FromClause::Raw(expression.to_string());
        self.bindings.remove(&BindingSlot::From);
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }
}
