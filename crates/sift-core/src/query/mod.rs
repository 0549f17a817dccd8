//! Query builder abstraction.
//!
//! Relevance search only needs a handful of operations from the host's query
//! builder. They are collected in [`QueryBuilder`]; [`SelectQuery`] is a
//! self-contained implementation rendering plain SQL with `?` placeholders.

mod binding;
mod select;

pub use binding::Binding;
pub use select::SelectQuery;

/// Clause a binding belongs to.
///
/// Variants are declared in render order, so sorting by slot yields the
/// order in which placeholders appear in the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingSlot {
    Select,
    From,
    Join,
    Where,
    Having,
    Order,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Operations relevance search performs on a host query builder.
///
/// `Clone` is the builder-copy operation: the search scores a copy and
/// leaves the caller's query untouched until the final splice.
pub trait QueryBuilder: Clone {
    /// Table the query is positioned against.
    fn table(&self) -> &str;

    /// Replace the select list.
    fn select(&mut self, columns: &[&str]);

    /// Append a raw select expression.
    fn select_raw(&mut self, expression: &str);

    fn left_join(&mut self, table: &str, first: &str, second: &str);

    fn group_by(&mut self, column: &str);

    /// Add a raw boolean expression to the HAVING clause.
    fn having_raw(&mut self, expression: &str);

    fn order_by(&mut self, column: &str, order: Order);

    /// Register a positional parameter for a clause.
    fn add_binding(&mut self, value: Binding, slot: BindingSlot);

    /// Render the query as SQL text.
    fn to_sql(&self) -> String;

    /// All bindings in the order their placeholders appear in [`to_sql`](Self::to_sql).
    fn bindings(&self) -> Vec<Binding>;

    /// Replace the FROM target with a raw expression, dropping FROM bindings.
    fn from_raw(&mut self, expression: &str);

    /// Physical table prefix of the connection.
    ///
    /// Builders that render `prefix + table` must keep the bare table name
    /// usable in column references. Builders that prefix on their own can
    /// ignore it.
    fn set_table_prefix(&mut self, _prefix: &str) {}

    /// Append every binding of `other`, in render order, to `slot`.
    fn merge_bindings(&mut self, other: &Self, slot: BindingSlot) {
        for binding in other.bindings() {
            self.add_binding(binding, slot);
        }
    }
}
