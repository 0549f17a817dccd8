//! Centralized configuration for relevance search.
//!
//! This module provides the scoring constants shared by every search and the
//! declarative per-entity [`SearchConfig`].

use crate::error::{Result, SiftError};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

/// Scoring constants.
pub struct ScoringConfig;

impl ScoringConfig {
    /// Multiplier for a column matching the word exactly.
    pub const EXACT_MULTIPLIER: f64 = 15.0;
    /// Multiplier for a column starting with the word.
    pub const PREFIX_MULTIPLIER: f64 = 5.0;
    /// Multiplier for a column containing the word anywhere.
    pub const CONTAINS_MULTIPLIER: f64 = 1.0;
    /// The default threshold is the sum of all column weights divided by this.
    pub const THRESHOLD_DIVISOR: f64 = 4.0;
    /// Alias of the computed score column.
    pub const RELEVANCE_ALIAS: &'static str = "relevance";
    pub const DEFAULT_PRIMARY_KEY: &'static str = "id";
}

/// Local and foreign key expressions of a left join.
///
/// Deserializes from a two element array: `["posts.user_id", "users.id"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct JoinKeys {
    pub local: String,
    pub foreign: String,
}

impl JoinKeys {
    pub fn new(local: impl Into<String>, foreign: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            foreign: foreign.into(),
        }
    }
}

impl From<(String, String)> for JoinKeys {
    fn from((local, foreign): (String, String)) -> Self {
        Self { local, foreign }
    }
}

/// A string-keyed map that keeps insertion order.
///
/// Configuration order decides the order of score terms, so JSON objects are
/// read key by key instead of through a hashed or sorted map.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a value, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Declarative search configuration attached to an entity.
///
/// ```json
/// {
///     "columns": { "posts.title": 10, "users.name": 2 },
///     "joins": { "users": ["posts.user_id", "users.id"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Searchable column expressions and their relevance weights.
    /// `None` means every column of the entity's table with weight 1.
    pub columns: Option<OrderedMap<f64>>,
    /// Tables to left join, keyed by joined table name.
    pub joins: OrderedMap<JoinKeys>,
    /// Full column list for dialects that cannot group by primary key alone.
    pub table_columns: Option<Vec<String>>,
    /// Explicit GROUP BY list replacing the computed one.
    pub group_by: Option<Vec<String>>,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Add a searchable column with its relevance weight.
    pub fn column(mut self, column: impl Into<String>, weight: f64) -> Self {
        self.columns
            .get_or_insert_with(OrderedMap::new)
            .insert(column, weight);
        self
    }

    /// Left join `table` on `local = foreign`.
    pub fn join(
        mut self,
        table: impl Into<String>,
        local: impl Into<String>,
        foreign: impl Into<String>,
    ) -> Self {
        self.joins.insert(table, JoinKeys::new(local, foreign));
        self
    }

    pub fn table_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Check the weight invariants.
    ///
    /// Join keys are checked separately when the joins are applied.
    pub fn validate(&self) -> Result<()> {
        let Some(columns) = &self.columns else {
            return Ok(());
        };

        if columns.is_empty() {
            return Err(SiftError::config("column mapping is present but empty"));
        }

        for (column, weight) in columns.iter() {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(SiftError::config(format!(
                    "weight of column {} must be a positive number, got {}",
                    column, weight
                )));
            }
        }

        Ok(())
    }
}
