//! Weighted score expression built from columns and search words.
//!
//! Each (column, word) pair yields three terms, one per [`MatchStrength`]:
//!
//! ```text
//! (case when LOWER(title) LIKE ? then 150 else 0 end)    -- "hello"
//! (case when LOWER(title) LIKE ? then 50 else 0 end)     -- "hello%"
//! (case when LOWER(title) LIKE ? then 10 else 0 end)     -- "%hello%"
//! ```
//!
//! Terms are summed into a single expression. The bindings are read back from
//! the terms themselves, so their order always matches the placeholders.

use super::columns::WeightedColumn;
use crate::config::ScoringConfig;
use crate::dialect::LikeOperator;
use crate::query::Binding;

/// Wildcard shape applied to a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrength {
    /// `word`
    Exact,
    /// `word%`
    Prefix,
    /// `%word%`
    Contains,
}

impl MatchStrength {
    pub const ALL: [MatchStrength; 3] = [
        MatchStrength::Exact,
        MatchStrength::Prefix,
        MatchStrength::Contains,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            MatchStrength::Exact => ScoringConfig::EXACT_MULTIPLIER,
            MatchStrength::Prefix => ScoringConfig::PREFIX_MULTIPLIER,
            MatchStrength::Contains => ScoringConfig::CONTAINS_MULTIPLIER,
        }
    }

    /// The comparison pattern for `word`.
    pub fn pattern(&self, word: &str) -> String {
        match self {
            MatchStrength::Exact => word.to_string(),
            MatchStrength::Prefix => format!("{}%", word),
            MatchStrength::Contains => format!("%{}%", word),
        }
    }
}

/// One weighted CASE comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTerm {
    pub column: String,
    pub strength: MatchStrength,
    pub weight: f64,
    /// Value bound to the term's placeholder.
    pub pattern: String,
}

impl ScoreTerm {
    pub fn to_sql(&self, operator: LikeOperator) -> String {
        format!(
            "(case when LOWER({}) {} ? then {} else 0 end)",
            self.column,
            operator.as_sql(),
            self.weight
        )
    }
}

/// The additive relevance expression and its terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreExpression {
    terms: Vec<ScoreTerm>,
    operator: LikeOperator,
}

impl ScoreExpression {
    /// Emit terms column by column, word by word, strongest match first.
    pub fn build(columns: &[WeightedColumn], words: &[String], operator: LikeOperator) -> Self {
        let mut terms = Vec::with_capacity(columns.len() * words.len() * MatchStrength::ALL.len());

        for column in columns {
            for word in words {
                for strength in MatchStrength::ALL {
                    terms.push(ScoreTerm {
                        column: column.column.clone(),
                        strength,
                        weight: column.weight * strength.multiplier(),
                        pattern: strength.pattern(word),
                    });
                }
            }
        }

        Self { terms, operator }
    }

    pub fn terms(&self) -> &[ScoreTerm] {
        &self.terms
    }

    pub fn operator(&self) -> LikeOperator {
        self.operator
    }

    /// All terms joined with `+`.
    pub fn to_sql(&self) -> String {
        self.terms
            .iter()
            .map(|term| term.to_sql(self.operator))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// One binding per term, in term order.
    pub fn bindings(&self) -> Vec<Binding> {
        self.terms
            .iter()
            .map(|term| Binding::Text(term.pattern.clone()))
            .collect()
    }
}
