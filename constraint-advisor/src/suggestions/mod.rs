//! Rule-driven constraint suggestions from column statistics.
//!
//! ## Architecture
//!
//! - [`ConstraintRule`] implementations ([`NullabilityRule`], [`MinMaxRule`],
//!   [`DeterminedListRule`], [`InconsistentNamesRule`], [`FutureDatesRule`],
//!   [`ForeignKeyRule`]) are stateless heuristics over one [`ColumnStatistics`]
//!   record.
//! - [`RuleSpec`] is the closed set of configurable rules with their parameters;
//!   [`RuleConfig`] maps each semantic column type to an ordered rule list.
//! - [`ConstraintIdentifier`] holds one suggestion slot per rule kind and
//!   [`IdentifierBuilder`] folds a configured rule list over it.
//! - [`Analyzer`] walks every profiled table and column and assembles a
//!   [`SuggestionReport`](crate::report::SuggestionReport).
//!
//! ## Example Usage
//!
//! ```rust
//! use constraint_advisor::profile::{ColumnStatistics, TableProfile};
//! use constraint_advisor::suggestions::{Analyzer, RuleConfig};
//!
//! let table = TableProfile::named("ORDERS").with_column(
//!     "STATUS",
//!     ColumnStatistics {
//!         share: Some(1.0),
//!         uniq: Some(4),
//!         uniq_upper: Some(3),
//!         ..ColumnStatistics::of_type("TEXT")
//!     },
//! );
//!
//! let analyzer = Analyzer::new(RuleConfig::recommended());
//! let report = analyzer.suggest_constraints(&[table]).unwrap();
//! for suggestion in report.suggestions_for("ORDERS", "STATUS").unwrap() {
//!     println!("{}", suggestion.description);
//! }
//! ```
//!
//! [`ColumnStatistics`]: crate::profile::ColumnStatistics

mod analyzer;
mod config;
mod identifier;
mod rules;
mod templates;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerConfig};
pub use config::{
    DeterminedListParams, ForeignKeyParams, NullabilityParams, RawRule, RuleConfig, RuleSpec,
    TemplateConfig,
};
pub use identifier::{ConstraintIdentifier, IdentifierBuilder};
pub use rules::{
    ConstraintRule, DeterminedListRule, EvaluationContext, ForeignKeyRule, FutureDatesRule,
    InconsistentNamesRule, MinMaxRule, NullabilityRule,
};
pub use templates::RuleTemplate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;
use crate::profile::ColumnStatistics;

/// Description of the suggestion emitted for columns of an unrecognized type.
pub const NO_IDENTIFIED_CONSTRAINTS: &str = "No identified constraints";

/// The six rule kinds, in the order their results are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleKind {
    #[serde(rename = "NULLABILITY")]
    Nullability,
    #[serde(rename = "MINMAX")]
    MinMax,
    #[serde(rename = "DETERMINED_LIST")]
    DeterminedList,
    #[serde(rename = "INCONSISTENT_NAMES")]
    InconsistentNames,
    #[serde(rename = "FUTURE_DATES")]
    FutureDates,
    #[serde(rename = "FOREIGN_KEYS")]
    ForeignKeys,
}

impl RuleKind {
    /// All rule kinds in collection order.
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Nullability,
        RuleKind::MinMax,
        RuleKind::DeterminedList,
        RuleKind::InconsistentNames,
        RuleKind::FutureDates,
        RuleKind::ForeignKeys,
    ];

    /// Configuration name of the rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Nullability => "NULLABILITY",
            RuleKind::MinMax => "MINMAX",
            RuleKind::DeterminedList => "DETERMINED_LIST",
            RuleKind::InconsistentNames => "INCONSISTENT_NAMES",
            RuleKind::FutureDates => "FUTURE_DATES",
            RuleKind::ForeignKeys => "FOREIGN_KEYS",
        }
    }

    /// Position of the rule's slot in collection order.
    pub fn slot(&self) -> usize {
        *self as usize
    }

    pub(crate) fn expected_names() -> String {
        Self::ALL
            .iter()
            .map(RuleKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = AdvisorError;

    /// Parses a rule name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AdvisorError::UnknownRule {
                rule_name: s.to_string(),
                expected: Self::expected_names(),
            })
    }
}

/// A proposed data-quality constraint with its rationale.
///
/// `BASE_INFORMATION` echoes the statistics the rule looked at; the template is
/// present only when automation-template output is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSuggestion {
    /// Rule that produced the suggestion; absent on the fallback suggestion
    #[serde(rename = "RULE", default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleKind>,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(
        rename = "BASE_INFORMATION",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base_information: Option<ColumnStatistics>,
    #[serde(
        rename = "MERGE_INTO_ADF_FRM",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<String>,
}

impl ConstraintSuggestion {
    /// Creates a suggestion fired by `rule` over `statistics`.
    pub fn new(
        rule: RuleKind,
        description: impl Into<String>,
        statistics: &ColumnStatistics,
    ) -> Self {
        Self {
            rule: Some(rule),
            description: description.into(),
            base_information: Some(statistics.clone()),
            template: None,
        }
    }

    /// The fallback emitted for columns whose type has no rule set.
    pub fn no_identified_constraints() -> Self {
        Self {
            rule: None,
            description: NO_IDENTIFIED_CONSTRAINTS.to_string(),
            base_information: None,
            template: None,
        }
    }

    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }
}
