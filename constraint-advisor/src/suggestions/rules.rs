//! The six constraint heuristics.
//!
//! Every rule is a pure function of one column's statistics: it either returns
//! a [`ConstraintSuggestion`] or `None` when the evidence is missing or points
//! elsewhere. Absent statistics never cause an error; the rule just stays
//! silent.

use chrono::{DateTime, Utc};

use super::templates::RuleTemplate;
use super::{ConstraintSuggestion, RuleKind, RuleSpec, TemplateConfig};
use crate::profile::{ColumnStatistics, StatValue};

pub(crate) const NULLABILITY_DESCRIPTION: &str =
    "NULLABILITY: Maybe this column should be non-nullable";
pub(crate) const ONLY_NULLS_DESCRIPTION: &str =
    "ONLY NULLS: column contains only nulls, maybe something wrong with ingestion";
pub(crate) const DETERMINED_LIST_DESCRIPTION: &str =
    "DETERMINED LIST: Maybe column should contain values only from determined list";
pub(crate) const INCONSISTENT_NAMES_DESCRIPTION: &str =
    "INCONSISTENT NAMES: Maybe some unique values have same meaning and should be uppercased";
pub(crate) const FUTURE_DATES_DESCRIPTION: &str =
    "FUTURE DATES: Maybe this column should not contain dates from the future";
pub(crate) const FOREIGN_KEY_DESCRIPTION: &str =
    "POSSIBLE FOREIGN KEY: Maybe this column is a foreign key and it is worth to check for CONSISTENCY";

/// Everything a rule may look at for one column.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub statistics: &'a ColumnStatistics,
    pub column: &'a str,
    pub table: &'a str,
    /// Present when automation templates should be attached
    pub template: Option<&'a TemplateConfig>,
    /// Reference time for FUTURE_DATES
    pub now: DateTime<Utc>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(statistics: &'a ColumnStatistics, column: &'a str, table: &'a str) -> Self {
        Self {
            statistics,
            column,
            table,
            template: None,
            now: Utc::now(),
        }
    }

    pub fn with_template(mut self, template: Option<&'a TemplateConfig>) -> Self {
        self.template = template;
        self
    }

    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Builds a suggestion, attaching the template when templates are enabled.
    fn suggest(
        &self,
        rule: RuleKind,
        description: impl Into<String>,
        template: Option<RuleTemplate>,
    ) -> ConstraintSuggestion {
        let rendered = match (self.template, template) {
            (Some(config), Some(template)) => Some(template.render(config, self.table, self.column)),
            _ => None,
        };
        ConstraintSuggestion::new(rule, description, self.statistics).with_template(rendered)
    }

    fn metadata_table(&self) -> &str {
        self.template
            .map(|config| config.metadata_table.as_str())
            .unwrap_or_default()
    }
}

/// Trait for implementing constraint heuristics.
pub trait ConstraintRule: Send + Sync {
    /// Which slot the rule's result occupies.
    fn kind(&self) -> RuleKind;

    /// Inspects the column and returns a suggestion when the rule fires.
    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Get a description of what this rule analyzes
    fn description(&self) -> &str;
}

/// Suggests a non-null constraint for almost fully populated columns and
/// warns about columns that contain only nulls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullabilityRule {
    threshold: f64,
}

impl NullabilityRule {
    pub fn new() -> Self {
        Self { threshold: 0.99 }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for NullabilityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintRule for NullabilityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Nullability
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let share = ctx.statistics.share?;

        if self.threshold < share && share <= 1.0 {
            Some(ctx.suggest(
                RuleKind::Nullability,
                NULLABILITY_DESCRIPTION,
                Some(RuleTemplate::nullability()),
            ))
        } else if share == 0.0 {
            Some(ctx.suggest(RuleKind::Nullability, ONLY_NULLS_DESCRIPTION, None))
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        "Compares the share of non-null rows with a threshold"
    }
}

/// Suggests a validity range for columns with a meaningful spread.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinMaxRule;

impl MinMaxRule {
    pub fn new() -> Self {
        Self
    }

    fn is_boolean_like(min: &StatValue, max: &StatValue) -> bool {
        min.as_f64() == Some(0.0) && max.as_f64() == Some(1.0)
    }
}

impl ConstraintRule for MinMaxRule {
    fn kind(&self) -> RuleKind {
        RuleKind::MinMax
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let stats = ctx.statistics;
        let (min, max, uniq) = (stats.min.as_ref()?, stats.max.as_ref()?, stats.uniq?);

        if min == max || Self::is_boolean_like(min, max) || uniq <= 2 {
            return None;
        }

        Some(ctx.suggest(
            RuleKind::MinMax,
            format!("MINMAX: Maybe this column has business-determined validity range [{min}, {max}]"),
            Some(RuleTemplate::min_max(min, max)),
        ))
    }

    fn description(&self) -> &str {
        "Proposes the observed minimum and maximum as a validity range"
    }
}

/// Suggests an allowed-values constraint for low-cardinality columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterminedListRule {
    list_size_threshold: u64,
}

impl DeterminedListRule {
    pub fn new() -> Self {
        Self {
            list_size_threshold: 10,
        }
    }

    pub fn with_threshold(list_size_threshold: u64) -> Self {
        Self {
            list_size_threshold,
        }
    }
}

impl Default for DeterminedListRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintRule for DeterminedListRule {
    fn kind(&self) -> RuleKind {
        RuleKind::DeterminedList
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let uniq = ctx.statistics.uniq?;
        (0 < uniq && uniq < self.list_size_threshold).then(|| {
            ctx.suggest(
                RuleKind::DeterminedList,
                DETERMINED_LIST_DESCRIPTION,
                Some(RuleTemplate::determined_list()),
            )
        })
    }

    fn description(&self) -> &str {
        "Flags columns with few distinct values as enumerations"
    }
}

/// Flags text columns whose distinct values collapse when upper-cased.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InconsistentNamesRule;

impl InconsistentNamesRule {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintRule for InconsistentNamesRule {
    fn kind(&self) -> RuleKind {
        RuleKind::InconsistentNames
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let (uniq, uniq_upper) = (ctx.statistics.uniq?, ctx.statistics.uniq_upper?);
        (uniq != uniq_upper).then(|| {
            ctx.suggest(
                RuleKind::InconsistentNames,
                INCONSISTENT_NAMES_DESCRIPTION,
                Some(RuleTemplate::inconsistent_names(
                    ctx.metadata_table(),
                    ctx.table,
                    ctx.column,
                )),
            )
        })
    }

    fn description(&self) -> &str {
        "Compares distinct counts before and after case folding"
    }
}

/// Flags timestamp columns whose minimum or maximum lies after the reference time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FutureDatesRule;

impl FutureDatesRule {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintRule for FutureDatesRule {
    fn kind(&self) -> RuleKind {
        RuleKind::FutureDates
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let stats = ctx.statistics;
        let in_future = [stats.max.as_ref(), stats.min.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(StatValue::as_datetime)
            .any(|moment| moment > ctx.now);

        in_future.then(|| {
            ctx.suggest(
                RuleKind::FutureDates,
                FUTURE_DATES_DESCRIPTION,
                Some(RuleTemplate::future_dates(
                    ctx.metadata_table(),
                    ctx.table,
                    ctx.column,
                )),
            )
        })
    }

    fn description(&self) -> &str {
        "Detects timestamps later than the reference time"
    }
}

/// Flags columns whose top-value frequency is internally consistent, a hint
/// that the column references another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyRule {
    precision: u32,
}

impl ForeignKeyRule {
    pub fn new() -> Self {
        Self { precision: 3 }
    }

    pub fn with_precision(precision: u32) -> Self {
        Self { precision }
    }

    fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision as i32);
        (value * factor).round() / factor
    }
}

impl Default for ForeignKeyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintRule for ForeignKeyRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ForeignKeys
    }

    fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        let stats = ctx.statistics;
        let (count, top_freq, top_share) = (stats.count?, stats.top_freq?, stats.top_share?);

        let observed = top_freq as f64 / count.max(1) as f64;
        (self.round(observed) == self.round(top_share))
            .then(|| ctx.suggest(RuleKind::ForeignKeys, FOREIGN_KEY_DESCRIPTION, None))
    }

    fn description(&self) -> &str {
        "Checks that the top value's share agrees with its frequency"
    }
}

impl RuleSpec {
    /// Evaluates the configured rule against one column.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Option<ConstraintSuggestion> {
        match self {
            RuleSpec::Nullability(params) => {
                NullabilityRule::with_threshold(params.nullability_threshold).evaluate(ctx)
            }
            RuleSpec::MinMax => MinMaxRule.evaluate(ctx),
            RuleSpec::DeterminedList(params) => {
                DeterminedListRule::with_threshold(params.list_size_threshold).evaluate(ctx)
            }
            RuleSpec::InconsistentNames => InconsistentNamesRule.evaluate(ctx),
            RuleSpec::FutureDates => FutureDatesRule.evaluate(ctx),
            RuleSpec::ForeignKeys(params) => {
                ForeignKeyRule::with_precision(params.precision).evaluate(ctx)
            }
        }
    }
}
