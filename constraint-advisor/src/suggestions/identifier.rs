//! Per-column accumulation of rule results.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::rules::EvaluationContext;
use super::{ConstraintSuggestion, RuleKind, RuleSpec, TemplateConfig};
use crate::log_rule;
use crate::logging::LogConfig;
use crate::profile::ColumnStatistics;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Pending,
    Empty,
    Fired(ConstraintSuggestion),
}

/// Holds one column's statistics and one result slot per rule kind.
///
/// Running a rule fills its slot once; a second run of the same kind is a
/// no-op, so earlier results are never replaced or removed.
#[derive(Debug, Clone)]
pub struct ConstraintIdentifier<'a> {
    ctx: EvaluationContext<'a>,
    log_config: Option<&'a LogConfig>,
    slots: [Slot; RuleKind::ALL.len()],
}

impl<'a> ConstraintIdentifier<'a> {
    /// Creates an identifier for `related_table`.`related_column`.
    pub fn new(
        statistics: &'a ColumnStatistics,
        related_column: &'a str,
        related_table: &'a str,
    ) -> Self {
        Self::from_context(EvaluationContext::new(
            statistics,
            related_column,
            related_table,
        ))
    }

    fn from_context(ctx: EvaluationContext<'a>) -> Self {
        Self {
            ctx,
            log_config: None,
            slots: std::array::from_fn(|_| Slot::Pending),
        }
    }

    /// Enables automation templates rendered with `config`.
    pub fn with_template(mut self, config: Option<&'a TemplateConfig>) -> Self {
        self.ctx.template = config;
        self
    }

    /// Fixes the reference time used by FUTURE_DATES.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.ctx.now = now;
        self
    }

    pub fn with_log_config(mut self, log_config: &'a LogConfig) -> Self {
        self.log_config = Some(log_config);
        self
    }

    /// Runs one configured rule unless its kind already ran.
    pub fn run(mut self, rule: &RuleSpec) -> Self {
        let kind = rule.kind();
        let slot = &mut self.slots[kind.slot()];
        if *slot != Slot::Pending {
            debug!(
                rule = %kind,
                column = self.ctx.column,
                "Rule already evaluated, skipping"
            );
            return self;
        }

        let outcome = rule.evaluate(&self.ctx);
        if let Some(log_config) = self.log_config {
            log_rule!(
                log_config,
                table = self.ctx.table,
                column = self.ctx.column,
                rule = %kind,
                fired = outcome.is_some(),
                "Evaluated rule"
            );
        }
        *slot = match outcome {
            Some(suggestion) => Slot::Fired(suggestion),
            None => Slot::Empty,
        };
        self
    }

    pub fn nullability(self, nullability_threshold: f64) -> Self {
        self.run(&RuleSpec::nullability(nullability_threshold))
    }

    pub fn min_max(self) -> Self {
        self.run(&RuleSpec::MinMax)
    }

    pub fn determined_list(self, list_size_threshold: u64) -> Self {
        self.run(&RuleSpec::determined_list(list_size_threshold))
    }

    pub fn inconsistent_names(self) -> Self {
        self.run(&RuleSpec::InconsistentNames)
    }

    pub fn future_dates(self) -> Self {
        self.run(&RuleSpec::FutureDates)
    }

    pub fn foreign_keys(self, precision: u32) -> Self {
        self.run(&RuleSpec::foreign_keys(precision))
    }

    /// Returns true once a rule of `kind` has run, whether or not it fired.
    pub fn is_evaluated(&self, kind: RuleKind) -> bool {
        self.slots[kind.slot()] != Slot::Pending
    }

    /// Returns the fired suggestions in collection order.
    pub fn collect(self) -> Vec<ConstraintSuggestion> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Fired(suggestion) => Some(suggestion),
                Slot::Pending | Slot::Empty => None,
            })
            .collect()
    }
}

/// Builds a [`ConstraintIdentifier`] for one column and runs a rule list over it.
#[derive(Debug, Clone)]
pub struct IdentifierBuilder<'a> {
    statistics: &'a ColumnStatistics,
    related_column: &'a str,
    related_table: &'a str,
    template: Option<&'a TemplateConfig>,
    reference_time: Option<DateTime<Utc>>,
    log_config: Option<&'a LogConfig>,
}

impl<'a> IdentifierBuilder<'a> {
    pub fn new(
        statistics: &'a ColumnStatistics,
        related_column: &'a str,
        related_table: &'a str,
    ) -> Self {
        Self {
            statistics,
            related_column,
            related_table,
            template: None,
            reference_time: None,
            log_config: None,
        }
    }

    /// Attach automation templates rendered with `config`.
    pub fn template(mut self, config: Option<&'a TemplateConfig>) -> Self {
        self.template = config;
        self
    }

    /// Set the reference time; defaults to the current time.
    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn log_config(mut self, log_config: &'a LogConfig) -> Self {
        self.log_config = Some(log_config);
        self
    }

    /// Creates an identifier with no rules run yet.
    pub fn build(&self) -> ConstraintIdentifier<'a> {
        let mut ctx = EvaluationContext::new(self.statistics, self.related_column, self.related_table)
            .with_template(self.template);
        if let Some(now) = self.reference_time {
            ctx = ctx.with_reference_time(now);
        }
        let identifier = ConstraintIdentifier::from_context(ctx);
        match self.log_config {
            Some(log_config) => identifier.with_log_config(log_config),
            None => identifier,
        }
    }

    /// Runs `rules` in order and returns the fired suggestions.
    ///
    /// An empty rule list yields no suggestions.
    pub fn identify(&self, rules: &[RuleSpec]) -> Vec<ConstraintSuggestion> {
        rules
            .iter()
            .fold(self.build(), |identifier, rule| identifier.run(rule))
            .collect()
    }
}
