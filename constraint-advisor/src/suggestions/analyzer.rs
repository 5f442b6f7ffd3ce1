//! Table-by-table orchestration of the suggestion rules.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::{ConstraintSuggestion, IdentifierBuilder, RuleConfig, TemplateConfig};
use crate::error::{AdvisorError, Result};
use crate::logging::LogConfig;
use crate::perf_debug;
use crate::profile::{ColumnStatistics, TableProfile};
use crate::report::{ColumnSuggestions, SuggestionReport, TableSuggestions};
use crate::security::SqlSecurity;

/// Output options of an [`Analyzer`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Attach automation templates to fired suggestions
    pub include_templates: bool,
    pub template: TemplateConfig,
    /// Fixed reference time for FUTURE_DATES; the current time per run when unset
    pub reference_time: Option<DateTime<Utc>>,
    pub logging: LogConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            include_templates: false,
            template: TemplateConfig::default(),
            reference_time: None,
            logging: LogConfig::default(),
        }
    }
}

/// Turns profiled tables into a [`SuggestionReport`].
///
/// The analyzer is immutable after construction and holds no per-run state, so
/// one instance can serve concurrent callers.
///
/// # Example
///
/// ```rust
/// use constraint_advisor::suggestions::{Analyzer, RuleConfig, TemplateConfig};
///
/// let analyzer = Analyzer::builder()
///     .rules(RuleConfig::recommended())
///     .include_templates(true)
///     .template_config(TemplateConfig::default().with_metadata_table("OPS.DATASOURCES"))
///     .build()
///     .unwrap();
///
/// let report = analyzer.suggest_constraints(&[]).unwrap();
/// assert!(report.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    rules: RuleConfig,
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Creates an analyzer with default output options.
    pub fn new(rules: RuleConfig) -> Self {
        Self {
            rules,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes every table that carries no `ERROR`.
    ///
    /// # Errors
    ///
    /// - [`AdvisorError::LackDataForAnalysis`] when a table has no name or no
    ///   column statistics
    /// - [`AdvisorError::UndefinedColumnType`] when a column without `ERROR`
    ///   lacks `col_type`
    /// - [`AdvisorError::SecurityError`] when templates are enabled with strict
    ///   identifiers and a name fails validation
    ///
    /// Any of these aborts the whole run.
    #[instrument(skip(self, profiles), fields(tables = profiles.len(), templates = self.config.include_templates))]
    pub fn suggest_constraints(&self, profiles: &[TableProfile]) -> Result<SuggestionReport> {
        let now = self.config.reference_time.unwrap_or_else(Utc::now);

        let (failed, profiled): (Vec<&TableProfile>, Vec<&TableProfile>) =
            profiles.iter().partition(|profile| profile.has_error());
        for table in &failed {
            debug!(
                table = table.table_name.as_deref().unwrap_or("<unnamed>"),
                error = table.error.as_deref().unwrap_or_default(),
                "Skipping table that failed profiling"
            );
        }

        let tables = profiled
            .into_iter()
            .map(|profile| self.analyze_table_at(profile, now))
            .collect::<Result<Vec<_>>>()?;

        let report = SuggestionReport::new(tables);
        info!(
            analyzed = report.len(),
            skipped = failed.len(),
            suggestions = report.total_suggestions(),
            "Constraint suggestion completed"
        );
        Ok(report)
    }

    /// Analyzes a single table that carries no `ERROR`.
    pub fn analyze_table(&self, profile: &TableProfile) -> Result<TableSuggestions> {
        let now = self.config.reference_time.unwrap_or_else(Utc::now);
        self.analyze_table_at(profile, now)
    }

    #[instrument(skip_all, fields(table = profile.table_name.as_deref().unwrap_or_default()))]
    fn analyze_table_at(
        &self,
        profile: &TableProfile,
        now: DateTime<Utc>,
    ) -> Result<TableSuggestions> {
        let (Some(table_name), Some(columns)) = (profile.table_name.as_deref(), profile.columns())
        else {
            return Err(AdvisorError::lack_data(profile));
        };

        let strict = self.config.include_templates && self.config.template.strict_identifiers;
        if strict {
            SqlSecurity::validate_embedded_name(table_name)?;
        }

        let mut suggestions = TableSuggestions::new(table_name);
        for (column_name, statistics) in columns {
            let possible_constraints = if statistics.has_error() {
                debug!(
                    column = column_name.as_str(),
                    "Column failed profiling, no rules evaluated"
                );
                Vec::new()
            } else {
                if strict {
                    SqlSecurity::validate_embedded_name(column_name)?;
                }
                self.identify_column(table_name, column_name, statistics, now)?
            };

            perf_debug!(
                self.config.logging,
                column = column_name.as_str(),
                suggestions = possible_constraints.len(),
                "Analyzed column"
            );
            suggestions.suggested_constraints.insert(
                column_name.clone(),
                ColumnSuggestions {
                    possible_constraints,
                    base_info: statistics.clone(),
                },
            );
        }

        Ok(suggestions)
    }

    fn identify_column(
        &self,
        table_name: &str,
        column_name: &str,
        statistics: &ColumnStatistics,
        now: DateTime<Utc>,
    ) -> Result<Vec<ConstraintSuggestion>> {
        let column_type = statistics
            .column_type()
            .ok_or_else(|| AdvisorError::undefined_column_type(table_name, column_name, statistics))?;

        if !column_type.is_recognized() {
            debug!(
                column = column_name,
                col_type = %column_type,
                "Unrecognized column type, no rule set applies"
            );
            return Ok(vec![ConstraintSuggestion::no_identified_constraints()]);
        }

        let template = self
            .config
            .include_templates
            .then_some(&self.config.template);

        Ok(IdentifierBuilder::new(statistics, column_name, table_name)
            .template(template)
            .reference_time(now)
            .log_config(&self.config.logging)
            .identify(self.rules.rules_for(column_type)))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(RuleConfig::recommended())
    }
}

/// Builder for [`Analyzer`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    rules: Option<RuleConfig>,
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule configuration; [`RuleConfig::recommended`] when unset.
    pub fn rules(mut self, rules: RuleConfig) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Enables or disables automation templates.
    pub fn include_templates(mut self, enabled: bool) -> Self {
        self.config.include_templates = enabled;
        self
    }

    pub fn template_config(mut self, template: TemplateConfig) -> Self {
        self.config.template = template;
        self
    }

    /// Fixes the reference time used by FUTURE_DATES.
    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.config.reference_time = Some(now);
        self
    }

    pub fn log_config(mut self, logging: LogConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Validates the configuration and builds the analyzer.
    pub fn build(self) -> Result<Analyzer> {
        let rules = self.rules.unwrap_or_else(RuleConfig::recommended);
        rules.validate()?;
        if self.config.include_templates {
            self.config.template.validate()?;
        }
        Ok(Analyzer {
            rules,
            config: self.config,
        })
    }
}
