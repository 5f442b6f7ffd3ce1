//! Report formatting for constraint suggestions.
//!
//! A [`SuggestionReport`] already serializes to the canonical JSON shape; the
//! formatters here add the views people review: filtered JSON, console text
//! and Markdown. Formatters only build strings; writing them is up to the
//! caller.
//!
//! # Examples
//!
//! ```rust
//! use constraint_advisor::formatters::{HumanFormatter, ReportFormatter};
//! use constraint_advisor::report::SuggestionReport;
//!
//! let report = SuggestionReport::default();
//! let output = HumanFormatter::new().format(&report).unwrap();
//! assert!(output.contains("No tables analyzed"));
//! ```

use std::fmt::{self, Write};

use serde_json::Value;

use crate::error::{AdvisorError, Result};
use crate::profile::ColumnStatistics;
use crate::report::{ColumnSuggestions, SuggestionReport};
use crate::suggestions::ConstraintSuggestion;

/// Configuration options for formatting suggestion reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    /// Include the statistics each suggestion was derived from
    pub include_base_info: bool,
    /// Include automation templates
    pub include_templates: bool,
    /// Maximum suggestions shown per column (None for all)
    pub max_suggestions_per_column: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to list columns that received no suggestion
    pub include_empty_columns: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_base_info: true,
            include_templates: true,
            max_suggestions_per_column: None,
            use_colors: true,
            include_empty_columns: true,
        }
    }
}

impl FormatterConfig {
    /// Descriptions only.
    pub fn minimal() -> Self {
        Self {
            include_base_info: false,
            include_templates: false,
            max_suggestions_per_column: None,
            use_colors: false,
            include_empty_columns: false,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for CI/CD logs.
    pub fn ci() -> Self {
        Self {
            include_base_info: false,
            include_templates: true,
            max_suggestions_per_column: Some(10),
            use_colors: false,
            include_empty_columns: false,
        }
    }

    pub fn with_base_info(mut self, include: bool) -> Self {
        self.include_base_info = include;
        self
    }

    pub fn with_templates(mut self, include: bool) -> Self {
        self.include_templates = include;
        self
    }

    /// Sets the maximum number of suggestions shown per column.
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions_per_column = Some(max);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_empty_columns(mut self, include: bool) -> Self {
        self.include_empty_columns = include;
        self
    }

    fn visible<'a>(&self, column: &'a ColumnSuggestions) -> &'a [ConstraintSuggestion] {
        let all = column.possible_constraints.as_slice();
        match self.max_suggestions_per_column {
            Some(max) => &all[..max.min(all.len())],
            None => all,
        }
    }

    fn shows(&self, column: &ColumnSuggestions) -> bool {
        self.include_empty_columns || !column.possible_constraints.is_empty() || column.is_failed()
    }
}

/// Trait for turning a suggestion report into an output format.
///
/// # Examples
///
/// ```rust
/// use constraint_advisor::formatters::ReportFormatter;
/// use constraint_advisor::report::SuggestionReport;
///
/// struct CountFormatter;
///
/// impl ReportFormatter for CountFormatter {
///     fn format(&self, report: &SuggestionReport) -> constraint_advisor::Result<String> {
///         Ok(format!("{} suggestions", report.total_suggestions()))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report into a string.
    fn format(&self, report: &SuggestionReport) -> Result<String>;

    /// Formats a report with an explicit configuration.
    fn format_with_config(
        &self,
        report: &SuggestionReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

fn render(build: impl FnOnce(&mut String) -> fmt::Result) -> Result<String> {
    let mut output = String::new();
    build(&mut output)
        .map_err(|e| AdvisorError::Internal(format!("Failed to format report: {e}")))?;
    Ok(output)
}

/// Formats reports as JSON in the canonical report shape.
///
/// Keys dropped by the configuration are removed; everything else is left as
/// the report serializes it.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &SuggestionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &SuggestionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered = filter_report_for_config(report, config)?;
        let json = if self.pretty {
            serde_json::to_string_pretty(&filtered)
        } else {
            serde_json::to_string(&filtered)
        };
        json.map_err(|e| AdvisorError::Serialization(format!("Failed to serialize report: {e}")))
    }
}

fn filter_report_for_config(report: &SuggestionReport, config: &FormatterConfig) -> Result<Value> {
    let mut value = report.to_json_value()?;
    let tables = value.as_array_mut().into_iter().flatten();

    for table in tables {
        let Some(Value::Object(columns)) = table.get_mut("SUGGESTED_CONSTRAINTS") else {
            continue;
        };
        if !config.include_empty_columns {
            columns.retain(|_, column| {
                let empty = column["POSSIBLE_CONSTRAINTS"]
                    .as_array()
                    .is_some_and(|s| s.is_empty());
                !empty || column["BASE_INFO"].get("ERROR").is_some()
            });
        }
        for column in columns.values_mut().filter_map(Value::as_object_mut) {
            if !config.include_base_info {
                column.remove("BASE_INFO");
            }
            let Some(Value::Array(suggestions)) = column.get_mut("POSSIBLE_CONSTRAINTS") else {
                continue;
            };
            if let Some(max) = config.max_suggestions_per_column {
                suggestions.truncate(max);
            }
            for suggestion in suggestions.iter_mut().filter_map(Value::as_object_mut) {
                if !config.include_base_info {
                    suggestion.remove("BASE_INFORMATION");
                }
                if !config.include_templates {
                    suggestion.remove("MERGE_INTO_ADF_FRM");
                }
            }
        }
    }
    Ok(value)
}

/// Formats reports for console review.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

fn paint(text: &str, color: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn statistics_summary(stats: &ColumnStatistics) -> String {
    let mut parts = Vec::new();
    if let Some(share) = stats.share {
        parts.push(format!("share={share:.3}"));
    }
    if let Some(uniq) = stats.uniq {
        parts.push(format!("uniq={uniq}"));
    }
    if let Some(top_share) = stats.top_share {
        parts.push(format!("top_share={top_share:.3}"));
    }
    if let Some(min) = &stats.min {
        parts.push(format!("min={min}"));
    }
    if let Some(max) = &stats.max {
        parts.push(format!("max={max}"));
    }
    parts.join(" ")
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &SuggestionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &SuggestionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        render(|out| {
            writeln!(out)?;
            if report.is_empty() {
                writeln!(out, "No tables analyzed")?;
                return Ok(());
            }

            writeln!(
                out,
                "Constraint suggestions: {} across {} table(s)",
                paint(&report.total_suggestions().to_string(), GREEN, config.use_colors),
                report.len()
            )?;

            for table in report {
                writeln!(out)?;
                writeln!(
                    out,
                    "Table {} ({} suggestion(s))",
                    table.table_name,
                    table.suggestion_count()
                )?;

                for (name, column) in &table.suggested_constraints {
                    if !config.shows(column) {
                        continue;
                    }
                    let col_type = column
                        .base_info
                        .col_type
                        .as_ref()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_else(|| "?".to_string());
                    writeln!(out, "  {name} [{col_type}]")?;

                    if let Some(error) = &column.base_info.error {
                        let line = format!("! profiling failed: {error}");
                        writeln!(out, "    {}", paint(&line, RED, config.use_colors))?;
                        continue;
                    }
                    if config.include_base_info {
                        let summary = statistics_summary(&column.base_info);
                        if !summary.is_empty() {
                            writeln!(out, "    stats: {summary}")?;
                        }
                    }

                    let visible = config.visible(column);
                    for suggestion in visible {
                        let rule = suggestion
                            .rule
                            .map(|kind| kind.as_str())
                            .unwrap_or("NONE");
                        writeln!(
                            out,
                            "    - {}: {}",
                            paint(rule, YELLOW, config.use_colors),
                            suggestion.description
                        )?;
                        let template = suggestion
                            .template
                            .as_deref()
                            .filter(|_| config.include_templates);
                        for line in template.into_iter().flat_map(str::lines) {
                            writeln!(out, "        {line}")?;
                        }
                    }
                    let hidden = column.possible_constraints.len() - visible.len();
                    if hidden > 0 {
                        writeln!(out, "    ... and {hidden} more suggestion(s)")?;
                    }
                }
            }
            writeln!(out)
        })
    }
}

/// Formats reports as Markdown for review documents.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &SuggestionReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &SuggestionReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let h = "#".repeat(self.heading_level as usize);
        render(|out| {
            writeln!(out, "{h} Constraint Suggestions")?;
            writeln!(out)?;
            writeln!(out, "| Rule | Suggestions |")?;
            writeln!(out, "|------|-------------|")?;
            for (rule, count) in report.count_by_rule() {
                writeln!(out, "| {rule} | {count} |")?;
            }

            for table in report {
                writeln!(out)?;
                writeln!(out, "{h}# {}", table.table_name)?;
                writeln!(out)?;

                if config.include_base_info {
                    writeln!(out, "| Column | Type | Suggestion | Statistics |")?;
                    writeln!(out, "|--------|------|------------|------------|")?;
                } else {
                    writeln!(out, "| Column | Type | Suggestion |")?;
                    writeln!(out, "|--------|------|------------|")?;
                }

                let mut templates = Vec::new();
                for (name, column) in &table.suggested_constraints {
                    if !config.shows(column) {
                        continue;
                    }
                    let col_type = column
                        .base_info
                        .col_type
                        .as_ref()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default();
                    let stats = escape_cell(&statistics_summary(&column.base_info));

                    let mut cells: Vec<String> = match &column.base_info.error {
                        Some(error) => vec![format!("⚠️ {}", escape_cell(error))],
                        None => config
                            .visible(column)
                            .iter()
                            .map(|s| escape_cell(&s.description))
                            .collect(),
                    };
                    if cells.is_empty() {
                        cells.push("-".to_string());
                    }

                    for (i, cell) in cells.iter().enumerate() {
                        let (column_cell, type_cell) = if i == 0 {
                            (format!("`{name}`"), col_type.as_str())
                        } else {
                            (String::new(), "")
                        };
                        if config.include_base_info {
                            let stats_cell = if i == 0 { stats.as_str() } else { "" };
                            writeln!(out, "| {column_cell} | {type_cell} | {cell} | {stats_cell} |")?;
                        } else {
                            writeln!(out, "| {column_cell} | {type_cell} | {cell} |")?;
                        }
                    }

                    if config.include_templates {
                        templates.extend(
                            config
                                .visible(column)
                                .iter()
                                .filter_map(|s| s.template.as_deref())
                                .map(|t| (name.as_str(), t)),
                        );
                    }
                }

                if !templates.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "{h}## Templates")?;
                    for (column, template) in templates {
                        writeln!(out)?;
                        writeln!(out, "`{column}`:")?;
                        writeln!(out)?;
                        writeln!(out, "```sql")?;
                        writeln!(out, "{template}")?;
                        writeln!(out, "```")?;
                    }
                }
            }
            Ok(())
        })
    }
}
