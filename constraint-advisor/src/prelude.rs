//! Prelude for commonly used types and traits in constraint-advisor.

pub use crate::error::{AdvisorError, ErrorContext, Result};
pub use crate::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
pub use crate::logging::LogConfig;
pub use crate::profile::{ColumnStatistics, ColumnType, StatValue, TableProfile};
pub use crate::report::SuggestionReport;
pub use crate::sources::{InMemorySource, ProfilingRunner, SourceType, StatisticsSource, TableRef};
pub use crate::suggestions::{
    Analyzer, AnalyzerBuilder, ConstraintSuggestion, RuleConfig, RuleKind, RuleSpec,
    TemplateConfig,
};
