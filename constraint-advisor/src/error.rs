//! Error types for the constraint advisor.
//!
//! All fallible operations in this crate return [`AdvisorError`] through the
//! [`Result`] alias. The variants follow the failure taxonomy of the analysis
//! pipeline: configuration problems are fatal at startup, missing column types
//! and tables without column statistics abort the analysis run, and upstream
//! connector failures surface as [`AdvisorError::DataSource`].

use serde::Serialize;
use thiserror::Error;

use crate::profile::{ColumnStatistics, TableProfile};

const EXPECTED_TABLE_SHAPE: &str = r#"[
    {
        "TABLE_NAME": "EXAMPLE_TABLE_NAME",
        "TABLE_PROFILING_INFO": {
            "TABLE_COUNT": 5,
            "COLUMNS": {
                "EXAMPLE_COLUMN_NAME": {
                    "col_type": "TEXT",
                    "count": 5,
                    "share": 1.0,
                    "uniq": 5,
                    "uniq_upper": 5,
                    "top_value": "1",
                    "top_freq": 1,
                    "top_share": 0.2
                }
            }
        }
    }
]"#;

const EXPECTED_COLUMN_SHAPE: &str = r#"{
    "col_type": "TEXT",
    "count": 5,
    "share": 1.0,
    "uniq": 5,
    "uniq_upper": 5,
    "top_value": "1",
    "top_freq": 1,
    "top_share": 0.2
}"#;

/// The main error type for the constraint advisor.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// A table profile is missing its name or its column statistics.
    #[error(
        "Data for analysis should contain the table name and column statistics.\nExpected structure:\n{shape}\nData provided:\n{data}",
        shape = EXPECTED_TABLE_SHAPE,
        data = render_json(.table)
    )]
    LackDataForAnalysis {
        /// The offending table profile
        table: Box<TableProfile>,
    },

    /// Column statistics arrived without a `col_type`.
    #[error(
        "Statistics for column '{column}' of table '{table}' lack a column type.\nExpected structure:\n{shape}\nData provided:\n{data}",
        shape = EXPECTED_COLUMN_SHAPE,
        data = render_json(.statistics)
    )]
    UndefinedColumnType {
        /// Table the column belongs to
        table: String,
        /// Column name
        column: String,
        /// The offending statistics record
        statistics: Box<ColumnStatistics>,
    },

    /// A rule configuration names a rule outside the supported set.
    #[error("Unknown rule '{rule_name}'. Expected one of: {expected}")]
    UnknownRule {
        /// The rule name found in configuration
        rule_name: String,
        /// Comma separated list of supported rule names
        expected: String,
    },

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A table was routed to a source that serves another source type.
    #[error("Table source type should be {expected}, found {found}")]
    UnexpectedSourceType {
        /// Source type the receiving source serves
        expected: String,
        /// Source type named by the table configuration
        found: String,
    },

    /// Error from data source operations.
    #[error("Data source error ({source_type}): {message}")]
    DataSource {
        /// Type of data source (e.g., "SNF", "CSV")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An identifier failed the template safety check.
    #[error("Security error: {0}")]
    SecurityError(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, AdvisorError>`.
pub type Result<T> = std::result::Result<T, AdvisorError>;

impl AdvisorError {
    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an undefined column type error for the given column.
    pub fn undefined_column_type(
        table: impl Into<String>,
        column: impl Into<String>,
        statistics: &ColumnStatistics,
    ) -> Self {
        Self::UndefinedColumnType {
            table: table.into(),
            column: column.into(),
            statistics: Box::new(statistics.clone()),
        }
    }

    /// Creates a lack-of-data error carrying the offending table.
    pub fn lack_data(table: &TableProfile) -> Self {
        Self::LackDataForAnalysis {
            table: Box::new(table.clone()),
        }
    }

    /// Returns true for failures reported by an upstream connector.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::DataSource { .. })
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error. Variants that carry a free-form message get
    /// the context prefixed; structured variants pass through unchanged.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AdvisorError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            AdvisorError::Configuration(inner) => {
                AdvisorError::Configuration(format!("{}: {inner}", f()))
            }
            AdvisorError::Serialization(inner) => {
                AdvisorError::Serialization(format!("{}: {inner}", f()))
            }
            AdvisorError::DataSource {
                source_type,
                message,
                source,
            } => AdvisorError::DataSource {
                source_type,
                message: format!("{}: {message}", f()),
                source,
            },
            AdvisorError::Internal(inner) => AdvisorError::Internal(format!("{}: {inner}", f())),
            // Structured variants carry their own diagnostics
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ColumnType;
    use std::error::Error;

    #[test]
    fn test_data_source_error() {
        let err = AdvisorError::data_source("CSV", "Invalid file format");
        assert_eq!(err.to_string(), "Data source error (CSV): Invalid file format");
        assert!(err.is_upstream());
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err =
            AdvisorError::data_source_with_source("CSV", "Could not read file", Box::new(source));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_undefined_column_type_names_expected_shape() {
        let stats = ColumnStatistics {
            uniq: Some(3),
            ..Default::default()
        };
        let err = AdvisorError::undefined_column_type("ORDERS", "STATUS", &stats);
        let message = err.to_string();
        assert!(message.contains("lack a column type"));
        assert!(message.contains("\"col_type\": \"TEXT\""));
        assert!(message.contains("\"uniq\": 3"));
    }

    #[test]
    fn test_lack_data_embeds_offending_table() {
        let table = TableProfile::named("EMPTY_TABLE");
        let err = AdvisorError::lack_data(&table);
        let message = err.to_string();
        assert!(message.contains("TABLE_PROFILING_INFO"));
        assert!(message.contains("EMPTY_TABLE"));
    }

    #[test]
    fn test_unknown_rule_message() {
        let err = AdvisorError::UnknownRule {
            rule_name: "UNIQUENESS".to_string(),
            expected: "NULLABILITY, MINMAX".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown rule 'UNIQUENESS'. Expected one of: NULLABILITY, MINMAX"
        );
    }

    #[test]
    fn test_error_context() {
        fn failing_operation() -> Result<()> {
            Err(AdvisorError::configuration("missing NUMERIC rules"))
        }

        let err = failing_operation()
            .context("Loading rule config")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Loading rule config: missing NUMERIC rules"
        );
    }

    #[test]
    fn test_context_keeps_structured_errors() {
        let result: Result<()> = Err(AdvisorError::UnknownRule {
            rule_name: "X".to_string(),
            expected: "NULLABILITY".to_string(),
        });
        let err = result.context("Loading rule config").unwrap_err();
        assert!(matches!(err, AdvisorError::UnknownRule { .. }));

        let result: Result<()> = Err(AdvisorError::data_source("SNF", "timeout"));
        let err = result.context("Counting rows of DIM_CUSTOMER").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data source error (SNF): Counting rows of DIM_CUSTOMER: timeout"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse = serde_json::from_str::<ColumnType>("{");
        let err: AdvisorError = parse.unwrap_err().into();
        assert!(matches!(err, AdvisorError::Serialization(_)));
    }
}
