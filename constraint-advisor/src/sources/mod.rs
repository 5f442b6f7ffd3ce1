//! Statistics sources and the table configuration that selects them.
//!
//! A [`StatisticsSource`] answers three questions about a table: how many rows
//! it has, which columns it has, and what one column's statistics are. Real
//! connectors (warehouse clients, file readers, compute engines) live outside
//! this crate and implement the trait; [`InMemorySource`] serves profiles that
//! are already materialized. [`ProfilingRunner`] fans the configured tables out
//! to their sources.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{AdvisorError, Result};
use crate::logging::{truncate_field, LogConfig};
use crate::profile::{ColumnStatistics, TableProfile, EMPTY_TABLE};

mod in_memory;
mod runner;

pub use in_memory::InMemorySource;
pub use runner::ProfilingRunner;

const EXAMPLE_TABLE_CONFIG: &str = r#"[
    {
        "datasource_type": "SNF",
        "schema": "DWH",
        "name": "DIM_CUSTOMER"
    },
    {
        "datasource_type": "CSV",
        "path": "data/dim_customer.csv",
        "name": "DIM_CUSTOMER"
    }
]"#;

/// The kinds of systems tables can be profiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// Cloud data warehouse
    #[serde(rename = "SNF")]
    Warehouse,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "PARQUET")]
    Parquet,
    /// Distributed compute engine
    #[serde(rename = "SPARK")]
    Spark,
}

impl SourceType {
    pub const ALL: [SourceType; 4] = [
        SourceType::Warehouse,
        SourceType::Csv,
        SourceType::Parquet,
        SourceType::Spark,
    ];

    /// Wire name used in table configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Warehouse => "SNF",
            SourceType::Csv => "CSV",
            SourceType::Parquet => "PARQUET",
            SourceType::Spark => "SPARK",
        }
    }

    /// File sources are addressed by path, the others by schema.
    pub fn is_file_based(&self) -> bool {
        matches!(self, SourceType::Csv | SourceType::Parquet)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|source_type| source_type.as_str() == normalized)
            .ok_or_else(|| {
                AdvisorError::configuration(format!(
                    "Unknown datasource_type '{s}'. Example of config:\n{EXAMPLE_TABLE_CONFIG}"
                ))
            })
    }
}

/// One table-to-profile entry of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub datasource_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Columns to profile; all columns when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl TableRef {
    /// A warehouse table addressed by schema and name.
    pub fn warehouse(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            datasource_type: SourceType::Warehouse,
            schema: Some(schema.into()),
            name: Some(name.into()),
            path: None,
            columns: None,
        }
    }

    /// A file-backed table addressed by path.
    pub fn file(
        datasource_type: SourceType,
        path: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            datasource_type,
            schema: None,
            name: Some(name.into()),
            path: Some(path.into()),
            columns: None,
        }
    }

    /// Restricts profiling to the given columns.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Parses a JSON list of table entries.
    pub fn list_from_json(json: &str) -> Result<Vec<TableRef>> {
        serde_json::from_str(json).map_err(|e| {
            AdvisorError::configuration(format!(
                "Malformed table configuration: {e}. Example of config:\n{EXAMPLE_TABLE_CONFIG}"
            ))
        })
    }

    /// Checks that the entry carries the keys its source type needs.
    pub fn validate(&self) -> Result<()> {
        let located = if self.datasource_type.is_file_based() {
            has_text(&self.path)
        } else {
            has_text(&self.schema)
        };
        if located && has_text(&self.name) {
            return Ok(());
        }
        Err(AdvisorError::configuration(format!(
            "Config lacks 'schema', 'name' or 'path' keys for the {} table to profile. Example of config:\n{EXAMPLE_TABLE_CONFIG}",
            self.datasource_type
        )))
    }

    /// The table name reported in profiles.
    pub fn table_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Schema-qualified name, or the path for file sources.
    pub fn location(&self) -> String {
        match (&self.schema, &self.path) {
            (_, Some(path)) if self.datasource_type.is_file_based() => path.clone(),
            (Some(schema), _) => format!("{schema}.{}", self.table_name()),
            _ => self.table_name().to_string(),
        }
    }

    /// Configured columns, if a non-empty list was given.
    pub fn configured_columns(&self) -> Option<&[String]> {
        self.columns.as_deref().filter(|columns| !columns.is_empty())
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// A system that can compute column statistics for tables.
///
/// Implementations should report upstream failures (bad credentials, missing
/// tables, failed statements) as [`AdvisorError::DataSource`]; the provided
/// [`describe_table`](StatisticsSource::describe_table) turns those into
/// `ERROR`-tagged records instead of failing the batch.
#[async_trait]
pub trait StatisticsSource: fmt::Debug + Send + Sync {
    /// The source type this implementation serves.
    fn source_type(&self) -> SourceType;

    /// Logging settings for this source's operations.
    fn log_config(&self) -> LogConfig {
        LogConfig::default()
    }

    /// Returns the table's row count.
    async fn table_count(&self, table: &TableRef) -> Result<u64>;

    /// Lists the table's columns in their natural order.
    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Computes one column's statistics.
    async fn column_statistics(&self, table: &TableRef, column: &str) -> Result<ColumnStatistics>;

    /// Profiles a whole table.
    ///
    /// Column statistics are fetched concurrently; a non-upstream error from
    /// any column aborts the table.
    #[instrument(skip(self, table), fields(source = %self.source_type(), table = table.table_name()))]
    async fn describe_table(&self, table: &TableRef) -> Result<TableProfile> {
        if table.datasource_type != self.source_type() {
            return Err(AdvisorError::UnexpectedSourceType {
                expected: self.source_type().to_string(),
                found: table.datasource_type.to_string(),
            });
        }
        let table_name = table.table_name();
        let max_field_length = self.log_config().max_field_length;

        let table_count = match self.table_count(table).await {
            Ok(count) => count,
            Err(err) if err.is_upstream() => {
                warn!(
                    error = %truncate_field(&err.to_string(), max_field_length),
                    "Table count failed"
                );
                return Ok(TableProfile::failed(table_name, err.to_string()));
            }
            Err(err) => return Err(err),
        };
        if table_count == 0 {
            debug!("Table is empty");
            return Ok(TableProfile::failed(table_name, EMPTY_TABLE));
        }

        let columns = match table.configured_columns() {
            Some(columns) => columns.to_vec(),
            None => self.list_columns(table).await?,
        };

        let statistics = try_join_all(columns.iter().map(|column| async move {
            match self.column_statistics(table, column).await {
                Ok(stats) => Ok(stats),
                Err(err) if err.is_upstream() => {
                    warn!(
                        column = column.as_str(),
                        error = %truncate_field(&err.to_string(), max_field_length),
                        "Column statistics failed"
                    );
                    Ok(ColumnStatistics::failed(err.to_string()))
                }
                Err(err) => Err(err),
            }
        }))
        .await?;

        Ok(TableProfile::profiled(
            table_name,
            table_count,
            columns.into_iter().zip(statistics).collect(),
        ))
    }
}
