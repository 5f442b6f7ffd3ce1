//! Table-level profile produced once per table by a statistics source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ColumnStatistics;

/// Marker stored in `ERROR` when a table has no rows.
pub const EMPTY_TABLE: &str = "EMPTY_TABLE";

/// Row count and per-column statistics of a profiled table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableProfilingInfo {
    #[serde(rename = "TABLE_COUNT", default, skip_serializing_if = "Option::is_none")]
    pub table_count: Option<u64>,
    /// Column statistics in the order the source reported them
    #[serde(rename = "COLUMNS", default)]
    pub columns: IndexMap<String, ColumnStatistics>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One table's profile: `{TABLE_NAME, TABLE_PROFILING_INFO: {TABLE_COUNT, COLUMNS}}`.
///
/// Malformed or partial records deserialize too; the analyzer decides what is
/// missing and reports it with the record attached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableProfile {
    #[serde(rename = "TABLE_NAME", default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(
        rename = "TABLE_PROFILING_INFO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profiling_info: Option<TableProfilingInfo>,
    #[serde(rename = "ERROR", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableProfile {
    /// Creates a profile carrying only a table name.
    pub fn named(table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            ..Default::default()
        }
    }

    /// Creates a fully profiled table.
    pub fn profiled(
        table_name: impl Into<String>,
        table_count: u64,
        columns: IndexMap<String, ColumnStatistics>,
    ) -> Self {
        Self {
            table_name: Some(table_name.into()),
            profiling_info: Some(TableProfilingInfo {
                table_count: Some(table_count),
                columns,
                extra: Map::new(),
            }),
            ..Default::default()
        }
    }

    /// Creates a profile describing a table-level upstream failure.
    pub fn failed(table_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Adds a column, keeping insertion order.
    pub fn with_column(mut self, name: impl Into<String>, statistics: ColumnStatistics) -> Self {
        self.profiling_info
            .get_or_insert_with(TableProfilingInfo::default)
            .columns
            .insert(name.into(), statistics);
        self
    }

    /// Returns true when the source flagged the whole table as unprofilable.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the column statistics, or `None` when none were collected.
    pub fn columns(&self) -> Option<&IndexMap<String, ColumnStatistics>> {
        self.profiling_info
            .as_ref()
            .map(|info| &info.columns)
            .filter(|columns| !columns.is_empty())
    }

    pub fn table_count(&self) -> Option<u64> {
        self.profiling_info.as_ref().and_then(|info| info.table_count)
    }
}
