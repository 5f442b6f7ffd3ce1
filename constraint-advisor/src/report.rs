//! The analyzer's output: table → column → suggestions.
//!
//! Every type here serializes to plain JSON objects and arrays with the
//! upper-case keys downstream consumers expect, so a report can be written to a
//! file or console as-is.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::profile::ColumnStatistics;
use crate::suggestions::{ConstraintSuggestion, RuleKind};

/// Suggestions and the statistics they were derived from, for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSuggestions {
    #[serde(rename = "POSSIBLE_CONSTRAINTS")]
    pub possible_constraints: Vec<ConstraintSuggestion>,
    #[serde(rename = "BASE_INFO")]
    pub base_info: ColumnStatistics,
}

impl ColumnSuggestions {
    /// Returns true when the column's statistics carried an upstream error.
    pub fn is_failed(&self) -> bool {
        self.base_info.has_error()
    }
}

/// All column suggestions of one table, in the table's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSuggestions {
    #[serde(rename = "TABLE_NAME")]
    pub table_name: String,
    #[serde(rename = "SUGGESTED_CONSTRAINTS")]
    pub suggested_constraints: IndexMap<String, ColumnSuggestions>,
}

impl TableSuggestions {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            suggested_constraints: IndexMap::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSuggestions> {
        self.suggested_constraints.get(name)
    }

    /// Number of suggestions across all columns.
    pub fn suggestion_count(&self) -> usize {
        self.suggested_constraints
            .values()
            .map(|column| column.possible_constraints.len())
            .sum()
    }
}

/// The full analyzer output, one entry per analyzed table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionReport {
    pub tables: Vec<TableSuggestions>,
}

impl SuggestionReport {
    pub fn new(tables: Vec<TableSuggestions>) -> Self {
        Self { tables }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableSuggestions> {
        self.tables.iter()
    }

    /// Finds the entry of a table by name.
    pub fn table(&self, name: &str) -> Option<&TableSuggestions> {
        self.tables.iter().find(|table| table.table_name == name)
    }

    /// Returns the suggestions of one column, if the table and column were analyzed.
    pub fn suggestions_for(&self, table: &str, column: &str) -> Option<&[ConstraintSuggestion]> {
        self.table(table)?
            .column(column)
            .map(|column| column.possible_constraints.as_slice())
    }

    /// Number of suggestions across all tables.
    pub fn total_suggestions(&self) -> usize {
        self.tables.iter().map(TableSuggestions::suggestion_count).sum()
    }

    /// Counts fired suggestions per rule, in collection order.
    pub fn count_by_rule(&self) -> IndexMap<RuleKind, usize> {
        let mut counts: IndexMap<RuleKind, usize> =
            RuleKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for suggestion in self
            .tables
            .iter()
            .flat_map(|table| table.suggested_constraints.values())
            .flat_map(|column| column.possible_constraints.iter())
        {
            if let Some(kind) = suggestion.rule {
                *counts.entry(kind).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Converts the report to a JSON value.
    pub fn to_json_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl IntoIterator for SuggestionReport {
    type Item = TableSuggestions;
    type IntoIter = std::vec::IntoIter<TableSuggestions>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

impl<'a> IntoIterator for &'a SuggestionReport {
    type Item = &'a TableSuggestions;
    type IntoIter = std::slice::Iter<'a, TableSuggestions>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> SuggestionReport {
        let stats = ColumnStatistics {
            uniq: Some(2),
            ..ColumnStatistics::of_type("NUMERIC")
        };
        let mut table = TableSuggestions::new("ORDERS");
        table.suggested_constraints.insert(
            "STATUS".to_string(),
            ColumnSuggestions {
                possible_constraints: vec![ConstraintSuggestion::new(
                    RuleKind::DeterminedList,
                    "DETERMINED LIST",
                    &stats,
                )],
                base_info: stats.clone(),
            },
        );
        table.suggested_constraints.insert(
            "BROKEN".to_string(),
            ColumnSuggestions {
                possible_constraints: vec![],
                base_info: ColumnStatistics::failed("permission denied"),
            },
        );
        SuggestionReport::new(vec![table])
    }

    #[test]
    fn test_report_serializes_as_plain_list() {
        let value = sample_report().to_json_value().unwrap();
        assert_eq!(
            value,
            json!([{
                "TABLE_NAME": "ORDERS",
                "SUGGESTED_CONSTRAINTS": {
                    "STATUS": {
                        "POSSIBLE_CONSTRAINTS": [{
                            "RULE": "DETERMINED_LIST",
                            "DESCRIPTION": "DETERMINED LIST",
                            "BASE_INFORMATION": {"col_type": "NUMERIC", "uniq": 2}
                        }],
                        "BASE_INFO": {"col_type": "NUMERIC", "uniq": 2}
                    },
                    "BROKEN": {
                        "POSSIBLE_CONSTRAINTS": [],
                        "BASE_INFO": {"ERROR": "permission denied"}
                    }
                }
            }])
        );
    }

    #[test]
    fn test_report_lookups() {
        let report = sample_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report.total_suggestions(), 1);
        assert_eq!(report.suggestions_for("ORDERS", "STATUS").unwrap().len(), 1);
        assert!(report.suggestions_for("ORDERS", "MISSING").is_none());
        assert!(report.table("ORDERS").unwrap().column("BROKEN").unwrap().is_failed());

        let counts = report.count_by_rule();
        assert_eq!(counts[&RuleKind::DeterminedList], 1);
        assert_eq!(counts[&RuleKind::Nullability], 0);
        assert_eq!(counts.len(), 6);
    }

    #[test]
    fn test_report_keeps_column_order_through_json() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("STATUS").unwrap() < json.find("BROKEN").unwrap());

        let parsed: SuggestionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
