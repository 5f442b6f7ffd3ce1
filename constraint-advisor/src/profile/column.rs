//! Per-column statistics record produced by statistics sources.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic column type that selects the rule set applied to a column.
///
/// Sources report the type as a string; anything outside the three supported
/// names is kept verbatim in [`ColumnType::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Numeric,
    Timestamp,
    Text,
    /// A type name reported by a source that the advisor has no rules for
    Unrecognized(String),
}

impl ColumnType {
    /// The three semantic types rule sets can be configured for.
    pub const SUPPORTED: [ColumnType; 3] =
        [ColumnType::Numeric, ColumnType::Timestamp, ColumnType::Text];

    /// Returns the wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Text => "TEXT",
            ColumnType::Unrecognized(name) => name,
        }
    }

    /// Returns true for NUMERIC, TIMESTAMP and TEXT.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ColumnType::Unrecognized(_))
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NUMERIC" => ColumnType::Numeric,
            "TIMESTAMP" => ColumnType::Timestamp,
            "TEXT" => ColumnType::Text,
            _ => ColumnType::Unrecognized(value),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(value: &str) -> Self {
        ColumnType::from(value.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        match value {
            ColumnType::Unrecognized(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColumnType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ColumnType::from)
    }
}

/// A spread or central-tendency statistic.
///
/// Numeric columns report numbers; timestamp columns report ISO-8601 strings.
/// Sources may report other JSON values for types the advisor has no rules for
/// (booleans, structs); those are kept but never read as numbers or times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Other(Value),
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl StatValue {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Parses a textual statistic as a point in time.
    ///
    /// Accepts RFC 3339 and the ISO-8601 variants warehouses print (space or `T`
    /// separator, optional fraction, optional offset, bare dates). Values
    /// without an offset are read as UTC.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        let StatValue::Text(raw) = self else {
            return None;
        };
        let raw = raw.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
                return Some(parsed.with_timezone(&Utc));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Renders the value as a SQL literal: numbers and booleans bare, everything
    /// else single-quoted.
    pub fn to_sql_literal(&self) -> String {
        match self {
            StatValue::Number(v) => v.to_string(),
            StatValue::Bool(b) => b.to_string().to_uppercase(),
            StatValue::Text(s) => quote_literal(s),
            StatValue::Other(v) => quote_literal(&v.to_string()),
        }
    }
}

fn quote_literal(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(v) => write!(f, "{v}"),
            StatValue::Text(s) => f.write_str(s),
            StatValue::Bool(b) => write!(f, "{b}"),
            StatValue::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Number(value)
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        StatValue::Number(value as f64)
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        StatValue::Bool(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

/// One column's profiled facts.
///
/// Every field is optional: absence means the source did not compute it.
/// Fields the advisor does not interpret (diagnostics such as the statement a
/// source tried to run) are preserved in `extra` so the record round-trips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_type: Option<ColumnType>,
    /// Number of non-null values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Fraction of non-null rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<f64>,
    /// Distinct value count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq: Option<u64>,
    /// Distinct value count after upper-casing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniq_upper: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_value: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_freq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_share: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perc25: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<StatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perc75: Option<StatValue>,
    /// Upstream failure message; marks the column as unprofilable
    #[serde(rename = "ERROR", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnStatistics {
    /// Creates an empty record of the given type.
    pub fn of_type(col_type: impl Into<ColumnType>) -> Self {
        Self {
            col_type: Some(col_type.into()),
            ..Default::default()
        }
    }

    /// Creates a record describing an upstream failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Returns true when the source flagged this column as unprofilable.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the reported type. A blank type name counts as not reported.
    pub fn column_type(&self) -> Option<&ColumnType> {
        self.col_type
            .as_ref()
            .filter(|col_type| !col_type.as_str().trim().is_empty())
    }
}
