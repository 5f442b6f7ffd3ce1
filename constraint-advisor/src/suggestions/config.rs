//! Rule configuration: which rules run for each semantic column type.
//!
//! A configuration file maps `NUMERIC`, `TIMESTAMP` and `TEXT` to ordered lists
//! of `{rule_name, properties}` entries:
//!
//! ```json
//! {
//!   "NUMERIC": [
//!     {"rule_name": "NULLABILITY", "properties": {"nullability_threshold": 0.99}},
//!     {"rule_name": "MINMAX"},
//!     {"rule_name": "DETERMINED_LIST", "properties": {"list_size_threshold": 2}}
//!   ],
//!   "TEXT": [{"rule_name": "INCONSISTENT_NAMES"}]
//! }
//! ```
//!
//! Rule names and properties are checked when the configuration is loaded, so
//! an unknown rule never surfaces in the middle of an analysis run.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::RuleKind;
use crate::error::{AdvisorError, ErrorContext, Result};
use crate::profile::ColumnType;
use crate::security::{InputValidator, SqlSecurity};

/// Maximum supported FOREIGN_KEYS rounding precision.
pub const MAX_PRECISION: u32 = 10;

/// Parameters of the NULLABILITY rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NullabilityParams {
    /// Share of non-null rows above which the column looks non-nullable
    pub nullability_threshold: f64,
}

impl Default for NullabilityParams {
    fn default() -> Self {
        Self {
            nullability_threshold: 0.99,
        }
    }
}

/// Parameters of the DETERMINED_LIST rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeterminedListParams {
    /// Distinct value count below which the column looks like an enumeration
    pub list_size_threshold: u64,
}

impl Default for DeterminedListParams {
    fn default() -> Self {
        Self {
            list_size_threshold: 10,
        }
    }
}

/// Parameters of the FOREIGN_KEYS rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForeignKeyParams {
    /// Decimal places used when comparing frequency shares
    pub precision: u32,
}

impl Default for ForeignKeyParams {
    fn default() -> Self {
        Self { precision: 3 }
    }
}

/// One configured rule together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub enum RuleSpec {
    Nullability(NullabilityParams),
    MinMax,
    DeterminedList(DeterminedListParams),
    InconsistentNames,
    FutureDates,
    ForeignKeys(ForeignKeyParams),
}

impl RuleSpec {
    pub fn nullability(nullability_threshold: f64) -> Self {
        RuleSpec::Nullability(NullabilityParams {
            nullability_threshold,
        })
    }

    pub fn determined_list(list_size_threshold: u64) -> Self {
        RuleSpec::DeterminedList(DeterminedListParams {
            list_size_threshold,
        })
    }

    pub fn foreign_keys(precision: u32) -> Self {
        RuleSpec::ForeignKeys(ForeignKeyParams { precision })
    }

    /// Returns the rule kind this entry configures.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleSpec::Nullability(_) => RuleKind::Nullability,
            RuleSpec::MinMax => RuleKind::MinMax,
            RuleSpec::DeterminedList(_) => RuleKind::DeterminedList,
            RuleSpec::InconsistentNames => RuleKind::InconsistentNames,
            RuleSpec::FutureDates => RuleKind::FutureDates,
            RuleSpec::ForeignKeys(_) => RuleKind::ForeignKeys,
        }
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match self {
            RuleSpec::Nullability(params) => InputValidator::validate_percentage(
                params.nullability_threshold,
                "nullability_threshold",
            ),
            RuleSpec::DeterminedList(params) => InputValidator::validate_range(
                params.list_size_threshold,
                1,
                u64::MAX,
                "list_size_threshold",
            ),
            RuleSpec::ForeignKeys(params) => InputValidator::validate_range(
                u64::from(params.precision),
                0,
                u64::from(MAX_PRECISION),
                "precision",
            ),
            RuleSpec::MinMax | RuleSpec::InconsistentNames | RuleSpec::FutureDates => Ok(()),
        }
    }
}

/// The on-disk form of a rule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    pub rule_name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl RawRule {
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

fn parse_params<T: DeserializeOwned>(kind: RuleKind, properties: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(properties)).map_err(|e| {
        AdvisorError::configuration(format!("Invalid properties for rule {kind}: {e}"))
    })
}

fn expect_no_params(kind: RuleKind, properties: &Map<String, Value>) -> Result<()> {
    if properties.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = properties.keys().map(String::as_str).collect();
    Err(AdvisorError::configuration(format!(
        "Rule {kind} takes no properties, found: {}",
        names.join(", ")
    )))
}

impl TryFrom<RawRule> for RuleSpec {
    type Error = AdvisorError;

    fn try_from(raw: RawRule) -> Result<Self> {
        let kind: RuleKind = raw.rule_name.parse()?;
        let spec = match kind {
            RuleKind::Nullability => RuleSpec::Nullability(parse_params(kind, raw.properties)?),
            RuleKind::DeterminedList => {
                RuleSpec::DeterminedList(parse_params(kind, raw.properties)?)
            }
            RuleKind::ForeignKeys => RuleSpec::ForeignKeys(parse_params(kind, raw.properties)?),
            RuleKind::MinMax => {
                expect_no_params(kind, &raw.properties)?;
                RuleSpec::MinMax
            }
            RuleKind::InconsistentNames => {
                expect_no_params(kind, &raw.properties)?;
                RuleSpec::InconsistentNames
            }
            RuleKind::FutureDates => {
                expect_no_params(kind, &raw.properties)?;
                RuleSpec::FutureDates
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl From<RuleSpec> for RawRule {
    fn from(spec: RuleSpec) -> Self {
        let raw = RawRule::new(spec.kind().as_str());
        match spec {
            RuleSpec::Nullability(params) => {
                raw.with_property("nullability_threshold", json!(params.nullability_threshold))
            }
            RuleSpec::DeterminedList(params) => {
                raw.with_property("list_size_threshold", json!(params.list_size_threshold))
            }
            RuleSpec::ForeignKeys(params) => raw.with_property("precision", json!(params.precision)),
            RuleSpec::MinMax | RuleSpec::InconsistentNames | RuleSpec::FutureDates => raw,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleConfig {
    #[serde(rename = "NUMERIC", default)]
    numeric: Vec<RawRule>,
    #[serde(rename = "TIMESTAMP", default)]
    timestamp: Vec<RawRule>,
    #[serde(rename = "TEXT", default)]
    text: Vec<RawRule>,
}

/// Ordered rule lists keyed by semantic column type.
///
/// A type without rules yields no suggestions for its columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRuleConfig", into = "RawRuleConfig")]
pub struct RuleConfig {
    numeric: Vec<RuleSpec>,
    timestamp: Vec<RuleSpec>,
    text: Vec<RuleSpec>,
}

impl RuleConfig {
    /// Creates a configuration with no rules for any type.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule sets the advisor ships with.
    pub fn recommended() -> Self {
        Self::new()
            .numeric(vec![
                RuleSpec::nullability(0.99),
                RuleSpec::MinMax,
                RuleSpec::determined_list(2),
                RuleSpec::ForeignKeys(ForeignKeyParams::default()),
            ])
            .text(vec![
                RuleSpec::nullability(0.99),
                RuleSpec::InconsistentNames,
                RuleSpec::determined_list(7),
                RuleSpec::ForeignKeys(ForeignKeyParams::default()),
            ])
            .timestamp(vec![
                RuleSpec::nullability(0.99),
                RuleSpec::MinMax,
                RuleSpec::FutureDates,
            ])
    }

    /// Sets the rule list for NUMERIC columns.
    pub fn numeric(mut self, rules: Vec<RuleSpec>) -> Self {
        self.numeric = rules;
        self
    }

    /// Sets the rule list for TIMESTAMP columns.
    pub fn timestamp(mut self, rules: Vec<RuleSpec>) -> Self {
        self.timestamp = rules;
        self
    }

    /// Sets the rule list for TEXT columns.
    pub fn text(mut self, rules: Vec<RuleSpec>) -> Self {
        self.text = rules;
        self
    }

    /// Returns the ordered rules for a column type; empty for unrecognized types.
    pub fn rules_for(&self, column_type: &ColumnType) -> &[RuleSpec] {
        match column_type {
            ColumnType::Numeric => &self.numeric,
            ColumnType::Timestamp => &self.timestamp,
            ColumnType::Text => &self.text,
            ColumnType::Unrecognized(_) => &[],
        }
    }

    /// Parses and validates a JSON rule configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawRuleConfig = serde_json::from_str(json).map_err(|e| {
            AdvisorError::configuration(format!("Malformed rule configuration: {e}"))
        })?;
        Self::try_from(raw)
    }

    /// Reads, parses and validates a JSON rule configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .with_context(|| format!("Loading rule config {}", path.display()))
    }

    /// Validates every configured rule.
    pub fn validate(&self) -> Result<()> {
        for column_type in ColumnType::SUPPORTED {
            for rule in self.rules_for(&column_type) {
                rule.validate()
                    .with_context(|| format!("{column_type} rule {}", rule.kind()))?;
            }
        }
        Ok(())
    }

    /// Total number of configured rules across all types.
    pub fn len(&self) -> usize {
        self.numeric.len() + self.timestamp.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn convert_rules(rules: Vec<RawRule>) -> Result<Vec<RuleSpec>> {
    rules.into_iter().map(RuleSpec::try_from).collect()
}

impl TryFrom<RawRuleConfig> for RuleConfig {
    type Error = AdvisorError;

    fn try_from(raw: RawRuleConfig) -> Result<Self> {
        let config = Self {
            numeric: convert_rules(raw.numeric)?,
            timestamp: convert_rules(raw.timestamp)?,
            text: convert_rules(raw.text)?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<RuleConfig> for RawRuleConfig {
    fn from(config: RuleConfig) -> Self {
        let to_raw = |rules: Vec<RuleSpec>| rules.into_iter().map(RawRule::from).collect();
        Self {
            numeric: to_raw(config.numeric),
            timestamp: to_raw(config.timestamp),
            text: to_raw(config.text),
        }
    }
}

/// Settings for rendered automation templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    /// Table holding datasource metadata (`DATASOURCE_ID`, `DATASOURCE_DESC`,
    /// `DATASOURCE_RELATED_SCHEMA`)
    pub metadata_table: String,
    /// Value written to `META_RULE_LEVEL`
    pub rule_level: String,
    /// Reject table and column names that could leave their quoted literal
    pub strict_identifiers: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            metadata_table: "DQ_METADATA.DATASOURCES".to_string(),
            rule_level: "EXTENDED".to_string(),
            strict_identifiers: true,
        }
    }
}

impl TemplateConfig {
    pub fn with_metadata_table(mut self, metadata_table: impl Into<String>) -> Self {
        self.metadata_table = metadata_table.into();
        self
    }

    pub fn with_rule_level(mut self, rule_level: impl Into<String>) -> Self {
        self.rule_level = rule_level.into();
        self
    }

    pub fn with_strict_identifiers(mut self, strict: bool) -> Self {
        self.strict_identifiers = strict;
        self
    }

    /// Checks the values embedded into every template.
    pub fn validate(&self) -> Result<()> {
        SqlSecurity::validate_identifier(&self.metadata_table)?;
        SqlSecurity::validate_literal_word(&self.rule_level, "rule level")
    }
}
