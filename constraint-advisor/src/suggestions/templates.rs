//! Automation templates attached to fired suggestions.
//!
//! A template is a `SELECT` producing one row for the downstream rule
//! management framework. `<DS>`, `<DL>` and `<NUM>` are placeholders that
//! framework fills in (datasource code, layer, numeric suffix). Rendering is
//! plain string formatting; names are embedded verbatim.

use std::fmt::Write;

use super::TemplateConfig;
use crate::profile::StatValue;

/// Parameters of one rule-template row.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTemplate {
    /// Digit placed between `<DL>` and `<NUM>` in the rule id
    pub id_digit: u8,
    pub dimension: &'static str,
    pub rule_type: &'static str,
    pub suites: &'static str,
    pub param_min: Option<String>,
    pub param_max: Option<String>,
    pub param_regexp: Option<String>,
    pub param_default: Option<String>,
}

impl RuleTemplate {
    fn base(id_digit: u8, dimension: &'static str, rule_type: &'static str, suites: &'static str) -> Self {
        Self {
            id_digit,
            dimension,
            rule_type,
            suites,
            param_min: None,
            param_max: None,
            param_regexp: None,
            param_default: None,
        }
    }

    /// Completeness check that the column has no nulls.
    pub fn nullability() -> Self {
        Self::base(3, "COMPLETENESS", "NULLABILITY", "SMOKE,REGRESSION,INTEGRATION")
    }

    /// Validity range check bounded by the observed minimum and maximum.
    pub fn min_max(min: &StatValue, max: &StatValue) -> Self {
        Self {
            param_min: Some(min.to_sql_literal()),
            param_max: Some(max.to_sql_literal()),
            ..Self::base(7, "VALIDITY", "MINMAX", "REGRESSION,INTEGRATION")
        }
    }

    /// Regular-expression check against an allowed value list.
    pub fn determined_list() -> Self {
        Self {
            param_regexp: Some("'^<VAL1>|<VAL2>|<VAL3>$'".to_string()),
            ..Self::base(8, "VALIDITY", "REGEXP", "INTEGRATION,EXTENDED")
        }
    }

    /// Consistency check that values do not differ only by case.
    pub fn inconsistent_names(metadata_table: &str, table: &str, column: &str) -> Self {
        let query = format!(
            "concat('select iff(count(distinct {column}) <> count(distinct upper({column})), 1, 0) from ', {schema}, '.{table}')",
            schema = related_schema(metadata_table),
        );
        Self {
            param_default: Some(query),
            ..Self::base(8, "CONSISTENCY", "DEFAULT", "REGRESSION,INTEGRATION")
        }
    }

    /// Validity check that no value lies after the current date.
    pub fn future_dates(metadata_table: &str, table: &str, column: &str) -> Self {
        let query = format!(
            "concat('select iff(count({column}) > 0, 1, 0) from ', {schema}, '.{table} where {column} > getdate()')",
            schema = related_schema(metadata_table),
        );
        Self {
            param_default: Some(query),
            ..Self::base(8, "VALIDITY", "DEFAULT", "REGRESSION,INTEGRATION")
        }
    }

    /// Renders the template row for `table`.`column`.
    pub fn render(&self, config: &TemplateConfig, table: &str, column: &str) -> String {
        let mut sql = String::from("SELECT\n");
        let mut line = |expr: &str, alias: &str| {
            // Writing into a String cannot fail
            let _ = writeln!(sql, "    {expr} AS {alias},");
        };

        line(&format!("<DS><DL>{}<NUM>", self.id_digit), "DQ_RULE_ID");
        line(
            &format!(
                "(SELECT DATASOURCE_ID FROM {} WHERE DATASOURCE_DESC = '<DS>')",
                config.metadata_table
            ),
            "DATASOURCE_ID",
        );
        line("NULL", "DQ_ACTION_ID");
        line("NULL", "DQ_RULE_DESC");
        line(&quoted(self.dimension), "META_DQ_DIMENSION");
        line(&quoted(self.rule_type), "META_RULE_TYPE");
        line(&quoted(self.suites), "META_SUITES");
        line(&quoted(&config.rule_level), "META_RULE_LEVEL");
        line(&quoted(table), "PARAM_TABLE_NAME");
        line(&quoted(column), "PARAM_TABLE_COLUMN");
        line(or_null(&self.param_min), "PARAM_MIN");
        line(or_null(&self.param_max), "PARAM_MAX");
        line(or_null(&self.param_regexp), "PARAM_REGEXP");
        line("NULL", "PARAM_S2T_VIEW");
        line(or_null(&self.param_default), "PARAM_DEFAULT");

        sql.push_str("    TRUE AS IS_ACTIVE");
        sql
    }
}

fn quoted(value: &str) -> String {
    format!("'{value}'")
}

fn or_null(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("NULL")
}

fn related_schema(metadata_table: &str) -> String {
    format!(
        "(SELECT DATASOURCE_RELATED_SCHEMA FROM {metadata_table} WHERE DATASOURCE_DESC = '<DS>')::varchar"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_template() {
        let sql = RuleTemplate::nullability().render(&TemplateConfig::default(), "ORDERS", "ID");
        let expected = "\
SELECT
    <DS><DL>3<NUM> AS DQ_RULE_ID,
    (SELECT DATASOURCE_ID FROM DQ_METADATA.DATASOURCES WHERE DATASOURCE_DESC = '<DS>') AS DATASOURCE_ID,
    NULL AS DQ_ACTION_ID,
    NULL AS DQ_RULE_DESC,
    'COMPLETENESS' AS META_DQ_DIMENSION,
    'NULLABILITY' AS META_RULE_TYPE,
    'SMOKE,REGRESSION,INTEGRATION' AS META_SUITES,
    'EXTENDED' AS META_RULE_LEVEL,
    'ORDERS' AS PARAM_TABLE_NAME,
    'ID' AS PARAM_TABLE_COLUMN,
    NULL AS PARAM_MIN,
    NULL AS PARAM_MAX,
    NULL AS PARAM_REGEXP,
    NULL AS PARAM_S2T_VIEW,
    NULL AS PARAM_DEFAULT,
    TRUE AS IS_ACTIVE";
        assert_eq!(sql, expected);
    }

    #[test]
    fn test_min_max_template_embeds_literals() {
        let numeric = RuleTemplate::min_max(&StatValue::Number(1.0), &StatValue::Number(100.5))
            .render(&TemplateConfig::default(), "T", "C");
        assert!(numeric.contains("<DS><DL>7<NUM> AS DQ_RULE_ID"));
        assert!(numeric.contains("    1 AS PARAM_MIN,"));
        assert!(numeric.contains("    100.5 AS PARAM_MAX,"));

        let dates = RuleTemplate::min_max(
            &StatValue::from("2020-01-01 00:00:00"),
            &StatValue::from("2024-12-31 23:59:59"),
        )
        .render(&TemplateConfig::default(), "T", "C");
        assert!(dates.contains("    '2020-01-01 00:00:00' AS PARAM_MIN,"));
        assert!(dates.contains("    '2024-12-31 23:59:59' AS PARAM_MAX,"));
    }

    #[test]
    fn test_determined_list_template() {
        let sql = RuleTemplate::determined_list().render(&TemplateConfig::default(), "T", "C");
        assert!(sql.contains("'REGEXP' AS META_RULE_TYPE"));
        assert!(sql.contains("'INTEGRATION,EXTENDED' AS META_SUITES"));
        assert!(sql.contains("'^<VAL1>|<VAL2>|<VAL3>$' AS PARAM_REGEXP"));
    }

    #[test]
    fn test_default_query_templates_use_configured_metadata() {
        let config = TemplateConfig::default()
            .with_metadata_table("OPS.SOURCES")
            .with_rule_level("CORE");

        let names = RuleTemplate::inconsistent_names(&config.metadata_table, "DIM", "NAME")
            .render(&config, "DIM", "NAME");
        assert!(names.contains("'CONSISTENCY' AS META_DQ_DIMENSION"));
        assert!(names.contains("'CORE' AS META_RULE_LEVEL"));
        assert!(names.contains(
            "count(distinct NAME) <> count(distinct upper(NAME))"
        ));
        assert!(names.contains(
            "(SELECT DATASOURCE_RELATED_SCHEMA FROM OPS.SOURCES WHERE DATASOURCE_DESC = '<DS>')::varchar, '.DIM')"
        ));

        let future = RuleTemplate::future_dates(&config.metadata_table, "FACT", "LOADED_AT")
            .render(&config, "FACT", "LOADED_AT");
        assert!(future.contains("'.FACT where LOADED_AT > getdate()') AS PARAM_DEFAULT"));
        assert!(future.contains("select iff(count(LOADED_AT) > 0, 1, 0) from "));
    }
}
