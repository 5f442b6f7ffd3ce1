//! Integration tests for the analyzer over profiles in the connector's JSON shape.

use chrono::{Duration, TimeZone, Utc};
use constraint_advisor::prelude::*;
use constraint_advisor::suggestions::NO_IDENTIFIED_CONSTRAINTS;

fn parse_profiles(json: &str) -> Vec<TableProfile> {
    serde_json::from_str(json).expect("profiles should deserialize")
}

fn text_rules() -> RuleConfig {
    RuleConfig::from_json_str(
        r#"{
            "TEXT": [
                {"rule_name": "NULLABILITY", "properties": {"nullability_threshold": 0.99}},
                {"rule_name": "INCONSISTENT_NAMES"},
                {"rule_name": "DETERMINED_LIST", "properties": {"list_size_threshold": 7}},
                {"rule_name": "FOREIGN_KEYS"}
            ]
        }"#,
    )
    .unwrap()
}

fn rules_of(report: &SuggestionReport, table: &str, column: &str) -> Vec<RuleKind> {
    report
        .suggestions_for(table, column)
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.rule)
        .collect()
}

#[test]
fn test_text_column_end_to_end() {
    let profiles = parse_profiles(
        r#"[{
            "TABLE_NAME": "DIM_REGION",
            "TABLE_PROFILING_INFO": {
                "TABLE_COUNT": 5,
                "COLUMNS": {
                    "REGION_CODE": {
                        "col_type": "TEXT", "share": 1.0, "uniq": 5, "uniq_upper": 5,
                        "top_value": "1", "top_freq": 1, "top_share": 0.2
                    }
                }
            }
        }]"#,
    );

    let report = Analyzer::new(text_rules())
        .suggest_constraints(&profiles)
        .unwrap();

    let fired = rules_of(&report, "DIM_REGION", "REGION_CODE");
    assert!(fired.contains(&RuleKind::DeterminedList));
    assert!(!fired.contains(&RuleKind::InconsistentNames));
    assert!(!fired.contains(&RuleKind::ForeignKeys));
    // share 1.0 is above the 0.99 threshold
    assert_eq!(fired, vec![RuleKind::Nullability, RuleKind::DeterminedList]);

    let column = report.table("DIM_REGION").unwrap().column("REGION_CODE").unwrap();
    assert_eq!(column.base_info.uniq, Some(5));
    assert!(column
        .possible_constraints
        .iter()
        .all(|s| s.template.is_none()));
}

#[test]
fn test_failed_tables_never_reach_the_report() {
    let profiles = parse_profiles(
        r#"[
            {"TABLE_NAME": "GOOD", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 1, "COLUMNS": {"ID": {"col_type": "NUMERIC", "share": 1.0}}}},
            {"TABLE_NAME": "EMPTY", "ERROR": "EMPTY_TABLE"},
            {"TABLE_NAME": "DENIED", "ERROR": "Insufficient privileges to operate on table"},
            {"ERROR": "connection reset"}
        ]"#,
    );

    let report = Analyzer::default().suggest_constraints(&profiles).unwrap();
    let names: Vec<_> = report.iter().map(|t| t.table_name.as_str()).collect();
    assert_eq!(names, vec!["GOOD"]);
}

#[test]
fn test_column_failure_is_isolated() {
    let profiles = parse_profiles(
        r#"[{
            "TABLE_NAME": "ORDERS",
            "TABLE_PROFILING_INFO": {
                "TABLE_COUNT": 10,
                "COLUMNS": {
                    "ID": {"col_type": "NUMERIC", "share": 1.0},
                    "SECRET": {"ERROR": "permission denied", "SQL": "select count(SECRET) from ORDERS"},
                    "NOTE": {"col_type": "TEXT", "share": 0.0}
                }
            }
        }]"#,
    );

    let report = Analyzer::default().suggest_constraints(&profiles).unwrap();
    let table = report.table("ORDERS").unwrap();
    let columns: Vec<_> = table.suggested_constraints.keys().cloned().collect();
    assert_eq!(columns, vec!["ID", "SECRET", "NOTE"]);

    let secret = table.column("SECRET").unwrap();
    assert!(secret.possible_constraints.is_empty());
    assert!(secret.is_failed());
    assert_eq!(
        secret.base_info.extra.get("SQL").and_then(|v| v.as_str()),
        Some("select count(SECRET) from ORDERS")
    );

    let note = table.column("NOTE").unwrap();
    assert_eq!(note.possible_constraints.len(), 1);
    assert!(note.possible_constraints[0]
        .description
        .starts_with("ONLY NULLS"));
}

#[test]
fn test_missing_column_type_aborts_the_run() {
    let profiles = parse_profiles(
        r#"[{"TABLE_NAME": "T", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 3, "COLUMNS": {"C": {"share": 1.0, "uniq": 2}}}}]"#,
    );

    let err = Analyzer::default().suggest_constraints(&profiles).unwrap_err();
    match &err {
        AdvisorError::UndefinedColumnType {
            table,
            column,
            statistics,
        } => {
            assert_eq!(table, "T");
            assert_eq!(column, "C");
            assert_eq!(statistics.uniq, Some(2));
        }
        other => panic!("Expected UndefinedColumnType, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("col_type"));
    assert!(message.contains("\"uniq\": 2"));
}

#[test]
fn test_unrecognized_column_type_gets_sentinel() {
    let profiles = parse_profiles(
        r#"[{"TABLE_NAME": "T", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 3, "COLUMNS": {"FLAG": {"col_type": "BOOLEAN", "share": 1.0}}}}]"#,
    );

    let report = Analyzer::default().suggest_constraints(&profiles).unwrap();
    let suggestions = report.suggestions_for("T", "FLAG").unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].description, NO_IDENTIFIED_CONSTRAINTS);
    assert!(suggestions[0].rule.is_none());
    assert_eq!(
        report.table("T").unwrap().column("FLAG").unwrap().base_info.col_type,
        Some(ColumnType::Unrecognized("BOOLEAN".to_string()))
    );
}

#[test]
fn test_native_boolean_statistics_reach_the_analyzer() {
    let profiles = parse_profiles(
        r#"[{"TABLE_NAME": "T", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 4, "COLUMNS": {
            "IS_ACTIVE": {"col_type": "BOOLEAN", "count": 4, "share": 1.0, "uniq": 2,
                          "top_value": true, "top_freq": 3, "top_share": 0.75,
                          "min": false, "max": true},
            "CODE": {"col_type": "TEXT", "share": 1.0, "uniq": 2, "uniq_upper": 2}
        }}}]"#,
    );

    let report = Analyzer::default().suggest_constraints(&profiles).unwrap();
    let flag = report.suggestions_for("T", "IS_ACTIVE").unwrap();
    assert_eq!(flag.len(), 1);
    assert_eq!(flag[0].description, NO_IDENTIFIED_CONSTRAINTS);
    assert_eq!(
        report.table("T").unwrap().column("IS_ACTIVE").unwrap().base_info.top_value,
        Some(StatValue::Bool(true))
    );
    assert!(!report.suggestions_for("T", "CODE").unwrap().is_empty());
}

#[test]
fn test_blank_column_type_is_undefined() {
    let profiles = parse_profiles(
        r#"[{"TABLE_NAME": "T", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 3, "COLUMNS": {"C": {"col_type": "", "uniq": 2}}}}]"#,
    );
    let err = Analyzer::default().suggest_constraints(&profiles).unwrap_err();
    assert!(matches!(err, AdvisorError::UndefinedColumnType { .. }));
}

#[test]
fn test_table_without_columns_lacks_data() {
    for json in [
        r#"[{"TABLE_NAME": "T", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 3, "COLUMNS": {}}}]"#,
        r#"[{"TABLE_NAME": "T"}]"#,
        r#"[{"TABLE_PROFILING_INFO": {"TABLE_COUNT": 3, "COLUMNS": {"C": {"col_type": "TEXT"}}}}]"#,
    ] {
        let err = Analyzer::default()
            .suggest_constraints(&parse_profiles(json))
            .unwrap_err();
        assert!(
            matches!(err, AdvisorError::LackDataForAnalysis { .. }),
            "unexpected error for {json}: {err:?}"
        );
    }
}

#[test]
fn test_analysis_is_idempotent_with_fixed_clock() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let profiles = parse_profiles(
        r#"[{
            "TABLE_NAME": "EVENTS",
            "TABLE_PROFILING_INFO": {
                "TABLE_COUNT": 100,
                "COLUMNS": {
                    "CREATED_AT": {"col_type": "TIMESTAMP", "share": 1.0, "uniq": 90, "min": "2023-01-01 00:00:00", "max": "2025-01-01T00:00:00Z"},
                    "KIND": {"col_type": "TEXT", "share": 0.5, "uniq": 4, "uniq_upper": 3},
                    "AMOUNT": {"col_type": "NUMERIC", "count": 100, "share": 1.0, "uniq": 50, "min": 1, "max": 100, "top_freq": 50, "top_share": 0.5}
                }
            }
        }]"#,
    );

    let analyzer = Analyzer::builder()
        .rules(RuleConfig::recommended())
        .include_templates(true)
        .reference_time(now)
        .build()
        .unwrap();

    let first = analyzer.suggest_constraints(&profiles).unwrap();
    let second = analyzer.suggest_constraints(&profiles).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    assert_eq!(
        rules_of(&first, "EVENTS", "CREATED_AT"),
        vec![RuleKind::Nullability, RuleKind::MinMax, RuleKind::FutureDates]
    );
    assert_eq!(
        rules_of(&first, "EVENTS", "KIND"),
        vec![RuleKind::DeterminedList, RuleKind::InconsistentNames]
    );
    assert_eq!(
        rules_of(&first, "EVENTS", "AMOUNT"),
        vec![RuleKind::Nullability, RuleKind::MinMax, RuleKind::ForeignKeys]
    );
}

#[test]
fn test_future_dates_follow_the_reference_time() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let rules = RuleConfig::new().timestamp(vec![RuleSpec::FutureDates]);

    let profile_with_max = |max: String| {
        TableProfile::named("EVENTS").with_column(
            "TS",
            ColumnStatistics {
                max: Some(StatValue::Text(max)),
                ..ColumnStatistics::of_type("TIMESTAMP")
            },
        )
    };
    let analyzer = Analyzer::builder()
        .rules(rules)
        .reference_time(now)
        .build()
        .unwrap();

    let future = profile_with_max((now + Duration::days(365)).to_rfc3339());
    let report = analyzer.suggest_constraints(&[future]).unwrap();
    assert_eq!(rules_of(&report, "EVENTS", "TS"), vec![RuleKind::FutureDates]);

    let past = profile_with_max((now - Duration::days(365)).to_rfc3339());
    let report = analyzer.suggest_constraints(&[past]).unwrap();
    assert!(rules_of(&report, "EVENTS", "TS").is_empty());
}

#[test]
fn test_templates_are_attached_when_enabled() {
    let profiles = vec![TableProfile::named("DIM_PRODUCT").with_column(
        "CATEGORY",
        ColumnStatistics {
            share: Some(1.0),
            uniq: Some(6),
            uniq_upper: Some(4),
            ..ColumnStatistics::of_type("TEXT")
        },
    )];

    let analyzer = Analyzer::builder()
        .rules(RuleConfig::recommended())
        .include_templates(true)
        .template_config(TemplateConfig::default().with_metadata_table("OPS.DATASOURCES"))
        .build()
        .unwrap();
    let report = analyzer.suggest_constraints(&profiles).unwrap();
    let suggestions = report.suggestions_for("DIM_PRODUCT", "CATEGORY").unwrap();
    assert_eq!(suggestions.len(), 3);

    for suggestion in suggestions {
        let template = suggestion.template.as_deref().unwrap();
        assert!(template.starts_with("SELECT\n"));
        assert!(template.contains("'DIM_PRODUCT' AS PARAM_TABLE_NAME"));
        assert!(template.contains("'CATEGORY' AS PARAM_TABLE_COLUMN"));
        assert!(template.contains("FROM OPS.DATASOURCES"));
        assert!(template.ends_with("TRUE AS IS_ACTIVE"));
    }

    let value = report.to_json_value().unwrap();
    let first = &value[0]["SUGGESTED_CONSTRAINTS"]["CATEGORY"]["POSSIBLE_CONSTRAINTS"][0];
    assert!(first["MERGE_INTO_ADF_FRM"].is_string());
    assert_eq!(first["RULE"], "NULLABILITY");
}

#[test]
fn test_unsafe_names_are_rejected_in_template_mode() {
    let profiles = vec![TableProfile::named("ORDERS").with_column(
        "ID; DROP TABLE ORDERS",
        ColumnStatistics {
            share: Some(1.0),
            ..ColumnStatistics::of_type("NUMERIC")
        },
    )];

    let strict = Analyzer::builder().include_templates(true).build().unwrap();
    let err = strict.suggest_constraints(&profiles).unwrap_err();
    assert!(matches!(err, AdvisorError::SecurityError(_)));

    // Without templates nothing is embedded, so names are not checked
    let plain = Analyzer::default();
    assert!(plain.suggest_constraints(&profiles).is_ok());

    let lenient = Analyzer::builder()
        .include_templates(true)
        .template_config(TemplateConfig::default().with_strict_identifiers(false))
        .build()
        .unwrap();
    assert!(lenient.suggest_constraints(&profiles).is_ok());
}

#[test]
fn test_types_without_rules_yield_empty_lists() {
    let rules = RuleConfig::new().text(vec![RuleSpec::InconsistentNames]);
    let profiles = vec![TableProfile::named("T").with_column(
        "N",
        ColumnStatistics {
            share: Some(1.0),
            uniq: Some(1),
            ..ColumnStatistics::of_type("NUMERIC")
        },
    )];
    let report = Analyzer::new(rules).suggest_constraints(&profiles).unwrap();
    assert_eq!(report.suggestions_for("T", "N"), Some(&[][..]));
}

#[test]
fn test_report_counts_by_rule() {
    let profiles = parse_profiles(
        r#"[
            {"TABLE_NAME": "A", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 2, "COLUMNS": {
                "X": {"col_type": "TEXT", "share": 1.0, "uniq": 2, "uniq_upper": 1},
                "Y": {"col_type": "NUMERIC", "share": 0.999}
            }}},
            {"TABLE_NAME": "B", "TABLE_PROFILING_INFO": {"TABLE_COUNT": 2, "COLUMNS": {
                "Z": {"col_type": "TIMESTAMP", "share": 0.0}
            }}}
        ]"#,
    );
    let report = Analyzer::default().suggest_constraints(&profiles).unwrap();
    let counts = report.count_by_rule();
    assert_eq!(counts[&RuleKind::Nullability], 3);
    assert_eq!(counts[&RuleKind::InconsistentNames], 1);
    assert_eq!(counts[&RuleKind::DeterminedList], 1);
    assert_eq!(report.total_suggestions(), 5);
}
