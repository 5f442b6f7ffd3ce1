//! Property-based tests for the constraint suggestion rules.
//!
//! Generates arbitrary (possibly partial) column statistics and checks the
//! invariants every analysis run must hold:
//! - rules never fail on missing statistics, they stay silent
//! - suggestions come back in the fixed rule order, at most one per rule
//! - failed tables never appear in the report
//! - the same input always yields the same report
//! - each rule fires exactly when its trigger condition holds

use chrono::{TimeZone, Utc};
use constraint_advisor::prelude::*;
use constraint_advisor::suggestions::{ConstraintIdentifier, IdentifierBuilder};
use proptest::prelude::*;

fn all_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::nullability(0.99),
        RuleSpec::MinMax,
        RuleSpec::determined_list(7),
        RuleSpec::InconsistentNames,
        RuleSpec::FutureDates,
        RuleSpec::foreign_keys(3),
    ]
}

fn stat_value() -> impl Strategy<Value = StatValue> {
    prop_oneof![
        (-1_000i64..1_000).prop_map(StatValue::from),
        (0i64..4_000_000_000).prop_map(|secs| {
            let moment = Utc.timestamp_opt(secs, 0).single().unwrap_or_default();
            StatValue::Text(moment.to_rfc3339())
        }),
        "[a-z]{0,8}".prop_map(StatValue::Text),
    ]
}

fn column_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("NUMERIC".to_string()),
        Just("TIMESTAMP".to_string()),
        Just("TEXT".to_string()),
        "[A-Z]{3,8}",
    ]
}

prop_compose! {
    fn column_statistics()(
        col_type in column_type(),
        count in proptest::option::of(0u64..10_000),
        share in proptest::option::of(0.0f64..=1.0),
        uniq in proptest::option::of(0u64..50),
        uniq_upper in proptest::option::of(0u64..50),
        top_freq in proptest::option::of(0u64..10_000),
        top_share in proptest::option::of(0.0f64..=1.0),
        min in proptest::option::of(stat_value()),
        max in proptest::option::of(stat_value()),
    ) -> ColumnStatistics {
        ColumnStatistics {
            count,
            share,
            uniq,
            uniq_upper,
            top_freq,
            top_share,
            min,
            max,
            ..ColumnStatistics::of_type(col_type)
        }
    }
}

prop_compose! {
    fn table_profile()(
        name in "[A-Z][A-Z_]{0,10}",
        failed in proptest::bool::weighted(0.3),
        columns in proptest::collection::vec(column_statistics(), 1..6),
    ) -> TableProfile {
        if failed {
            return TableProfile::failed(name, "profiling failed");
        }
        columns
            .into_iter()
            .enumerate()
            .fold(TableProfile::named(name), |table, (i, stats)| {
                table.with_column(format!("COL_{i}"), stats)
            })
    }
}

fn rule_config() -> RuleConfig {
    RuleConfig::new()
        .numeric(all_rules())
        .timestamp(all_rules())
        .text(all_rules())
}

proptest! {
    #[test]
    fn prop_suggestions_follow_rule_order(stats in column_statistics()) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut shuffled = all_rules();
        shuffled.reverse();

        let suggestions = IdentifierBuilder::new(&stats, "C", "T")
            .reference_time(now)
            .identify(&shuffled);

        let kinds: Vec<RuleKind> = suggestions.iter().filter_map(|s| s.rule).collect();
        prop_assert_eq!(kinds.len(), suggestions.len());
        let mut sorted = kinds.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(kinds, sorted);
    }

    #[test]
    fn prop_repeated_rules_do_not_duplicate(stats in column_statistics()) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let once = IdentifierBuilder::new(&stats, "C", "T")
            .reference_time(now)
            .identify(&all_rules());
        let doubled: Vec<RuleSpec> = all_rules().into_iter().chain(all_rules()).collect();
        let twice = IdentifierBuilder::new(&stats, "C", "T")
            .reference_time(now)
            .identify(&doubled);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_failed_tables_are_filtered(tables in proptest::collection::vec(table_profile(), 0..6)) {
        let analyzer = Analyzer::builder()
            .rules(rule_config())
            .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
            .build()
            .unwrap();
        let report = analyzer.suggest_constraints(&tables).unwrap();

        let expected: Vec<String> = tables
            .iter()
            .filter(|t| !t.has_error())
            .filter_map(|t| t.table_name.clone())
            .collect();
        let actual: Vec<String> = report.iter().map(|t| t.table_name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_analysis_is_deterministic(tables in proptest::collection::vec(table_profile(), 0..4)) {
        let analyzer = Analyzer::builder()
            .rules(rule_config())
            .include_templates(true)
            .template_config(TemplateConfig::default().with_strict_identifiers(false))
            .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
            .build()
            .unwrap();
        let first = analyzer.suggest_constraints(&tables).unwrap();
        let second = analyzer.suggest_constraints(&tables).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_nullability_matches_threshold(share in 0.0f64..=1.0, threshold in 0.0f64..1.0) {
        let stats = ColumnStatistics { share: Some(share), ..ColumnStatistics::of_type("NUMERIC") };
        let suggestions = ConstraintIdentifier::new(&stats, "C", "T")
            .nullability(threshold)
            .collect();

        let expected = (threshold < share && share <= 1.0) || share == 0.0;
        prop_assert_eq!(suggestions.len() == 1, expected);
    }

    #[test]
    fn prop_determined_list_is_strict(uniq in 0u64..30, threshold in 1u64..30) {
        let stats = ColumnStatistics { uniq: Some(uniq), ..ColumnStatistics::of_type("TEXT") };
        let fired = !ConstraintIdentifier::new(&stats, "C", "T")
            .determined_list(threshold)
            .collect()
            .is_empty();
        prop_assert_eq!(fired, 0 < uniq && uniq < threshold);
    }

    #[test]
    fn prop_inconsistent_names_compares_counts(uniq in 0u64..20, uniq_upper in 0u64..20) {
        let stats = ColumnStatistics {
            uniq: Some(uniq),
            uniq_upper: Some(uniq_upper),
            ..ColumnStatistics::of_type("TEXT")
        };
        let fired = !ConstraintIdentifier::new(&stats, "C", "T")
            .inconsistent_names()
            .collect()
            .is_empty();
        prop_assert_eq!(fired, uniq != uniq_upper);
    }

    #[test]
    fn prop_foreign_keys_fire_on_consistent_share(count in 1u64..10_000, top_freq in 0u64..10_000) {
        let top_freq = top_freq.min(count);
        let share = top_freq as f64 / count as f64;
        let stats = ColumnStatistics {
            count: Some(count),
            top_freq: Some(top_freq),
            top_share: Some(share),
            ..ColumnStatistics::of_type("NUMERIC")
        };
        let fired = !ConstraintIdentifier::new(&stats, "C", "T")
            .foreign_keys(3)
            .collect()
            .is_empty();
        prop_assert!(fired);
    }
}

mod edge_case_tests {
    use super::*;

    #[test]
    fn test_statistics_without_values_never_fire() {
        for col_type in ["NUMERIC", "TIMESTAMP", "TEXT"] {
            let stats = ColumnStatistics::of_type(col_type);
            let suggestions = IdentifierBuilder::new(&stats, "C", "T").identify(&all_rules());
            assert!(suggestions.is_empty(), "{col_type} fired without evidence");
        }
    }

    #[test]
    fn test_boundary_values() {
        let at_threshold = ColumnStatistics {
            share: Some(0.99),
            ..ColumnStatistics::of_type("NUMERIC")
        };
        assert!(ConstraintIdentifier::new(&at_threshold, "C", "T")
            .nullability(0.99)
            .collect()
            .is_empty());

        let boolean_like = ColumnStatistics {
            min: Some(StatValue::from(0i64)),
            max: Some(StatValue::from(1i64)),
            uniq: Some(2),
            ..ColumnStatistics::of_type("NUMERIC")
        };
        assert!(ConstraintIdentifier::new(&boolean_like, "C", "T")
            .min_max()
            .collect()
            .is_empty());

        let constant = ColumnStatistics {
            min: Some(StatValue::from(5i64)),
            max: Some(StatValue::from(5i64)),
            uniq: Some(3),
            ..ColumnStatistics::of_type("NUMERIC")
        };
        assert!(ConstraintIdentifier::new(&constant, "C", "T")
            .min_max()
            .collect()
            .is_empty());
    }
}
