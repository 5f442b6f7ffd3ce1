//! Common test fixtures for constraint suggestion scenarios.
//!
//! This module provides pre-built table profiles shaped like what a profiling
//! run returns, so tests and demos can exercise the analyzer without a live
//! statistics source.

use chrono::{DateTime, TimeZone, Utc};

use crate::profile::{ColumnStatistics, StatValue, TableProfile, EMPTY_TABLE};
use crate::sources::{InMemorySource, SourceType};
use crate::suggestions::{RuleConfig, RuleSpec};

/// The fixed clock fixtures are written against: 2024-06-01T00:00:00Z.
pub fn fixed_reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A single TEXT column that only the determined-list rule fires on, besides
/// nullability.
pub fn create_text_column_profile() -> TableProfile {
    TableProfile::profiled("DIM_REGION", 5, Default::default()).with_column(
        "REGION_CODE",
        ColumnStatistics {
            share: Some(1.0),
            uniq: Some(5),
            uniq_upper: Some(5),
            top_value: Some(StatValue::from("1")),
            top_freq: Some(1),
            top_share: Some(0.2),
            ..ColumnStatistics::of_type("TEXT")
        },
    )
}

/// Rules for TEXT columns as most deployments configure them.
pub fn text_rules() -> RuleConfig {
    RuleConfig::new().text(vec![
        RuleSpec::nullability(0.99),
        RuleSpec::InconsistentNames,
        RuleSpec::determined_list(7),
        RuleSpec::foreign_keys(3),
    ])
}

/// An orders table mixing every column type, a failed column and a type the
/// rules do not know.
pub fn create_orders_profile() -> TableProfile {
    TableProfile::profiled("ORDERS", 1_000, Default::default())
        .with_column(
            "ORDER_ID",
            ColumnStatistics {
                count: Some(1_000),
                share: Some(1.0),
                uniq: Some(1_000),
                top_freq: Some(1),
                top_share: Some(0.001),
                min: Some(StatValue::Number(1.0)),
                max: Some(StatValue::Number(1_000.0)),
                ..ColumnStatistics::of_type("NUMERIC")
            },
        )
        .with_column(
            "STATUS",
            ColumnStatistics {
                count: Some(1_000),
                share: Some(1.0),
                uniq: Some(5),
                uniq_upper: Some(3),
                top_value: Some(StatValue::from("shipped")),
                top_freq: Some(400),
                top_share: Some(0.35),
                ..ColumnStatistics::of_type("TEXT")
            },
        )
        .with_column(
            "IS_GIFT",
            ColumnStatistics {
                count: Some(600),
                share: Some(0.6),
                uniq: Some(2),
                min: Some(StatValue::Number(0.0)),
                max: Some(StatValue::Number(1.0)),
                ..ColumnStatistics::of_type("NUMERIC")
            },
        )
        .with_column(
            "DELIVERED_AT",
            ColumnStatistics {
                count: Some(900),
                share: Some(0.9),
                uniq: Some(850),
                min: Some(StatValue::from("2023-01-03 10:00:00")),
                max: Some(StatValue::from("2025-02-01T08:30:00+02:00")),
                ..ColumnStatistics::of_type("TIMESTAMP")
            },
        )
        .with_column(
            "COUPON",
            ColumnStatistics {
                count: Some(0),
                share: Some(0.0),
                uniq: Some(0),
                ..ColumnStatistics::of_type("TEXT")
            },
        )
        .with_column(
            "PAYLOAD",
            ColumnStatistics {
                share: Some(1.0),
                ..ColumnStatistics::of_type("VARIANT")
            },
        )
        .with_column(
            "INTERNAL_NOTE",
            ColumnStatistics::failed("SQL compilation error: insufficient privileges"),
        )
}

/// A table the source could not profile.
pub fn create_failed_table_profile() -> TableProfile {
    TableProfile::failed("LEGACY_AUDIT", "Object 'DWH.LEGACY_AUDIT' does not exist")
}

/// A table with no rows.
pub fn create_empty_table_profile() -> TableProfile {
    TableProfile::failed("STAGING_ORDERS", EMPTY_TABLE)
}

/// A table whose column lacks a type, which analysis rejects.
pub fn create_untyped_column_profile() -> TableProfile {
    TableProfile::profiled("BROKEN", 10, Default::default()).with_column(
        "MYSTERY",
        ColumnStatistics {
            share: Some(1.0),
            uniq: Some(3),
            ..ColumnStatistics::default()
        },
    )
}

/// A typical batch: two analyzable tables and two failed ones.
pub fn create_profile_batch() -> Vec<TableProfile> {
    vec![
        create_orders_profile(),
        create_failed_table_profile(),
        create_text_column_profile(),
        create_empty_table_profile(),
    ]
}

/// A warehouse source serving the batch above.
pub fn create_in_memory_warehouse() -> InMemorySource {
    InMemorySource::with_profiles(SourceType::Warehouse, create_profile_batch())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_consistent() {
        let batch = create_profile_batch();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.iter().filter(|p| p.has_error()).count(), 2);
        assert_eq!(create_orders_profile().columns().unwrap().len(), 7);
        assert_eq!(
            fixed_reference_time().to_rfc3339(),
            "2024-06-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_text_rules_validate() {
        assert!(text_rules().validate().is_ok());
        assert_eq!(text_rules().len(), 4);
    }
}
