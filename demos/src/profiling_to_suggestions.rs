//! Example of a complete profiling run feeding the constraint advisor.
//!
//! This example shows the full flow:
//! - Loading the table list and rule configuration from JSON files
//! - Registering statistics sources with a profiling runner
//! - Profiling every table concurrently
//! - Turning the profiles into constraint suggestions
//!
//! The warehouse source replays profiles captured earlier; a real connector
//! implementing `StatisticsSource` is a drop-in replacement.
//!
//! Run with: `cargo run -p advisor-demos --example profiling_to_suggestions`

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use constraint_advisor::logging::setup::{init_logging, LoggingConfig};
use constraint_advisor::prelude::*;

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

fn regions_source() -> Result<InMemorySource> {
    InMemorySource::new(SourceType::Csv).with_profile(
        TableProfile::profiled("REGIONS", 12, Default::default())
            .with_column(
                "REGION_CODE",
                ColumnStatistics {
                    count: Some(12),
                    share: Some(1.0),
                    uniq: Some(12),
                    uniq_upper: Some(12),
                    top_value: Some(StatValue::from("EU-N")),
                    top_freq: Some(1),
                    top_share: Some(0.083),
                    ..ColumnStatistics::of_type("TEXT")
                },
            )
            .with_column(
                "COUNTRY_COUNT",
                ColumnStatistics {
                    count: Some(12),
                    share: Some(1.0),
                    uniq: Some(9),
                    min: Some(StatValue::from(1i64)),
                    max: Some(StatValue::from(27i64)),
                    ..ColumnStatistics::of_type("NUMERIC")
                },
            ),
    )
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    init_logging(LoggingConfig::default())?;

    let tables = TableRef::list_from_json(&std::fs::read_to_string(data_path("tables.json"))?)?;
    let rules = RuleConfig::from_path(data_path("rules.json"))?;
    let captured: Vec<TableProfile> =
        serde_json::from_str(&std::fs::read_to_string(data_path("profiles.json"))?)?;

    println!("📋 Profiling {} configured tables...", tables.len());

    let runner = ProfilingRunner::new()
        .with_source(Arc::new(
            InMemorySource::with_profiles(SourceType::Warehouse, captured)
                .with_log_config(LogConfig::verbose()),
        ))
        .with_source(Arc::new(regions_source()?))
        .with_log_config(LogConfig::verbose());

    let profiles = runner.profile(&tables).await?;
    for profile in &profiles {
        let name = profile.table_name.as_deref().unwrap_or("<unnamed>");
        match &profile.error {
            Some(error) => println!("   ⚠️  {name}: {error}"),
            None => println!(
                "   ✅ {name}: {} rows, {} columns",
                profile.table_count().unwrap_or_default(),
                profile.columns().map(|c| c.len()).unwrap_or_default()
            ),
        }
    }

    let analyzer = Analyzer::builder()
        .rules(rules)
        .log_config(LogConfig::balanced())
        .build()?;
    let report = analyzer.suggest_constraints(&profiles)?;

    println!("\n💡 Suggested constraints");
    let formatter = HumanFormatter::with_config(FormatterConfig::default().with_templates(false));
    println!("{}", formatter.format(&report)?);

    println!("📊 Suggestions per rule:");
    for (rule, count) in report.count_by_rule() {
        println!("   {rule:<20} {count}");
    }

    let output = std::env::temp_dir().join("constraint_suggestions.json");
    std::fs::write(&output, JsonFormatter::new().format(&report)?)?;
    println!("\n📝 Full report written to {}", output.display());

    Ok(())
}
