//! Example producing automation templates for a rule management framework.
//!
//! With templates enabled every fired suggestion carries a `SELECT` that
//! yields one rule row. `<DS>`, `<DL>` and `<NUM>` are left as placeholders
//! for the framework to fill in. The script printed here merges all rows into
//! the rule table in one statement.
//!
//! Run with: `cargo run -p advisor-demos --example automation_templates`

use std::error::Error;

use constraint_advisor::logging::setup::{init_logging, LoggingConfig};
use constraint_advisor::prelude::*;
use constraint_advisor::test_fixtures::{
    create_orders_profile, create_untyped_column_profile, fixed_reference_time,
};

fn main() -> std::result::Result<(), Box<dyn Error>> {
    init_logging(LoggingConfig::default().with_advisor_level(tracing::Level::INFO))?;

    let template = TemplateConfig::default()
        .with_metadata_table("DQ_METADATA.DATASOURCES")
        .with_rule_level("EXTENDED");

    let analyzer = Analyzer::builder()
        .rules(RuleConfig::recommended())
        .include_templates(true)
        .template_config(template)
        .reference_time(fixed_reference_time())
        .build()?;

    let report = analyzer.suggest_constraints(&[create_orders_profile()])?;

    let rows: Vec<&str> = report
        .iter()
        .flat_map(|table| table.suggested_constraints.values())
        .flat_map(|column| column.possible_constraints.iter())
        .filter_map(|suggestion| suggestion.template.as_deref())
        .collect();

    println!("-- {} rule rows generated", rows.len());
    println!("MERGE INTO DQ_METADATA.DQ_RULES AS target USING (");
    println!("{}", rows.join("\nUNION ALL\n"));
    println!(") AS source ON target.DQ_RULE_ID = source.DQ_RULE_ID");
    println!("WHEN NOT MATCHED THEN INSERT ALL BY NAME;");

    // A connector defect (a column without a type) aborts the run with a
    // message describing the expected statistics shape.
    match analyzer.suggest_constraints(&[create_untyped_column_profile()]) {
        Ok(_) => println!("\n-- unexpected: untyped column was accepted"),
        Err(err) => println!("\n-- rejected malformed profile:\n/*\n{err}\n*/"),
    }

    // Unsafe names never reach a template.
    let hostile = TableProfile::named("ORDERS").with_column(
        "STATUS'); DROP TABLE DQ_RULES; --",
        ColumnStatistics {
            share: Some(1.0),
            ..ColumnStatistics::of_type("TEXT")
        },
    );
    if let Err(err) = analyzer.suggest_constraints(&[hostile]) {
        println!("-- {err}");
    }

    Ok(())
}
