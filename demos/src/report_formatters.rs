//! Example demonstrating the report formatters.
//!
//! This example formats one suggestion report in different ways:
//! - JSON for programmatic consumption
//! - Human-readable text for console review
//! - Markdown for review documents
//! - Custom formatting configurations

use std::error::Error;

use constraint_advisor::prelude::*;
use constraint_advisor::test_fixtures::{create_profile_batch, fixed_reference_time};

fn main() -> std::result::Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let analyzer = Analyzer::builder()
        .include_templates(true)
        .reference_time(fixed_reference_time())
        .build()?;
    let report = analyzer.suggest_constraints(&create_profile_batch())?;

    println!("=== Compact JSON (descriptions only) ===");
    let json = JsonFormatter::with_config(FormatterConfig::minimal()).with_pretty(false);
    println!("{}", json.format(&report)?);

    println!("\n=== Human readable ===");
    println!("{}", HumanFormatter::new().format(&report)?);

    println!("=== CI log ===");
    let ci = HumanFormatter::with_config(FormatterConfig::ci().with_max_suggestions(2));
    println!("{}", ci.format(&report)?);

    println!("=== Markdown ===");
    let markdown = MarkdownFormatter::with_config(FormatterConfig::default().with_templates(false))
        .with_heading_level(1);
    println!("{}", markdown.format(&report)?);

    Ok(())
}
