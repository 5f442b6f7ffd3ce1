//! # Constraint Advisor - Data Quality Constraint Suggestions for Rust
//!
//! Constraint Advisor turns column profiling statistics into suggested data
//! quality constraints. Feed it the profile of each table (row count plus one
//! statistics record per column) and a rule configuration keyed by semantic
//! column type, and it tells you which columns look non-nullable, bounded,
//! enumerated, case-inconsistent, future-dated or key-like.
//!
//! ## Overview
//!
//! The crate is split into the two halves of a profiling run:
//!
//! - **Profiling**: [`sources::StatisticsSource`] implementations compute
//!   statistics for configured tables; [`sources::ProfilingRunner`] fans a batch
//!   of [`sources::TableRef`]s out to them and collects [`profile::TableProfile`]s.
//! - **Suggesting**: [`suggestions::Analyzer`] evaluates the configured rules
//!   for every column and produces a [`report::SuggestionReport`], optionally
//!   with automation templates that load each suggestion into a rule
//!   metadata table.
//!
//! The two halves only share the profile data model, so profiles captured
//! elsewhere (a JSON file, another tool) can be analyzed directly.
//!
//! ## Quick Start
//!
//! ```rust
//! use constraint_advisor::prelude::*;
//!
//! # fn example() -> constraint_advisor::Result<()> {
//! let orders = TableProfile::profiled("ORDERS", 1_000, Default::default())
//!     .with_column(
//!         "ORDER_ID",
//!         ColumnStatistics {
//!             count: Some(1_000),
//!             share: Some(1.0),
//!             uniq: Some(1_000),
//!             ..ColumnStatistics::of_type("NUMERIC")
//!         },
//!     )
//!     .with_column(
//!         "STATUS",
//!         ColumnStatistics {
//!             share: Some(1.0),
//!             uniq: Some(4),
//!             uniq_upper: Some(4),
//!             top_share: Some(0.4),
//!             ..ColumnStatistics::of_type("TEXT")
//!         },
//!     );
//!
//! let analyzer = Analyzer::builder()
//!     .rules(RuleConfig::recommended())
//!     .build()?;
//! let report = analyzer.suggest_constraints(&[orders])?;
//!
//! println!("{}", HumanFormatter::new().format(&report)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Rules
//!
//! | Rule | Column types | Fires when |
//! |------|--------------|------------|
//! | `NULLABILITY` | all | the non-null share exceeds a threshold, or is zero |
//! | `MINMAX` | numeric, timestamp | the bounds differ and more than two values exist |
//! | `DETERMINED_LIST` | numeric, text | fewer distinct values than a list size |
//! | `INCONSISTENT_NAMES` | text | upper-casing merges distinct values |
//! | `FUTURE_DATES` | timestamp | a bound lies after the reference time |
//! | `FOREIGN_KEYS` | numeric, text | the top value's share agrees with its frequency |
//!
//! Rules, their parameters and their order per column type come from a
//! [`suggestions::RuleConfig`], usually loaded from JSON.
//!
//! ## Logging
//!
//! The library emits `tracing` events and spans and never installs a
//! subscriber itself. Binaries can call [`logging::setup::init_logging`]:
//!
//! ```rust,no_run
//! use constraint_advisor::logging::setup::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::production()).unwrap();
//! ```

pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod profile;
pub mod report;
pub mod security;
pub mod sources;
pub mod suggestions;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

pub use error::{AdvisorError, Result};
