//! Uniform statistics records produced by statistics sources.
//!
//! A [`TableProfile`] holds one table's row count and a [`ColumnStatistics`]
//! record per column. Both are plain serde structures so profiles can be read
//! from JSON, passed through the analyzer and echoed back in reports unchanged.

mod column;
mod table;

pub use column::{ColumnStatistics, ColumnType, StatValue};
pub use table::{TableProfile, TableProfilingInfo, EMPTY_TABLE};
