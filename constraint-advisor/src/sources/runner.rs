//! Fan-out of configured tables to their statistics sources.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, instrument};

use super::{SourceType, StatisticsSource, TableRef};
use crate::error::{AdvisorError, Result};
use crate::log_source_op;
use crate::logging::{truncate_field, LogConfig};
use crate::profile::TableProfile;

/// Profiles a batch of tables concurrently.
///
/// Sources are registered explicitly per [`SourceType`]; the runner owns no
/// connections of its own. All table entries are validated before any source
/// is called, and the batch fails as a whole if any table fails with an error
/// the source did not turn into an `ERROR` record.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use constraint_advisor::profile::{ColumnStatistics, TableProfile};
/// use constraint_advisor::sources::{InMemorySource, ProfilingRunner, SourceType, TableRef};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let warehouse = InMemorySource::new(SourceType::Warehouse)
///     .with_profile(
///         TableProfile::profiled("ORDERS", 10, Default::default())
///             .with_column("ID", ColumnStatistics::of_type("NUMERIC")),
///     )
///     .unwrap();
///
/// let runner = ProfilingRunner::new().with_source(Arc::new(warehouse));
/// let profiles = runner
///     .profile(&[TableRef::warehouse("DWH", "ORDERS")])
///     .await
///     .unwrap();
/// assert_eq!(profiles.len(), 1);
/// # })
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfilingRunner {
    sources: HashMap<SourceType, Arc<dyn StatisticsSource>>,
    log_config: LogConfig,
}

impl ProfilingRunner {
    /// Creates a runner with no registered sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source for the type it reports, replacing any earlier one.
    pub fn with_source(mut self, source: Arc<dyn StatisticsSource>) -> Self {
        self.sources.insert(source.source_type(), source);
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Returns the source registered for `source_type`.
    pub fn source(&self, source_type: SourceType) -> Option<&Arc<dyn StatisticsSource>> {
        self.sources.get(&source_type)
    }

    fn resolve(&self, table: &TableRef) -> Result<&Arc<dyn StatisticsSource>> {
        table.validate()?;
        self.source(table.datasource_type).ok_or_else(|| {
            AdvisorError::configuration(format!(
                "No statistics source registered for datasource_type {}",
                table.datasource_type
            ))
        })
    }

    /// Profiles every table, returning profiles in configuration order.
    ///
    /// Tables that fail upstream come back as `ERROR`-tagged profiles.
    #[instrument(skip(self, tables), fields(tables = tables.len()))]
    pub async fn profile(&self, tables: &[TableRef]) -> Result<Vec<TableProfile>> {
        let resolved = tables
            .iter()
            .map(|table| self.resolve(table).map(|source| (table, source)))
            .collect::<Result<Vec<_>>>()?;

        let profiles = try_join_all(resolved.into_iter().map(|(table, source)| async move {
            log_source_op!(
                self.log_config,
                source = %table.datasource_type,
                table = %table.location(),
                "Profiling table"
            );
            source.describe_table(table).await
        }))
        .await?;

        for profile in profiles.iter().filter(|profile| profile.has_error()) {
            log_source_op!(
                self.log_config,
                table = profile.table_name.as_deref().unwrap_or_default(),
                error = %truncate_field(
                    profile.error.as_deref().unwrap_or_default(),
                    self.log_config.max_field_length
                ),
                "Table not profiled"
            );
        }
        let failed = profiles.iter().filter(|profile| profile.has_error()).count();
        info!(
            profiled = profiles.len() - failed,
            failed, "Profiling completed"
        );
        Ok(profiles)
    }
}
