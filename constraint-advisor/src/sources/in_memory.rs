//! Statistics source backed by already-materialized profiles.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{SourceType, StatisticsSource, TableRef};
use crate::error::{AdvisorError, Result};
use crate::log_source_op;
use crate::logging::LogConfig;
use crate::profile::{ColumnStatistics, TableProfile};

/// In-memory implementation of [`StatisticsSource`].
///
/// Profiles are keyed by table name. A stored profile carrying `ERROR` makes
/// the table count fail as an upstream error, which is how a real connector
/// reports a missing or unreadable table. Useful for:
/// - Testing and development
/// - Replaying profiles captured from an earlier run
///
/// # Example
///
/// ```rust
/// use constraint_advisor::profile::{ColumnStatistics, TableProfile};
/// use constraint_advisor::sources::{InMemorySource, SourceType, StatisticsSource, TableRef};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let source = InMemorySource::new(SourceType::Warehouse)
///     .with_profile(
///         TableProfile::profiled("ORDERS", 10, Default::default())
///             .with_column("ID", ColumnStatistics::of_type("NUMERIC")),
///     )
///     .unwrap();
///
/// let profile = source.describe_table(&TableRef::warehouse("DWH", "ORDERS")).await.unwrap();
/// assert_eq!(profile.table_count(), Some(10));
/// # })
/// ```
#[derive(Debug, Clone)]
pub struct InMemorySource {
    source_type: SourceType,
    tables: Arc<RwLock<HashMap<String, TableProfile>>>,
    log_config: LogConfig,
}

impl InMemorySource {
    /// Creates an empty source serving `source_type` tables.
    pub fn new(source_type: SourceType) -> Self {
        Self {
            source_type,
            tables: Arc::new(RwLock::new(HashMap::new())),
            log_config: LogConfig::default(),
        }
    }

    /// Creates a source pre-populated with profiles.
    pub fn with_profiles(
        source_type: SourceType,
        profiles: impl IntoIterator<Item = TableProfile>,
    ) -> Self {
        let tables = profiles
            .into_iter()
            .map(|profile| (profile.table_name.clone().unwrap_or_default(), profile))
            .collect();
        Self {
            source_type,
            tables: Arc::new(RwLock::new(tables)),
            log_config: LogConfig::default(),
        }
    }

    /// Adds a profile. Clones taken earlier keep their own contents.
    ///
    /// Fails when a clone is writing to the shared store at the same moment,
    /// since its contents cannot be copied without blocking.
    pub fn with_profile(mut self, profile: TableProfile) -> Result<Self> {
        let name = profile.table_name.clone().unwrap_or_default();
        if let Some(tables) = Arc::get_mut(&mut self.tables) {
            tables.get_mut().insert(name, profile);
            return Ok(self);
        }
        let mut tables = self
            .tables
            .try_read()
            .map(|tables| tables.clone())
            .map_err(|_| {
                AdvisorError::Internal(format!(
                    "Cannot add profile '{name}': the shared profile store is being written"
                ))
            })?;
        tables.insert(name, profile);
        self.tables = Arc::new(RwLock::new(tables));
        Ok(self)
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Stores or replaces a profile.
    pub async fn insert(&self, profile: TableProfile) {
        let name = profile.table_name.clone().unwrap_or_default();
        self.tables.write().await.insert(name, profile);
    }

    /// Returns the number of stored tables.
    pub async fn len(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.is_empty()
    }

    async fn stored(&self, table: &TableRef) -> Result<TableProfile> {
        let tables = self.tables.read().await;
        let profile = tables.get(table.table_name()).ok_or_else(|| {
            AdvisorError::data_source(
                self.source_type.as_str(),
                format!("Table '{}' does not exist", table.location()),
            )
        })?;
        match &profile.error {
            Some(message) => Err(AdvisorError::data_source(
                self.source_type.as_str(),
                message.clone(),
            )),
            None => Ok(profile.clone()),
        }
    }
}

#[async_trait]
impl StatisticsSource for InMemorySource {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    fn log_config(&self) -> LogConfig {
        self.log_config.clone()
    }

    #[instrument(skip(self, table), fields(table = table.table_name()))]
    async fn table_count(&self, table: &TableRef) -> Result<u64> {
        let profile = self.stored(table).await?;
        let count = profile.table_count().unwrap_or(0);
        log_source_op!(self.log_config, table = table.table_name(), count, "Counted rows");
        Ok(count)
    }

    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        let profile = self.stored(table).await?;
        Ok(profile
            .columns()
            .map(|columns| columns.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn column_statistics(&self, table: &TableRef, column: &str) -> Result<ColumnStatistics> {
        let profile = self.stored(table).await?;
        profile
            .columns()
            .and_then(|columns| columns.get(column))
            .cloned()
            .ok_or_else(|| {
                AdvisorError::data_source(
                    self.source_type.as_str(),
                    format!("Column '{column}' does not exist in '{}'", table.location()),
                )
            })
    }
}
