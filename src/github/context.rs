use crate::analyze::DataAnalysis;
use crate::github::cache::StreamCache;
use crate::github::source::{Stream, StreamSource};
use crate::model::{RowExt, Result, Table};
use crate::utils::message_spinner;
use log::{debug, error, info, warn};

/// Tables materialized from one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedTables {
    pub members: Table,
    pub issues: Table,
}

impl FetchedTables {
    pub fn into_analysis(self) -> DataAnalysis {
        DataAnalysis::new(self.members, self.issues)
    }
}

/// Connector plus the cache its streams are materialized into.
pub struct SourceContext<S: StreamSource> {
    source: S,
    cache: StreamCache,
}

impl<S: StreamSource> SourceContext<S> {
    pub fn new(source: S, cache: StreamCache) -> Self {
        Self { source, cache }
    }

    /// Reads both streams. A failure is logged and leaves the remaining tables empty.
    pub async fn fetch(&self) -> FetchedTables {
        info!("🔄 Connecting to GitHub and loading data...");
        let mut tables = FetchedTables::default();
        if let Err(err) = self.fetch_into(&mut tables).await {
            error!("❌ Error while fetching: {err}");
        }
        tables
    }

    async fn fetch_into(&self, tables: &mut FetchedTables) -> Result<()> {
        self.source.check().await?;

        info!("👥 Fetching team members...");
        tables.members = self.load_stream(Stream::TeamMembers).await?;
        if let Some(row) = tables.members.rows().first() {
            debug!("Sample team member: {} / {}", row.cell("login"), row.cell("user"));
        }

        info!("🎫 Fetching issues...");
        tables.issues = self.load_stream(Stream::Issues).await?;
        if let Some(row) = tables.issues.rows().first() {
            debug!("Sample assignee: {}", row.cell("assignee"));
            debug!("Sample assignees: {}", row.cell("assignees"));
        }
        Ok(())
    }

    async fn load_stream(&self, stream: Stream) -> Result<Table> {
        let pb = message_spinner(format!("Reading `{}` ...", stream.name()));
        let records = self.source.read(stream).await;
        pb.finish_and_clear();

        self.cache.write_stream(stream.name(), &records?)?;
        if !self.cache.contains(stream.name()) {
            warn!("⚠️ No `{}` records found.", stream.name());
            return Ok(Table::new());
        }
        let table = self.cache.to_table(stream.name())?;
        info!("✅ {} `{}` records loaded.", table.len(), stream.name());
        debug!(
            "Columns of `{}`: {:?}",
            stream.name(),
            table.columns().collect::<Vec<_>>()
        );
        Ok(table)
    }
}
