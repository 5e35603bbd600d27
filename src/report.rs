//! Read-only summary printed at the end of a run.

use std::fmt;

use arryn_db::Store;
use mongodb::bson::Document;

use crate::catalog::PRIMARY_COLLECTION;

/// Database statistics gathered after provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub database: String,
    /// Sorted collection names
    pub collections: Vec<String>,
    /// Documents in the primary collection
    pub document_count: u64,
    /// Indexes on the primary collection, `_id_` included
    pub index_count: usize,
}

impl StatusReport {
    pub async fn collect(store: &dyn Store) -> anyhow::Result<Self> {
        let mut collections = store.collection_names().await?;
        collections.sort();

        let document_count = store
            .count_documents(PRIMARY_COLLECTION, Document::new())
            .await?;
        let index_count = store.index_names(PRIMARY_COLLECTION).await?.len();

        let report = Self {
            database: store.database_name().to_string(),
            collections,
            document_count,
            index_count,
        };

        tracing::info!(
            database = %report.database,
            collections = report.collections.len(),
            documents = report.document_count,
            indexes = report.index_count,
            "database status collected"
        );

        Ok(report)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database statistics for {}:", self.database)?;
        writeln!(f, "- Collections: {}", self.collections.join(", "))?;
        writeln!(
            f,
            "- Documents in {PRIMARY_COLLECTION}: {}",
            self.document_count
        )?;
        write!(f, "- Indexes on {PRIMARY_COLLECTION}: {}", self.index_count)
    }
}
