//! Offline description of what a run would provision.

use std::fmt;

use arryn_db::{IndexDefinition, IndexDirection, UserGrant};
use arryn_kernel::{BootstrapMode, Settings};
use mongodb::bson::DateTime;

use crate::catalog::{archivo_indexes, seed_documents, COLLECTIONS, PRIMARY_COLLECTION};

#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    pub database: String,
    pub mode: BootstrapMode,
    pub user: UserGrant,
    pub collections: Vec<&'static str>,
    pub indexes: Vec<IndexDefinition>,
    /// Titles of the sample documents, empty when seeding is disabled
    pub seeds: Vec<String>,
}

impl BootstrapPlan {
    pub fn from_settings(settings: &Settings) -> Self {
        let database = settings.database.name.clone();
        let seeds = if settings.bootstrap.seed {
            seed_documents(DateTime::now())
                .into_iter()
                .map(|archivo| archivo.titulo)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            user: settings.app_user.grant(&database),
            database,
            mode: settings.bootstrap.mode,
            collections: COLLECTIONS.to_vec(),
            indexes: archivo_indexes(),
            seeds,
        }
    }
}

fn describe_keys(index: &IndexDefinition) -> String {
    index
        .keys
        .iter()
        .map(|(field, direction)| match direction {
            IndexDirection::Ascending => format!("{field} asc"),
            IndexDirection::Descending => format!("{field} desc"),
            IndexDirection::Text => format!("{field} text"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for BootstrapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bootstrap plan for {} ({:?} mode):", self.database, self.mode)?;

        let roles = self
            .user
            .roles
            .iter()
            .map(|grant| format!("{}@{}", grant.role, grant.db))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "- User: {} [{}]", self.user.username, roles)?;
        writeln!(f, "- Collections: {}", self.collections.join(", "))?;

        writeln!(f, "- Indexes on {PRIMARY_COLLECTION}:")?;
        for index in &self.indexes {
            writeln!(f, "    {} ({})", index.name, describe_keys(index))?;
        }

        if self.seeds.is_empty() {
            write!(f, "- Seed documents: none")
        } else {
            write!(f, "- Seed documents: {}", self.seeds.join(", "))
        }
    }
}
