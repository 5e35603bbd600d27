//! Arryn database bootstrap
//!
//! Provisions the `arryn_products_db` MongoDB database: the application
//! user, the catalog collections, the `archivos` indexes, and sample data.

pub mod catalog;
pub mod plan;
pub mod report;
pub mod steps;

use anyhow::Context;
use arryn_db::{MongoStore, Store};
use arryn_kernel::{Settings, StepCtx, StepOutcome};

pub use plan::BootstrapPlan;
pub use report::StatusReport;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct BootstrapSummary {
    pub steps: Vec<(&'static str, StepOutcome)>,
    pub status: StatusReport,
}

/// Validate settings and connect to the configured database, retrying while
/// the server is still starting.
pub async fn connect(settings: &Settings) -> anyhow::Result<MongoStore> {
    settings
        .validate()
        .with_context(|| "invalid bootstrap settings")?;

    arryn_db::connect(&settings.database.connect_options())
        .await
        .with_context(|| format!("failed to connect to MongoDB database '{}'", settings.database.name))
}

/// Run every provisioning step against `store`, then collect the status report.
pub async fn bootstrap(settings: &Settings, store: &dyn Store) -> anyhow::Result<BootstrapSummary> {
    tracing::info!(database = store.database_name(), "initializing MongoDB database for Arryn");

    let ctx = StepCtx { settings, store };
    let steps = steps::pipeline().run(&ctx).await?;

    let status = StatusReport::collect(store)
        .await
        .with_context(|| "failed to collect database status")?;

    tracing::info!(database = store.database_name(), "MongoDB initialization complete");

    Ok(BootstrapSummary { steps, status })
}

/// Connect with `settings` and run the full bootstrap.
pub async fn run(settings: &Settings) -> anyhow::Result<BootstrapSummary> {
    let store = connect(settings).await?;
    bootstrap(settings, &store).await
}
