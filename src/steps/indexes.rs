use async_trait::async_trait;
use arryn_kernel::{Step, StepCtx, StepOutcome};

use crate::catalog::{archivo_indexes, PRIMARY_COLLECTION};

/// Builds the lookup, compound and text indexes on the primary collection.
/// Index builds are not awaited beyond what `createIndexes` itself blocks on.
pub struct CreateIndexes;

#[async_trait]
impl Step for CreateIndexes {
    fn name(&self) -> &'static str {
        "create-indexes"
    }

    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
        let existing = if ctx.checks_existing() {
            ctx.store.index_names(PRIMARY_COLLECTION).await?
        } else {
            Vec::new()
        };

        let mut outcome = StepOutcome::none();

        for index in archivo_indexes() {
            if existing.contains(&index.name) {
                tracing::debug!(step = self.name(), index = %index.name, "index exists");
                outcome.record(false);
                continue;
            }

            let name = ctx.store.create_index(PRIMARY_COLLECTION, &index).await?;
            tracing::info!(
                step = self.name(),
                collection = PRIMARY_COLLECTION,
                index = %name,
                "index created"
            );
            outcome.record(true);
        }

        Ok(outcome)
    }
}
