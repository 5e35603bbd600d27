use async_trait::async_trait;
use arryn_kernel::{Step, StepCtx, StepOutcome};

use crate::catalog::COLLECTIONS;

pub struct CreateCollections;

#[async_trait]
impl Step for CreateCollections {
    fn name(&self) -> &'static str {
        "create-collections"
    }

    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
        let existing = if ctx.checks_existing() {
            ctx.store.collection_names().await?
        } else {
            Vec::new()
        };

        let mut outcome = StepOutcome::none();

        for name in COLLECTIONS {
            if existing.iter().any(|present| present == name) {
                tracing::debug!(step = self.name(), collection = name, "collection exists");
                outcome.record(false);
                continue;
            }

            ctx.store.create_collection(name).await?;
            tracing::info!(step = self.name(), collection = name, "collection created");
            outcome.record(true);
        }

        Ok(outcome)
    }
}
