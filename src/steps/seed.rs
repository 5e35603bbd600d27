use anyhow::Context;
use async_trait::async_trait;
use arryn_kernel::{Step, StepCtx, StepOutcome};
use mongodb::bson::{doc, DateTime};

use crate::catalog::{seed_documents, PRIMARY_COLLECTION};

/// Inserts the sample catalog items as one batch, stamped with the run time.
/// A failed batch is not rolled back; whatever the server wrote stays.
pub struct SeedDocuments;

#[async_trait]
impl Step for SeedDocuments {
    fn name(&self) -> &'static str {
        "seed-documents"
    }

    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
        let mut outcome = StepOutcome::none();

        if !ctx.settings.bootstrap.seed {
            tracing::info!(step = self.name(), "seeding disabled");
            return Ok(outcome);
        }

        let mut batch = Vec::new();
        for archivo in seed_documents(DateTime::now()) {
            if ctx.checks_existing() {
                let filter = doc! {
                    "titulo": archivo.titulo.as_str(),
                    "fuente": archivo.fuente.as_str(),
                };
                if ctx.store.count_documents(PRIMARY_COLLECTION, filter).await? > 0 {
                    tracing::debug!(step = self.name(), titulo = %archivo.titulo, "seed exists");
                    outcome.skipped += 1;
                    continue;
                }
            }

            let document = archivo
                .to_document()
                .with_context(|| format!("failed to encode seed '{}'", archivo.titulo))?;
            batch.push(document);
        }

        if batch.is_empty() {
            tracing::info!(step = self.name(), "sample documents already present");
            return Ok(outcome);
        }

        let inserted = ctx.store.insert_many(PRIMARY_COLLECTION, batch).await?;
        outcome.created += inserted;

        tracing::info!(
            step = self.name(),
            collection = PRIMARY_COLLECTION,
            inserted,
            skipped = outcome.skipped,
            "sample documents inserted"
        );

        Ok(outcome)
    }
}
