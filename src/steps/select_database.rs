use async_trait::async_trait;
use arryn_kernel::{Step, StepCtx, StepOutcome};

/// Scopes the run to the configured database and confirms the server answers.
pub struct SelectDatabase;

#[async_trait]
impl Step for SelectDatabase {
    fn name(&self) -> &'static str {
        "select-database"
    }

    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
        ctx.store.ping().await?;

        tracing::info!(
            step = self.name(),
            database = ctx.store.database_name(),
            environment = ?ctx.settings.environment,
            "target database selected"
        );

        Ok(StepOutcome::none())
    }
}
