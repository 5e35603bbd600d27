use async_trait::async_trait;
use arryn_kernel::{Step, StepCtx, StepOutcome};

/// Provisions the application credential with `readWrite` on the target
/// database only.
pub struct CreateAppUser;

#[async_trait]
impl Step for CreateAppUser {
    fn name(&self) -> &'static str {
        "create-user"
    }

    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
        let grant = ctx.settings.app_user.grant(ctx.store.database_name());
        let mut outcome = StepOutcome::none();

        if ctx.checks_existing() && ctx.store.user_exists(&grant.username).await? {
            tracing::info!(
                step = self.name(),
                user = %grant.username,
                "application user already exists, skipping"
            );
            outcome.record(false);
            return Ok(outcome);
        }

        ctx.store.create_user(&grant).await?;
        tracing::info!(
            step = self.name(),
            user = %grant.username,
            database = ctx.store.database_name(),
            "application user created"
        );
        outcome.record(true);

        Ok(outcome)
    }
}
