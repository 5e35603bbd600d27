use arryn_db::Store;
use async_trait::async_trait;

use crate::settings::{BootstrapMode, Settings};

/// Context provided to steps while a bootstrap run executes
pub struct StepCtx<'a> {
    pub settings: &'a Settings,
    pub store: &'a dyn Store,
}

impl StepCtx<'_> {
    pub fn mode(&self) -> BootstrapMode {
        self.settings.bootstrap.mode
    }

    /// Whether steps should look for existing artifacts before creating them.
    pub fn checks_existing(&self) -> bool {
        self.mode() == BootstrapMode::Idempotent
    }
}

/// What a step did to the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Artifacts written during this run
    pub created: usize,
    /// Artifacts found already present and left alone
    pub skipped: usize,
}

impl StepOutcome {
    pub const fn none() -> Self {
        Self {
            created: 0,
            skipped: 0,
        }
    }

    pub fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// One provisioning action in a bootstrap run
#[async_trait]
pub trait Step: Sync + Send {
    /// Unique name for this step, used in logs and error context
    fn name(&self) -> &'static str;

    /// Apply the step against `ctx.store`
    /// Errors are not retried; the pipeline halts on the first one
    async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_records_created_and_skipped() {
        let mut outcome = StepOutcome::none();
        outcome.record(true);
        outcome.record(false);
        outcome.record(true);
        assert_eq!(
            outcome,
            StepOutcome {
                created: 2,
                skipped: 1
            }
        );
    }
}
