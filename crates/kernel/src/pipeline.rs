use anyhow::Context;
use std::sync::Arc;

use crate::step::{Step, StepCtx, StepOutcome};

/// Ordered list of bootstrap steps, executed once and strictly in sequence
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step; steps run in registration order
    pub fn register(&mut self, step: Arc<dyn Step>) {
        self.steps.push(step);
    }

    /// Names of the registered steps, in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step in order, halting on the first error.
    /// Nothing applied by earlier steps is rolled back.
    pub async fn run(&self, ctx: &StepCtx<'_>) -> anyhow::Result<Vec<(&'static str, StepOutcome)>> {
        tracing::info!(
            database = ctx.store.database_name(),
            mode = ?ctx.mode(),
            "running bootstrap steps in order: {:?}",
            self.step_names()
        );

        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            tracing::info!(step = step.name(), "running bootstrap step");

            let outcome = step
                .run(ctx)
                .await
                .with_context(|| format!("failed to run bootstrap step '{}'", step.name()))?;

            tracing::info!(
                step = step.name(),
                created = outcome.created,
                skipped = outcome.skipped,
                "bootstrap step complete"
            );

            outcomes.push((step.name(), outcome));
        }

        Ok(outcomes)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use arryn_db::memory::MemoryStore;
    use std::sync::Mutex;

    struct RecordingStep {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Step for RecordingStep {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, _ctx: &StepCtx<'_>) -> anyhow::Result<StepOutcome> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(StepOutcome {
                created: 1,
                skipped: 0,
            })
        }
    }

    fn step(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, fail: bool) -> Arc<dyn Step> {
        Arc::new(RecordingStep {
            name,
            log: Arc::clone(log),
            fail,
        })
    }

    #[test]
    fn test_pipeline_creation() {
        let pipeline = Pipeline::new();
        assert!(pipeline.step_names().is_empty());
    }

    #[tokio::test]
    async fn test_steps_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new();
        pipeline.register(step("first", &log, false));
        pipeline.register(step("second", &log, false));
        pipeline.register(step("third", &log, false));

        let settings = Settings::default();
        let store = MemoryStore::new("test");
        let ctx = StepCtx {
            settings: &settings,
            store: &store,
        };

        let outcomes = pipeline.run(&ctx).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(
            outcomes.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            pipeline.step_names()
        );
    }

    #[tokio::test]
    async fn test_failure_halts_remaining_steps() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new();
        pipeline.register(step("first", &log, false));
        pipeline.register(step("broken", &log, true));
        pipeline.register(step("never", &log, false));

        let settings = Settings::default();
        let store = MemoryStore::new("test");
        let ctx = StepCtx {
            settings: &settings,
            store: &store,
        };

        let err = pipeline.run(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to run bootstrap step 'broken'");
        assert_eq!(*log.lock().unwrap(), vec!["first", "broken"]);
    }
}
