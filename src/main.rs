use anyhow::Context;
use arryn_kernel::settings::Settings;

/// Container start-up hook: provisions the configured database once.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Arryn settings")?;
    arryn_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        database = %settings.database.name,
        "arryn-bootstrap starting"
    );

    let summary = arryn_bootstrap::run(&settings).await?;
    println!("{}", summary.status);

    Ok(())
}
