use anyhow::Context;
use arryn_bootstrap::{BootstrapPlan, StatusReport};
use arryn_db::Store;
use arryn_kernel::settings::{BootstrapMode, Settings};
use clap::{Parser, Subcommand};

/// Provision and inspect the Arryn products database.
#[derive(Debug, Parser)]
#[command(name = "arryn", version, about)]
struct Cli {
    /// MongoDB connection string, overriding configuration
    #[arg(long, global = true, env = "ARRYN_MONGODB_URI")]
    uri: Option<String>,

    /// Target database name, overriding configuration
    #[arg(long, global = true)]
    database: Option<String>,

    /// Fail on existing artifacts instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// Skip inserting the sample documents
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full bootstrap (default)
    Init,
    /// Print collection, document and index counts
    Status,
    /// Print what the bootstrap would create without connecting
    Plan,
    /// Connect and ping the database
    Check,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(uri) = &self.uri {
            settings.database.uri = uri.clone();
        }
        if let Some(database) = &self.database {
            settings.database.name = database.clone();
        }
        if self.strict {
            settings.bootstrap.mode = BootstrapMode::Strict;
        }
        if self.no_seed {
            settings.bootstrap.seed = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Arryn settings")?;
    cli.apply(&mut settings);
    arryn_telemetry::init(&settings.telemetry)?;

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "arryn CLI starting");

    match cli.command.unwrap_or(Command::Init) {
        Command::Init => {
            let summary = arryn_bootstrap::run(&settings).await?;
            println!("{}", summary.status);
        }
        Command::Status => {
            let store = arryn_bootstrap::connect(&settings).await?;
            let report = StatusReport::collect(&store).await?;
            println!("{report}");
        }
        Command::Plan => {
            settings
                .validate()
                .with_context(|| "invalid bootstrap settings")?;
            println!("{}", BootstrapPlan::from_settings(&settings));
        }
        Command::Check => {
            let store = arryn_bootstrap::connect(&settings).await?;
            store.ping().await?;
            println!("MongoDB reachable: database '{}'", store.database_name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "arryn",
            "--uri",
            "mongodb://db:27017",
            "--database",
            "other_db",
            "--strict",
            "--no-seed",
            "plan",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.database.uri, "mongodb://db:27017");
        assert_eq!(settings.database.name, "other_db");
        assert_eq!(settings.bootstrap.mode, BootstrapMode::Strict);
        assert!(!settings.bootstrap.seed);
        assert!(matches!(cli.command, Some(Command::Plan)));
    }

    #[test]
    fn no_subcommand_defaults_to_init() {
        let cli = Cli::parse_from(["arryn"]);
        assert!(cli.command.is_none());
    }
}
