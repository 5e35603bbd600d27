use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use arryn_db::{ConnectOptions, UserGrant};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "ARRYN_ENV";
const CONFIG_DIR_ENV: &str = "ARRYN_CONFIG_DIR";
const ENV_PREFIX: &str = "ARRYN";

/// Deployment environment the bootstrap is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub app_user: AppUserSettings,
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Default to the `config` directory next to the working directory.
                std::env::current_dir()
                    .map(|cwd| cwd.join("config"))
                    .unwrap_or_else(|_| PathBuf::from("config"))
            });

        Self::load_from(&config_dir, &environment)
    }

    /// Load `base.toml` and `{environment}.toml` from `config_dir`, then
    /// `ARRYN_`-prefixed variables (`ARRYN_DATABASE__URI`, ...).
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{environment}.toml"));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = match environment {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        Ok(settings)
    }

    /// Reject settings that cannot produce a working run before any
    /// connection is attempted.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.database.validate()?;
        self.app_user.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_uri")]
    pub uri: String,
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
    #[serde(default = "DatabaseSettings::default_app_name")]
    pub app_name: String,
    #[serde(default = "DatabaseSettings::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "DatabaseSettings::default_connect_retries")]
    pub connect_retries: usize,
}

impl DatabaseSettings {
    fn default_uri() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_name() -> String {
        "arryn_products_db".to_string()
    }

    fn default_app_name() -> String {
        "arryn-bootstrap".to_string()
    }

    fn default_connect_timeout_ms() -> u64 {
        5000
    }

    fn default_connect_retries() -> usize {
        5
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            uri: self.uri.clone(),
            database: self.name.clone(),
            app_name: Some(self.app_name.clone()),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            max_retries: self.connect_retries,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.uri.starts_with("mongodb://") || self.uri.starts_with("mongodb+srv://")) {
            bail!("database.uri must use the mongodb:// or mongodb+srv:// scheme");
        }

        if self.name.is_empty() {
            bail!("database.name must not be empty");
        }

        if let Some(bad) = self
            .name
            .chars()
            .find(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0'))
        {
            bail!(
                "database.name '{}' contains invalid character {:?}",
                self.name,
                bad
            );
        }

        if self.connect_timeout_ms == 0 {
            bail!("database.connect_timeout_ms must be greater than zero");
        }

        Ok(())
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            uri: Self::default_uri(),
            name: Self::default_name(),
            app_name: Self::default_app_name(),
            connect_timeout_ms: Self::default_connect_timeout_ms(),
            connect_retries: Self::default_connect_retries(),
        }
    }
}

/// Credential provisioned for the application.
#[derive(Clone, Deserialize)]
pub struct AppUserSettings {
    #[serde(default = "AppUserSettings::default_username")]
    pub username: String,
    #[serde(default = "AppUserSettings::default_password")]
    pub password: String,
}

impl AppUserSettings {
    fn default_username() -> String {
        "arryn_app".to_string()
    }

    fn default_password() -> String {
        "arryn_app_password".to_string()
    }

    /// The credential with `readWrite` on `database` and nothing else.
    pub fn grant(&self, database: &str) -> UserGrant {
        UserGrant::read_write(&self.username, &self.password, database)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.username.is_empty() {
            bail!("app_user.username must not be empty");
        }
        if self.password.is_empty() {
            bail!("app_user.password must not be empty");
        }
        Ok(())
    }
}

impl Default for AppUserSettings {
    fn default() -> Self {
        Self {
            username: Self::default_username(),
            password: Self::default_password(),
        }
    }
}

impl fmt::Debug for AppUserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUserSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How a run treats artifacts that already exist.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapMode {
    /// Check before creating and skip what is already there.
    #[default]
    Idempotent,
    /// Create unconditionally; duplicates halt the run.
    Strict,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapSettings {
    #[serde(default)]
    pub mode: BootstrapMode,
    /// Insert the sample catalog documents.
    #[serde(default = "BootstrapSettings::default_seed")]
    pub seed: bool,
}

impl BootstrapSettings {
    fn default_seed() -> bool {
        true
    }
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            mode: BootstrapMode::default(),
            seed: Self::default_seed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "arryn-settings-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn defaults_target_arryn_products_db() {
        let settings = Settings::default();
        assert_eq!(settings.database.uri, "mongodb://localhost:27017");
        assert_eq!(settings.database.name, "arryn_products_db");
        assert_eq!(settings.app_user.username, "arryn_app");
        assert_eq!(settings.app_user.password, "arryn_app_password");
        assert_eq!(settings.bootstrap.mode, BootstrapMode::Idempotent);
        assert!(settings.bootstrap.seed);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn environment_overlay_overrides_base() {
        let dir = scratch_dir("overlay");
        std::fs::write(
            dir.join("base.toml"),
            "[database]\nname = \"base_db\"\nconnect_retries = 2\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("staging.toml"),
            "[database]\nname = \"staging_db\"\n\n[bootstrap]\nmode = \"strict\"\nseed = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(&dir, "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.database.name, "staging_db");
        assert_eq!(settings.database.connect_retries, 2);
        assert_eq!(settings.bootstrap.mode, BootstrapMode::Strict);
        assert!(!settings.bootstrap.seed);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let dir = scratch_dir("unknown-env");
        let err = Settings::load_from(&dir, "qa").unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn non_mongodb_uri_fails_validation() {
        let mut settings = Settings::default();
        settings.database.uri = "postgres://localhost".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn database_name_with_dot_fails_validation() {
        let mut settings = Settings::default();
        settings.database.name = "arryn.products".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("invalid character"));
    }

    #[test]
    fn empty_password_fails_validation() {
        let mut settings = Settings::default();
        settings.app_user.password.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", Settings::default());
        assert!(!rendered.contains("arryn_app_password"));
    }

    #[test]
    fn connect_options_follow_database_settings() {
        let settings = DatabaseSettings::default();
        let options = settings.connect_options();
        assert_eq!(options.database, "arryn_products_db");
        assert_eq!(options.connect_timeout, Duration::from_millis(5000));
        assert_eq!(options.max_retries, 5);
    }

    #[test]
    fn grant_targets_configured_database() {
        let grant = AppUserSettings::default().grant("arryn_products_db");
        assert_eq!(grant.roles.len(), 1);
        assert_eq!(grant.roles[0].role, "readWrite");
        assert_eq!(grant.roles[0].db, "arryn_products_db");
    }
}
