//! Configuration Loader
//!
//! Environment-aware loading: a shared `base.toml`, an overlay per
//! environment under `environments/`, then process environment overrides.

use super::error::{ConfigResult, ConfigurationError};
use super::EnqueueConfig;
use crate::constants::{BUILTIN_ENVIRONMENTS, CONFIG_DIR_ENV, CONFIG_ENV_PREFIX};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const BASE_FILE: &str = "base.toml";
const ENVIRONMENTS_DIR: &str = "environments";

/// Loads [`EnqueueConfig`] for a named environment from a config directory
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    env_overrides: bool,
}

impl ConfigLoader {
    pub fn new(config_directory: impl Into<PathBuf>) -> Self {
        Self {
            config_directory: config_directory.into(),
            env_overrides: true,
        }
    }

    /// Use `ENQUEUE_CONFIG_DIR`, falling back to `./config`
    pub fn from_env() -> Self {
        let dir = env::var(CONFIG_DIR_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config"));
        Self::new(dir)
    }

    /// Ignore `ENQUEUE__*` and `DATABASE_URL`; files and defaults only
    pub fn without_env_overrides(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Path of the overlay file for an environment
    pub fn overlay_path(&self, environment: &str) -> PathBuf {
        self.config_directory
            .join(ENVIRONMENTS_DIR)
            .join(format!("{environment}.toml"))
    }

    /// Load and validate configuration for `environment`
    pub fn load(&self, environment: &str) -> ConfigResult<EnqueueConfig> {
        let environment = Self::normalize_environment(environment)?;
        let overlay_path = self.overlay_path(&environment);
        let builtin = BUILTIN_ENVIRONMENTS.contains(&environment.as_str());

        if !builtin && !overlay_path.is_file() {
            return Err(ConfigurationError::unknown_environment(
                environment,
                overlay_path,
            ));
        }

        debug!(
            environment = %environment,
            config_directory = %self.config_directory.display(),
            "Loading enqueue configuration"
        );

        let mut builder = config::Config::builder()
            .add_source(config::File::from(self.config_directory.join(BASE_FILE)).required(false))
            .add_source(config::File::from(overlay_path).required(!builtin));

        if self.env_overrides {
            builder = builder.add_source(
                config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

            if let Some(url) = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
                builder = builder.set_override("database.url", url)?;
            }
        }

        let mut config: EnqueueConfig = builder.build()?.try_deserialize()?;
        config.environment = environment;
        config.validate()?;

        debug!(
            environment = %config.environment,
            sink = %config.sink.kind,
            batch_capacity = config.batch.capacity,
            naming_pattern = %config.queues.naming_pattern,
            database_configured = config.database.url.is_some(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Lowercase and check the environment is usable as a file stem
    fn normalize_environment(environment: &str) -> ConfigResult<String> {
        let normalized = environment.trim().to_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(normalized)
        } else {
            Err(ConfigurationError::invalid_value(
                "environment",
                environment,
                "environment names may only contain letters, digits, '_' and '-'",
            ))
        }
    }
}
