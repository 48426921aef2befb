use crate::models::AgentConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat, Map, Value, ValueKind};
use std::fs;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "autoclick.yaml";

/// Prefix for environment overrides, e.g. `AUTOCLICK_CONFIDENCE=0.9`
pub const ENV_PREFIX: &str = "AUTOCLICK";

/// Highest-priority key/value overrides, normally built from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    entries: Vec<(String, Value)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.entries.push((key.to_string(), value.into()));
        self
    }

    /// Set only when a value was given.
    pub fn set_opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Reset an optional key to unset, whatever lower layers said.
    pub fn clear(&mut self, key: &str) -> &mut Self {
        self.entries
            .push((key.to_string(), Value::new(None, ValueKind::Nil)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves [`AgentConfig`] from layered sources.
///
/// Layers, lowest priority first:
/// - built-in defaults
/// - YAML file (`--config`, else `autoclick.yaml` when present)
/// - `AUTOCLICK_*` environment variables
/// - command-line [`Overrides`]
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Option<Utf8PathBuf>,
    environment: Option<Map<String, String>>,
}

impl ConfigManager {
    /// `config_path` is required to exist when given.
    pub fn new(config_path: Option<Utf8PathBuf>) -> Self {
        Self {
            config_path,
            environment: None,
        }
    }

    /// Read environment overrides from `vars` instead of the process environment.
    pub fn with_environment(mut self, vars: Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    /// The file this manager reads, if any
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config_path.as_deref()
    }

    /// Build and validate the configuration.
    pub fn load(&self, overrides: &Overrides) -> Result<AgentConfig> {
        let defaults =
            Config::try_from(&AgentConfig::default()).context("Failed to encode default config")?;

        let file = match &self.config_path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path);
                }
                File::new(path.as_str(), FileFormat::Yaml).required(true)
            }
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false),
        };

        let environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.environment.clone());

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(environment);
        for (key, value) in &overrides.entries {
            builder = builder
                .set_override(key.as_str(), value.clone())
                .with_context(|| format!("Invalid override for '{}'", key))?;
        }

        let config: AgentConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.validate().context("Invalid configuration")?;

        match &self.config_path {
            Some(path) => tracing::debug!("Loaded config from {}", path),
            None => tracing::debug!("Loaded config (optional file {})", DEFAULT_CONFIG_FILE),
        }
        Ok(config)
    }

    /// Write `config` as YAML so it can be edited and passed back with `--config`.
    pub fn save_config(path: &Utf8Path, config: &AgentConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent))?;
        }

        fs::write(path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", path))?;

        tracing::info!("Saved config to {}", path);
        Ok(())
    }
}
