use std::path::Path;

use config::{Config, Environment, File, FileFormat, Value};
use eyre::{Context, Result};

use crate::config::models::RunConfig;

/// Prefix for environment overrides, e.g. `INGRESS_PROBE_SKIP_TLS_VERIFY=true`
pub const ENV_PREFIX: &str = "INGRESS_PROBE";

/// Values that win over every other source, normally taken from command-line flags.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    entries: Vec<(&'static str, Value)>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.entries.push((key, value.into()));
        self
    }

    /// Only override when a value was actually given
    pub fn set_option<V: Into<Value>>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn file_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Toml, // Default to TOML
    }
}

/// Layer defaults, an optional config file, `INGRESS_PROBE_*` variables and `overrides`
pub fn load_run_config(
    config_path: Option<&str>,
    overrides: ConfigOverrides,
) -> Result<RunConfig> {
    load_run_config_with_env(config_path, overrides, Environment::with_prefix(ENV_PREFIX))
}

/// Same as `load_run_config` with an explicit environment source
pub fn load_run_config_with_env(
    config_path: Option<&str>,
    overrides: ConfigOverrides,
    environment: Environment,
) -> Result<RunConfig> {
    let mut builder = Config::builder();

    if let Some(config_path) = config_path {
        let path = Path::new(config_path);
        builder = builder.add_source(File::new(config_path, file_format(path)).required(true));
        tracing::debug!("Reading run configuration from {}", path.display());
    }

    builder = builder.add_source(environment.try_parsing(true));

    for (key, value) in overrides.entries {
        builder = builder
            .set_override(key, value)
            .with_context(|| format!("Invalid override for '{key}'"))?;
    }

    let settings = builder
        .build()
        .with_context(|| match config_path {
            Some(path) => format!("Failed to build run configuration from {path}"),
            None => "Failed to build run configuration".to_string(),
        })?;

    let run_config: RunConfig = settings
        .try_deserialize()
        .context("Failed to deserialize run configuration")?;

    Ok(run_config)
}
