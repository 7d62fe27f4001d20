//! Run configuration for a probe.
//!
//! One `RunConfig` is assembled per invocation from defaults, an optional config file,
//! the environment and command-line flags (see `loader`). It is then passed by reference
//! into the planner; nothing reads process-wide flag state.
use std::time::Duration;

use serde::Deserialize;

use crate::core::executor::{DEFAULT_REPEAT_INTERVAL, DEFAULT_TIMEOUT, ExecutorSettings};

/// Default namespace used when listing ingresses from an API server
pub const DEFAULT_NAMESPACE: &str = "default";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_repeat_interval() -> Duration {
    DEFAULT_REPEAT_INTERVAL
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

/// Durations are written the humantime way: `10s`, `500ms`, `1m 30s`.
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(D::Error::custom)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Ingress JSON file, or an API server base URL
    #[serde(default)]
    pub resources: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Ingress to use without asking
    #[serde(default)]
    pub ingress: Option<String>,
    /// Method to use without asking
    #[serde(default)]
    pub method: Option<String>,
    /// Sub-path to append to the rule's path prefix without asking
    #[serde(default)]
    pub path: Option<String>,
    /// Body token: a `.json`/`.xml`/`.txt` file name or literal text
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub skip_tls_verify: bool,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default = "default_timeout", with = "humantime_duration")]
    pub timeout: Duration,
    #[serde(default = "default_repeat_interval", with = "humantime_duration")]
    pub repeat_interval: Duration,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `console` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl RunConfig {
    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            timeout: self.timeout,
            repeat_interval: self.repeat_interval,
        }
    }

    /// Whether `resources` points at an API server rather than a file
    pub fn resources_is_remote(&self) -> bool {
        self.resources
            .as_deref()
            .is_some_and(|r| r.starts_with("http://") || r.starts_with("https://"))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            resources: None,
            namespace: default_namespace(),
            ingress: None,
            method: None,
            path: None,
            body: None,
            https: false,
            skip_tls_verify: false,
            repeat: false,
            timeout: default_timeout(),
            repeat_interval: default_repeat_interval(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.namespace, "default");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.repeat_interval, Duration::from_secs(1));
        assert!(!config.repeat);
        assert_eq!(config.executor_settings(), ExecutorSettings::default());
    }

    #[test]
    fn test_deserialize_humantime_durations() {
        let config: RunConfig = serde_json::from_str(
            r#"{"resources": "ing.json", "timeout": "2s", "repeat_interval": "250ms"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.repeat_interval, Duration::from_millis(250));
        assert_eq!(config.log_format, "console");
    }

    #[test]
    fn test_resources_is_remote() {
        let mut config = RunConfig::default();
        assert!(!config.resources_is_remote());
        config.resources = Some("ingresses.json".to_string());
        assert!(!config.resources_is_remote());
        config.resources = Some("http://127.0.0.1:8001".to_string());
        assert!(config.resources_is_remote());
    }
}
