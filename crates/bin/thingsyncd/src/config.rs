//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `thingsync.toml` in the working directory, or at the path named
//! by `THINGSYNC_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;
use thingsync_adapter_mqtt::MqttConfig;
use thingsync_domain::broker::BrokerUri;

const DEFAULT_CONFIG_PATH: &str = "thingsync.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    /// Thing model template settings.
    pub templates: TemplatesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Where thing model templates are read from.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding `<model>.tm.json` files.
    pub dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("THINGSYNC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("THINGSYNC_MQTT_SERVER") {
            self.mqtt.server = val;
        }
        if let Some(val) = lookup("THINGSYNC_MQTT_USER") {
            self.mqtt.user = Some(val);
        }
        if let Some(val) = lookup("THINGSYNC_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = lookup("THINGSYNC_BASE_TOPIC") {
            self.mqtt.base_topic = val;
        }
        if let Some(val) = lookup("THINGSYNC_TEMPLATES_DIR") {
            self.templates.dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("THINGSYNC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = self.mqtt.server.parse::<BrokerUri>() {
            return Err(ConfigError::Validation(format!(
                "invalid mqtt server {:?}: {err}",
                self.mqtt.server
            )));
        }
        if self.mqtt.base_topic.trim().is_empty() {
            return Err(ConfigError::Validation(
                "base topic must not be empty".to_string(),
            ));
        }
        if self.mqtt.client_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "client id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("thing_models"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thingsyncd=info,thingsync=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
