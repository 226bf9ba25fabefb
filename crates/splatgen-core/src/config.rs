use crate::error::{Result, SplatError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered client configuration for splatgen
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the generation service
    pub base_url: ConfigValue<String>,
    /// Status poll cadence in milliseconds
    pub poll_interval_ms: ConfigValue<u64>,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// Default export format name
    pub export_format: ConfigValue<String>,
}

impl ClientConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            base_url: ConfigValue::new("http://localhost:8000".to_string(), ConfigSource::Default),
            poll_interval_ms: ConfigValue::new(2000, ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(120, ConfigSource::Default),
            export_format: ConfigValue::new("ply".to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| SplatError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| SplatError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(base_url) = file_config.base_url {
            self.base_url.update(base_url, ConfigSource::File);
        }

        if let Some(poll_interval_ms) = file_config.poll_interval_ms {
            self.poll_interval_ms.update(poll_interval_ms, ConfigSource::File);
        }

        if let Some(request_timeout_secs) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(request_timeout_secs, ConfigSource::File);
        }

        if let Some(export_format) = file_config.export_format {
            self.export_format.update(export_format, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(base_url) = env::var("SPLATGEN_BASE_URL") {
            self.base_url.update(base_url, ConfigSource::Environment);
        }

        if let Ok(interval_str) = env::var("SPLATGEN_POLL_INTERVAL_MS") {
            match interval_str.parse::<u64>() {
                Ok(interval) => self.poll_interval_ms.update(interval, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid SPLATGEN_POLL_INTERVAL_MS value '{}': expected integer milliseconds",
                    interval_str
                ),
            }
        }

        if let Ok(timeout_str) = env::var("SPLATGEN_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.request_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid SPLATGEN_TIMEOUT_SECS value '{}': expected integer seconds",
                    timeout_str
                ),
            }
        }

        if let Ok(format) = env::var("SPLATGEN_EXPORT_FORMAT") {
            self.export_format.update(format, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url.update(base_url, ConfigSource::Cli);
        }

        if let Some(poll_interval_ms) = overrides.poll_interval_ms {
            self.poll_interval_ms.update(poll_interval_ms, ConfigSource::Cli);
        }

        if let Some(request_timeout_secs) = overrides.request_timeout_secs {
            self.request_timeout_secs.update(request_timeout_secs, ConfigSource::Cli);
        }

        if let Some(export_format) = overrides.export_format {
            self.export_format.update(export_format, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "base_url".to_string(),
            (self.base_url.value.clone(), self.base_url.source),
        );
        map.insert(
            "poll_interval_ms".to_string(),
            (self.poll_interval_ms.value.to_string(), self.poll_interval_ms.source),
        );
        map.insert(
            "request_timeout_secs".to_string(),
            (self.request_timeout_secs.value.to_string(), self.request_timeout_secs.source),
        );
        map.insert(
            "export_format".to_string(),
            (self.export_format.value.clone(), self.export_format.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    export_format: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub export_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::with_defaults();
        assert_eq!(config.base_url.value, "http://localhost:8000");
        assert_eq!(config.base_url.source, ConfigSource::Default);
        assert_eq!(config.poll_interval_ms.value, 2000);
        assert_eq!(config.export_format.value, "ply");
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://splat.example.dev"
poll_interval_ms = 1500
request_timeout_secs = 300
export_format = "glb"
"#
        )
        .unwrap();

        let config = ClientConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.base_url.value, "https://splat.example.dev");
        assert_eq!(config.base_url.source, ConfigSource::File);
        assert_eq!(config.poll_interval_ms.value, 1500);
        assert_eq!(config.request_timeout_secs.value, 300);
        assert_eq!(config.export_format.value, "glb");
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base_url = [not toml").unwrap();
        let err = ClientConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, SplatError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = ClientConfig::with_defaults();

        let overrides = CliConfigOverrides {
            base_url: Some("http://10.0.0.5:9000".to_string()),
            poll_interval_ms: Some(500),
            request_timeout_secs: None,
            export_format: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(config.base_url.value, "http://10.0.0.5:9000");
        assert_eq!(config.base_url.source, ConfigSource::Cli);
        assert_eq!(config.poll_interval_ms.value, 500);
        assert_eq!(config.poll_interval_ms.source, ConfigSource::Cli);
        // These should still be defaults
        assert_eq!(config.request_timeout_secs.source, ConfigSource::Default);
        assert_eq!(config.export_format.source, ConfigSource::Default);
    }

    #[test]
    fn test_inspection_map() {
        let config = ClientConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("base_url"));
        assert!(map.contains_key("poll_interval_ms"));
        assert!(map.contains_key("request_timeout_secs"));
        assert!(map.contains_key("export_format"));

        let (interval, source) = &map["poll_interval_ms"];
        assert_eq!(interval, "2000");
        assert_eq!(*source, ConfigSource::Default);
    }
}
