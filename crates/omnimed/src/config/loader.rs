use std::path::Path;

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "OMNIMED_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str(&content, format)?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config: Config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

/// Loads the file named by `OMNIMED_CONFIG`, or the defaults when unset.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => load_config(path.trim()),
        _ => {
            log::debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
            Ok(Config::default())
        }
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.models.default_reasoning_engine.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "models.default_reasoning_engine must not be empty".to_string(),
        });
    }

    if config.session.ttl_secs == 0 {
        return Err(ConfigError::Validation {
            message: "session.ttl_secs must be greater than zero".to_string(),
        });
    }

    if config.session.max_sessions == 0 {
        return Err(ConfigError::Validation {
            message: "session.max_sessions must be greater than zero".to_string(),
        });
    }

    if config.pipeline.max_summary_chars == 0 {
        return Err(ConfigError::Validation {
            message: "pipeline.max_summary_chars must be greater than zero".to_string(),
        });
    }

    Ok(())
}
