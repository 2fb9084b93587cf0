//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::ClientConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "reqwrap.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from `reqwrap.yaml`.
    ///
    /// Without a file the defaults are used, with endpoints read from the
    /// environment.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let config_path = self.base_path.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(ClientConfig::from_env());
        }

        Self::load_file(&config_path)
    }

    /// Load from `REQWRAP_CONFIG_PATH` when set, otherwise from the project
    /// directory.
    pub fn discover(&self) -> Result<ClientConfig, ConfigError> {
        match Environment::get(vars::REQWRAP_CONFIG_PATH) {
            Some(path) => Self::load_file(Path::new(&path)),
            None => self.load(),
        }
    }

    /// Load an explicit config file.
    pub fn load_file(path: &Path) -> Result<ClientConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&contents)?;

        let config: ClientConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| ConfigError::ParseError {
        line: None,
        message: e.to_string(),
    })?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Validate configuration values.
fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.endpoints.production.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            message: "endpoints.production must not be empty".to_string(),
        });
    }

    if config.http.connect_timeout_secs == 0 || config.http.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            message: "http timeouts must be greater than 0".to_string(),
        });
    }

    Ok(())
}
