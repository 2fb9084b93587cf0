//! Environment variable handling.

use crate::types::{ClientConfig, Endpoints, Server};
use std::env;
use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Endpoints
    pub const REQWRAP_BUILD_ENV: &str = "REQWRAP_BUILD_ENV";
    pub const REQWRAP_BASE_URL: &str = "REQWRAP_BASE_URL";
    pub const REQWRAP_BASE_URL_DEV: &str = "REQWRAP_BASE_URL_DEV";
    pub const REQWRAP_BASE_URL_TEST: &str = "REQWRAP_BASE_URL_TEST";
    pub const REQWRAP_BASE_URL_MOCK: &str = "REQWRAP_BASE_URL_MOCK";

    // Storage
    pub const REQWRAP_TOKEN: &str = "REQWRAP_TOKEN";
    pub const REQWRAP_TOKEN_FILE: &str = "REQWRAP_TOKEN_FILE";

    // Configuration
    pub const REQWRAP_CONFIG_PATH: &str = "REQWRAP_CONFIG_PATH";
    pub const REQWRAP_LOG_LEVEL: &str = "REQWRAP_LOG_LEVEL";
    pub const REQWRAP_LOG_FORMAT: &str = "REQWRAP_LOG_FORMAT";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files in the working directory.
    ///
    /// Missing files are skipped. A file that exists but does not parse is
    /// an error.
    pub fn init() -> Result<Self, EnvError> {
        // Later files override earlier ones
        load_optional(".env")?;
        load_optional(".env.local")?;

        if let Some(build_env) = Self::get(vars::REQWRAP_BUILD_ENV) {
            load_optional(format!(".env.{}", build_env))?;
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok()
    }
}

fn load_optional(path: impl AsRef<Path>) -> Result<(), EnvError> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Endpoints {
    /// Read base URLs and the default server from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Read base URLs through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            production: lookup(vars::REQWRAP_BASE_URL).unwrap_or_default(),
            development: lookup(vars::REQWRAP_BASE_URL_DEV).unwrap_or_default(),
            testing: lookup(vars::REQWRAP_BASE_URL_TEST).unwrap_or_default(),
            mock: lookup(vars::REQWRAP_BASE_URL_MOCK).unwrap_or_default(),
            default_server: lookup(vars::REQWRAP_BUILD_ENV)
                .and_then(|v| Server::parse(&v))
                .unwrap_or_default(),
        }
    }
}

impl ClientConfig {
    /// Defaults with endpoints taken from the environment.
    pub fn from_env() -> Self {
        Self {
            endpoints: Endpoints::from_env(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_get_missing_var() {
        assert_eq!(Environment::get("NONEXISTENT_REQWRAP_VAR_12345"), None);
    }

    #[test]
    fn test_load_optional_skips_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_optional(dir.path().join(".env")).is_ok());
    }

    #[test]
    fn test_load_optional_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "REQWRAP_ENV_FILE_TEST_VAR=loaded\n").unwrap();

        load_optional(&path).unwrap();
        assert_eq!(
            Environment::get("REQWRAP_ENV_FILE_TEST_VAR").as_deref(),
            Some("loaded")
        );
        env::remove_var("REQWRAP_ENV_FILE_TEST_VAR");
    }

    #[test]
    fn test_load_optional_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "REQWRAP_ENV_BAD='unterminated\n").unwrap();

        let err = load_optional(&path).unwrap_err();
        assert!(matches!(err, EnvError::DotenvError(_)));
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_endpoints_from_lookup() {
        let endpoints = Endpoints::from_lookup(lookup(&[
            (vars::REQWRAP_BASE_URL, "https://api.example.com"),
            (vars::REQWRAP_BASE_URL_DEV, "https://dev.example.com"),
            (vars::REQWRAP_BASE_URL_TEST, "https://test.example.com"),
            (vars::REQWRAP_BASE_URL_MOCK, "http://mock.example.com"),
            (vars::REQWRAP_BUILD_ENV, "testing"),
        ]));

        assert_eq!(endpoints.production, "https://api.example.com");
        assert_eq!(endpoints.development, "https://dev.example.com");
        assert_eq!(endpoints.testing, "https://test.example.com");
        assert_eq!(endpoints.mock, "http://mock.example.com");
        assert_eq!(endpoints.default_server, Server::Testing);
        assert_eq!(endpoints.resolve(None), "https://test.example.com");
    }

    #[test]
    fn test_unknown_build_env_selects_production() {
        let endpoints = Endpoints::from_lookup(lookup(&[
            (vars::REQWRAP_BASE_URL, "https://api.example.com"),
            (vars::REQWRAP_BUILD_ENV, "staging"),
        ]));

        assert_eq!(endpoints.default_server, Server::Production);
        assert_eq!(endpoints.resolve(None), "https://api.example.com");
    }

    #[test]
    fn test_missing_urls_are_empty() {
        let endpoints = Endpoints::from_lookup(lookup(&[]));
        assert_eq!(endpoints, Endpoints::default());
    }

    #[test]
    fn test_environment_init() {
        let result = Environment::init();
        assert!(result.is_ok());
    }
}
