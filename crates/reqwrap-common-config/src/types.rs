//! Configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Backend server a call is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Server {
    /// Production backend.
    #[default]
    Production,
    /// Development backend.
    Development,
    /// Testing backend.
    Testing,
    /// Mock server generated from the API schema.
    Mock,
}

impl Server {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            "testing" | "test" => Some(Self::Testing),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URLs per server.
    pub endpoints: Endpoints,
    /// Transport settings.
    pub http: HttpSettings,
    /// Retry settings.
    pub retry: RetrySettings,
}

/// Base URL for every server plus the process-wide default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub production: String,
    pub development: String,
    pub testing: String,
    pub mock: String,
    /// Server used when a call does not name one.
    pub default_server: Server,
}

impl Endpoints {
    /// Create endpoints that send every server to the same base URL.
    pub fn single(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            production: base_url.clone(),
            development: base_url.clone(),
            testing: base_url.clone(),
            mock: base_url,
            default_server: Server::Production,
        }
    }

    /// Base URL for the requested server, or the default server when `None`.
    pub fn resolve(&self, server: Option<Server>) -> &str {
        match server.unwrap_or(self.default_server) {
            Server::Mock => &self.mock,
            Server::Development => &self.development,
            Server::Testing => &self.testing,
            Server::Production => &self.production,
        }
    }
}

/// Transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// User agent string.
    pub user_agent: String,
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("reqwrap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries allowed when a call enables auto retry without a limit.
    pub default_limit: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { default_limit: 3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints {
            production: "https://api.example.com".to_string(),
            development: "https://dev.example.com".to_string(),
            testing: "https://test.example.com".to_string(),
            mock: "http://127.0.0.1:3000/mock/1".to_string(),
            default_server: Server::Production,
        }
    }

    #[test]
    fn test_server_parse() {
        assert_eq!(Server::parse("production"), Some(Server::Production));
        assert_eq!(Server::parse("prod"), Some(Server::Production));
        assert_eq!(Server::parse("Development"), Some(Server::Development));
        assert_eq!(Server::parse("dev"), Some(Server::Development));
        assert_eq!(Server::parse("testing"), Some(Server::Testing));
        assert_eq!(Server::parse(" mock "), Some(Server::Mock));
        assert_eq!(Server::parse("staging"), None);
    }

    #[test]
    fn test_resolve_explicit_server() {
        let endpoints = endpoints();
        assert_eq!(endpoints.resolve(Some(Server::Mock)), "http://127.0.0.1:3000/mock/1");
        assert_eq!(endpoints.resolve(Some(Server::Development)), "https://dev.example.com");
        assert_eq!(endpoints.resolve(Some(Server::Testing)), "https://test.example.com");
        assert_eq!(endpoints.resolve(Some(Server::Production)), "https://api.example.com");
    }

    #[test]
    fn test_resolve_falls_back_to_default_server() {
        let mut endpoints = endpoints();
        assert_eq!(endpoints.resolve(None), "https://api.example.com");

        endpoints.default_server = Server::Testing;
        assert_eq!(endpoints.resolve(None), "https://test.example.com");
        assert_eq!(endpoints.resolve(Some(Server::Mock)), "http://127.0.0.1:3000/mock/1");
    }

    #[test]
    fn test_single_endpoint() {
        let endpoints = Endpoints::single("http://localhost:8080");
        for server in [Server::Production, Server::Development, Server::Testing, Server::Mock] {
            assert_eq!(endpoints.resolve(Some(server)), "http://localhost:8080");
        }
    }

    #[test]
    fn test_server_serde_lowercase() {
        let yaml = serde_yaml::to_string(&Server::Development).unwrap();
        assert_eq!(yaml.trim(), "development");
        let parsed: Server = serde_yaml::from_str("mock").unwrap();
        assert_eq!(parsed, Server::Mock);
    }
}
