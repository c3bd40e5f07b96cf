//! Collector configuration
//!
//! Defines every tunable of a collection cycle: where the CI server lives,
//! how hard it may be queried, how deep the job tree is walked and which
//! jobs and nodes are reported.

use reqwest::Url;
use std::time::Duration;
use vigil_client::{ClientOptions, Credentials};
use vigil_core::Filter;

use crate::error::CollectError;

/// Simultaneous requests allowed when unset
pub const DEFAULT_MAX_CONNECTIONS: usize = 5;

/// Children examined per layer when unset
pub const DEFAULT_MAX_SUBJOB_PER_LAYER: usize = 10;

/// Collector configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// CI server base URL (e.g., "http://localhost:8080")
    pub url: String,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Deadline for each HTTP request
    pub response_timeout: Duration,

    /// Upper bound on simultaneous requests, 0 means the default
    pub max_connections: usize,

    /// Builds that started before `now - max_build_age` are not reported
    pub max_build_age: Duration,

    /// Depth at which traversal stops, 0 means unbounded
    pub max_subjob_depth: usize,

    /// Children examined per layer, 0 means the default
    pub max_subjob_per_layer: usize,

    /// Emit a sorted `labels` tag on node events
    pub node_labels_as_tag: bool,

    /// Patterns over the full job path (`folder/job`)
    pub job_include: Vec<String>,
    pub job_exclude: Vec<String>,

    /// Patterns over node display names
    pub node_include: Vec<String>,
    pub node_exclude: Vec<String>,

    /// Time between collection cycles
    pub interval: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            response_timeout: Duration::from_secs(5),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_build_age: Duration::from_secs(3600),
            max_subjob_depth: 0,
            max_subjob_per_layer: DEFAULT_MAX_SUBJOB_PER_LAYER,
            node_labels_as_tag: false,
            job_include: Vec::new(),
            job_exclude: Vec::new(),
            node_include: Vec::new(),
            node_exclude: Vec::new(),
            interval: Duration::from_secs(10),
        }
    }

    /// Replaces zero limits with their defaults
    pub fn normalized(mut self) -> Self {
        if self.max_connections == 0 {
            self.max_connections = DEFAULT_MAX_CONNECTIONS;
        }
        if self.max_subjob_per_layer == 0 {
            self.max_subjob_per_layer = DEFAULT_MAX_SUBJOB_PER_LAYER;
        }
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), CollectError> {
        if self.url.is_empty() {
            return Err(CollectError::Config("url cannot be empty".into()));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(CollectError::Config(
                "url must start with http:// or https://".into(),
            ));
        }

        self.server_tags()?;

        if self.interval.is_zero() {
            return Err(CollectError::Config(
                "interval must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Tags identifying the server on every event
    pub fn server_tags(&self) -> Result<ServerTags, CollectError> {
        let url = Url::parse(&self.url)
            .map_err(|e| CollectError::Config(format!("invalid url {:?}: {}", self.url, e)))?;
        ServerTags::from_url(&url)
    }

    pub fn job_filter(&self) -> Result<Filter, CollectError> {
        Filter::compile(&self.job_include, &self.job_exclude)
            .map_err(|source| CollectError::Filter { scope: "job", source })
    }

    pub fn node_filter(&self) -> Result<Filter, CollectError> {
        Filter::compile(&self.node_include, &self.node_exclude)
            .map_err(|source| CollectError::Filter { scope: "node", source })
    }

    /// Transport settings for the HTTP client
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.response_timeout,
            max_idle_connections: self.max_connections,
            credentials: self.username.clone().map(|username| Credentials {
                username,
                password: self.password.clone(),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

/// `source` and `port` tags derived from the server URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTags {
    pub source: String,
    pub port: String,
}

impl ServerTags {
    pub fn from_url(url: &Url) -> Result<Self, CollectError> {
        let source = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CollectError::Config(format!("url {url} has no host")))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let port = url
            .port_or_known_default()
            .map(|p| p.to_string())
            .unwrap_or_default();

        Ok(Self { source, port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.max_build_age, Duration::from_secs(3600));
        assert_eq!(config.max_subjob_depth, 0);
        assert_eq!(config.max_subjob_per_layer, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.url = String::new();
        assert!(config.validate().is_err());

        config.url = "ftp://ci.local".to_string();
        assert!(config.validate().is_err());

        config.url = "http://".to_string();
        assert!(config.validate().is_err());

        config.url = "https://ci.local".to_string();
        assert!(config.validate().is_ok());

        config.interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(CollectError::Config(_))));
    }

    #[test]
    fn test_normalized_replaces_zero_limits() {
        let mut config = Config::default();
        config.max_connections = 0;
        config.max_subjob_per_layer = 0;
        let config = config.normalized();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.max_subjob_per_layer, DEFAULT_MAX_SUBJOB_PER_LAYER);
    }

    #[yare::parameterized(
        http_default  = { "http://ci.local",          "ci.local",  "80" },
        https_default = { "https://ci.local/jenkins", "ci.local",  "443" },
        explicit_port = { "http://127.0.0.1:8080",    "127.0.0.1", "8080" },
        ipv6          = { "http://[::1]:9090",        "::1",       "9090" },
    )]
    fn server_tags_from_url(url: &str, source: &str, port: &str) {
        let tags = Config::new(url).server_tags().unwrap();
        assert_eq!(tags.source, source);
        assert_eq!(tags.port, port);
    }

    #[test]
    fn test_malformed_filter_is_config_error() {
        let mut config = Config::default();
        config.job_include = vec!["[broken".to_string()];
        let err = config.job_filter().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("error compiling job filters"));
        assert!(config.node_filter().is_ok());
    }

    #[test]
    fn test_client_options_carry_credentials() {
        let mut config = Config::default();
        assert!(config.client_options().credentials.is_none());

        config.username = Some("ci".to_string());
        config.password = Some("token".to_string());
        let creds = config.client_options().credentials.unwrap();
        assert_eq!(creds.username, "ci");
        assert_eq!(creds.password.as_deref(), Some("token"));
    }
}
