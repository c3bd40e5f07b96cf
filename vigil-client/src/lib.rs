//! Vigil HTTP Client
//!
//! A small, typed HTTP client for the JSON API of a Jenkins-style CI server.
//! It knows how to address nested jobs, builds and the node collection, and
//! decodes responses into `vigil_core` records. It does not retry, cache or
//! throttle; callers decide how many requests run at once.
//!
//! # Example
//!
//! ```no_run
//! use vigil_client::JenkinsClient;
//! use vigil_core::domain::JobPath;
//!
//! #[tokio::main]
//! async fn main() -> vigil_client::Result<()> {
//!     let client = JenkinsClient::new("http://localhost:8080")?;
//!
//!     let listing = client.list_children(&JobPath::root("folder").child("app")).await?;
//!     println!("{} child jobs", listing.jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod nodes;

pub use error::{ClientError, Result};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Username and password sent as HTTP basic auth
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Transport settings for [`JenkinsClient::with_options`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Deadline for a whole request, surfaced as [`ClientError::RequestFailed`]
    pub timeout: Duration,
    /// Upper bound on idle pooled connections per host
    pub max_idle_connections: usize,
    pub credentials: Option<Credentials>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_idle_connections: 5,
            credentials: None,
        }
    }
}

/// HTTP client for the CI server API
///
/// Endpoints are grouped by resource:
/// - Jobs: top-level listing, nested listings and build details
/// - Nodes: executor totals and per-node monitors
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    /// Base URL of the server, possibly with a path prefix
    base_url: Url,
    /// HTTP client instance
    client: Client,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    /// Create a client with default transport settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with the given timeout, pool bound and credentials
    pub fn with_options(base_url: &str, options: ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .pool_max_idle_per_host(options.max_idle_connections)
            .build()?;

        let mut this = Self::with_client(base_url, client)?;
        this.credentials = options.credentials;
        Ok(this)
    }

    /// Create a client around a preconfigured reqwest client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            base_url,
            client,
            credentials: None,
        })
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/<segments...>`, escaping each segment on its own
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let mut request = self.client.get(url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, creds.password.as_ref());
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
