//! Metasys API client.
//!
//! Low-level HTTP client that handles the base URL, bearer-token
//! authentication and raw requests. Higher-level operations live in the
//! model modules and take a client reference.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

use crate::error::{MetasysError, Result};
use crate::session::SessionState;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v4";

const USER_AGENT: &str = concat!("metasys/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Low-level Metasys API client.
///
/// Handles authentication and HTTP requests against
/// `https://{host}/api/{version}`. Entity-specific operations are free
/// functions in the model modules (for example
/// [`read_property`](crate::read_property)) that take a client reference.
///
/// This struct is cheaply cloneable; clones share the same underlying
/// connection pool and session (token and refresh timer).
///
/// # Example
///
/// ```no_run
/// use metasys::MetasysClient;
///
/// # async fn example() -> metasys::Result<()> {
/// // Create from environment variables
/// let client = MetasysClient::from_env()?;
///
/// // Or configure manually
/// let client = MetasysClient::builder()
///     .host("adx.example.com")
///     .ignore_certificate_errors(true)
///     .build()?;
///
/// client.login("api-user", "secret", true).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MetasysClient {
    http: Client,
    base_url: Arc<Url>,
    pub(crate) session: Arc<SessionState>,
}

impl std::fmt::Debug for MetasysClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetasysClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Builder for [`MetasysClient`].
#[derive(Debug, Clone, Default)]
pub struct MetasysClientBuilder {
    host: Option<String>,
    version: Option<String>,
    base_url: Option<String>,
    ignore_certificate_errors: bool,
    timeout: Option<Duration>,
}

impl MetasysClientBuilder {
    /// Set the Metasys server hostname (e.g. `adx.example.com`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the API version segment (defaults to `v4`).
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the full base URL instead of deriving it from host and
    /// version. Intended for tests and proxies.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Skip TLS certificate validation.
    ///
    /// Metasys controllers commonly ship with self-signed certificates;
    /// only enable this for hosts you trust.
    pub fn ignore_certificate_errors(mut self, ignore: bool) -> Self {
        self.ignore_certificate_errors = ignore;
        self
    }

    /// Per-request timeout (defaults to 60 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a host nor a base URL was provided, or
    /// if the resulting URL is invalid.
    pub fn build(self) -> Result<MetasysClient> {
        let base_url_str = match (self.base_url, self.host) {
            (Some(base), _) => base,
            (None, Some(host)) => {
                let version = self.version.as_deref().unwrap_or(DEFAULT_API_VERSION);
                format!("https://{host}/api/{version}")
            }
            (None, None) => {
                return Err(MetasysError::ConfigMissing(
                    "a host or base URL is required".to_string(),
                ))
            }
        };

        // Ensure base URL ends with / so that Url::join keeps the path
        let base_url_str = if base_url_str.ends_with('/') {
            base_url_str
        } else {
            format!("{base_url_str}/")
        };
        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(self.ignore_certificate_errors)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(MetasysError::from_reqwest)?;

        Ok(MetasysClient {
            http,
            base_url: Arc::new(base_url),
            session: Arc::new(SessionState::new()),
        })
    }
}

impl MetasysClient {
    /// Create a builder.
    pub fn builder() -> MetasysClientBuilder {
        MetasysClientBuilder::default()
    }

    /// Create a client for the given host with default settings
    /// (API `v4`, certificate validation on).
    ///
    /// # Errors
    ///
    /// Returns an error if the derived base URL is invalid.
    pub fn new(host: &str) -> Result<Self> {
        Self::builder().host(host).build()
    }

    /// Create a client from environment variables.
    ///
    /// Uses `METASYS_HOST` for the server hostname and optionally
    /// `METASYS_API_VERSION` (defaults to `v4`).
    ///
    /// # Errors
    ///
    /// Returns an error if `METASYS_HOST` is not set.
    pub fn from_env() -> Result<Self> {
        let host = env::var("METASYS_HOST").map_err(|_| {
            MetasysError::ConfigMissing("METASYS_HOST environment variable not set".to_string())
        })?;

        let mut builder = Self::builder().host(host);
        if let Ok(version) = env::var("METASYS_API_VERSION") {
            builder = builder.api_version(version);
        }
        builder.build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Attach the current bearer token, if one is stored.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Make a GET request against an absolute URL.
    ///
    /// Used for continuation links and `typeUrl` dereferences where the
    /// server hands back a full URL.
    #[tracing::instrument(skip(self))]
    pub async fn get_absolute(&self, url: Url) -> Result<Response> {
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let response = self
            .authed(self.http.get(url))
            .query(query)
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path)?;
        let response = self
            .authed(self.http.put(url))
            .json(body)
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Make a PATCH request with JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path)?;
        let response = self
            .authed(self.http.patch(url))
            .json(body)
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Make a POST request with JSON body and no bearer header.
    ///
    /// Only the login endpoint is unauthenticated.
    #[tracing::instrument(skip(self, body))]
    pub(crate) async fn post_unauthenticated<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(MetasysError::from_reqwest)?;

        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(MetasysError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
