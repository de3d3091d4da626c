//! HTTP client used to download manifests.

use async_trait::async_trait;
use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Proxy};

use crate::blocking::block_on;
use crate::error::{Result, UpdateError};

/// HTTP proxy used for manifest requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy address, e.g. `http://proxy.local:3128`
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    fn to_proxy(&self) -> Result<Proxy> {
        let mut proxy = Proxy::all(&self.url).map_err(|e| {
            UpdateError::invalid_argument(format!("Invalid proxy URL '{}': {}", self.url, e))
        })?;
        let username = self.username.as_deref().unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();
        if !username.is_empty() {
            proxy = proxy.basic_auth(username, password);
        }
        Ok(proxy)
    }
}

/// Source of raw manifest text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FetchManifest: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Thin wrapper over a reqwest client. Requests are never retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client that routes through `proxy` (if any) and sends
    /// `headers` with every request.
    pub fn with_settings(proxy: Option<&ProxyConfig>, headers: &HeaderMap) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("platform-update/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers.clone());

        if let Some(proxy) = proxy {
            debug!("Using proxy {}", proxy.url);
            builder = builder.proxy(proxy.to_proxy()?);
        }

        Ok(Self::new(builder.build()?))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and returns the body as text.
    ///
    /// Non-success statuses are reported as [`UpdateError::Network`] carrying
    /// the original reqwest error.
    #[tracing::instrument(skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        if url.is_empty() {
            return Err(UpdateError::invalid_argument("URL must not be empty"));
        }

        debug!("GET {}...", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Blocking form of [`HttpClient::get_text`].
    pub fn get_text_blocking(&self, url: &str) -> Result<String> {
        block_on(self.get_text(url))
    }
}

#[async_trait]
impl FetchManifest for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }
}
