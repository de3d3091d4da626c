//! Update resolution engine.
//!
//! [`UpdateManager`] holds the caller's configuration and runs the
//! fetch → decode → select pipeline. Every operation has an async form and a
//! `_blocking` form; the blocking form drives the async one to completion, so
//! both always agree.

mod select;

use log::{debug, info};
use reqwest::header::HeaderMap;

use crate::blocking::block_on;
use crate::error::{Result, UpdateError};
use crate::http::{FetchManifest, HttpClient, ProxyConfig};
use crate::manifest::{self, ManifestFormat, PlatformUpdates, Update};

pub use select::UpdateResolver;

/// Checks a remote manifest for updates.
///
/// Configuration is read at call time. The manager keeps no state between
/// calls: no cache, no retry, no last known version.
#[derive(Debug, Clone, Default)]
pub struct UpdateManager {
    /// Location of the manifest
    pub update_url: String,
    /// Platform identifier matched exactly against `PlatformName`
    pub current_platform: String,
    pub format: ManifestFormat,
    pub proxy: Option<ProxyConfig>,
    /// Extra headers sent with the manifest request
    pub headers: HeaderMap,
}

impl UpdateManager {
    pub fn new(update_url: impl Into<String>, current_platform: impl Into<String>) -> Self {
        Self {
            update_url: update_url.into(),
            current_platform: current_platform.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: ManifestFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Download and decode the whole manifest.
    pub async fn get_latest_versions(&self) -> Result<PlatformUpdates> {
        self.ensure_update_url()?;
        let client = self.http_client()?;
        self.get_latest_versions_with(&client).await
    }

    /// Resolve the update for the configured platform.
    ///
    /// `Ok(None)` means the manifest has no entry for the platform. Whether
    /// the returned update is newer than the running application is left to
    /// [`Update::update_available`].
    pub async fn get_latest_version(&self, include_pre_release: bool) -> Result<Option<Update>> {
        self.ensure_platform()?;
        self.ensure_update_url()?;
        let client = self.http_client()?;
        self.get_latest_version_with(&client, include_pre_release)
            .await
    }

    /// Same as [`UpdateManager::get_latest_versions`] over a caller-supplied fetcher.
    #[tracing::instrument(skip(self, fetcher), fields(url = %self.update_url, format = %self.format))]
    pub async fn get_latest_versions_with<F>(&self, fetcher: &F) -> Result<PlatformUpdates>
    where
        F: FetchManifest + ?Sized,
    {
        self.ensure_update_url()?;

        debug!("Fetching manifest from {}...", self.update_url);
        let raw = fetcher.fetch(&self.update_url).await?;

        let updates = manifest::deserialize(raw, self.format)?;
        debug!(
            "Manifest lists {} platform entries",
            updates.platform_update_list.len()
        );
        Ok(updates)
    }

    /// Same as [`UpdateManager::get_latest_version`] over a caller-supplied fetcher.
    #[tracing::instrument(skip(self, fetcher), fields(platform = %self.current_platform))]
    pub async fn get_latest_version_with<F>(
        &self,
        fetcher: &F,
        include_pre_release: bool,
    ) -> Result<Option<Update>>
    where
        F: FetchManifest + ?Sized,
    {
        self.ensure_platform()?;

        let updates = self.get_latest_versions_with(fetcher).await?;
        let resolved =
            UpdateResolver::resolve(&updates, &self.current_platform, include_pre_release).cloned();

        match &resolved {
            Some(update) => info!(
                "Latest version for {}: {}",
                self.current_platform,
                update.version_string()
            ),
            None => info!("No manifest entries for {}", self.current_platform),
        }

        Ok(resolved)
    }

    /// Blocking form of [`UpdateManager::get_latest_versions`].
    pub fn get_latest_versions_blocking(&self) -> Result<PlatformUpdates> {
        self.ensure_update_url()?;
        block_on(self.get_latest_versions())
    }

    /// Blocking form of [`UpdateManager::get_latest_version`].
    pub fn get_latest_version_blocking(&self, include_pre_release: bool) -> Result<Option<Update>> {
        self.ensure_platform()?;
        self.ensure_update_url()?;
        block_on(self.get_latest_version(include_pre_release))
    }

    fn http_client(&self) -> Result<HttpClient> {
        HttpClient::with_settings(self.proxy.as_ref(), &self.headers)
    }

    fn ensure_update_url(&self) -> Result<()> {
        if self.update_url.is_empty() {
            return Err(UpdateError::invalid_argument("update URL must not be empty"));
        }
        Ok(())
    }

    fn ensure_platform(&self) -> Result<()> {
        if self.current_platform.is_empty() {
            return Err(UpdateError::invalid_argument(
                "current platform must not be empty",
            ));
        }
        Ok(())
    }
}
