//! Update manifest model.
//!
//! These types are the normalized, format-independent view of a manifest.
//! Field names serialize in PascalCase to match the wire format.

mod codec;
mod xml;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UpdateError;
use crate::version::{self, Version};

pub use codec::{deserialize, serialize};

/// Serialization format of a remote manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Xml,
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestFormat::Json => write!(f, "JSON"),
            ManifestFormat::Xml => write!(f, "XML"),
        }
    }
}

impl FromStr for ManifestFormat {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "xml" => Ok(ManifestFormat::Xml),
            _ => Err(UpdateError::invalid_argument(format!(
                "Unknown manifest format: {}. Expected json or xml.",
                s
            ))),
        }
    }
}

/// Digest of a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileHash {
    /// Algorithm label, e.g. "sha256"
    #[serde(default)]
    pub hash_type: String,
    /// Hex-encoded digest
    #[serde(default)]
    pub hash: String,
}

impl FileHash {
    pub fn new(hash_type: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            hash_type: hash_type.into(),
            hash: hash.into(),
        }
    }
}

/// A single release of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Update {
    #[serde(default)]
    pub major_version: u32,
    #[serde(default)]
    pub minor_version: u32,
    #[serde(default)]
    pub build_version: u32,
    #[serde(default)]
    pub revision_version: u32,
    /// Where the release can be downloaded
    #[serde(default)]
    pub update_url: String,
    /// Where the release notes live
    #[serde(default)]
    pub info_url: String,
    /// Free-form release notes
    #[serde(default)]
    pub update_info: String,
    #[serde(default)]
    pub hash_list: Vec<FileHash>,
}

impl Update {
    pub fn new(version: Version) -> Self {
        Self {
            major_version: version.major,
            minor_version: version.minor,
            build_version: version.build,
            revision_version: version.revision,
            ..Default::default()
        }
    }

    pub fn with_update_url(mut self, url: impl Into<String>) -> Self {
        self.update_url = url.into();
        self
    }

    pub fn with_info_url(mut self, url: impl Into<String>) -> Self {
        self.info_url = url.into();
        self
    }

    pub fn with_update_info(mut self, info: impl Into<String>) -> Self {
        self.update_info = info.into();
        self
    }

    pub fn with_hash(mut self, hash: FileHash) -> Self {
        self.hash_list.push(hash);
        self
    }

    /// The version this update carries.
    pub fn version(&self) -> Version {
        Version::new(
            self.major_version,
            self.minor_version,
            self.build_version,
            self.revision_version,
        )
    }

    /// Formatted as `major.minor.build.revision`.
    pub fn version_string(&self) -> String {
        self.version().to_string()
    }

    /// Whether this update is strictly newer than the running application.
    pub fn update_available(&self, application_version: &Version) -> bool {
        version::is_newer(&self.version(), application_version)
    }
}

/// Stable release and optional pre-release for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformUpdate {
    /// Opaque platform identifier, e.g. "win32"
    #[serde(default)]
    pub platform_name: String,
    #[serde(default)]
    pub update: Update,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_release: Option<Update>,
}

impl PlatformUpdate {
    pub fn new(platform_name: impl Into<String>, update: Update) -> Self {
        Self {
            platform_name: platform_name.into(),
            update,
            pre_release: None,
        }
    }

    pub fn with_pre_release(mut self, pre_release: Update) -> Self {
        self.pre_release = Some(pre_release);
        self
    }
}

/// Every platform entry of a manifest, in document order.
///
/// A platform may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformUpdates {
    pub platform_update_list: Vec<PlatformUpdate>,
}

impl PlatformUpdates {
    pub fn new(platform_update_list: Vec<PlatformUpdate>) -> Self {
        Self {
            platform_update_list,
        }
    }

    /// Entries whose platform name matches exactly (case-sensitive).
    pub fn for_platform<'a>(
        &'a self,
        platform: &str,
    ) -> impl Iterator<Item = &'a PlatformUpdate> {
        self.platform_update_list
            .iter()
            .filter(move |p| p.platform_name == platform)
    }

    /// Every update and pre-release in the manifest.
    pub(crate) fn all_updates(&self) -> impl Iterator<Item = &Update> {
        self.platform_update_list
            .iter()
            .flat_map(|p| std::iter::once(&p.update).chain(p.pre_release.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_format_parse() {
        assert_eq!(
            "json".parse::<ManifestFormat>().unwrap(),
            ManifestFormat::Json
        );
        assert_eq!(
            "XML".parse::<ManifestFormat>().unwrap(),
            ManifestFormat::Xml
        );
        assert!("yaml".parse::<ManifestFormat>().is_err());
    }

    #[test]
    fn test_manifest_format_default_is_json() {
        assert_eq!(ManifestFormat::default(), ManifestFormat::Json);
    }

    #[test]
    fn test_update_version_helpers() {
        let update = Update::new(Version::new(1, 2, 0, 3));
        assert_eq!(update.version(), Version::new(1, 2, 0, 3));
        assert_eq!(update.version_string(), "1.2.0.3");
    }

    #[test]
    fn test_update_available() {
        let update = Update::new(Version::new(1, 2, 0, 0));
        assert!(update.update_available(&Version::new(1, 0, 0, 0)));
        assert!(!update.update_available(&Version::new(1, 2, 0, 0)));
        assert!(!update.update_available(&Version::new(2, 0, 0, 0)));
    }

    #[test]
    fn test_for_platform_is_case_sensitive() {
        let updates = PlatformUpdates::new(vec![
            PlatformUpdate::new("win32", Update::default()),
            PlatformUpdate::new("Win32", Update::default()),
            PlatformUpdate::new("linux64", Update::default()),
            PlatformUpdate::new("win32", Update::default()),
        ]);

        assert_eq!(updates.for_platform("win32").count(), 2);
        assert_eq!(updates.for_platform("WIN32").count(), 0);
    }

    #[test]
    fn test_all_updates_includes_pre_releases() {
        let updates = PlatformUpdates::new(vec![
            PlatformUpdate::new("win32", Update::default())
                .with_pre_release(Update::new(Version::new(2, 0, 0, 0))),
            PlatformUpdate::new("linux64", Update::default()),
        ]);

        assert_eq!(updates.all_updates().count(), 3);
    }

    #[test]
    fn test_json_field_names() {
        let entry = PlatformUpdate::new(
            "win32",
            Update::new(Version::new(1, 0, 0, 0)).with_hash(FileHash::new("sha256", "ab")),
        );
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["PlatformName"], "win32");
        assert_eq!(value["Update"]["MajorVersion"], 1);
        assert_eq!(value["Update"]["HashList"][0]["HashType"], "sha256");
        // absent pre-release is omitted, not null
        assert!(value.get("PreRelease").is_none());
    }
}
