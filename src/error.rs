//! Error types for manifest resolution.

use crate::manifest::ManifestFormat;

/// Convenient result alias for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur while resolving an update.
#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    /// Required configuration (update URL, platform) is missing or unusable.
    /// Always detected before any network I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The manifest body was empty.
    #[error("manifest payload is empty")]
    EmptyPayload,

    /// The manifest could not be parsed as the declared format, or is
    /// structurally incomplete.
    #[error("malformed {format} manifest: {source}")]
    MalformedManifest {
        format: ManifestFormat,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport failure, carrying the original reqwest error.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// A file hash label that no supported algorithm answers to.
    #[error("unsupported hash type: {0}")]
    UnsupportedHashType(String),

    /// Local I/O failure, such as reading a file to hash or building the
    /// runtime for a blocking call.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdateError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        UpdateError::InvalidArgument(msg.into())
    }

    pub(crate) fn malformed(
        format: ManifestFormat,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        UpdateError::MalformedManifest {
            format,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = UpdateError::invalid_argument("update URL must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid argument: update URL must not be empty"
        );
    }

    #[test]
    fn test_malformed_display_names_format() {
        let err = UpdateError::malformed(ManifestFormat::Xml, "unexpected end of input");
        assert_eq!(
            err.to_string(),
            "malformed XML manifest: unexpected end of input"
        );
    }

    #[test]
    fn test_malformed_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = UpdateError::malformed(ManifestFormat::Json, json_err);
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("EOF"));
    }
}
