//! Format dispatch for manifest (de)serialization.
//!
//! Each [`ManifestFormat`] maps to an independent pair of codec functions.
//! Both produce the same [`PlatformUpdates`] shape.

use log::debug;

use super::{ManifestFormat, PlatformUpdates, xml};
use crate::error::{Result, UpdateError};

type DecodeFn = fn(&[u8]) -> Result<PlatformUpdates>;
type EncodeFn = fn(&PlatformUpdates) -> Result<String>;

struct Codec {
    decode: DecodeFn,
    encode: EncodeFn,
}

static JSON_CODEC: Codec = Codec {
    decode: decode_json,
    encode: encode_json,
};

static XML_CODEC: Codec = Codec {
    decode: xml::decode,
    encode: xml::encode,
};

fn codec_for(format: ManifestFormat) -> &'static Codec {
    match format {
        ManifestFormat::Json => &JSON_CODEC,
        ManifestFormat::Xml => &XML_CODEC,
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a raw manifest in the given format.
///
/// Fails with [`UpdateError::EmptyPayload`] before parsing when `raw` is
/// empty, and with [`UpdateError::MalformedManifest`] when the document does
/// not parse, lacks the update list, or carries an empty file hash.
pub fn deserialize(raw: impl AsRef<[u8]>, format: ManifestFormat) -> Result<PlatformUpdates> {
    let raw = raw.as_ref();
    if raw.is_empty() {
        return Err(UpdateError::EmptyPayload);
    }

    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    debug!("Decoding {} manifest ({} bytes)", format, raw.len());

    let updates = (codec_for(format).decode)(raw)?;
    validate(&updates, format)?;
    Ok(updates)
}

/// Render a manifest in the given format.
pub fn serialize(updates: &PlatformUpdates, format: ManifestFormat) -> Result<String> {
    (codec_for(format).encode)(updates)
}

fn validate(updates: &PlatformUpdates, format: ManifestFormat) -> Result<()> {
    for update in updates.all_updates() {
        if let Some(empty) = update.hash_list.iter().find(|h| h.hash.trim().is_empty()) {
            return Err(UpdateError::malformed(
                format,
                format!(
                    "empty {} hash for update {}",
                    empty.hash_type,
                    update.version_string()
                ),
            ));
        }
    }
    Ok(())
}

fn decode_json(raw: &[u8]) -> Result<PlatformUpdates> {
    serde_json::from_slice(raw).map_err(|e| UpdateError::malformed(ManifestFormat::Json, e))
}

fn encode_json(updates: &PlatformUpdates) -> Result<String> {
    serde_json::to_string_pretty(updates)
        .map_err(|e| UpdateError::malformed(ManifestFormat::Json, e))
}
