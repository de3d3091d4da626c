//! XML codec.
//!
//! The XML layout wraps each list in a container element holding one child
//! element per item (`<HashList><FileHash>…</FileHash></HashList>`). Encoding
//! goes through dedicated wire types; decoding walks the element tree so that
//! element text comes back exactly as written.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

use super::{FileHash, ManifestFormat, PlatformUpdate, PlatformUpdates, Update};
use crate::error::{Result, UpdateError};

const ROOT_ELEMENT: &str = "PlatformUpdates";

#[derive(Debug, Serialize)]
struct XmlPlatformUpdates {
    #[serde(rename = "PlatformUpdateList")]
    platform_update_list: XmlPlatformUpdateList,
}

#[derive(Debug, Serialize)]
struct XmlPlatformUpdateList {
    #[serde(rename = "PlatformUpdate")]
    items: Vec<XmlPlatformUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct XmlPlatformUpdate {
    platform_name: String,
    update: XmlUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pre_release: Option<XmlUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct XmlUpdate {
    major_version: u32,
    minor_version: u32,
    build_version: u32,
    revision_version: u32,
    update_url: String,
    info_url: String,
    update_info: String,
    hash_list: XmlHashList,
}

#[derive(Debug, Serialize)]
struct XmlHashList {
    #[serde(rename = "FileHash")]
    items: Vec<FileHash>,
}

impl From<&Update> for XmlUpdate {
    fn from(u: &Update) -> Self {
        XmlUpdate {
            major_version: u.major_version,
            minor_version: u.minor_version,
            build_version: u.build_version,
            revision_version: u.revision_version,
            update_url: u.update_url.clone(),
            info_url: u.info_url.clone(),
            update_info: u.update_info.clone(),
            hash_list: XmlHashList {
                items: u.hash_list.clone(),
            },
        }
    }
}

impl From<&PlatformUpdates> for XmlPlatformUpdates {
    fn from(updates: &PlatformUpdates) -> Self {
        let items = updates
            .platform_update_list
            .iter()
            .map(|p| XmlPlatformUpdate {
                platform_name: p.platform_name.clone(),
                update: XmlUpdate::from(&p.update),
                pre_release: p.pre_release.as_ref().map(XmlUpdate::from),
            })
            .collect();
        XmlPlatformUpdates {
            platform_update_list: XmlPlatformUpdateList { items },
        }
    }
}

/// Element read from a manifest document.
///
/// Text is kept exactly as written (entities resolved), so release notes
/// survive with their surrounding whitespace. Text of elements that have
/// children is indentation and never read.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text_of(&self, name: &str) -> String {
        self.child(name).map(|c| c.text.clone()).unwrap_or_default()
    }

    fn number_of(&self, name: &str) -> Result<u32> {
        let Some(child) = self.child(name) else {
            return Ok(0);
        };
        let text = child.text.trim();
        text.parse::<u32>().map_err(|e| {
            UpdateError::malformed(
                ManifestFormat::Xml,
                format!("invalid {} '{}': {}", name, text, e),
            )
        })
    }
}

fn malformed(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> UpdateError {
    UpdateError::malformed(ManifestFormat::Xml, e)
}

/// Reads the document into a tree rooted at its document element.
fn read_tree(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().expand_empty_elements = true;

    let mut open: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => open.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ..Default::default()
            }),
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(malformed("more than one document element")),
                }
            }
            Event::Text(e) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&e.unescape().map_err(malformed)?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&e.decode().map_err(malformed)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(malformed(format!(
            "unexpected end of document inside <{}>",
            unclosed.name
        )));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn read_hash(element: &Element) -> FileHash {
    FileHash::new(element.text_of("HashType"), element.text_of("Hash"))
}

fn read_update(element: &Element) -> Result<Update> {
    let hash_list: Vec<FileHash> = element
        .child("HashList")
        .map(|list| list.children_named("FileHash").map(read_hash).collect())
        .unwrap_or_default();

    Ok(Update {
        major_version: element.number_of("MajorVersion")?,
        minor_version: element.number_of("MinorVersion")?,
        build_version: element.number_of("BuildVersion")?,
        revision_version: element.number_of("RevisionVersion")?,
        update_url: element.text_of("UpdateUrl"),
        info_url: element.text_of("InfoUrl"),
        update_info: element.text_of("UpdateInfo"),
        hash_list,
    })
}

fn read_platform_update(element: &Element) -> Result<PlatformUpdate> {
    let update = match element.child("Update") {
        Some(update) => read_update(update)?,
        None => Update::default(),
    };
    let pre_release = element.child("PreRelease").map(read_update).transpose()?;

    Ok(PlatformUpdate {
        platform_name: element.text_of("PlatformName"),
        update,
        pre_release,
    })
}

pub(super) fn decode(raw: &[u8]) -> Result<PlatformUpdates> {
    let text = std::str::from_utf8(raw).map_err(malformed)?;
    let root = read_tree(text)?;

    let list = root
        .child("PlatformUpdateList")
        .ok_or_else(|| malformed("missing PlatformUpdateList element"))?;
    let entries = list
        .children_named("PlatformUpdate")
        .map(read_platform_update)
        .collect::<Result<Vec<_>>>()?;

    Ok(PlatformUpdates::new(entries))
}

pub(super) fn encode(updates: &PlatformUpdates) -> Result<String> {
    let doc = XmlPlatformUpdates::from(updates);
    quick_xml::se::to_string_with_root(ROOT_ELEMENT, &doc).map_err(malformed)
}
