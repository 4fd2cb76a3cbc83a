//! XML utility functions
//!
//! Builds the `<GDALMetadata>` document stored in the GDAL metadata tag.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::tiff::errors::{TiffError, TiffResult};

/// One `<Item>` of a GDALMetadata document
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataItem {
    /// Item name
    pub name: String,
    /// Item text
    pub value: String,
    /// Band the item applies to (0-based), or dataset-wide when `None`
    pub sample: Option<usize>,
    /// Optional GDAL role, e.g. `unittype`
    pub role: Option<String>,
}

impl MetadataItem {
    /// Dataset-wide item
    pub fn dataset(name: &str, value: impl Into<String>) -> Self {
        MetadataItem {
            name: name.to_string(),
            value: value.into(),
            sample: None,
            role: None,
        }
    }

    /// Band-level item with an optional role
    pub fn band(sample: usize, name: &str, value: impl Into<String>, role: Option<&str>) -> Self {
        MetadataItem {
            name: name.to_string(),
            value: value.into(),
            sample: Some(sample),
            role: role.map(str::to_string),
        }
    }
}

/// Serialise items as a GDALMetadata XML document
///
/// Text values are escaped by the XML writer.
pub fn build_gdal_metadata(items: &[MetadataItem]) -> TiffResult<String> {
    let mut writer = Writer::new(Vec::new());
    let to_err = |e: std::io::Error| TiffError::GenericError(format!("Failed to write metadata XML: {}", e));

    writer.write_event(Event::Start(BytesStart::new("GDALMetadata"))).map_err(to_err)?;

    for item in items {
        let mut start = BytesStart::new("Item");
        start.push_attribute(("name", item.name.as_str()));
        let sample = item.sample.map(|s| s.to_string());
        if let Some(sample) = sample.as_deref() {
            start.push_attribute(("sample", sample));
        }
        if let Some(role) = item.role.as_deref() {
            start.push_attribute(("role", role));
        }

        writer.write_event(Event::Start(start)).map_err(to_err)?;
        writer.write_event(Event::Text(BytesText::new(&item.value))).map_err(to_err)?;
        writer.write_event(Event::End(BytesEnd::new("Item"))).map_err(to_err)?;
    }

    writer.write_event(Event::End(BytesEnd::new("GDALMetadata"))).map_err(to_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| TiffError::GenericError(format!("Metadata XML is not UTF-8: {}", e)))
}

/// Value of the first `<Item>` with the given name
///
/// Band-level items carrying `sample` or `role` attributes match as well.
/// Returns `None` when no such item exists or the document is malformed.
pub fn find_item(xml: &str, name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut value: Option<String> = None;

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) if start.name().as_ref() == b"Item" => {
                value = has_name(&start, name).then(String::new);
            }
            Event::Empty(start) if start.name().as_ref() == b"Item" => {
                if has_name(&start, name) {
                    return Some(String::new());
                }
            }
            Event::Text(text) => {
                if let Some(value) = value.as_mut() {
                    value.push_str(&text.unescape().ok()?);
                }
            }
            Event::End(end) if end.name().as_ref() == b"Item" => {
                if value.is_some() {
                    return value;
                }
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn has_name(start: &BytesStart, name: &str) -> bool {
    start.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"name" && attr.unescape_value().map(|v| v == name).unwrap_or(false)
    })
}
