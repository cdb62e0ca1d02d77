//! Persisted forms of a label document.
//!
//! Two encodings carry the same information: a tree form (XML, `.label`
//! files) and an object form (JSON). Both are written and read through
//! [`write_document`] and [`read_document`]. A failed read never yields a
//! partially built document.

pub mod json;
pub mod xml;

use crate::document::LabelDocument;
use crate::items::{ItemKind, ItemType, LabelItem, is_valid_rect};
use kurbo::{Point, Rect};
use std::fmt;
use std::io::{Read, Write};
use thiserror::Error;

/// Version written into every document and the only one accepted on load.
pub const FORMAT_VERSION: &str = "1.0";

/// Errors raised while reading or writing a document.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Missing element: {0}")]
    MissingElement(String),
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(String),
    #[error("Invalid value '{value}' for attribute {name}")]
    InvalidAttribute { name: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encoding of a persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    /// Tree form, the native `.label` format.
    #[default]
    Xml,
    /// Object form.
    Json,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Xml => "label",
            DocumentFormat::Json => "json",
        }
    }

    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "label" | "xml" => Some(DocumentFormat::Xml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }

    /// Guess the format from the first significant byte of the data.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        match data.iter().find(|b| !b.is_ascii_whitespace())? {
            b'<' => Some(DocumentFormat::Xml),
            b'{' => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Xml => f.write_str("XML"),
            DocumentFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Serialize `doc` into `writer`.
pub fn write_document<W: Write>(
    doc: &LabelDocument,
    writer: W,
    format: DocumentFormat,
) -> Result<(), FormatError> {
    match format {
        DocumentFormat::Xml => xml::write_document(doc, writer),
        DocumentFormat::Json => json::write_document(doc, writer),
    }
}

pub fn write_to_string(doc: &LabelDocument, format: DocumentFormat) -> Result<String, FormatError> {
    let mut buf = Vec::new();
    write_document(doc, &mut buf, format)?;
    String::from_utf8(buf).map_err(|e| FormatError::Xml(e.to_string()))
}

/// Parse a complete document from `reader`.
pub fn read_document<R: Read>(
    mut reader: R,
    format: DocumentFormat,
) -> Result<LabelDocument, FormatError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    read_str(&input, format)
}

pub fn read_str(input: &str, format: DocumentFormat) -> Result<LabelDocument, FormatError> {
    match format {
        DocumentFormat::Xml => xml::read_document(input),
        DocumentFormat::Json => json::read_document(input),
    }
}

/// Read a document whose format is detected from its content.
pub fn read_detected(input: &str) -> Result<LabelDocument, FormatError> {
    let format = DocumentFormat::sniff(input.as_bytes()).ok_or_else(|| {
        FormatError::Xml("unrecognized document format".to_string())
    })?;
    read_str(input, format)
}

/// Shared fields of an item record, already parsed by one of the codecs.
pub(crate) struct ItemFields {
    pub id: String,
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: f64,
    pub locked: bool,
    pub visible: bool,
}

/// Build an item from parsed fields, or `None` if the geometry is unusable.
pub(crate) fn build_item(fields: ItemFields, kind: ItemKind) -> Option<LabelItem> {
    let size = kind.default_size();
    let rect = Rect::from_origin_size(
        Point::new(fields.x, fields.y),
        (
            fields.width.unwrap_or(size.width),
            fields.height.unwrap_or(size.height),
        ),
    );
    if !is_valid_rect(rect) || !fields.rotation.is_finite() {
        log::warn!(
            "Skipping {} item '{}' with invalid geometry {:?}",
            kind.item_type(),
            fields.id,
            rect
        );
        return None;
    }
    let name = fields
        .name
        .unwrap_or_else(|| kind.default_name().to_string());
    Some(LabelItem::from_parts(
        fields.id,
        name,
        rect,
        fields.rotation,
        fields.locked,
        fields.visible,
        kind,
    ))
}

/// Append a loaded item, skipping duplicate ids.
pub(crate) fn push_loaded(doc: &mut LabelDocument, item: LabelItem) {
    let id = item.id().clone();
    if !doc.add_item(Box::new(item)) {
        log::warn!("Skipping item with duplicate id {}", id);
    }
}

pub(crate) fn parse_item_type(tag: &str) -> Option<ItemType> {
    let item_type = ItemType::from_tag(tag);
    if item_type.is_none() {
        log::warn!("Unknown item type '{}', skipping", tag);
    }
    item_type
}
