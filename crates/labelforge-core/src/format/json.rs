//! Object form: a keyed root object with an ordered `items` array.

use super::{FORMAT_VERSION, FormatError, ItemFields, build_item, parse_item_type, push_loaded};
use crate::document::LabelDocument;
use crate::items::{ItemKind, LabelItem};
use crate::page::{Margins, Orientation, PageSettings, PageSize};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

/// Root object. Missing fields take the page defaults.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DocumentRecord {
    version: String,
    page_size: i32,
    orientation: i32,
    custom_width: f64,
    custom_height: f64,
    dpi: u32,
    margin_left: f64,
    margin_top: f64,
    margin_right: f64,
    margin_bottom: f64,
    items: Vec<Value>,
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::from_page(&PageSettings::default(), Vec::new())
    }
}

impl DocumentRecord {
    fn from_page(page: &PageSettings, items: Vec<Value>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            page_size: page.page_size.code(),
            orientation: page.orientation.code(),
            custom_width: page.custom_size.width,
            custom_height: page.custom_size.height,
            dpi: page.dpi,
            margin_left: page.margins.left,
            margin_top: page.margins.top,
            margin_right: page.margins.right,
            margin_bottom: page.margins.bottom,
            items,
        }
    }

    fn page(&self) -> PageSettings {
        PageSettings {
            page_size: PageSize::from_code(self.page_size),
            orientation: Orientation::from_code(self.orientation),
            custom_size: Size::new(self.custom_width, self.custom_height),
            dpi: self.dpi,
            margins: Margins {
                left: self.margin_left,
                top: self.margin_top,
                right: self.margin_right,
                bottom: self.margin_bottom,
            },
        }
    }
}

fn default_true() -> bool {
    true
}

/// One entry of `items`: shared fields plus the tagged content.
#[derive(Debug, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    locked: bool,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(flatten)]
    kind: ItemKind,
}

impl ItemRecord {
    fn from_item(item: &LabelItem) -> Self {
        let rect = item.rect();
        Self {
            id: item.id().clone(),
            name: Some(item.name().to_string()),
            x: rect.x0,
            y: rect.y0,
            width: Some(rect.width()),
            height: Some(rect.height()),
            rotation: item.rotation(),
            locked: item.is_locked(),
            visible: item.is_visible(),
            kind: item.kind().clone(),
        }
    }

    fn into_item(self) -> Option<LabelItem> {
        let fields = ItemFields {
            id: self.id,
            name: self.name,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            locked: self.locked,
            visible: self.visible,
        };
        build_item(fields, self.kind)
    }
}

fn item_from_value(value: Value) -> Option<LabelItem> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    parse_item_type(&tag)?;
    match serde_json::from_value::<ItemRecord>(value) {
        Ok(record) => record.into_item(),
        Err(e) => {
            log::warn!("Skipping malformed {} item: {}", tag, e);
            None
        }
    }
}

/// Build the root JSON value for a document.
pub fn document_to_value(doc: &LabelDocument) -> Result<Value, FormatError> {
    let items = doc
        .items()
        .map(|item| serde_json::to_value(ItemRecord::from_item(item)))
        .collect::<Result<Vec<_>, _>>()?;
    let record = DocumentRecord::from_page(doc.page_settings(), items);
    Ok(serde_json::to_value(record)?)
}

pub fn write_document<W: Write>(doc: &LabelDocument, mut writer: W) -> Result<(), FormatError> {
    let value = document_to_value(doc)?;
    serde_json::to_writer_pretty(&mut writer, &value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn read_document(input: &str) -> Result<LabelDocument, FormatError> {
    let record: DocumentRecord = serde_json::from_str(input)?;
    if record.version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(record.version));
    }

    let mut doc = LabelDocument::new();
    doc.set_page_settings(record.page());
    for value in record.items {
        if let Some(item) = item_from_value(value) {
            push_loaded(&mut doc, item);
        }
    }
    doc.reset_modified();
    Ok(doc)
}
