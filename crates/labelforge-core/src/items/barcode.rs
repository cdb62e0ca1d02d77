//! Barcode item content.
//!
//! Only the description of the symbol lives here; encoding bars is left to
//! the renderer.

use super::{FontSpec, ItemContent, ItemType, SerializableColor};
use crate::format::xml::XmlNode;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported linear symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BarcodeType {
    #[default]
    Code128,
    Code39,
    Code93,
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Msi,
    Interleaved2of5,
    Itf14,
    Codabar,
}

impl BarcodeType {
    pub const ALL: [BarcodeType; 11] = [
        BarcodeType::Code128,
        BarcodeType::Code39,
        BarcodeType::Code93,
        BarcodeType::Ean8,
        BarcodeType::Ean13,
        BarcodeType::UpcA,
        BarcodeType::UpcE,
        BarcodeType::Msi,
        BarcodeType::Interleaved2of5,
        BarcodeType::Itf14,
        BarcodeType::Codabar,
    ];

    /// Display name, also the persisted value.
    pub fn name(self) -> &'static str {
        match self {
            BarcodeType::Code128 => "Code 128",
            BarcodeType::Code39 => "Code 39",
            BarcodeType::Code93 => "Code 93",
            BarcodeType::Ean8 => "EAN-8",
            BarcodeType::Ean13 => "EAN-13",
            BarcodeType::UpcA => "UPC-A",
            BarcodeType::UpcE => "UPC-E",
            BarcodeType::Msi => "MSI",
            BarcodeType::Interleaved2of5 => "Interleaved 2 of 5",
            BarcodeType::Itf14 => "ITF-14",
            BarcodeType::Codabar => "Codabar",
        }
    }

    /// Unknown names fall back to Code 128.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .unwrap_or_else(|| {
                log::warn!("Unknown barcode type '{}', using Code 128", name);
                BarcodeType::Code128
            })
    }

    /// Placeholder data valid for this symbology.
    pub fn sample_data(self) -> &'static str {
        match self {
            BarcodeType::Ean8 => "1234567",
            BarcodeType::Ean13 => "123456789012",
            BarcodeType::UpcA => "12345678901",
            BarcodeType::UpcE => "123456",
            _ => "12345678",
        }
    }

    /// Whether `data` can be encoded with this symbology.
    pub fn validate(self, data: &str) -> bool {
        if data.is_empty() {
            return false;
        }
        let digits_only = data.chars().all(|c| c.is_ascii_digit());
        let len = data.chars().count();
        match self {
            BarcodeType::Code128 => len <= 80,
            BarcodeType::Code39 => len <= 80 && data.chars().all(is_code39_char),
            BarcodeType::Ean8 => digits_only && (len == 7 || len == 8),
            BarcodeType::Ean13 => digits_only && (len == 12 || len == 13),
            BarcodeType::UpcA => digits_only && (len == 11 || len == 12),
            BarcodeType::UpcE => digits_only && (6..=8).contains(&len),
            _ => true,
        }
    }
}

fn is_code39_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || " -.$/+%*".contains(c)
}

impl fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for BarcodeType {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<BarcodeType> for String {
    fn from(value: BarcodeType) -> Self {
        value.name().to_string()
    }
}

/// Content of a barcode item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarcodeContent {
    pub data: String,
    pub barcode_type: BarcodeType,
    pub foreground_color: SerializableColor,
    pub background_color: SerializableColor,
    pub show_text: bool,
    pub margin: u32,
    pub include_checksum: bool,
    pub font: FontSpec,
}

impl Default for BarcodeContent {
    fn default() -> Self {
        Self {
            data: "12345678".to_string(),
            barcode_type: BarcodeType::Code128,
            foreground_color: SerializableColor::black(),
            background_color: SerializableColor::white(),
            show_text: true,
            margin: 10,
            include_checksum: true,
            font: Self::default_font(),
        }
    }
}

impl BarcodeContent {
    fn default_font() -> FontSpec {
        FontSpec {
            point_size: 8,
            ..FontSpec::default()
        }
    }

    /// Whether the current data suits the current symbology.
    pub fn is_valid(&self) -> bool {
        self.barcode_type.validate(&self.data)
    }

    /// Replace the data if it is valid for the current symbology.
    pub fn set_data(&mut self, data: impl Into<String>) -> bool {
        let data = data.into();
        if !self.barcode_type.validate(&data) {
            log::warn!("Invalid barcode data '{}' for {}", data, self.barcode_type);
            return false;
        }
        self.data = data;
        true
    }

    /// Change symbology, swapping in sample data if the current data no
    /// longer validates.
    pub fn set_barcode_type(&mut self, barcode_type: BarcodeType) {
        self.barcode_type = barcode_type;
        if !barcode_type.validate(&self.data) {
            self.data = barcode_type.sample_data().to_string();
        }
    }
}

impl ItemContent for BarcodeContent {
    const ITEM_TYPE: ItemType = ItemType::Barcode;

    fn default_size() -> Size {
        Size::new(200.0, 100.0)
    }

    fn default_name() -> &'static str {
        "Barcode"
    }

    fn write_xml(&self, node: &mut XmlNode) {
        node.set_attr("data", &self.data);
        node.set_attr("barcodeType", self.barcode_type.name());
        node.set_attr("foregroundColor", self.foreground_color.to_hex());
        node.set_attr("backgroundColor", self.background_color.to_hex());
        node.set_attr("showText", self.show_text);
        node.set_attr("margin", self.margin);
        node.set_attr("includeChecksum", self.include_checksum);
        node.push_child(self.font.write_xml(false));
    }

    fn read_xml(node: &XmlNode) -> Self {
        let d = Self::default();
        Self {
            data: node.string_attr("data", &d.data),
            barcode_type: node
                .attr("barcodeType")
                .map(BarcodeType::from_name)
                .unwrap_or(d.barcode_type),
            foreground_color: node.color_attr("foregroundColor", d.foreground_color),
            background_color: node.color_attr("backgroundColor", d.background_color),
            show_text: node.bool_attr("showText", d.show_text),
            margin: node.attr_or("margin", d.margin),
            include_checksum: node.bool_attr("includeChecksum", d.include_checksum),
            font: node
                .child("font")
                .map(|f| FontSpec::read_xml(f, &d.font))
                .unwrap_or(d.font),
        }
    }
}
