//! QR code item content.

use super::{ItemContent, ItemType, SerializableColor};
use crate::format::xml::XmlNode;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCorrectionLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl ErrorCorrectionLevel {
    pub fn name(self) -> &'static str {
        match self {
            ErrorCorrectionLevel::Low => "Low",
            ErrorCorrectionLevel::Medium => "Medium",
            ErrorCorrectionLevel::Quartile => "Quartile",
            ErrorCorrectionLevel::High => "High",
        }
    }

    /// Unknown names fall back to Medium.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Low" => ErrorCorrectionLevel::Low,
            "Medium" => ErrorCorrectionLevel::Medium,
            "Quartile" => ErrorCorrectionLevel::Quartile,
            "High" => ErrorCorrectionLevel::High,
            other => {
                log::warn!("Unknown error correction level '{}', using Medium", other);
                ErrorCorrectionLevel::Medium
            }
        }
    }
}

impl From<String> for ErrorCorrectionLevel {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<ErrorCorrectionLevel> for String {
    fn from(value: ErrorCorrectionLevel) -> Self {
        value.name().to_string()
    }
}

/// Content of a QR code item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrCodeContent {
    pub data: String,
    pub error_level: ErrorCorrectionLevel,
    pub foreground_color: SerializableColor,
    pub background_color: SerializableColor,
    pub margin: u32,
    /// Rendered symbol size in pixels.
    pub size: u32,
    pub quiet_zone: bool,
}

impl Default for QrCodeContent {
    fn default() -> Self {
        Self {
            data: "https://example.com".to_string(),
            error_level: ErrorCorrectionLevel::Medium,
            foreground_color: SerializableColor::black(),
            background_color: SerializableColor::white(),
            margin: 10,
            size: 200,
            quiet_zone: true,
        }
    }
}

impl ItemContent for QrCodeContent {
    const ITEM_TYPE: ItemType = ItemType::QrCode;

    fn default_size() -> Size {
        Size::new(200.0, 200.0)
    }

    fn default_name() -> &'static str {
        "QR Code"
    }

    fn write_xml(&self, node: &mut XmlNode) {
        node.set_attr("data", &self.data);
        node.set_attr("errorLevel", self.error_level.name());
        node.set_attr("foregroundColor", self.foreground_color.to_hex());
        node.set_attr("backgroundColor", self.background_color.to_hex());
        node.set_attr("margin", self.margin);
        node.set_attr("size", self.size);
        node.set_attr("quietZone", self.quiet_zone);
    }

    fn read_xml(node: &XmlNode) -> Self {
        let d = Self::default();
        Self {
            data: node.string_attr("data", &d.data),
            error_level: node
                .attr("errorLevel")
                .map(ErrorCorrectionLevel::from_name)
                .unwrap_or(d.error_level),
            foreground_color: node.color_attr("foregroundColor", d.foreground_color),
            background_color: node.color_attr("backgroundColor", d.background_color),
            margin: node.attr_or("margin", d.margin),
            size: node.attr_or("size", d.size),
            quiet_zone: node.bool_attr("quietZone", d.quiet_zone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_level_names() {
        assert_eq!(ErrorCorrectionLevel::from_name("High"), ErrorCorrectionLevel::High);
        assert_eq!(ErrorCorrectionLevel::from_name("bogus"), ErrorCorrectionLevel::Medium);
    }

    #[test]
    fn test_json_defaults_for_missing_fields() {
        let qr: QrCodeContent = serde_json::from_str(r#"{"data":"hi","errorLevel":"Quartile"}"#).unwrap();
        assert_eq!(qr.data, "hi");
        assert_eq!(qr.error_level, ErrorCorrectionLevel::Quartile);
        assert_eq!(qr.size, 200);
        assert!(qr.quiet_zone);
    }

    #[test]
    fn test_xml_roundtrip() {
        let qr = QrCodeContent {
            data: "https://example.com/?a=1&b=2".into(),
            error_level: ErrorCorrectionLevel::Low,
            quiet_zone: false,
            ..QrCodeContent::default()
        };
        let mut node = XmlNode::new("Item");
        qr.write_xml(&mut node);
        assert_eq!(QrCodeContent::read_xml(&node), qr);
    }
}
