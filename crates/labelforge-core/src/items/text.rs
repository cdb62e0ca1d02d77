//! Text item content.

use super::{ItemContent, ItemType, SerializableColor};
use crate::format::xml::XmlNode;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Font description shared by text and barcode captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub point_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            point_size: 12,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

impl FontSpec {
    pub(crate) fn write_xml(&self, with_underline: bool) -> XmlNode {
        let mut node = XmlNode::new("font")
            .with_attr("family", &self.family)
            .with_attr("pointSize", self.point_size)
            .with_attr("bold", self.bold)
            .with_attr("italic", self.italic);
        if with_underline {
            node.set_attr("underline", self.underline);
        }
        node
    }

    pub(crate) fn read_xml(node: &XmlNode, default: &FontSpec) -> Self {
        Self {
            family: node.string_attr("family", &default.family),
            point_size: node.attr_or("pointSize", default.point_size),
            bold: node.bool_attr("bold", false),
            italic: node.bool_attr("italic", false),
            underline: node.bool_attr("underline", false),
        }
    }
}

/// Alignment flags, bit-compatible with the values stored in label files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alignment(pub u32);

impl Alignment {
    pub const LEFT: u32 = 0x0001;
    pub const RIGHT: u32 = 0x0002;
    pub const H_CENTER: u32 = 0x0004;
    pub const JUSTIFY: u32 = 0x0008;
    pub const TOP: u32 = 0x0020;
    pub const BOTTOM: u32 = 0x0040;
    pub const V_CENTER: u32 = 0x0080;
    pub const CENTER: u32 = Self::H_CENTER | Self::V_CENTER;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment(Self::LEFT | Self::TOP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextColors {
    pub text: SerializableColor,
    pub background: SerializableColor,
    pub border: SerializableColor,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            text: SerializableColor::black(),
            background: SerializableColor::transparent(),
            border: SerializableColor::black(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextFormat {
    pub alignment: Alignment,
    pub word_wrap: bool,
    pub border_width: u32,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            alignment: Alignment::default(),
            word_wrap: true,
            border_width: 0,
        }
    }
}

/// Content of a text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub text: String,
    pub font: FontSpec,
    pub colors: TextColors,
    pub format: TextFormat,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: "Double-click to edit".to_string(),
            font: FontSpec::default(),
            colors: TextColors::default(),
            format: TextFormat::default(),
        }
    }
}

impl ItemContent for TextContent {
    const ITEM_TYPE: ItemType = ItemType::Text;

    fn default_size() -> Size {
        Size::new(100.0, 50.0)
    }

    fn default_name() -> &'static str {
        "Text"
    }

    fn write_xml(&self, node: &mut XmlNode) {
        node.push_child(XmlNode::new("text").with_cdata(&self.text));
        node.push_child(self.font.write_xml(true));
        node.push_child(
            XmlNode::new("colors")
                .with_attr("text", self.colors.text.to_hex())
                .with_attr("background", self.colors.background.to_hex())
                .with_attr("border", self.colors.border.to_hex()),
        );
        node.push_child(
            XmlNode::new("format")
                .with_attr("alignment", self.format.alignment.0)
                .with_attr("wordWrap", self.format.word_wrap)
                .with_attr("borderWidth", self.format.border_width),
        );
    }

    fn read_xml(node: &XmlNode) -> Self {
        let defaults = Self::default();
        let text = node
            .child("text")
            .map(|t| t.text().to_string())
            .unwrap_or_default();
        let font = node
            .child("font")
            .map(|f| FontSpec::read_xml(f, &defaults.font))
            .unwrap_or(defaults.font);
        let colors = node
            .child("colors")
            .map(|c| TextColors {
                text: c.color_attr("text", defaults.colors.text),
                background: c.color_attr("background", defaults.colors.background),
                border: c.color_attr("border", defaults.colors.border),
            })
            .unwrap_or(defaults.colors);
        let format = node
            .child("format")
            .map(|f| TextFormat {
                alignment: Alignment(f.attr_or("alignment", defaults.format.alignment.0)),
                word_wrap: f.bool_attr("wordWrap", defaults.format.word_wrap),
                border_width: f.attr_or("borderWidth", defaults.format.border_width),
            })
            .unwrap_or(defaults.format);
        Self {
            text,
            font,
            colors,
            format,
        }
    }
}
