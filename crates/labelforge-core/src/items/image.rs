//! Image item content.

use super::{ItemContent, ItemType, SerializableColor};
use crate::format::xml::XmlNode;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Image format for embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        None
    }
}

/// Content of an image item.
///
/// The picture is referenced by path and, when it did not come from a file,
/// embedded as base64 so the label stays self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub image_path: String,
    pub keep_aspect_ratio: bool,
    pub border_width: u32,
    pub border_color: SerializableColor,
    /// 0.0 = fully transparent, 1.0 = opaque.
    pub opacity: f64,
    pub gray_scale: bool,
    /// -100..=100
    pub brightness: i32,
    /// -100..=100
    pub contrast: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Default for ImageContent {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            keep_aspect_ratio: true,
            border_width: 0,
            border_color: SerializableColor::black(),
            opacity: 1.0,
            gray_scale: false,
            brightness: 0,
            contrast: 0,
            image_data: None,
        }
    }
}

impl ImageContent {
    /// Image referenced by file path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            image_path: path.into(),
            ..Self::default()
        }
    }

    /// Image embedded from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            image_data: Some(STANDARD.encode(data)),
            ..Self::default()
        }
    }

    /// Decoded embedded bytes, if any and if the base64 is well formed.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let data = self.image_data.as_deref()?;
        match STANDARD.decode(data) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Embedded image data is not valid base64: {}", e);
                None
            }
        }
    }

    /// Format of the embedded bytes, or of the path extension.
    pub fn format(&self) -> Option<ImageFormat> {
        if let Some(format) = self.bytes().and_then(|b| ImageFormat::from_magic_bytes(&b)) {
            return Some(format);
        }
        std::path::Path::new(&self.image_path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_brightness(&mut self, brightness: i32) {
        self.brightness = brightness.clamp(-100, 100);
    }

    pub fn set_contrast(&mut self, contrast: i32) {
        self.contrast = contrast.clamp(-100, 100);
    }
}

impl ItemContent for ImageContent {
    const ITEM_TYPE: ItemType = ItemType::Image;

    fn default_size() -> Size {
        Size::new(100.0, 100.0)
    }

    fn default_name() -> &'static str {
        "Image"
    }

    fn write_xml(&self, node: &mut XmlNode) {
        node.set_attr("imagePath", &self.image_path);
        node.set_attr("keepAspectRatio", self.keep_aspect_ratio);
        node.set_attr("borderWidth", self.border_width);
        node.set_attr("borderColor", self.border_color.to_hex());
        node.set_attr("opacity", self.opacity);
        node.set_attr("grayScale", self.gray_scale);
        node.set_attr("brightness", self.brightness);
        node.set_attr("contrast", self.contrast);
        if let Some(data) = &self.image_data {
            node.push_child(XmlNode::new("imageData").with_text(data));
        }
    }

    fn read_xml(node: &XmlNode) -> Self {
        let d = Self::default();
        Self {
            image_path: node.attr("imagePath").unwrap_or_default().to_string(),
            keep_aspect_ratio: node.bool_attr("keepAspectRatio", d.keep_aspect_ratio),
            border_width: node.attr_or("borderWidth", d.border_width),
            border_color: node.color_attr("borderColor", d.border_color),
            opacity: node.attr_or("opacity", d.opacity),
            gray_scale: node.bool_attr("grayScale", d.gray_scale),
            brightness: node.attr_or("brightness", d.brightness),
            contrast: node.attr_or("contrast", d.contrast),
            image_data: node
                .child("imageData")
                .map(|c| c.text().trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}
