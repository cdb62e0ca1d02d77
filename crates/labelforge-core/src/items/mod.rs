//! Label items placed on the page.
//!
//! A [`LabelItem`] carries the geometry every item shares (rect, rotation,
//! lock and visibility flags) plus an [`ItemKind`] payload with the
//! type-specific content.

mod barcode;
mod image;
mod qrcode;
mod text;

pub use barcode::{BarcodeContent, BarcodeType};
pub use image::{ImageContent, ImageFormat};
pub use qrcode::{ErrorCorrectionLevel, QrCodeContent};
pub use text::{Alignment, FontSpec, TextColors, TextContent, TextFormat};

use crate::format::xml::XmlNode;
use crate::selection::{self, HandleKind, HANDLE_SIZE, HANDLE_SPACE, ROTATE_HANDLE_DISTANCE};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = String;

/// Generate a fresh item id.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().to_string()
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid rounds up to 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Serializable color, persisted as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }
        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
                255,
            )),
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Hex form; the alpha byte is only written when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<String> for SerializableColor {
    fn from(value: String) -> Self {
        Self::from_hex(&value).unwrap_or_else(|| {
            log::warn!("Invalid color '{}', using black", value);
            Self::black()
        })
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Item type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Text,
    Image,
    Barcode,
    #[serde(rename = "qrcode")]
    QrCode,
}

impl ItemType {
    /// Tag used in both persisted forms.
    pub fn tag(self) -> &'static str {
        match self {
            ItemType::Text => "text",
            ItemType::Image => "image",
            ItemType::Barcode => "barcode",
            ItemType::QrCode => "qrcode",
        }
    }

    /// Look up a type by its persisted tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(ItemType::Text),
            "image" => Some(ItemType::Image),
            "barcode" => Some(ItemType::Barcode),
            "qrcode" => Some(ItemType::QrCode),
            _ => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-type content hooks used by construction and the tree-form codec.
///
/// The object form goes through serde on [`ItemKind`] directly.
pub trait ItemContent: Sized {
    /// Discriminator for this content type.
    const ITEM_TYPE: ItemType;

    /// Size of a freshly created item.
    fn default_size() -> Size;

    /// Name given to a freshly created item.
    fn default_name() -> &'static str;

    /// Write type-specific attributes and child elements onto an `<Item>`.
    fn write_xml(&self, node: &mut XmlNode);

    /// Read type-specific content back, falling back to defaults per field.
    fn read_xml(node: &XmlNode) -> Self;
}

/// Type-specific payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemKind {
    #[serde(rename = "text")]
    Text(TextContent),
    #[serde(rename = "image")]
    Image(ImageContent),
    #[serde(rename = "barcode")]
    Barcode(BarcodeContent),
    #[serde(rename = "qrcode")]
    QrCode(QrCodeContent),
}

impl ItemKind {
    /// Default content for a type.
    pub fn default_for(item_type: ItemType) -> Self {
        match item_type {
            ItemType::Text => ItemKind::Text(TextContent::default()),
            ItemType::Image => ItemKind::Image(ImageContent::default()),
            ItemType::Barcode => ItemKind::Barcode(BarcodeContent::default()),
            ItemType::QrCode => ItemKind::QrCode(QrCodeContent::default()),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::Text(_) => TextContent::ITEM_TYPE,
            ItemKind::Image(_) => ImageContent::ITEM_TYPE,
            ItemKind::Barcode(_) => BarcodeContent::ITEM_TYPE,
            ItemKind::QrCode(_) => QrCodeContent::ITEM_TYPE,
        }
    }

    pub fn default_size(&self) -> Size {
        match self {
            ItemKind::Text(_) => TextContent::default_size(),
            ItemKind::Image(_) => ImageContent::default_size(),
            ItemKind::Barcode(_) => BarcodeContent::default_size(),
            ItemKind::QrCode(_) => QrCodeContent::default_size(),
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            ItemKind::Text(_) => TextContent::default_name(),
            ItemKind::Image(_) => ImageContent::default_name(),
            ItemKind::Barcode(_) => BarcodeContent::default_name(),
            ItemKind::QrCode(_) => QrCodeContent::default_name(),
        }
    }

    pub(crate) fn write_xml(&self, node: &mut XmlNode) {
        match self {
            ItemKind::Text(c) => c.write_xml(node),
            ItemKind::Image(c) => c.write_xml(node),
            ItemKind::Barcode(c) => c.write_xml(node),
            ItemKind::QrCode(c) => c.write_xml(node),
        }
    }

    pub(crate) fn read_xml(item_type: ItemType, node: &XmlNode) -> Self {
        match item_type {
            ItemType::Text => ItemKind::Text(TextContent::read_xml(node)),
            ItemType::Image => ItemKind::Image(ImageContent::read_xml(node)),
            ItemType::Barcode => ItemKind::Barcode(BarcodeContent::read_xml(node)),
            ItemType::QrCode => ItemKind::QrCode(QrCodeContent::read_xml(node)),
        }
    }
}

/// A single element on the label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    id: ItemId,
    name: String,
    rect: Rect,
    /// Degrees, always in `[0, 360)`.
    rotation: f64,
    locked: bool,
    visible: bool,
    modified: bool,
    /// Bumped on every effective change.
    revision: u64,
    /// Mirrors the item's index in its document.
    z_order: usize,
    kind: ItemKind,
}

impl LabelItem {
    /// Create an item at the origin with the content's default size and name.
    pub fn new(kind: ItemKind) -> Self {
        let size = kind.default_size();
        Self {
            id: new_item_id(),
            name: kind.default_name().to_string(),
            rect: Rect::from_origin_size(Point::ZERO, size),
            rotation: 0.0,
            locked: false,
            visible: true,
            modified: false,
            revision: 0,
            z_order: 0,
            kind,
        }
    }

    /// Create a default item of the given type.
    pub fn of_type(item_type: ItemType) -> Self {
        Self::new(ItemKind::default_for(item_type))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ItemKind::Text(TextContent {
            text: text.into(),
            ..TextContent::default()
        }))
    }

    pub fn image(content: ImageContent) -> Self {
        Self::new(ItemKind::Image(content))
    }

    pub fn barcode(data: impl Into<String>, barcode_type: BarcodeType) -> Self {
        Self::new(ItemKind::Barcode(BarcodeContent {
            data: data.into(),
            barcode_type,
            ..BarcodeContent::default()
        }))
    }

    pub fn qrcode(data: impl Into<String>) -> Self {
        Self::new(ItemKind::QrCode(QrCodeContent {
            data: data.into(),
            ..QrCodeContent::default()
        }))
    }

    /// Replace the generated id. Empty ids are ignored.
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.id = id;
        }
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move the top-left corner to `position`, keeping the size.
    pub fn at(mut self, position: Point) -> Self {
        self.rect = Rect::from_origin_size(position, self.rect.size());
        self
    }

    /// Set the rect if it is valid; invalid rects are ignored.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        if is_valid_rect(rect) {
            self.rect = rect;
        }
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        if degrees.is_finite() {
            self.rotation = normalize_angle(degrees);
        }
        self
    }

    /// Copy with a fresh id, as used by duplicate and paste.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_item_id(),
            modified: false,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Point {
        self.rect.origin()
    }

    pub fn size(&self) -> Size {
        self.rect.size()
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Change counter, useful to detect whether a call altered the item.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }

    pub fn z_order(&self) -> usize {
        self.z_order
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    /// Local-to-document transform (rotation about the rect center).
    pub fn transform(&self) -> Affine {
        selection::item_transform(self.rect, self.rotation)
    }

    /// Map a document point into this item's unrotated frame.
    pub fn to_local(&self, point: Point) -> Point {
        selection::to_local(self.rect, self.rotation, point)
    }

    /// Rect padded for handles; rotated items get the enclosing square of
    /// the padded rect's diagonal.
    pub fn bounding_box(&self) -> Rect {
        selection::decorated_bounds(self.rect, self.rotation, HANDLE_SIZE + HANDLE_SPACE)
    }

    /// Rotation-aware point containment.
    pub fn contains(&self, point: Point) -> bool {
        selection::rotated_contains(self.rect, self.rotation, point)
    }

    /// Handle under `point`, using the default handle metrics.
    pub fn handle_at(&self, point: Point) -> Option<HandleKind> {
        selection::hit_handle(self.rect, self.rotation, point, HANDLE_SIZE, ROTATE_HANDLE_DISTANCE)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.touch();
        }
    }

    /// Move the top-left corner. Rejected for locked items.
    pub fn set_position(&mut self, position: Point) -> bool {
        if self.locked {
            return false;
        }
        self.restore_rect(Rect::from_origin_size(position, self.rect.size()))
    }

    /// Translate by `delta`. Rejected for locked items.
    pub fn move_by(&mut self, delta: Vec2) -> bool {
        if self.locked {
            return false;
        }
        self.restore_rect(self.rect + delta)
    }

    /// Resize keeping the top-left corner. Rejects non-positive sizes.
    pub fn set_size(&mut self, size: Size) -> bool {
        if self.locked {
            return false;
        }
        self.restore_rect(Rect::from_origin_size(self.rect.origin(), size))
    }

    /// Replace the rect. Rejects non-positive sizes and locked items.
    pub fn set_rect(&mut self, rect: Rect) -> bool {
        if self.locked {
            return false;
        }
        self.restore_rect(rect)
    }

    /// Set the rotation in degrees, normalized to `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if self.locked {
            return false;
        }
        self.restore_rotation(degrees)
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            self.locked = locked;
            self.touch();
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.touch();
        }
    }

    /// Swap in new content of the same type, returning the old content.
    pub fn replace_content(&mut self, kind: ItemKind) -> Result<ItemKind, ItemKind> {
        if kind.item_type() != self.item_type() {
            return Err(kind);
        }
        self.touch();
        Ok(std::mem::replace(&mut self.kind, kind))
    }

    /// Geometry write that ignores the lock. History replay goes through
    /// here since it restores a state that was valid when recorded.
    pub(crate) fn restore_rect(&mut self, rect: Rect) -> bool {
        if !is_valid_rect(rect) {
            return false;
        }
        if self.rect != rect {
            self.rect = rect;
            self.touch();
        }
        true
    }

    pub(crate) fn restore_rotation(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        let degrees = normalize_angle(degrees);
        if self.rotation != degrees {
            self.rotation = degrees;
            self.touch();
        }
        true
    }

    pub(crate) fn set_z_order(&mut self, z: usize) {
        self.z_order = z;
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Assemble a loaded item without going through the validating setters.
    pub(crate) fn from_parts(
        id: ItemId,
        name: String,
        rect: Rect,
        rotation: f64,
        locked: bool,
        visible: bool,
        kind: ItemKind,
    ) -> Self {
        let mut item = Self::new(kind).with_id(id).with_rect(rect).with_rotation(rotation);
        item.name = name;
        item.locked = locked;
        item.visible = visible;
        item
    }
}

/// Finite and with strictly positive width and height.
pub fn is_valid_rect(rect: Rect) -> bool {
    rect.is_finite() && rect.width() > 0.0 && rect.height() > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Corner;

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(725.0), 5.0);
        assert!(normalize_angle(-1e-18) < 360.0);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(
            SerializableColor::from_hex("#FF000080"),
            Some(SerializableColor::new(255, 0, 0, 128))
        );
        assert_eq!(SerializableColor::from_hex("#12"), None);
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::black().to_hex(), "#000000");
        assert_eq!(SerializableColor::transparent().to_hex(), "#00000000");
    }

    #[test]
    fn test_color_peniko_roundtrip() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_default_sizes_and_names() {
        let text = LabelItem::of_type(ItemType::Text);
        assert_eq!(text.rect(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(text.name(), "Text");

        let qr = LabelItem::of_type(ItemType::QrCode);
        assert_eq!(qr.size(), Size::new(200.0, 200.0));
        assert_eq!(qr.item_type(), ItemType::QrCode);
    }

    #[test]
    fn test_unique_ids() {
        let a = LabelItem::text("a");
        let b = LabelItem::text("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_set_size_rejects_non_positive() {
        let mut item = LabelItem::text("x");
        assert!(!item.set_size(Size::new(0.0, 10.0)));
        assert!(!item.set_size(Size::new(10.0, -5.0)));
        assert_eq!(item.size(), Size::new(100.0, 50.0));
        assert!(!item.is_modified());

        assert!(item.set_size(Size::new(30.0, 20.0)));
        assert!(item.is_modified());
    }

    #[test]
    fn test_rotation_is_normalized() {
        let mut item = LabelItem::text("x");
        assert!(item.set_rotation(-45.0));
        assert_eq!(item.rotation(), 315.0);
        assert!(!item.set_rotation(f64::NAN));
        assert_eq!(item.rotation(), 315.0);
    }

    #[test]
    fn test_locked_rejects_geometry() {
        let mut item = LabelItem::text("x");
        item.set_locked(true);
        assert!(!item.move_by(Vec2::new(5.0, 5.0)));
        assert!(!item.set_rect(Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert!(!item.set_rotation(30.0));
        assert_eq!(item.rect(), Rect::new(0.0, 0.0, 100.0, 50.0));

        item.set_visible(false);
        assert!(!item.is_visible());
    }

    #[test]
    fn test_contains_rotated() {
        let item = LabelItem::text("x").with_rotation(90.0);
        assert!(item.contains(Point::new(60.0, 10.0)));
        assert!(!item.contains(Point::new(10.0, 60.0)));
    }

    #[test]
    fn test_handle_at() {
        let item = LabelItem::text("x").at(Point::new(10.0, 10.0));
        assert_eq!(
            item.handle_at(Point::new(110.0, 60.0)),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(item.handle_at(Point::new(60.0, -10.0)), Some(HandleKind::Rotate));
    }

    #[test]
    fn test_replace_content_requires_same_type() {
        let mut item = LabelItem::text("a");
        let qr = ItemKind::default_for(ItemType::QrCode);
        assert!(item.replace_content(qr).is_err());

        let new_text = ItemKind::Text(TextContent {
            text: "b".into(),
            ..TextContent::default()
        });
        let old = item.replace_content(new_text).unwrap();
        assert!(matches!(old, ItemKind::Text(ref t) if t.text == "a"));
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let item = LabelItem::barcode("123", BarcodeType::Code39);
        let copy = item.duplicate();
        assert_ne!(copy.id(), item.id());
        assert_eq!(copy.kind(), item.kind());
        assert_eq!(copy.rect(), item.rect());
    }
}
