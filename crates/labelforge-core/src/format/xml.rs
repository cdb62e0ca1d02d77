//! Tree form: a `<Label>` root with an `<Items>` container.
//!
//! Parsing goes through a small owned element tree ([`XmlNode`]) so item
//! content types can read attributes and children without touching the
//! event stream.

use super::{FORMAT_VERSION, FormatError, ItemFields, build_item, parse_item_type, push_loaded};
use crate::document::LabelDocument;
use crate::items::{ItemKind, LabelItem, SerializableColor};
use crate::page::{Margins, Orientation, PageSettings, PageSize};
use kurbo::Size;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

const ROOT_TAG: &str = "Label";
const ITEMS_TAG: &str = "Items";
const ITEM_TAG: &str = "Item";

fn xml_error(e: impl Display) -> FormatError {
    FormatError::Xml(e.to_string())
}

/// An element with its attributes, child elements and text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    /// In document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    text: String,
    /// Write the text as a CDATA section.
    cdata: bool,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a numeric or keyword attribute, falling back to `default` when
    /// absent or malformed. Surrounding whitespace is ignored.
    pub fn attr_or<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.attr(key) {
            None => default,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Invalid value '{}' for {}.{}", raw, self.name, key);
                default
            }),
        }
    }

    /// Free text attribute, exactly as written.
    pub fn string_attr(&self, key: &str, default: &str) -> String {
        self.attr(key).unwrap_or(default).to_string()
    }

    /// Booleans are written as `true`/`false`; anything else but `true` reads
    /// as false.
    pub fn bool_attr(&self, key: &str, default: bool) -> bool {
        self.attr(key).map_or(default, |v| v == "true")
    }

    pub fn color_attr(&self, key: &str, default: SerializableColor) -> SerializableColor {
        self.attr(key)
            .and_then(SerializableColor::from_hex)
            .unwrap_or(default)
    }

    /// Parse a required attribute strictly.
    fn parse_attr<T: FromStr>(&self, key: &str, default: T) -> Result<T, FormatError> {
        match self.attr(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| FormatError::InvalidAttribute {
                name: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.cdata = false;
        self
    }

    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.cdata = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the root element of a document.
    pub fn parse(input: &str) -> Result<XmlNode, FormatError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => stack.push(node_from_start(&start)?),
                Event::Empty(start) => {
                    let node = node_from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
                Event::End(_) => {
                    let Some(node) = stack.pop() else {
                        return Err(FormatError::Xml("unbalanced end tag".to_string()));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
                Event::Text(text) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(node) = stack.last_mut() {
                        let raw = data.into_inner();
                        node.text.push_str(std::str::from_utf8(&raw).map_err(xml_error)?);
                        node.cdata = true;
                    }
                }
                Event::Eof => {
                    return Err(match stack.first() {
                        Some(open) => FormatError::Xml(format!("unclosed element <{}>", open.name)),
                        None => FormatError::Xml("document has no root element".to_string()),
                    });
                }
                _ => {}
            }
        }
    }

    /// Write this element and its subtree.
    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), FormatError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            let value = escape_attr(value);
            start.push_attribute((key.as_bytes(), value.as_bytes()));
        }
        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }
        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        if !self.text.is_empty() {
            // Text events are trimmed on read, so padded text goes in CDATA.
            if self.cdata || self.text.trim() != self.text {
                for section in cdata_sections(&self.text) {
                    writer
                        .write_event(Event::CData(BytesCData::new(section)))
                        .map_err(xml_error)?;
                }
            } else {
                writer
                    .write_event(Event::Text(BytesText::new(self.text.as_str())))
                    .map_err(xml_error)?;
            }
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

/// Escape an attribute value, keeping line breaks and tabs as character
/// references so readers that normalize attribute whitespace keep them.
fn escape_attr(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Split text so no section contains the CDATA terminator. The `]]` and `>`
/// of each terminator land in adjacent sections.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find("]]>") {
        sections.push(&rest[..at + 2]);
        rest = &rest[at + 2..];
    }
    sections.push(rest);
    sections
}

fn node_from_start(start: &BytesStart<'_>) -> Result<XmlNode, FormatError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(xml_error)?
        .to_string();
    let mut node = XmlNode::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_error)?.to_string();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn page_to_xml(page: &PageSettings, root: &mut XmlNode) {
    root.set_attr("version", FORMAT_VERSION);
    root.set_attr("pageSize", page.page_size.code());
    root.set_attr("orientation", page.orientation.code());
    root.set_attr("customWidth", page.custom_size.width);
    root.set_attr("customHeight", page.custom_size.height);
    root.set_attr("dpi", page.dpi);
    root.set_attr("marginLeft", page.margins.left);
    root.set_attr("marginTop", page.margins.top);
    root.set_attr("marginRight", page.margins.right);
    root.set_attr("marginBottom", page.margins.bottom);
}

fn page_from_xml(root: &XmlNode) -> Result<PageSettings, FormatError> {
    let d = PageSettings::default();
    Ok(PageSettings {
        page_size: PageSize::from_code(root.parse_attr("pageSize", d.page_size.code())?),
        orientation: Orientation::from_code(root.parse_attr("orientation", d.orientation.code())?),
        custom_size: Size::new(
            root.parse_attr("customWidth", d.custom_size.width)?,
            root.parse_attr("customHeight", d.custom_size.height)?,
        ),
        dpi: root.parse_attr("dpi", d.dpi)?,
        margins: Margins {
            left: root.parse_attr("marginLeft", d.margins.left)?,
            top: root.parse_attr("marginTop", d.margins.top)?,
            right: root.parse_attr("marginRight", d.margins.right)?,
            bottom: root.parse_attr("marginBottom", d.margins.bottom)?,
        },
    })
}

fn item_to_xml(item: &LabelItem) -> XmlNode {
    let rect = item.rect();
    let mut node = XmlNode::new(ITEM_TAG)
        .with_attr("type", item.item_type().tag())
        .with_attr("id", item.id())
        .with_attr("name", item.name())
        .with_attr("x", rect.x0)
        .with_attr("y", rect.y0)
        .with_attr("width", rect.width())
        .with_attr("height", rect.height())
        .with_attr("rotation", item.rotation())
        .with_attr("locked", item.is_locked())
        .with_attr("visible", item.is_visible());
    item.kind().write_xml(&mut node);
    node
}

fn item_from_xml(node: &XmlNode) -> Option<LabelItem> {
    let item_type = parse_item_type(node.attr("type").unwrap_or_default())?;
    let kind = ItemKind::read_xml(item_type, node);
    let fields = ItemFields {
        id: node.attr("id").unwrap_or_default().to_string(),
        name: node.attr("name").map(str::to_string),
        x: node.attr_or("x", 0.0),
        y: node.attr_or("y", 0.0),
        width: node.attr("width").and_then(|v| v.trim().parse().ok()),
        height: node.attr("height").and_then(|v| v.trim().parse().ok()),
        rotation: node.attr_or("rotation", 0.0),
        locked: node.bool_attr("locked", false),
        visible: node.bool_attr("visible", true),
    };
    build_item(fields, kind)
}

/// Build the full element tree for a document.
pub fn document_to_xml(doc: &LabelDocument) -> XmlNode {
    let mut root = XmlNode::new(ROOT_TAG);
    page_to_xml(doc.page_settings(), &mut root);
    let mut items = XmlNode::new(ITEMS_TAG);
    for item in doc.items() {
        items.push_child(item_to_xml(item));
    }
    root.push_child(items);
    root
}

pub fn write_document<W: Write>(doc: &LabelDocument, writer: W) -> Result<(), FormatError> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    document_to_xml(doc).write(&mut writer)?;
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

pub fn read_document(input: &str) -> Result<LabelDocument, FormatError> {
    let root = XmlNode::parse(input)?;
    if root.name != ROOT_TAG {
        return Err(FormatError::MissingElement(ROOT_TAG.to_string()));
    }
    if let Some(version) = root.attr("version") {
        if version != FORMAT_VERSION {
            log::warn!("Reading label version {} as {}", version, FORMAT_VERSION);
        }
    }
    let page = page_from_xml(&root)?;
    let items = root
        .child(ITEMS_TAG)
        .ok_or_else(|| FormatError::MissingElement(ITEMS_TAG.to_string()))?;

    let mut doc = LabelDocument::new();
    doc.set_page_settings(page);
    for node in items.children_named(ITEM_TAG) {
        if let Some(item) = item_from_xml(node) {
            push_loaded(&mut doc, item);
        }
    }
    doc.reset_modified();
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{BarcodeType, ItemType};
    use kurbo::Point;

    #[test]
    fn test_node_parse() {
        let root = XmlNode::parse(
            r#"<?xml version="1.0"?>
            <a x="1" flag="true">
                <b>hello &amp; bye</b>
                <c/>
                <d><![CDATA[<raw>]]></d>
            </a>"#,
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr_or("x", 0), 1);
        assert!(root.bool_attr("flag", false));
        assert_eq!(root.child("b").unwrap().text(), "hello & bye");
        assert!(root.child("c").is_some());
        assert_eq!(root.child("d").unwrap().text(), "<raw>");
    }

    #[test]
    fn test_node_write_escapes() {
        let node = XmlNode::new("n")
            .with_attr("q", "a\"b<c")
            .with_text("x < y");
        let mut writer = Writer::new(Vec::new());
        node.write(&mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let back = XmlNode::parse(&text).unwrap();
        assert_eq!(back.attr("q"), Some("a\"b<c"));
        assert_eq!(back.text(), "x < y");
    }

    fn reparse(node: &XmlNode) -> XmlNode {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        node.write(&mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        XmlNode::parse(&text).unwrap()
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        assert_eq!(cdata_sections("a ]]> b ]]>"), ["a ]]", "> b ]]", ">"]);
        let node = XmlNode::new("t").with_cdata("  a ]]> b\n");
        assert_eq!(reparse(&node).text(), "  a ]]> b\n");
    }

    #[test]
    fn test_padded_text_survives() {
        let mut root = XmlNode::new("r");
        root.push_child(XmlNode::new("t").with_text("\n x \n"));
        assert_eq!(reparse(&root).child("t").unwrap().text(), "\n x \n");
    }

    #[test]
    fn test_attribute_whitespace_survives() {
        let node = XmlNode::new("n")
            .with_attr("data", " 12345 ")
            .with_attr("card", "BEGIN:VCARD\r\nFN:Ann\tB\nEND:VCARD\n");
        let back = reparse(&node);
        assert_eq!(back.string_attr("data", ""), " 12345 ");
        assert_eq!(back.attr("card"), Some("BEGIN:VCARD\r\nFN:Ann\tB\nEND:VCARD\n"));
        assert_eq!(back.string_attr("missing", "dflt"), "dflt");
    }

    #[test]
    fn test_attr_fallbacks() {
        let node = XmlNode::new("n").with_attr("w", "wide").with_attr("b", "yes");
        assert_eq!(node.attr_or("w", 3.5), 3.5);
        assert!(!node.bool_attr("b", true));
        assert!(node.bool_attr("missing", true));
    }

    #[test]
    fn test_document_shape() {
        let mut doc = LabelDocument::new();
        doc.create_barcode_item("ABC", BarcodeType::Code39, Point::new(1.5, 2.0));
        let mut buf = Vec::new();
        write_document(&doc, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<Label version=\"1.0\" pageSize=\"0\""));
        assert!(text.contains("type=\"barcode\""));
        assert!(text.contains("x=\"1.5\""));
        assert!(text.contains("barcodeType=\"Code 39\""));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = read_document("<Drawing><Items/></Drawing>").unwrap_err();
        assert!(matches!(err, FormatError::MissingElement(ref e) if e == "Label"));
    }

    #[test]
    fn test_missing_items_rejected() {
        let err = read_document(r#"<Label version="1.0"/>"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingElement(ref e) if e == "Items"));
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(matches!(read_document("<Label><Items>"), Err(FormatError::Xml(_))));
        assert!(matches!(read_document(""), Err(FormatError::Xml(_))));
        assert!(matches!(
            read_document(r#"<Label dpi="lots"><Items/></Label>"#),
            Err(FormatError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_unknown_and_duplicate_items_skipped() {
        let doc = read_document(
            r#"<Label version="1.0"><Items>
                <Item type="text" id="a" x="0" y="0" width="50" height="20"/>
                <Item type="ellipse" id="b"/>
                <Item type="qrcode" id="a"/>
                <Item type="qrcode" id="c" width="0"/>
                <Item type="qrcode" id="d" locked="1"/>
            </Items></Label>"#,
        )
        .unwrap();
        let ids: Vec<&str> = doc.items().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["a", "d"]);
        let qr = doc.item_by_id("d").unwrap();
        assert_eq!(qr.item_type(), ItemType::QrCode);
        assert!(!qr.is_locked());
        assert!(qr.is_visible());
        assert!(!doc.is_modified());
    }
}
