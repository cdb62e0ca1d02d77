//! Concrete item commands.

use super::{Command, ItemSlot};
use crate::document::LabelDocument;
use crate::items::{ItemId, ItemKind, ItemType, LabelItem};
use kurbo::{Point, Rect};

/// Add a detached item to the document.
#[derive(Debug)]
pub struct AddItemCommand {
    slot: ItemSlot,
    item_type: ItemType,
    /// Position to restore on redo, recorded by undo.
    index: Option<usize>,
}

impl AddItemCommand {
    pub fn new(item: LabelItem) -> Self {
        Self::from_box(Box::new(item))
    }

    pub fn from_box(item: Box<LabelItem>) -> Self {
        Self {
            item_type: item.item_type(),
            slot: ItemSlot::Detached(item),
            index: None,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        self.slot.id()
    }

    pub fn slot(&self) -> &ItemSlot {
        &self.slot
    }
}

impl Command for AddItemCommand {
    fn description(&self) -> String {
        format!("Add {}", self.item_type)
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        let attached = self.slot.attach(doc, self.index);
        if !attached {
            log::warn!("Could not add item {}", self.slot.id());
        }
        attached
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        self.index = self.slot.detach(doc);
    }

    fn owned_items(&self) -> Vec<ItemId> {
        if self.slot.is_detached() {
            vec![self.slot.id().clone()]
        } else {
            Vec::new()
        }
    }
}

/// Take an item out of the document; undo puts it back at the same index.
#[derive(Debug)]
pub struct RemoveItemCommand {
    slot: ItemSlot,
    index: Option<usize>,
}

impl RemoveItemCommand {
    pub fn new(id: &str) -> Self {
        Self {
            slot: ItemSlot::InDocument(id.to_string()),
            index: None,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        self.slot.id()
    }

    pub fn slot(&self) -> &ItemSlot {
        &self.slot
    }
}

impl Command for RemoveItemCommand {
    fn description(&self) -> String {
        "Delete Item".to_string()
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        self.index = self.slot.detach(doc);
        if self.index.is_none() {
            log::warn!("Item {} is not in the document", self.slot.id());
        }
        self.index.is_some()
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        if self.slot.is_detached() && !self.slot.attach(doc, self.index) {
            log::warn!("Could not restore item {}", self.slot.id());
        }
    }

    fn owned_items(&self) -> Vec<ItemId> {
        if self.slot.is_detached() {
            vec![self.slot.id().clone()]
        } else {
            Vec::new()
        }
    }
}

/// Change an item's stacking position.
#[derive(Debug)]
pub struct ReorderItemCommand {
    id: ItemId,
    old_index: usize,
    new_index: usize,
}

impl ReorderItemCommand {
    pub fn new(id: &str, old_index: usize, new_index: usize) -> Self {
        Self {
            id: id.to_string(),
            old_index,
            new_index,
        }
    }
}

impl Command for ReorderItemCommand {
    fn description(&self) -> String {
        if self.new_index > self.old_index {
            "Bring Forward".to_string()
        } else {
            "Send Backward".to_string()
        }
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        doc.reorder_item(&self.id, self.new_index)
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        doc.reorder_item(&self.id, self.old_index);
    }
}

/// Translate an item between two top-left positions.
#[derive(Debug)]
pub struct MoveItemCommand {
    id: ItemId,
    old_position: Point,
    new_position: Point,
}

impl MoveItemCommand {
    pub fn new(id: &str, old_position: Point, new_position: Point) -> Self {
        Self {
            id: id.to_string(),
            old_position,
            new_position,
        }
    }

    fn apply(&self, doc: &mut LabelDocument, position: Point) -> bool {
        let Some(size) = doc.item_by_id(&self.id).map(|i| i.size()) else {
            log::warn!("Item {} is not in the document", self.id);
            return false;
        };
        doc.restore_item_rect(&self.id, Rect::from_origin_size(position, size))
    }
}

impl Command for MoveItemCommand {
    fn description(&self) -> String {
        "Move Item".to_string()
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        self.apply(doc, self.new_position)
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        self.apply(doc, self.old_position);
    }
}

#[derive(Debug)]
pub struct ResizeItemCommand {
    id: ItemId,
    old_rect: Rect,
    new_rect: Rect,
}

impl ResizeItemCommand {
    pub fn new(id: &str, old_rect: Rect, new_rect: Rect) -> Self {
        Self {
            id: id.to_string(),
            old_rect,
            new_rect,
        }
    }
}

impl Command for ResizeItemCommand {
    fn description(&self) -> String {
        "Resize Item".to_string()
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        doc.restore_item_rect(&self.id, self.new_rect)
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        doc.restore_item_rect(&self.id, self.old_rect);
    }
}

#[derive(Debug)]
pub struct RotateItemCommand {
    id: ItemId,
    old_rotation: f64,
    new_rotation: f64,
}

impl RotateItemCommand {
    pub fn new(id: &str, old_rotation: f64, new_rotation: f64) -> Self {
        Self {
            id: id.to_string(),
            old_rotation,
            new_rotation,
        }
    }
}

impl Command for RotateItemCommand {
    fn description(&self) -> String {
        "Rotate Item".to_string()
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        doc.restore_item_rotation(&self.id, self.new_rotation)
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        doc.restore_item_rotation(&self.id, self.old_rotation);
    }
}

/// Replace an item's type-specific content, e.g. after editing its text.
#[derive(Debug)]
pub struct EditContentCommand {
    id: ItemId,
    old: ItemKind,
    new: ItemKind,
}

impl EditContentCommand {
    pub fn new(id: &str, old: ItemKind, new: ItemKind) -> Self {
        Self {
            id: id.to_string(),
            old,
            new,
        }
    }

    /// Capture the current content as the undo state.
    pub fn from_document(doc: &LabelDocument, id: &str, new: ItemKind) -> Option<Self> {
        let item = doc.item_by_id(id)?;
        if item.item_type() != new.item_type() {
            return None;
        }
        Some(Self::new(id, item.kind().clone(), new))
    }
}

impl Command for EditContentCommand {
    fn description(&self) -> String {
        format!("Edit {}", self.new.item_type())
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        doc.set_item_content(&self.id, self.new.clone()).is_some()
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        doc.set_item_content(&self.id, self.old.clone());
    }
}

/// Item flags and name editable through the history.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemProperty {
    Name(String),
    Locked(bool),
    Visible(bool),
}

impl ItemProperty {
    fn read(&self, item: &LabelItem) -> Self {
        match self {
            ItemProperty::Name(_) => ItemProperty::Name(item.name().to_string()),
            ItemProperty::Locked(_) => ItemProperty::Locked(item.is_locked()),
            ItemProperty::Visible(_) => ItemProperty::Visible(item.is_visible()),
        }
    }

    fn write(&self, doc: &mut LabelDocument, id: &str) -> bool {
        match self {
            ItemProperty::Name(name) => doc.set_item_name(id, name),
            ItemProperty::Locked(locked) => doc.set_item_locked(id, *locked),
            ItemProperty::Visible(visible) => doc.set_item_visible(id, *visible),
        }
    }
}

#[derive(Debug)]
pub struct SetPropertyCommand {
    id: ItemId,
    old: ItemProperty,
    new: ItemProperty,
}

impl SetPropertyCommand {
    pub fn new(doc: &LabelDocument, id: &str, new: ItemProperty) -> Option<Self> {
        let item = doc.item_by_id(id)?;
        Some(Self {
            id: id.to_string(),
            old: new.read(item),
            new,
        })
    }
}

impl Command for SetPropertyCommand {
    fn description(&self) -> String {
        match &self.new {
            ItemProperty::Name(_) => "Rename Item".to_string(),
            ItemProperty::Locked(true) => "Lock Item".to_string(),
            ItemProperty::Locked(false) => "Unlock Item".to_string(),
            ItemProperty::Visible(true) => "Show Item".to_string(),
            ItemProperty::Visible(false) => "Hide Item".to_string(),
        }
    }

    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        self.new.write(doc, &self.id)
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        self.old.write(doc, &self.id);
    }
}

/// Several commands applied as one history entry.
#[derive(Debug)]
pub struct CompositeCommand {
    description: String,
    children: Vec<Box<dyn Command>>,
}

impl CompositeCommand {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(description: impl Into<String>, children: Vec<Box<dyn Command>>) -> Self {
        Self {
            description: description.into(),
            children,
        }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.children.push(command);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Collapse to the single child when there is only one.
    pub fn simplify(mut self) -> Box<dyn Command> {
        if self.children.len() == 1 {
            if let Some(only) = self.children.pop() {
                return only;
            }
        }
        Box::new(self)
    }
}

impl Command for CompositeCommand {
    fn description(&self) -> String {
        self.description.clone()
    }

    /// Applied when at least one child applied.
    fn execute(&mut self, doc: &mut LabelDocument) -> bool {
        let mut applied = false;
        for child in &mut self.children {
            applied |= child.execute(doc);
        }
        applied
    }

    fn undo(&mut self, doc: &mut LabelDocument) {
        for child in self.children.iter_mut().rev() {
            child.undo(doc);
        }
    }

    fn owned_items(&self) -> Vec<ItemId> {
        self.children.iter().flat_map(|c| c.owned_items()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::TextContent;
    use kurbo::Vec2;

    fn doc_abc() -> (LabelDocument, Vec<ItemId>) {
        let mut doc = LabelDocument::new();
        let ids = ["A", "B", "C"]
            .iter()
            .map(|n| {
                let item = Box::new(LabelItem::text(*n).with_name(*n));
                let id = item.id().clone();
                doc.add_item(item);
                id
            })
            .collect();
        (doc, ids)
    }

    fn ptr(doc: &LabelDocument, id: &str) -> *const LabelItem {
        doc.item_by_id(id).map(|i| i as *const LabelItem).unwrap()
    }

    #[test]
    fn test_add_flips_ownership() {
        let mut doc = LabelDocument::new();
        let mut cmd = AddItemCommand::new(LabelItem::text("x"));
        let id = cmd.item_id().clone();
        assert!(cmd.slot().is_detached());
        assert_eq!(cmd.owned_items(), vec![id.clone()]);

        cmd.execute(&mut doc);
        assert!(!cmd.slot().is_detached());
        assert!(cmd.owned_items().is_empty());
        let first = ptr(&doc, &id);

        cmd.undo(&mut doc);
        assert!(cmd.slot().is_detached());
        assert!(doc.is_empty());

        cmd.execute(&mut doc);
        assert_eq!(ptr(&doc, &id), first);
    }

    #[test]
    fn test_add_with_taken_id_reports_failure() {
        let (mut doc, ids) = doc_abc();
        let mut cmd = AddItemCommand::new(LabelItem::text("dup").with_id(ids[0].clone()));
        assert!(!cmd.execute(&mut doc));
        assert_eq!(doc.item_count(), 3);
        assert!(cmd.slot().is_detached());
    }

    #[test]
    fn test_remove_restores_index_and_identity() {
        let (mut doc, ids) = doc_abc();
        let before = ptr(&doc, &ids[1]);
        let mut cmd = RemoveItemCommand::new(&ids[1]);
        cmd.execute(&mut doc);
        assert_eq!(doc.item_count(), 2);
        assert!(cmd.slot().is_detached());

        cmd.undo(&mut doc);
        assert_eq!(doc.index_of(&ids[1]), Some(1));
        assert_eq!(ptr(&doc, &ids[1]), before);
        assert_eq!(doc.item_at(1).unwrap().z_order(), 1);
    }

    #[test]
    fn test_remove_missing_item_is_harmless() {
        let (mut doc, _) = doc_abc();
        let mut cmd = RemoveItemCommand::new("missing");
        assert!(!cmd.execute(&mut doc));
        cmd.undo(&mut doc);
        assert_eq!(doc.item_count(), 3);
    }

    #[test]
    fn test_reorder() {
        let (mut doc, ids) = doc_abc();
        let mut cmd = ReorderItemCommand::new(&ids[0], 0, 2);
        cmd.execute(&mut doc);
        assert_eq!(doc.index_of(&ids[0]), Some(2));
        cmd.undo(&mut doc);
        assert_eq!(doc.index_of(&ids[0]), Some(0));
        assert_eq!(cmd.description(), "Bring Forward");
    }

    #[test]
    fn test_geometry_commands_bypass_lock() {
        let (mut doc, ids) = doc_abc();
        let id = &ids[0];
        doc.move_item_by(id, Vec2::new(5.0, 5.0));
        doc.set_item_locked(id, true);

        let mut mv = MoveItemCommand::new(id, Point::ZERO, Point::new(5.0, 5.0));
        mv.undo(&mut doc);
        assert_eq!(doc.item_by_id(id).unwrap().position(), Point::ZERO);

        let mut rs = ResizeItemCommand::new(id, Rect::new(0.0, 0.0, 100.0, 50.0), Rect::new(0.0, 0.0, 30.0, 30.0));
        rs.execute(&mut doc);
        assert_eq!(doc.item_by_id(id).unwrap().rect(), Rect::new(0.0, 0.0, 30.0, 30.0));

        let mut rot = RotateItemCommand::new(id, 0.0, 370.0);
        rot.execute(&mut doc);
        assert_eq!(doc.item_by_id(id).unwrap().rotation(), 10.0);
        rot.undo(&mut doc);
        assert_eq!(doc.item_by_id(id).unwrap().rotation(), 0.0);
    }

    #[test]
    fn test_edit_content() {
        let (mut doc, ids) = doc_abc();
        let new = ItemKind::Text(TextContent {
            text: "edited".into(),
            ..TextContent::default()
        });
        let mut cmd = EditContentCommand::from_document(&doc, &ids[0], new.clone()).unwrap();
        cmd.execute(&mut doc);
        assert_eq!(doc.item_by_id(&ids[0]).unwrap().kind(), &new);
        cmd.undo(&mut doc);
        assert!(matches!(doc.item_by_id(&ids[0]).unwrap().kind(), ItemKind::Text(t) if t.text == "A"));

        let wrong = ItemKind::default_for(ItemType::Barcode);
        assert!(EditContentCommand::from_document(&doc, &ids[0], wrong).is_none());
    }

    #[test]
    fn test_set_property() {
        let (mut doc, ids) = doc_abc();
        let mut cmd = SetPropertyCommand::new(&doc, &ids[2], ItemProperty::Locked(true)).unwrap();
        assert_eq!(cmd.description(), "Lock Item");
        cmd.execute(&mut doc);
        assert!(doc.item_by_id(&ids[2]).unwrap().is_locked());
        cmd.undo(&mut doc);
        assert!(!doc.item_by_id(&ids[2]).unwrap().is_locked());

        let mut rename = SetPropertyCommand::new(&doc, &ids[2], ItemProperty::Name("Price".into())).unwrap();
        rename.execute(&mut doc);
        assert!(doc.item_by_name("Price").is_some());
        rename.undo(&mut doc);
        assert!(doc.item_by_name("C").is_some());
    }

    #[test]
    fn test_composite_runs_in_order_and_reverses() {
        let (mut doc, ids) = doc_abc();
        let mut composite = CompositeCommand::new("Delete Items");
        composite.push(Box::new(RemoveItemCommand::new(&ids[0])));
        composite.push(Box::new(RemoveItemCommand::new(&ids[2])));
        composite.execute(&mut doc);
        assert_eq!(doc.item_count(), 1);
        assert_eq!(composite.owned_items().len(), 2);

        composite.undo(&mut doc);
        let order: Vec<&str> = doc.items().map(|i| i.name()).collect();
        assert_eq!(order, ["A", "B", "C"]);
        assert!(composite.owned_items().is_empty());
    }

    #[test]
    fn test_composite_simplify() {
        let single = CompositeCommand::with_children(
            "Move Items",
            vec![Box::new(MoveItemCommand::new("x", Point::ZERO, Point::ZERO))],
        );
        assert_eq!(single.simplify().description(), "Move Item");
    }
}
