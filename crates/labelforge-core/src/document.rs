//! The label document: ordered items, page settings and change tracking.
//!
//! Items are boxed so that a single allocation moves between the document
//! and the undo history without ever being copied. Index 0 is the bottom of
//! the stack; every item's `z_order` equals its index once a call returns.

use crate::commands::{
    AddItemCommand, Command, ReorderItemCommand, RemoveItemCommand, UndoStack,
};
use crate::format::{self, DocumentFormat, FormatError};
use crate::items::{
    BarcodeType, ImageContent, ItemId, ItemKind, ItemType, LabelItem,
};
use crate::page::{Margins, Orientation, PageSettings, PageSize};
use crate::selection;
use kurbo::{Point, Rect, Size, Vec2};
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};

/// Change notifications published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    /// Geometry, flags, content or stacking position changed.
    ItemChanged(ItemId),
    DocumentModified,
    PageSettingsChanged,
    /// The history dropped the last owner of a detached item.
    ItemReleased(ItemId),
}

/// A label: ordered items on a configured page.
#[derive(Debug, Default)]
pub struct LabelDocument {
    items: Vec<Box<LabelItem>>,
    page: PageSettings,
    modified: bool,
    history: Option<UndoStack>,
    subscribers: Vec<Sender<DocumentEvent>>,
}

impl LabelDocument {
    /// Create an empty document without undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with an undo stack of the given depth.
    pub fn with_undo_limit(limit: usize) -> Self {
        let mut doc = Self::new();
        doc.attach_undo_stack(UndoStack::with_limit(limit));
        doc
    }

    // --- notifications -------------------------------------------------

    /// Register a listener. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<DocumentEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, event: DocumentEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.publish(DocumentEvent::DocumentModified);
    }

    // --- undo history --------------------------------------------------

    pub fn attach_undo_stack(&mut self, stack: UndoStack) {
        if let Some(mut old) = self.history.replace(stack) {
            old.clear(self);
        }
    }

    /// Detach the history; items it still owns stay alive in the returned stack.
    pub fn detach_undo_stack(&mut self) -> Option<UndoStack> {
        self.history.take()
    }

    pub fn undo_stack(&self) -> Option<&UndoStack> {
        self.history.as_ref()
    }

    pub fn has_undo_stack(&self) -> bool {
        self.history.is_some()
    }

    /// Execute a command, recording it when a history is attached.
    /// Returns whether it applied.
    pub fn push_command(&mut self, command: Box<dyn Command>) -> bool {
        match self.history.take() {
            Some(mut stack) => {
                let applied = stack.push(self, command);
                self.history = Some(stack);
                applied
            }
            None => {
                let mut command = command;
                command.execute(self)
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.with_history(|stack, doc| stack.undo(doc))
    }

    pub fn redo(&mut self) -> bool {
        self.with_history(|stack, doc| stack.redo(doc))
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoStack::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoStack::can_redo)
    }

    /// Drop all recorded commands, releasing any items they own.
    pub fn clear_history(&mut self) {
        self.with_history(|stack, doc| {
            stack.clear(doc);
            true
        });
    }

    /// Change the history depth, evicting the oldest entries if needed.
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.with_history(|stack, doc| {
            stack.set_limit(doc, limit);
            true
        });
    }

    fn with_history(&mut self, f: impl FnOnce(&mut UndoStack, &mut Self) -> bool) -> bool {
        let Some(mut stack) = self.history.take() else {
            return false;
        };
        let result = f(&mut stack, self);
        self.history = Some(stack);
        result
    }

    // --- queries -------------------------------------------------------

    /// Items bottom to top.
    pub fn items(&self) -> impl Iterator<Item = &LabelItem> {
        self.items.iter().map(|item| item.as_ref())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&LabelItem> {
        self.items.get(index).map(|item| item.as_ref())
    }

    pub fn item_by_id(&self, id: &str) -> Option<&LabelItem> {
        self.items.iter().find(|item| item.id() == id).map(|item| item.as_ref())
    }

    pub fn item_by_name(&self, name: &str) -> Option<&LabelItem> {
        self.items.iter().find(|item| item.name() == name).map(|item| item.as_ref())
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains_item(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Topmost visible item containing `point`.
    pub fn item_at_point(&self, point: Point) -> Option<&LabelItem> {
        self.items
            .iter()
            .rev()
            .find(|item| item.is_visible() && item.contains(point))
            .map(|item| item.as_ref())
    }

    /// Ids of all visible items containing `point`, topmost first.
    pub fn items_at_point(&self, point: Point) -> Vec<ItemId> {
        self.items
            .iter()
            .rev()
            .filter(|item| item.is_visible() && item.contains(point))
            .map(|item| item.id().clone())
            .collect()
    }

    /// Ids of visible items whose rotated outline overlaps `rect`.
    pub fn items_in_rect(&self, rect: Rect) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.is_visible())
            .filter(|item| {
                let extent = selection::rotated_extent(item.rect(), item.rotation());
                rect.intersect(extent).area() > 0.0
            })
            .map(|item| item.id().clone())
            .collect()
    }

    /// Union of all item extents.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .map(|item| selection::rotated_extent(item.rect(), item.rotation()))
            .reduce(|acc, r| acc.union(r))
    }

    // --- collection ----------------------------------------------------

    /// Append an item on top. Returns `false` if its id is already present.
    pub fn add_item(&mut self, item: Box<LabelItem>) -> bool {
        let index = self.items.len();
        self.try_insert(index, item).is_ok()
    }

    /// Insert an item at `index` (clamped). Returns `false` on duplicate id.
    pub fn insert_item(&mut self, index: usize, item: Box<LabelItem>) -> bool {
        self.try_insert(index, item).is_ok()
    }

    /// Insert handing the item back on failure, so callers never lose it.
    pub(crate) fn try_insert(
        &mut self,
        index: usize,
        item: Box<LabelItem>,
    ) -> Result<(), Box<LabelItem>> {
        if self.contains_item(item.id()) {
            log::warn!("Item {} is already in the document", item.id());
            return Err(item);
        }
        let id = item.id().clone();
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.refresh_z_order();
        self.publish(DocumentEvent::ItemAdded(id));
        self.mark_modified();
        Ok(())
    }

    /// Detach an item, transferring ownership to the caller.
    pub fn remove_item(&mut self, id: &str) -> Option<Box<LabelItem>> {
        let index = self.index_of(id)?;
        let item = self.items.remove(index);
        self.refresh_z_order();
        self.publish(DocumentEvent::ItemRemoved(item.id().clone()));
        self.mark_modified();
        Some(item)
    }

    /// Remove and drop every item.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        for item in std::mem::take(&mut self.items) {
            self.publish(DocumentEvent::ItemRemoved(item.id().clone()));
        }
        self.mark_modified();
    }

    // --- z-order -------------------------------------------------------

    fn refresh_z_order(&mut self) {
        for (z, item) in self.items.iter_mut().enumerate() {
            item.set_z_order(z);
        }
    }

    /// Move an item to `new_index` without recording history.
    pub(crate) fn reorder_item(&mut self, id: &str, new_index: usize) -> bool {
        let Some(old_index) = self.index_of(id) else {
            return false;
        };
        let new_index = new_index.min(self.items.len() - 1);
        if old_index == new_index {
            return false;
        }
        let item = self.items.remove(old_index);
        self.items.insert(new_index, item);
        self.refresh_z_order();
        self.publish(DocumentEvent::ItemChanged(id.to_string()));
        self.mark_modified();
        true
    }

    fn request_reorder(&mut self, id: &str, target: impl FnOnce(usize, usize) -> Option<usize>) -> bool {
        let Some(old_index) = self.index_of(id) else {
            return false;
        };
        let Some(new_index) = target(old_index, self.items.len() - 1) else {
            return false;
        };
        if self.history.is_some() {
            self.push_command(Box::new(ReorderItemCommand::new(id, old_index, new_index)))
        } else {
            self.reorder_item(id, new_index)
        }
    }

    /// One step toward the top. `false` if already topmost.
    pub fn move_item_up(&mut self, id: &str) -> bool {
        self.request_reorder(id, |i, top| (i < top).then_some(i + 1))
    }

    /// One step toward the bottom. `false` if already bottommost.
    pub fn move_item_down(&mut self, id: &str) -> bool {
        self.request_reorder(id, |i, _| (i > 0).then(|| i - 1))
    }

    pub fn move_item_to_top(&mut self, id: &str) -> bool {
        self.request_reorder(id, |i, top| (i < top).then_some(top))
    }

    pub fn move_item_to_bottom(&mut self, id: &str) -> bool {
        self.request_reorder(id, |i, _| (i > 0).then_some(0))
    }

    // --- item mutation -------------------------------------------------

    /// Run `f` on the item and publish a change if it reports one.
    fn update_item(&mut self, id: &str, f: impl FnOnce(&mut LabelItem) -> bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        let revision = item.revision();
        if !f(item) {
            return false;
        }
        if item.revision() != revision {
            self.publish(DocumentEvent::ItemChanged(id.to_string()));
            self.mark_modified();
        }
        true
    }

    pub fn set_item_position(&mut self, id: &str, position: Point) -> bool {
        self.update_item(id, |item| item.set_position(position))
    }

    pub fn move_item_by(&mut self, id: &str, delta: Vec2) -> bool {
        self.update_item(id, |item| item.move_by(delta))
    }

    pub fn set_item_size(&mut self, id: &str, size: Size) -> bool {
        self.update_item(id, |item| item.set_size(size))
    }

    pub fn set_item_rect(&mut self, id: &str, rect: Rect) -> bool {
        self.update_item(id, |item| item.set_rect(rect))
    }

    pub fn set_item_rotation(&mut self, id: &str, degrees: f64) -> bool {
        self.update_item(id, |item| item.set_rotation(degrees))
    }

    pub fn set_item_locked(&mut self, id: &str, locked: bool) -> bool {
        self.update_item(id, |item| {
            item.set_locked(locked);
            true
        })
    }

    pub fn set_item_visible(&mut self, id: &str, visible: bool) -> bool {
        self.update_item(id, |item| {
            item.set_visible(visible);
            true
        })
    }

    pub fn set_item_name(&mut self, id: &str, name: &str) -> bool {
        self.update_item(id, |item| {
            item.set_name(name);
            true
        })
    }

    /// Swap an item's content for one of the same type, returning the old one.
    pub fn set_item_content(&mut self, id: &str, kind: ItemKind) -> Option<ItemKind> {
        let mut old = None;
        self.update_item(id, |item| match item.replace_content(kind) {
            Ok(previous) => {
                old = Some(previous);
                true
            }
            Err(rejected) => {
                log::warn!(
                    "Cannot put {} content into {} item {}",
                    rejected.item_type(),
                    item.item_type(),
                    item.id()
                );
                false
            }
        });
        old
    }

    /// Lock-bypassing geometry write used by history replay.
    pub(crate) fn restore_item_rect(&mut self, id: &str, rect: Rect) -> bool {
        self.update_item(id, |item| item.restore_rect(rect))
    }

    pub(crate) fn restore_item_rotation(&mut self, id: &str, degrees: f64) -> bool {
        self.update_item(id, |item| item.restore_rotation(degrees))
    }

    // --- factories -----------------------------------------------------

    /// Create a default item of `item_type` at `position` and add it,
    /// through the history when one is attached.
    pub fn create_item(&mut self, item_type: ItemType, position: Point) -> ItemId {
        self.add_new(LabelItem::of_type(item_type).at(position))
    }

    pub fn create_text_item(&mut self, text: &str, position: Point) -> ItemId {
        self.add_new(LabelItem::text(text).at(position))
    }

    pub fn create_image_item(&mut self, content: ImageContent, position: Point) -> ItemId {
        self.add_new(LabelItem::image(content).at(position))
    }

    pub fn create_barcode_item(
        &mut self,
        data: &str,
        barcode_type: BarcodeType,
        position: Point,
    ) -> ItemId {
        self.add_new(LabelItem::barcode(data, barcode_type).at(position))
    }

    pub fn create_qrcode_item(&mut self, data: &str, position: Point) -> ItemId {
        self.add_new(LabelItem::qrcode(data).at(position))
    }

    /// Duplicate an item with a fresh id, shifted by `offset`.
    pub fn clone_item(&mut self, id: &str, offset: Vec2) -> Option<ItemId> {
        let source = self.item_by_id(id)?;
        let mut copy = source.duplicate();
        copy.restore_rect(source.rect() + offset);
        Some(self.add_new(copy))
    }

    /// Remove an item, through the history when one is attached.
    pub fn delete_item(&mut self, id: &str) -> bool {
        if !self.contains_item(id) {
            return false;
        }
        self.push_command(Box::new(RemoveItemCommand::new(id)))
    }

    fn add_new(&mut self, item: LabelItem) -> ItemId {
        let id = item.id().clone();
        self.push_command(Box::new(AddItemCommand::new(item)));
        id
    }

    // --- page settings -------------------------------------------------

    pub fn page_settings(&self) -> &PageSettings {
        &self.page
    }

    pub fn set_page_settings(&mut self, page: PageSettings) {
        if self.page != page {
            self.page = page;
            self.publish(DocumentEvent::PageSettingsChanged);
            self.mark_modified();
        }
    }

    fn update_page(&mut self, f: impl FnOnce(&mut PageSettings)) {
        let mut page = self.page;
        f(&mut page);
        self.set_page_settings(page);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.update_page(|p| p.page_size = page_size);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.update_page(|p| p.orientation = orientation);
    }

    /// Custom size in mm; ignored unless both sides are positive.
    pub fn set_custom_size(&mut self, size: Size) {
        if size.width > 0.0 && size.height > 0.0 {
            self.update_page(|p| p.custom_size = size);
        }
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        if dpi > 0 {
            self.update_page(|p| p.dpi = dpi);
        }
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.update_page(|p| p.margins = margins);
    }

    // --- modified flag -------------------------------------------------

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark the current state as saved.
    pub fn reset_modified(&mut self) {
        self.modified = false;
        for item in &mut self.items {
            item.clear_modified();
        }
    }

    // --- persistence ---------------------------------------------------

    /// Serialize without touching the modified flag.
    pub fn save_to_string(&self, format: DocumentFormat) -> Result<String, FormatError> {
        format::write_to_string(self, format)
    }

    /// Write the document and mark it saved.
    pub fn save<W: Write>(&mut self, writer: W, format: DocumentFormat) -> Result<(), FormatError> {
        format::write_document(self, writer, format)?;
        self.reset_modified();
        log::info!("Saved label with {} items as {}", self.items.len(), format);
        Ok(())
    }

    /// Replace the contents with a parsed document.
    ///
    /// On error the document is left exactly as it was.
    pub fn load<R: Read>(&mut self, reader: R, format: DocumentFormat) -> Result<(), FormatError> {
        let loaded = format::read_document(reader, format)?;
        self.adopt(loaded);
        log::info!("Loaded label with {} items from {}", self.items.len(), format);
        Ok(())
    }

    /// Like [`load`](Self::load) from an in-memory string.
    pub fn load_str(&mut self, data: &str, format: DocumentFormat) -> Result<(), FormatError> {
        self.load(data.as_bytes(), format)
    }

    /// Take over items and page settings from a freshly parsed document.
    fn adopt(&mut self, mut other: LabelDocument) {
        self.clear_history();
        for item in std::mem::take(&mut self.items) {
            self.publish(DocumentEvent::ItemRemoved(item.id().clone()));
        }
        self.items = std::mem::take(&mut other.items);
        self.refresh_z_order();
        let added: Vec<ItemId> = self.items.iter().map(|item| item.id().clone()).collect();
        for id in added {
            self.publish(DocumentEvent::ItemAdded(id));
        }
        self.page = other.page;
        self.publish(DocumentEvent::PageSettingsChanged);
        self.reset_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> Box<LabelItem> {
        Box::new(LabelItem::text(text).with_name(text))
    }

    fn names(doc: &LabelDocument) -> Vec<String> {
        doc.items().map(|i| i.name().to_string()).collect()
    }

    fn abc() -> (LabelDocument, Vec<ItemId>) {
        let mut doc = LabelDocument::new();
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            let it = item(name);
            ids.push(it.id().clone());
            assert!(doc.add_item(it));
        }
        (doc, ids)
    }

    #[test]
    fn test_document_creation() {
        let doc = LabelDocument::new();
        assert!(doc.is_empty());
        assert!(!doc.is_modified());
        assert!(!doc.has_undo_stack());
    }

    #[test]
    fn test_add_and_remove() {
        let (mut doc, ids) = abc();
        assert_eq!(doc.item_count(), 3);
        assert!(doc.is_modified());

        let removed = doc.remove_item(&ids[1]).unwrap();
        assert_eq!(removed.name(), "B");
        assert_eq!(names(&doc), ["A", "C"]);
        assert_eq!(doc.item_at(1).unwrap().z_order(), 1);
        assert!(doc.remove_item("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut doc = LabelDocument::new();
        let a = item("A");
        let twin = Box::new(LabelItem::text("other").with_id(a.id().clone()));
        assert!(doc.add_item(a));
        assert!(!doc.add_item(twin));
        assert_eq!(doc.item_count(), 1);
    }

    #[test]
    fn test_move_to_top() {
        let (mut doc, ids) = abc();
        assert!(doc.move_item_to_top(&ids[0]));
        assert_eq!(names(&doc), ["B", "C", "A"]);
        let z: Vec<usize> = doc.items().map(|i| i.z_order()).collect();
        assert_eq!(z, [0, 1, 2]);
    }

    #[test]
    fn test_reorder_boundaries() {
        let (mut doc, ids) = abc();
        doc.reset_modified();
        assert!(!doc.move_item_up(&ids[2]));
        assert!(!doc.move_item_to_top(&ids[2]));
        assert!(!doc.move_item_down(&ids[0]));
        assert!(!doc.move_item_to_bottom(&ids[0]));
        assert!(!doc.move_item_up("missing"));
        assert_eq!(names(&doc), ["A", "B", "C"]);
        assert!(!doc.is_modified());

        assert!(doc.move_item_down(&ids[2]));
        assert_eq!(names(&doc), ["A", "C", "B"]);
        assert!(doc.move_item_to_bottom(&ids[2]));
        assert_eq!(names(&doc), ["C", "A", "B"]);
    }

    #[test]
    fn test_item_at_point_topmost_visible() {
        let (mut doc, ids) = abc();
        let hit = doc.item_at_point(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.id(), &ids[2]);

        doc.set_item_visible(&ids[2], false);
        assert_eq!(doc.item_at_point(Point::new(10.0, 10.0)).unwrap().id(), &ids[1]);
        assert_eq!(doc.items_at_point(Point::new(10.0, 10.0)), vec![ids[1].clone(), ids[0].clone()]);
        assert!(doc.item_at_point(Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_items_in_rect() {
        let mut doc = LabelDocument::new();
        let near = item("near");
        let far = Box::new(LabelItem::text("far").at(Point::new(400.0, 400.0)));
        let near_id = near.id().clone();
        doc.add_item(near);
        doc.add_item(far);
        assert_eq!(doc.items_in_rect(Rect::new(50.0, 20.0, 150.0, 30.0)), vec![near_id]);
    }

    #[test]
    fn test_item_mutation_api() {
        let (mut doc, ids) = abc();
        assert!(doc.set_item_position(&ids[0], Point::new(5.0, 6.0)));
        assert_eq!(doc.item_by_id(&ids[0]).unwrap().position(), Point::new(5.0, 6.0));
        assert!(!doc.set_item_size(&ids[0], Size::new(0.0, 5.0)));
        assert!(!doc.set_item_rotation("missing", 10.0));

        assert!(doc.set_item_locked(&ids[0], true));
        assert!(!doc.move_item_by(&ids[0], Vec2::new(1.0, 1.0)));
        assert!(doc.set_item_visible(&ids[0], false));
        assert!(doc.remove_item(&ids[0]).is_some());
    }

    #[test]
    fn test_item_by_name() {
        let (doc, ids) = abc();
        assert_eq!(doc.item_by_name("B").unwrap().id(), &ids[1]);
        assert!(doc.item_by_name("Z").is_none());
    }

    #[test]
    fn test_events_published() {
        let mut doc = LabelDocument::new();
        let rx = doc.subscribe();
        let a = item("A");
        let id = a.id().clone();
        doc.add_item(a);
        doc.move_item_by(&id, Vec2::new(1.0, 0.0));
        doc.remove_item(&id);

        let events: Vec<DocumentEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                DocumentEvent::ItemAdded(id.clone()),
                DocumentEvent::DocumentModified,
                DocumentEvent::ItemChanged(id.clone()),
                DocumentEvent::DocumentModified,
                DocumentEvent::ItemRemoved(id),
                DocumentEvent::DocumentModified,
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut doc = LabelDocument::new();
        drop(doc.subscribe());
        doc.add_item(item("A"));
        assert!(doc.subscribers.is_empty());
    }

    #[test]
    fn test_page_settings_change() {
        let mut doc = LabelDocument::new();
        let rx = doc.subscribe();
        doc.set_orientation(Orientation::Landscape);
        assert!(doc.is_modified());
        assert_eq!(doc.page_settings().page_real_size(), Size::new(297.0, 210.0));
        assert!(rx.try_iter().any(|e| e == DocumentEvent::PageSettingsChanged));

        doc.reset_modified();
        doc.set_orientation(Orientation::Landscape);
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_factories_without_history() {
        let mut doc = LabelDocument::new();
        let id = doc.create_item(ItemType::Barcode, Point::new(10.0, 20.0));
        let barcode = doc.item_by_id(&id).unwrap();
        assert_eq!(barcode.rect(), Rect::new(10.0, 20.0, 210.0, 120.0));

        let copy = doc.clone_item(&id, Vec2::new(10.0, 10.0)).unwrap();
        assert_ne!(copy, id);
        assert_eq!(doc.item_by_id(&copy).unwrap().position(), Point::new(20.0, 30.0));
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_factories_record_history() {
        let mut doc = LabelDocument::with_undo_limit(10);
        let id = doc.create_text_item("hello", Point::ZERO);
        assert!(doc.can_undo());
        assert!(doc.undo());
        assert!(doc.item_by_id(&id).is_none());
        assert!(doc.redo());
        assert!(doc.item_by_id(&id).is_some());
        assert!(doc.delete_item(&id));
        assert!(doc.is_empty());
        assert!(doc.undo());
        assert_eq!(doc.item_count(), 1);
    }

    #[test]
    fn test_set_item_content_type_checked() {
        let (mut doc, ids) = abc();
        assert!(doc.set_item_content(&ids[0], ItemKind::default_for(ItemType::QrCode)).is_none());
        let old = doc.set_item_content(&ids[0], ItemKind::default_for(ItemType::Text));
        assert!(old.is_some());
    }
}
