//! Reversible document edits and the bounded history that records them.

mod history;
mod item;

pub use history::{DEFAULT_UNDO_LIMIT, UndoStack};
pub use item::{
    AddItemCommand, CompositeCommand, EditContentCommand, ItemProperty, MoveItemCommand,
    RemoveItemCommand, ReorderItemCommand, ResizeItemCommand, RotateItemCommand,
    SetPropertyCommand,
};

use crate::document::LabelDocument;
use crate::items::{ItemId, LabelItem};
use std::fmt;

/// A reversible operation on a [`LabelDocument`].
///
/// `undo` must exactly invert `execute`, and the pair may run any number of
/// times in alternation.
pub trait Command: fmt::Debug {
    /// Human readable label, e.g. for an "Undo Move" menu entry.
    fn description(&self) -> String;

    /// Apply the edit. `false` when it could not be applied, e.g. the item
    /// is gone or its id is already taken; such a command is not recorded.
    fn execute(&mut self, doc: &mut LabelDocument) -> bool;

    fn undo(&mut self, doc: &mut LabelDocument);

    /// Ids of items this command currently owns outside the document.
    fn owned_items(&self) -> Vec<ItemId> {
        Vec::new()
    }
}

/// Where an item handled by a command currently lives.
///
/// The box moves between the two states, so undo and redo always restore
/// the same allocation.
#[derive(Debug)]
pub enum ItemSlot {
    /// Owned by the command, not in any document.
    Detached(Box<LabelItem>),
    /// Owned by the document.
    InDocument(ItemId),
}

impl ItemSlot {
    pub fn id(&self) -> &ItemId {
        match self {
            ItemSlot::Detached(item) => item.id(),
            ItemSlot::InDocument(id) => id,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, ItemSlot::Detached(_))
    }

    /// The detached item, if the command holds it.
    pub fn item(&self) -> Option<&LabelItem> {
        match self {
            ItemSlot::Detached(item) => Some(item),
            ItemSlot::InDocument(_) => None,
        }
    }

    /// Hand the item to the document at `index` (append when `None`).
    pub(crate) fn attach(&mut self, doc: &mut LabelDocument, index: Option<usize>) -> bool {
        let placeholder = ItemSlot::InDocument(self.id().clone());
        match std::mem::replace(self, placeholder) {
            ItemSlot::Detached(item) => {
                let index = index.unwrap_or(doc.item_count());
                match doc.try_insert(index, item) {
                    Ok(()) => true,
                    Err(item) => {
                        *self = ItemSlot::Detached(item);
                        false
                    }
                }
            }
            in_doc @ ItemSlot::InDocument(_) => {
                *self = in_doc;
                false
            }
        }
    }

    /// Take the item back from the document, returning its former index.
    pub(crate) fn detach(&mut self, doc: &mut LabelDocument) -> Option<usize> {
        let ItemSlot::InDocument(id) = self else {
            return None;
        };
        let index = doc.index_of(id)?;
        let item = doc.remove_item(id)?;
        *self = ItemSlot::Detached(item);
        Some(index)
    }
}
