//! Pointer and keyboard driven editing of a label document.
//!
//! The controller keeps the selection and the gesture in progress. While a
//! drag is live it writes geometry straight into the document; on release
//! it records a single command so the whole drag undoes in one step.
//! Cancelling restores the geometry captured at gesture start.

use crate::commands::{
    AddItemCommand, Command, CompositeCommand, MoveItemCommand, RemoveItemCommand,
    ResizeItemCommand, RotateItemCommand,
};
use crate::config::EditorConfig;
use crate::document::LabelDocument;
use crate::input::{InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::items::{ItemId, ItemType, LabelItem};
use crate::selection::{self, HandleKind};
use crate::snap;
use kurbo::{Point, Rect, Vec2};

/// What the host should react to after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Nothing changed.
    None,
    SelectionChanged,
    /// Live geometry or marquee changed; repaint.
    Updated,
    /// A command was recorded, with its description.
    Committed(String),
    /// A gesture was aborted and its geometry restored.
    Cancelled,
    /// Undo or redo was applied.
    HistoryChanged,
    /// The user asked to edit an item's content, e.g. by double-clicking text.
    EditRequested(ItemId),
}

/// What lies under the pointer, for cursor feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    Nothing,
    Body(ItemId),
    /// A handle of a selected item. Locked items still report their
    /// handles but never act on them.
    Handle {
        id: ItemId,
        kind: HandleKind,
        locked: bool,
    },
}

/// Gesture in progress between pointer down and up.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Move {
        start_point: Point,
        /// Items being dragged with their rect at gesture start.
        originals: Vec<(ItemId, Rect)>,
    },
    Resize {
        id: ItemId,
        handle: HandleKind,
        start_point: Point,
        start_rect: Rect,
        rotation: f64,
    },
    Rotate {
        id: ItemId,
        start_point: Point,
        center: Point,
        start_rotation: f64,
    },
    Marquee {
        start_point: Point,
        current_point: Point,
        /// Selection to extend, kept when Shift or Ctrl was held.
        base_selection: Vec<ItemId>,
    },
}

impl Gesture {
    pub fn is_marquee(&self) -> bool {
        matches!(self, Gesture::Marquee { .. })
    }
}

/// Turns input events into selection changes and document commands.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    config: EditorConfig,
    input: InputState,
    /// Selected ids in selection order.
    selection: Vec<ItemId>,
    gesture: Option<Gesture>,
    /// Document modified flag when the gesture began.
    modified_before: bool,
}

impl InteractionController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Give `doc` a history of the configured depth, or resize the one it
    /// already has.
    pub fn prepare_document(&self, doc: &mut LabelDocument) {
        if doc.has_undo_stack() {
            doc.set_undo_limit(self.config.undo_limit);
        } else {
            doc.attach_undo_stack(self.config.undo_stack());
        }
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Current marquee rectangle, if one is being dragged.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Some(Gesture::Marquee {
                start_point,
                current_point,
                ..
            }) => Some(Rect::from_points(*start_point, *current_point)),
            _ => None,
        }
    }

    // --- selection -----------------------------------------------------

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Replace the selection with a single item.
    pub fn select(&mut self, id: &str) {
        self.selection.clear();
        self.selection.push(id.to_string());
    }

    pub fn add_to_selection(&mut self, id: &str) {
        if !self.is_selected(id) {
            self.selection.push(id.to_string());
        }
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if self.is_selected(id) {
            self.selection.retain(|s| s != id);
        } else {
            self.selection.push(id.to_string());
        }
    }

    pub fn select_all(&mut self, doc: &LabelDocument) {
        self.selection = doc
            .items()
            .filter(|item| item.is_visible())
            .map(|item| item.id().clone())
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Forget ids that are no longer in the document.
    pub fn prune_selection(&mut self, doc: &LabelDocument) {
        self.selection.retain(|id| doc.contains_item(id));
    }

    /// Selected items that exist in the document, bottom to top.
    fn selected_items<'a>(&self, doc: &'a LabelDocument) -> Vec<&'a LabelItem> {
        doc.items().filter(|item| self.is_selected(item.id())).collect()
    }

    /// Union of the selected items' rotated extents.
    pub fn selection_bounds(&self, doc: &LabelDocument) -> Option<Rect> {
        self.selected_items(doc)
            .into_iter()
            .map(|item| selection::rotated_extent(item.rect(), item.rotation()))
            .reduce(|acc, r| acc.union(r))
    }

    /// Area to repaint for the selection, handles and outline included.
    pub fn repaint_bounds(&self, doc: &LabelDocument) -> Option<Rect> {
        let margin = self.config.decoration_margin();
        self.selected_items(doc)
            .into_iter()
            .map(|item| selection::decorated_bounds(item.rect(), item.rotation(), margin))
            .reduce(|acc, r| acc.union(r))
    }

    // --- hit testing ---------------------------------------------------

    /// Handle of a selected item under `point`, topmost item first.
    fn handle_under(&self, doc: &LabelDocument, point: Point) -> Option<(ItemId, HandleKind, bool)> {
        self.selected_items(doc).into_iter().rev().find_map(|item| {
            selection::hit_handle(
                item.rect(),
                item.rotation(),
                point,
                self.config.handle_size,
                self.config.rotate_handle_distance,
            )
            .map(|kind| (item.id().clone(), kind, item.is_locked()))
        })
    }

    pub fn hover(&self, doc: &LabelDocument, point: Point) -> HoverTarget {
        if let Some((id, kind, locked)) = self.handle_under(doc, point) {
            return HoverTarget::Handle { id, kind, locked };
        }
        match doc.item_at_point(point) {
            Some(item) => HoverTarget::Body(item.id().clone()),
            None => HoverTarget::Nothing,
        }
    }

    // --- pointer -------------------------------------------------------

    pub fn handle_pointer_event(&mut self, doc: &mut LabelDocument, event: PointerEvent) -> Response {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Left {
                    self.pointer_down(doc, position, modifiers)
                } else {
                    self.input.handle_pointer_event(event);
                    Response::None
                }
            }
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(doc, position, modifiers),
            PointerEvent::Up { position, button } => {
                if button == MouseButton::Left {
                    self.pointer_up(doc, position)
                } else {
                    self.input.handle_pointer_event(event);
                    Response::None
                }
            }
            PointerEvent::Cancel => {
                self.input.handle_pointer_event(event);
                self.cancel(doc)
            }
        }
    }

    pub fn pointer_down(&mut self, doc: &mut LabelDocument, point: Point, modifiers: Modifiers) -> Response {
        self.input.handle_pointer_event(PointerEvent::Down {
            position: point,
            button: MouseButton::Left,
            modifiers,
        });
        if self.gesture.is_some() {
            return Response::None;
        }
        self.modified_before = doc.is_modified();

        if let Some((id, kind, locked)) = self.handle_under(doc, point) {
            if locked {
                log::debug!("Ignoring {:?} handle of locked item {}", kind, id);
                return Response::None;
            }
            return self.begin_handle_gesture(doc, id, kind, point);
        }

        let hit = doc
            .item_at_point(point)
            .map(|item| (item.id().clone(), item.item_type()));
        match hit {
            Some((id, item_type)) => {
                if modifiers.command() {
                    self.toggle_selection(&id);
                    return Response::SelectionChanged;
                }
                if self.input.is_double_click() && item_type == ItemType::Text {
                    self.select(&id);
                    return Response::EditRequested(id);
                }
                if modifiers.shift {
                    self.add_to_selection(&id);
                } else if !self.is_selected(&id) {
                    self.select(&id);
                }
                self.begin_move(doc, point);
                Response::SelectionChanged
            }
            None => {
                let additive = modifiers.shift || modifiers.command();
                if !additive {
                    self.clear_selection();
                }
                self.gesture = Some(Gesture::Marquee {
                    start_point: point,
                    current_point: point,
                    base_selection: self.selection.clone(),
                });
                Response::SelectionChanged
            }
        }
    }

    fn begin_handle_gesture(
        &mut self,
        doc: &LabelDocument,
        id: ItemId,
        kind: HandleKind,
        point: Point,
    ) -> Response {
        let Some(item) = doc.item_by_id(&id) else {
            return Response::None;
        };
        self.gesture = Some(match kind {
            HandleKind::Rotate => Gesture::Rotate {
                center: item.center(),
                start_rotation: item.rotation(),
                id,
                start_point: point,
            },
            handle => Gesture::Resize {
                start_rect: item.rect(),
                rotation: item.rotation(),
                id,
                handle,
                start_point: point,
            },
        });
        Response::Updated
    }

    /// Start dragging every unlocked selected item.
    fn begin_move(&mut self, doc: &LabelDocument, point: Point) {
        let originals: Vec<(ItemId, Rect)> = self
            .selected_items(doc)
            .into_iter()
            .filter(|item| !item.is_locked())
            .map(|item| (item.id().clone(), item.rect()))
            .collect();
        if originals.is_empty() {
            log::debug!("Selection is locked, not starting a move");
            return;
        }
        self.gesture = Some(Gesture::Move {
            start_point: point,
            originals,
        });
    }

    pub fn pointer_move(&mut self, doc: &mut LabelDocument, point: Point, modifiers: Modifiers) -> Response {
        self.input.handle_pointer_event(PointerEvent::Move {
            position: point,
            modifiers,
        });
        let Some(gesture) = self.gesture.as_mut() else {
            return Response::None;
        };
        match gesture {
            Gesture::Move {
                start_point,
                originals,
            } => {
                let mut delta = point - *start_point;
                if self.config.snap_to_grid {
                    if let Some((_, anchor)) = originals.first() {
                        delta = snap::snap_translation(*anchor, delta, self.config.grid_size);
                    }
                }
                for (id, rect) in originals.iter() {
                    doc.restore_item_rect(id, *rect + delta);
                }
                Response::Updated
            }
            Gesture::Resize {
                id,
                handle,
                start_point,
                start_rect,
                rotation,
            } => {
                let local_delta = selection::to_local(*start_rect, *rotation, point)
                    - selection::to_local(*start_rect, *rotation, *start_point);
                match selection::resize_rect(*start_rect, *handle, local_delta, self.config.min_item_size) {
                    Some(rect) => {
                        doc.restore_item_rect(id, rect);
                        Response::Updated
                    }
                    None => {
                        log::debug!("Resize of {} below minimum size rejected", id);
                        Response::None
                    }
                }
            }
            Gesture::Rotate {
                id,
                start_point,
                center,
                start_rotation,
            } => {
                let mut angle = selection::apply_rotation(*start_rotation, *center, *start_point, point);
                if modifiers.shift {
                    angle = snap::snap_angle(angle, self.config.angle_snap_increment);
                }
                doc.restore_item_rotation(id, angle);
                Response::Updated
            }
            Gesture::Marquee {
                start_point,
                current_point,
                base_selection,
            } => {
                *current_point = point;
                let mut selected = base_selection.clone();
                for id in doc.items_in_rect(Rect::from_points(*start_point, point)) {
                    if !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                self.selection = selected;
                Response::Updated
            }
        }
    }

    pub fn pointer_up(&mut self, doc: &mut LabelDocument, point: Point) -> Response {
        self.input.handle_pointer_event(PointerEvent::Up {
            position: point,
            button: MouseButton::Left,
        });
        let Some(gesture) = self.gesture.take() else {
            return Response::None;
        };
        let command: Option<Box<dyn Command>> = match gesture {
            Gesture::Move { originals, .. } => {
                let mut composite = CompositeCommand::new("Move Items");
                for (id, old) in originals {
                    let Some(new) = doc.item_by_id(&id).map(|item| item.rect()) else {
                        continue;
                    };
                    if new != old {
                        composite.push(Box::new(MoveItemCommand::new(&id, old.origin(), new.origin())));
                    }
                }
                (!composite.is_empty()).then(|| composite.simplify())
            }
            Gesture::Resize { id, start_rect, .. } => doc
                .item_by_id(&id)
                .map(|item| item.rect())
                .filter(|rect| *rect != start_rect)
                .map(|rect| Box::new(ResizeItemCommand::new(&id, start_rect, rect)) as Box<dyn Command>),
            Gesture::Rotate { id, start_rotation, .. } => doc
                .item_by_id(&id)
                .map(|item| item.rotation())
                .filter(|rotation| *rotation != start_rotation)
                .map(|rotation| {
                    Box::new(RotateItemCommand::new(&id, start_rotation, rotation)) as Box<dyn Command>
                }),
            Gesture::Marquee { .. } => return Response::SelectionChanged,
        };
        match command {
            Some(command) => self.commit(doc, command),
            None => {
                self.restore_modified(doc);
                Response::None
            }
        }
    }

    /// Abort the active gesture, restoring the geometry it started from.
    pub fn cancel(&mut self, doc: &mut LabelDocument) -> Response {
        let Some(gesture) = self.gesture.take() else {
            return Response::None;
        };
        match gesture {
            Gesture::Move { originals, .. } => {
                for (id, rect) in originals {
                    doc.restore_item_rect(&id, rect);
                }
            }
            Gesture::Resize { id, start_rect, .. } => {
                doc.restore_item_rect(&id, start_rect);
            }
            Gesture::Rotate { id, start_rotation, .. } => {
                doc.restore_item_rotation(&id, start_rotation);
            }
            Gesture::Marquee { base_selection, .. } => {
                self.selection = base_selection;
            }
        }
        self.restore_modified(doc);
        Response::Cancelled
    }

    /// A gesture that ends with no net edit leaves the document as clean as
    /// it found it.
    fn restore_modified(&self, doc: &mut LabelDocument) {
        if !self.modified_before && doc.is_modified() {
            doc.reset_modified();
        }
    }

    fn commit(&mut self, doc: &mut LabelDocument, command: Box<dyn Command>) -> Response {
        let description = command.description();
        if !doc.push_command(command) {
            log::warn!("'{}' did not apply", description);
            return Response::None;
        }
        Response::Committed(description)
    }

    // --- keyboard ------------------------------------------------------

    pub fn handle_key_event(&mut self, doc: &mut LabelDocument, event: KeyEvent) -> Response {
        let KeyEvent { key, modifiers } = event;
        if key == Key::Escape {
            if self.gesture.is_some() {
                return self.cancel(doc);
            }
            if self.selection.is_empty() {
                return Response::None;
            }
            self.clear_selection();
            return Response::SelectionChanged;
        }
        if self.gesture.is_some() {
            return Response::None;
        }

        if modifiers.command() {
            if key.is_char('a') {
                self.select_all(doc);
                return Response::SelectionChanged;
            }
            if key.is_char('z') {
                let applied = if modifiers.shift { doc.redo() } else { doc.undo() };
                return self.after_history(doc, applied);
            }
            if key.is_char('y') {
                let applied = doc.redo();
                return self.after_history(doc, applied);
            }
            if key.is_char('d') {
                return self.duplicate_selection(doc);
            }
            return Response::None;
        }

        match key {
            Key::Delete | Key::Backspace => self.delete_selection(doc),
            Key::Enter => match self.selected_items(doc).as_slice() {
                [item] if item.item_type() == ItemType::Text => Response::EditRequested(item.id().clone()),
                _ => Response::None,
            },
            arrow => match arrow.arrow_direction() {
                Some(direction) => {
                    let step = if modifiers.shift {
                        self.config.nudge_step_large
                    } else {
                        self.config.nudge_step
                    };
                    self.nudge_selection(doc, direction * step)
                }
                None => Response::None,
            },
        }
    }

    fn after_history(&mut self, doc: &LabelDocument, applied: bool) -> Response {
        if !applied {
            return Response::None;
        }
        self.prune_selection(doc);
        Response::HistoryChanged
    }

    /// Remove every unlocked selected item as one undoable step.
    pub fn delete_selection(&mut self, doc: &mut LabelDocument) -> Response {
        let ids: Vec<ItemId> = self
            .selected_items(doc)
            .into_iter()
            .filter(|item| !item.is_locked())
            .map(|item| item.id().clone())
            .collect();
        if ids.is_empty() {
            return Response::None;
        }
        let mut composite = CompositeCommand::new("Delete Items");
        // Top first, so undo reinserts bottom first at the recorded indices.
        for id in ids.iter().rev() {
            composite.push(Box::new(RemoveItemCommand::new(id)));
        }
        self.selection.retain(|id| !ids.contains(id));
        self.commit(doc, composite.simplify())
    }

    /// Move every unlocked selected item by `delta` as one undoable step.
    pub fn nudge_selection(&mut self, doc: &mut LabelDocument, delta: Vec2) -> Response {
        let mut composite = CompositeCommand::new("Move Items");
        for item in self.selected_items(doc) {
            if item.is_locked() {
                continue;
            }
            let old = item.position();
            composite.push(Box::new(MoveItemCommand::new(item.id(), old, old + delta)));
        }
        if composite.is_empty() {
            return Response::None;
        }
        self.commit(doc, composite.simplify())
    }

    /// Copy the selection with fresh ids, offset by the paste offset, and
    /// select the copies.
    pub fn duplicate_selection(&mut self, doc: &mut LabelDocument) -> Response {
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let copies: Vec<LabelItem> = self
            .selected_items(doc)
            .into_iter()
            .map(|item| {
                let rect = item.rect() + offset;
                item.duplicate().with_rect(rect)
            })
            .collect();
        if copies.is_empty() {
            return Response::None;
        }
        let new_ids: Vec<ItemId> = copies.iter().map(|c| c.id().clone()).collect();
        let mut composite = CompositeCommand::new("Duplicate Items");
        for copy in copies {
            composite.push(Box::new(AddItemCommand::new(copy)));
        }
        let response = self.commit(doc, composite.simplify());
        self.selection = new_ids;
        response
    }
}
