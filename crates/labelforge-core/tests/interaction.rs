//! Integration tests: input event sequences driven through the controller.

use kurbo::{Point, Rect};
use labelforge_core::selection::{Corner, HandleKind};
use labelforge_core::{
    DocumentEvent, EditorConfig, Gesture, HoverTarget, InteractionController, Key, KeyEvent,
    LabelDocument, LabelItem, Modifiers, MouseButton, PointerEvent, Response,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn place(doc: &mut LabelDocument, rect: Rect, rotation: f64) -> String {
    let item = LabelItem::text("sample").with_rect(rect).with_rotation(rotation);
    let id = item.id().clone();
    assert!(doc.add_item(Box::new(item)));
    id
}

fn editor() -> (LabelDocument, InteractionController) {
    let mut doc = LabelDocument::new();
    let ctl = InteractionController::new(EditorConfig::default());
    ctl.prepare_document(&mut doc);
    (doc, ctl)
}

fn down(position: Point) -> PointerEvent {
    PointerEvent::Down {
        position,
        button: MouseButton::Left,
        modifiers: Modifiers::NONE,
    }
}

fn drag_to(position: Point) -> PointerEvent {
    PointerEvent::Move {
        position,
        modifiers: Modifiers::NONE,
    }
}

fn up(position: Point) -> PointerEvent {
    PointerEvent::Up {
        position,
        button: MouseButton::Left,
    }
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(Key::Character(c), Modifiers::ctrl())
}

fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = (actual.x0 - expected.x0).abs() < 1e-9
        && (actual.y0 - expected.y0).abs() < 1e-9
        && (actual.x1 - expected.x1).abs() < 1e-9
        && (actual.y1 - expected.y1).abs() < 1e-9;
    assert!(close, "{:?} != {:?}", actual, expected);
}

#[test]
fn undersized_resize_is_rejected() {
    init();
    let (mut doc, mut ctl) = editor();
    let id = place(&mut doc, Rect::new(0.0, 0.0, 20.0, 20.0), 0.0);
    doc.reset_modified();
    ctl.select(&id);

    assert_eq!(ctl.handle_pointer_event(&mut doc, down(Point::new(20.0, 20.0))), Response::Updated);
    assert!(matches!(
        ctl.gesture(),
        Some(Gesture::Resize {
            handle: HandleKind::Corner(Corner::BottomRight),
            ..
        })
    ));
    assert_eq!(ctl.handle_pointer_event(&mut doc, drag_to(Point::new(4.0, 4.0))), Response::None);
    assert_eq!(doc.item_by_id(&id).unwrap().rect(), Rect::new(0.0, 0.0, 20.0, 20.0));

    assert_eq!(ctl.handle_pointer_event(&mut doc, up(Point::new(4.0, 4.0))), Response::None);
    assert!(!doc.can_undo());
    assert!(!doc.is_modified());
}

#[test]
fn quarter_turn_hit_test() {
    let (mut doc, ctl) = editor();
    let id = place(&mut doc, Rect::new(0.0, 0.0, 100.0, 50.0), 90.0);

    assert_eq!(ctl.hover(&doc, Point::new(60.0, 10.0)), HoverTarget::Body(id.clone()));
    assert_eq!(ctl.hover(&doc, Point::new(10.0, 60.0)), HoverTarget::Nothing);
    assert_eq!(doc.items_at_point(Point::new(60.0, 10.0)), vec![id]);
    assert!(doc.item_at_point(Point::new(10.0, 60.0)).is_none());
}

#[test]
fn resize_of_rotated_item_follows_its_axes() {
    let (mut doc, mut ctl) = editor();
    let id = place(&mut doc, Rect::new(100.0, 100.0, 200.0, 150.0), 90.0);
    ctl.select(&id);

    // Bottom-right corner of the local rect lands at (125, 175) after the turn.
    let corner = Point::new(125.0, 175.0);
    assert!(matches!(
        ctl.hover(&doc, corner),
        HoverTarget::Handle {
            kind: HandleKind::Corner(Corner::BottomRight),
            locked: false,
            ..
        }
    ));
    ctl.handle_pointer_event(&mut doc, down(corner));
    // Dragging left on screen is dragging down in the item's frame.
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(115.0, 175.0)));
    assert_rect_near(
        doc.item_by_id(&id).unwrap().rect(),
        Rect::new(100.0, 100.0, 200.0, 160.0),
    );
    assert_eq!(doc.item_by_id(&id).unwrap().rotation(), 90.0);

    let response = ctl.handle_pointer_event(&mut doc, up(Point::new(115.0, 175.0)));
    assert_eq!(response, Response::Committed("Resize Item".to_string()));
    assert!(doc.undo());
    assert_eq!(doc.item_by_id(&id).unwrap().rect(), Rect::new(100.0, 100.0, 200.0, 150.0));
}

#[test]
fn platform_cancel_restores_drag() {
    let (mut doc, mut ctl) = editor();
    let a = place(&mut doc, Rect::new(0.0, 0.0, 50.0, 50.0), 0.0);
    let b = place(&mut doc, Rect::new(100.0, 0.0, 150.0, 50.0), 0.0);
    ctl.select(&a);
    ctl.add_to_selection(&b);

    ctl.handle_pointer_event(&mut doc, down(Point::new(25.0, 25.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(65.0, 45.0)));
    assert_eq!(doc.item_by_id(&b).unwrap().rect(), Rect::new(140.0, 20.0, 190.0, 70.0));

    assert_eq!(ctl.handle_pointer_event(&mut doc, PointerEvent::Cancel), Response::Cancelled);
    assert_eq!(doc.item_by_id(&a).unwrap().rect(), Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(doc.item_by_id(&b).unwrap().rect(), Rect::new(100.0, 0.0, 150.0, 50.0));
    assert!(!doc.can_undo());
    assert_eq!(ctl.selection(), [a, b]);
}

#[test]
fn keyboard_session() {
    init();
    let (mut doc, mut ctl) = editor();
    let a = place(&mut doc, Rect::new(0.0, 0.0, 50.0, 50.0), 0.0);
    let b = place(&mut doc, Rect::new(60.0, 0.0, 110.0, 50.0), 0.0);
    let locked = place(&mut doc, Rect::new(120.0, 0.0, 170.0, 50.0), 0.0);
    doc.set_item_locked(&locked, true);

    assert_eq!(ctl.handle_key_event(&mut doc, ctrl('a')), Response::SelectionChanged);
    assert_eq!(ctl.selection().len(), 3);

    let response = ctl.handle_key_event(&mut doc, KeyEvent::plain(Key::Delete));
    assert_eq!(response, Response::Committed("Delete Items".to_string()));
    assert_eq!(doc.item_count(), 1);
    assert!(doc.contains_item(&locked));
    assert_eq!(ctl.selection(), [locked.clone()]);

    assert_eq!(ctl.handle_key_event(&mut doc, ctrl('z')), Response::HistoryChanged);
    let order: Vec<&String> = doc.items().map(|i| i.id()).collect();
    assert_eq!(order, [&a, &b, &locked]);

    let redo = KeyEvent::new(
        Key::Character('Z'),
        Modifiers {
            shift: true,
            ..Modifiers::ctrl()
        },
    );
    assert_eq!(ctl.handle_key_event(&mut doc, redo), Response::HistoryChanged);
    assert_eq!(doc.item_count(), 1);

    assert_eq!(ctl.handle_key_event(&mut doc, ctrl('y')), Response::None);
    assert_eq!(ctl.handle_key_event(&mut doc, KeyEvent::plain(Key::Escape)), Response::SelectionChanged);
    assert!(ctl.selection().is_empty());
}

#[test]
fn keys_are_ignored_mid_gesture() {
    let (mut doc, mut ctl) = editor();
    let id = place(&mut doc, Rect::new(0.0, 0.0, 50.0, 50.0), 0.0);

    ctl.handle_pointer_event(&mut doc, down(Point::new(10.0, 10.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(30.0, 10.0)));
    assert_eq!(ctl.handle_key_event(&mut doc, KeyEvent::plain(Key::Delete)), Response::None);
    assert_eq!(ctl.handle_key_event(&mut doc, ctrl('z')), Response::None);
    assert!(doc.contains_item(&id));

    assert_eq!(ctl.handle_key_event(&mut doc, KeyEvent::plain(Key::Escape)), Response::Cancelled);
    assert_eq!(doc.item_by_id(&id).unwrap().position(), Point::ZERO);
    assert!(!ctl.is_active());
}

#[test]
fn marquee_then_nudge_is_one_step() {
    let (mut doc, mut ctl) = editor();
    let a = place(&mut doc, Rect::new(10.0, 10.0, 40.0, 40.0), 0.0);
    let b = place(&mut doc, Rect::new(50.0, 10.0, 80.0, 40.0), 0.0);
    let far = place(&mut doc, Rect::new(300.0, 300.0, 340.0, 340.0), 0.0);

    ctl.handle_pointer_event(&mut doc, down(Point::new(0.0, 0.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(90.0, 50.0)));
    assert_eq!(ctl.marquee_rect(), Some(Rect::new(0.0, 0.0, 90.0, 50.0)));
    assert_eq!(ctl.handle_pointer_event(&mut doc, up(Point::new(90.0, 50.0))), Response::SelectionChanged);
    assert!(ctl.is_selected(&a) && ctl.is_selected(&b) && !ctl.is_selected(&far));

    let nudge = KeyEvent::new(Key::ArrowRight, Modifiers::shift());
    assert_eq!(
        ctl.handle_key_event(&mut doc, nudge),
        Response::Committed("Move Items".to_string())
    );
    assert_eq!(doc.item_by_id(&a).unwrap().position(), Point::new(20.0, 10.0));
    assert_eq!(doc.item_by_id(&b).unwrap().position(), Point::new(60.0, 10.0));

    assert!(doc.undo());
    assert_eq!(doc.item_by_id(&a).unwrap().position(), Point::new(10.0, 10.0));
    assert_eq!(doc.item_by_id(&b).unwrap().position(), Point::new(50.0, 10.0));
    assert!(!doc.can_undo());
}

#[test]
fn cancelled_drag_leaves_document_clean() {
    init();
    let (mut doc, mut ctl) = editor();
    let id = place(&mut doc, Rect::new(100.0, 100.0, 200.0, 150.0), 0.0);
    doc.reset_modified();
    let rx = doc.subscribe();

    ctl.handle_pointer_event(&mut doc, down(Point::new(150.0, 125.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(180.0, 160.0)));
    assert!(doc.is_modified());
    assert_eq!(ctl.handle_key_event(&mut doc, KeyEvent::plain(Key::Escape)), Response::Cancelled);

    assert_eq!(doc.item_by_id(&id).unwrap().rect(), Rect::new(100.0, 100.0, 200.0, 150.0));
    assert!(!doc.is_modified());
    assert!(!doc.item_by_id(&id).unwrap().is_modified());
    assert!(!doc.can_undo());
    let changes = rx
        .try_iter()
        .filter(|e| *e == DocumentEvent::ItemChanged(id.clone()))
        .count();
    assert_eq!(changes, 2);

    // A drag that returns to its start records nothing and stays clean too.
    // Pressed away from the first press so it is not read as a double-click.
    ctl.handle_pointer_event(&mut doc, down(Point::new(120.0, 110.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(140.0, 110.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(120.0, 110.0)));
    assert_eq!(ctl.handle_pointer_event(&mut doc, up(Point::new(120.0, 110.0))), Response::None);
    assert!(!doc.is_modified());
}

#[test]
fn cancel_keeps_earlier_edits_marked() {
    let (mut doc, mut ctl) = editor();
    let id = place(&mut doc, Rect::new(0.0, 0.0, 50.0, 50.0), 0.0);
    assert!(doc.is_modified());

    ctl.handle_pointer_event(&mut doc, down(Point::new(25.0, 25.0)));
    ctl.handle_pointer_event(&mut doc, drag_to(Point::new(45.0, 25.0)));
    assert_eq!(ctl.handle_pointer_event(&mut doc, PointerEvent::Cancel), Response::Cancelled);
    assert_eq!(doc.item_by_id(&id).unwrap().position(), Point::ZERO);
    assert!(doc.is_modified());
}
