//! Selection handles and the resize / rotate math behind them.
//!
//! Everything here works on an item's unrotated rectangle plus a rotation in
//! degrees about the rectangle center. Points coming from the pointer are
//! mapped into that local frame before any containment test.

use crate::items::normalize_angle;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Side length of a square handle, in document units.
pub const HANDLE_SIZE: f64 = 8.0;
/// Gap between the item edge and the selection outline.
pub const HANDLE_SPACE: f64 = 4.0;
/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_DISTANCE: f64 = 20.0;
/// Smallest width or height a resize may produce.
pub const MIN_ITEM_SIZE: f64 = 10.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner handle, resizes two edges.
    Corner(Corner),
    /// Edge midpoint handle, resizes one edge.
    Edge(Edge),
    /// Rotation handle above the top edge.
    Rotate,
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl HandleKind {
    /// All handles in hit-test priority order.
    pub const ALL: [HandleKind; 9] = [
        HandleKind::Rotate,
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Edge(Edge::Left),
        HandleKind::Edge(Edge::Right),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Corner(Corner::BottomRight),
    ];

    /// Whether dragging this handle changes the item size.
    pub fn is_resize(self) -> bool {
        !matches!(self, HandleKind::Rotate)
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in document coordinates (rotation applied).
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }
}

/// Transform mapping an item's local (unrotated) frame to document space.
pub fn item_transform(rect: Rect, rotation: f64) -> Affine {
    Affine::rotate_about(rotation.to_radians(), rect.center())
}

/// Map a document-space point into the item's unrotated frame.
pub fn to_local(rect: Rect, rotation: f64, point: Point) -> Point {
    if rotation == 0.0 {
        return point;
    }
    Affine::rotate_about(-rotation.to_radians(), rect.center()) * point
}

/// Rotation-aware containment test.
pub fn rotated_contains(rect: Rect, rotation: f64, point: Point) -> bool {
    rect.contains(to_local(rect, rotation, point))
}

/// Handle position in the item's unrotated frame.
pub fn local_handle_position(rect: Rect, kind: HandleKind, rotate_distance: f64) -> Point {
    let center = rect.center();
    match kind {
        HandleKind::Rotate => Point::new(center.x, rect.y0 - rotate_distance),
        HandleKind::Corner(Corner::TopLeft) => Point::new(rect.x0, rect.y0),
        HandleKind::Corner(Corner::TopRight) => Point::new(rect.x1, rect.y0),
        HandleKind::Corner(Corner::BottomLeft) => Point::new(rect.x0, rect.y1),
        HandleKind::Corner(Corner::BottomRight) => Point::new(rect.x1, rect.y1),
        HandleKind::Edge(Edge::Top) => Point::new(center.x, rect.y0),
        HandleKind::Edge(Edge::Bottom) => Point::new(center.x, rect.y1),
        HandleKind::Edge(Edge::Left) => Point::new(rect.x0, center.y),
        HandleKind::Edge(Edge::Right) => Point::new(rect.x1, center.y),
    }
}

/// All nine handles positioned in document space, for drawing.
pub fn get_handles(rect: Rect, rotation: f64, rotate_distance: f64) -> Vec<Handle> {
    let transform = item_transform(rect, rotation);
    HandleKind::ALL
        .iter()
        .map(|&kind| Handle::new(transform * local_handle_position(rect, kind, rotate_distance), kind))
        .collect()
}

/// Find the handle under `point`, testing the rotation handle first.
pub fn hit_handle(
    rect: Rect,
    rotation: f64,
    point: Point,
    handle_size: f64,
    rotate_distance: f64,
) -> Option<HandleKind> {
    let local = to_local(rect, rotation, point);
    HandleKind::ALL.into_iter().find(|&kind| {
        let center = local_handle_position(rect, kind, rotate_distance);
        Rect::from_center_size(center, Size::new(handle_size, handle_size)).contains(local)
    })
}

/// Area an item may paint into, including its selection decorations.
///
/// Rotated items get the square spanned by the diagonal of the padded rect,
/// which covers every possible rotation.
pub fn decorated_bounds(rect: Rect, rotation: f64, margin: f64) -> Rect {
    let padded = rect.inflate(margin, margin);
    if rotation == 0.0 {
        return padded;
    }
    let diagonal = padded.width().hypot(padded.height());
    Rect::from_center_size(rect.center(), Size::new(diagonal, diagonal))
}

/// Axis-aligned bounds of the rotated rect itself.
pub fn rotated_extent(rect: Rect, rotation: f64) -> Rect {
    let transform = item_transform(rect, rotation);
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x1, rect.y1),
    ];
    corners
        .iter()
        .map(|&p| transform * p)
        .fold(Rect::from_points(transform * corners[0], transform * corners[0]), |acc, p| {
            acc.union_pt(p)
        })
}

/// Apply a handle drag to the rect captured at gesture start.
///
/// `delta` is the total pointer travel expressed in the item's local frame.
/// Returns `None` when the result would be narrower or shorter than
/// `min_size`; callers keep the previous rect in that case.
pub fn resize_rect(start: Rect, handle: HandleKind, delta: Vec2, min_size: f64) -> Option<Rect> {
    let mut r = start;
    match handle {
        HandleKind::Rotate => return None,
        HandleKind::Corner(Corner::TopLeft) => {
            r.x0 += delta.x;
            r.y0 += delta.y;
        }
        HandleKind::Corner(Corner::TopRight) => {
            r.x1 += delta.x;
            r.y0 += delta.y;
        }
        HandleKind::Corner(Corner::BottomLeft) => {
            r.x0 += delta.x;
            r.y1 += delta.y;
        }
        HandleKind::Corner(Corner::BottomRight) => {
            r.x1 += delta.x;
            r.y1 += delta.y;
        }
        HandleKind::Edge(Edge::Top) => r.y0 += delta.y,
        HandleKind::Edge(Edge::Bottom) => r.y1 += delta.y,
        HandleKind::Edge(Edge::Left) => r.x0 += delta.x,
        HandleKind::Edge(Edge::Right) => r.x1 += delta.x,
    }
    if r.width() < min_size || r.height() < min_size {
        return None;
    }
    Some(r)
}

/// Signed angle in degrees swept from `start` to `current` around `center`.
pub fn rotation_delta(center: Point, start: Point, current: Point) -> f64 {
    let a = start - center;
    let b = current - center;
    (b.y.atan2(b.x) - a.y.atan2(a.x)).to_degrees()
}

/// Rotation after dragging the rotate handle from `start` to `current`.
pub fn apply_rotation(start_rotation: f64, center: Point, start: Point, current: Point) -> f64 {
    normalize_angle(start_rotation + rotation_delta(center, start, current))
}
