//! Free-form canvas board.
//!
//! Entities (HTML snippets, text notes, links, scribbles) live in canvas
//! coordinates; a [`CanvasView`] maps them to screen pixels through one
//! `kurbo::Affine` (pan offset, then uniform zoom). Tools translate input
//! events into [`CanvasMutation`]s, which the host applies via
//! [`CanvasBoard::apply`].
//!
//! | Tool | Drag on entity | Drag on empty space |
//! |------|----------------|---------------------|
//! | Select | Move entity | Pan |
//! | Pan | Pan | Pan |
//! | Scribble | Draw | Draw |
//!
//! Holding the command modifier pans with any tool; command + wheel zooms
//! around the pointer.

use crate::input::InputEvent;
use crate::shortcuts::ShortcutAction;
use folio_core::EditorConfig;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

const ZOOM_STEP: f64 = 1.25;
const WHEEL_ZOOM_SPEED: f64 = 0.01;
const SCRIBBLE_STROKE: f64 = 2.0;

static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

fn next_entity_id(prefix: &str) -> String {
    format!("{prefix}_{}", NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
}

// ─── Entities ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntityKind {
    Html { html: String },
    Text { content: String },
    Url { url: String },
    /// Polyline relative to the entity origin.
    Scribble { points: Vec<(f64, f64)>, stroke: f64 },
}

impl EntityKind {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Html { .. } => "html",
            Self::Text { .. } => "text",
            Self::Url { .. } => "url",
            Self::Scribble { .. } => "scribble",
        }
    }

    fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Html { .. } => (480.0, 320.0),
            Self::Text { .. } => (240.0, 64.0),
            Self::Url { .. } => (320.0, 200.0),
            Self::Scribble { .. } => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasEntity {
    pub id: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasEntity {
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

// ─── View ────────────────────────────────────────────────────────────────

/// Screen = translate(offset) · scale(zoom) · canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl CanvasView {
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.offset_x, self.offset_y)) * Affine::scale(self.zoom)
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        self.transform().inverse() * screen
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset_x += delta.x;
        self.offset_y += delta.y;
    }

    /// Set the zoom (clamped), keeping the canvas point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, zoom: f64, min: f64, max: f64) {
        let fixed = self.to_canvas(anchor);
        self.zoom = zoom.clamp(min, max);
        let offset = anchor.to_vec2() - fixed.to_vec2() * self.zoom;
        self.offset_x = offset.x;
        self.offset_y = offset.y;
    }
}

// ─── Mutations & tools ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum CanvasMutation {
    AddEntity { entity: CanvasEntity },
    MoveEntity { id: String, x: f64, y: f64 },
    ResizeEntity { id: String, width: f64, height: f64 },
    RemoveEntity { id: String },
    BringToFront { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasTool {
    #[default]
    Select,
    Pan,
    Scribble,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    /// `grab` is the pointer offset from the entity origin.
    Dragging { id: String, grab: Vec2 },
    Panning { last: Point },
    Scribbling { points: Vec<Point> },
}

// ─── Board ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CanvasBoard {
    entities: Vec<CanvasEntity>,
    pub view: CanvasView,
    tool: CanvasTool,
    selected: Option<String>,
    min_zoom: f64,
    max_zoom: f64,
    gesture: Gesture,
}

impl Default for CanvasBoard {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl CanvasBoard {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            entities: Vec::new(),
            view: CanvasView::default(),
            tool: CanvasTool::Select,
            selected: None,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            gesture: Gesture::Idle,
        }
    }

    pub fn entities(&self) -> &[CanvasEntity] {
        &self.entities
    }

    pub fn entity(&self, id: &str) -> Option<&CanvasEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.entity(id).is_some())
            .map(str::to_string);
    }

    pub fn tool(&self) -> CanvasTool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: CanvasTool) {
        self.tool = tool;
        self.gesture = Gesture::Idle;
    }

    /// Topmost entity containing a canvas-space point.
    pub fn hit_test(&self, point: Point) -> Option<&str> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.frame().contains(point))
            .map(|e| e.id.as_str())
    }

    /// A new entity centered on a screen point.
    pub fn place(&self, kind: EntityKind, screen: Point) -> CanvasMutation {
        let center = self.view.to_canvas(screen);
        let (width, height) = kind.default_size();
        CanvasMutation::AddEntity {
            entity: CanvasEntity {
                id: next_entity_id(kind.prefix()),
                kind,
                x: center.x - width / 2.0,
                y: center.y - height / 2.0,
                width,
                height,
            },
        }
    }

    /// Resize an existing entity. Sizes below one canvas unit are clamped.
    pub fn resize(&self, id: &str, width: f64, height: f64) -> Option<CanvasMutation> {
        let entity = self.entity(id)?;
        let (width, height) = (width.max(1.0), height.max(1.0));
        (entity.width != width || entity.height != height).then(|| CanvasMutation::ResizeEntity {
            id: id.to_string(),
            width,
            height,
        })
    }

    /// Raise an entity above the others; `None` if it is already on top.
    pub fn raise(&self, id: &str) -> Option<CanvasMutation> {
        let top = self.entities.last()?;
        (top.id != id && self.entity(id).is_some()).then(|| CanvasMutation::BringToFront {
            id: id.to_string(),
        })
    }

    /// Translate an input event into mutations. View changes (pan, zoom)
    /// are applied directly.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<CanvasMutation> {
        let screen = event.position();
        let point = self.view.to_canvas(screen);
        match event {
            InputEvent::Wheel {
                dx, dy, modifiers, ..
            } => {
                if modifiers.command() {
                    let zoom = self.view.zoom * (-dy * WHEEL_ZOOM_SPEED).exp();
                    self.view.zoom_at(screen, zoom, self.min_zoom, self.max_zoom);
                } else {
                    self.view.pan_by(Vec2::new(-dx, -dy));
                }
                vec![]
            }
            InputEvent::PointerDown { modifiers, .. } => {
                self.gesture = if self.tool == CanvasTool::Pan || modifiers.command() {
                    Gesture::Panning { last: screen }
                } else if self.tool == CanvasTool::Scribble {
                    Gesture::Scribbling {
                        points: vec![point],
                    }
                } else {
                    self.pointer_down_select(point, screen)
                };
                vec![]
            }
            InputEvent::PointerMove { modifiers, .. } => match &mut self.gesture {
                Gesture::Idle => vec![],
                Gesture::Dragging { id, grab } => {
                    let mut origin = point - *grab;
                    if modifiers.shift
                        && let Some(entity) = self.entities.iter().find(|e| e.id == *id)
                    {
                        // Constrain to the dominant axis.
                        let delta = origin - Point::new(entity.x, entity.y);
                        if delta.x.abs() > delta.y.abs() {
                            origin.y = entity.y;
                        } else {
                            origin.x = entity.x;
                        }
                    }
                    vec![CanvasMutation::MoveEntity {
                        id: id.clone(),
                        x: origin.x,
                        y: origin.y,
                    }]
                }
                Gesture::Panning { last } => {
                    let delta = screen - *last;
                    *last = screen;
                    self.view.pan_by(delta);
                    vec![]
                }
                Gesture::Scribbling { points } => {
                    if points.last() != Some(&point) {
                        points.push(point);
                    }
                    vec![]
                }
            },
            InputEvent::PointerUp { .. } => {
                match std::mem::replace(&mut self.gesture, Gesture::Idle) {
                    Gesture::Scribbling { points } => scribble_entity(&points)
                        .map(|entity| vec![CanvasMutation::AddEntity { entity }])
                        .unwrap_or_default(),
                    _ => vec![],
                }
            }
        }
    }

    fn pointer_down_select(&mut self, point: Point, screen: Point) -> Gesture {
        let hit = self.hit_test(point).map(str::to_string);
        self.selected = hit.clone();
        match hit.and_then(|id| self.entity(&id).map(|e| (id, Point::new(e.x, e.y)))) {
            Some((id, origin)) => Gesture::Dragging {
                id,
                grab: point - origin,
            },
            None => Gesture::Panning { last: screen },
        }
    }

    pub fn apply(&mut self, mutation: CanvasMutation) {
        match mutation {
            CanvasMutation::AddEntity { entity } => {
                if self.entity(&entity.id).is_some() {
                    log::warn!("canvas entity {} already exists", entity.id);
                    return;
                }
                self.entities.push(entity);
            }
            CanvasMutation::MoveEntity { id, x, y } => {
                if let Some(e) = self.entities.iter_mut().find(|e| e.id == id) {
                    e.x = x;
                    e.y = y;
                }
            }
            CanvasMutation::ResizeEntity { id, width, height } => {
                if let Some(e) = self.entities.iter_mut().find(|e| e.id == id) {
                    e.width = width.max(1.0);
                    e.height = height.max(1.0);
                }
            }
            CanvasMutation::RemoveEntity { id } => {
                self.entities.retain(|e| e.id != id);
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.selected = None;
                }
            }
            CanvasMutation::BringToFront { id } => {
                if let Some(pos) = self.entities.iter().position(|e| e.id == id) {
                    let entity = self.entities.remove(pos);
                    self.entities.push(entity);
                }
            }
        }
    }

    /// Handle a canvas shortcut. `center` is the viewport center in screen
    /// coordinates, used as the zoom anchor.
    pub fn apply_shortcut(&mut self, action: ShortcutAction, center: Point) -> bool {
        match action {
            ShortcutAction::ZoomIn => {
                let zoom = self.view.zoom * ZOOM_STEP;
                self.view.zoom_at(center, zoom, self.min_zoom, self.max_zoom);
                true
            }
            ShortcutAction::ZoomOut => {
                let zoom = self.view.zoom / ZOOM_STEP;
                self.view.zoom_at(center, zoom, self.min_zoom, self.max_zoom);
                true
            }
            ShortcutAction::ZoomReset => {
                self.view = CanvasView::default();
                true
            }
            ShortcutAction::Deselect => self.selected.take().is_some(),
            ShortcutAction::Delete => match self.selected.clone() {
                Some(id) => {
                    self.apply(CanvasMutation::RemoveEntity { id });
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

/// Bounding box of a stroke, padded by the stroke width.
fn scribble_entity(points: &[Point]) -> Option<CanvasEntity> {
    if points.len() < 2 {
        return None;
    }
    let first = Rect::from_points(points[0], points[0]);
    let bounds = points
        .iter()
        .fold(first, |r, p| r.union_pt(*p))
        .inflate(SCRIBBLE_STROKE, SCRIBBLE_STROKE);
    let relative = points
        .iter()
        .map(|p| (p.x - bounds.x0, p.y - bounds.y0))
        .collect();
    let kind = EntityKind::Scribble {
        points: relative,
        stroke: SCRIBBLE_STROKE,
    };
    Some(CanvasEntity {
        id: next_entity_id(kind.prefix()),
        kind,
        x: bounds.x0,
        y: bounds.y0,
        width: bounds.width(),
        height: bounds.height(),
    })
}
