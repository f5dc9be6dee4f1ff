// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle editor — one axis-aligned crop rectangle that can be moved by its
// body or resized by four corner and four edge handles.
//
// Every drag works from a snapshot of the rectangle taken at pointer-down.
// The side opposite the dragged handle stays exactly where it was.

use scanwerk_core::{Point, Rect};
use tracing::{debug, instrument};

use crate::RenderHook;
use crate::handle::{HandleTarget, ResizeHandle};
use crate::mapper::{CoordinateMapper, DisplayRect};
use crate::overlay::Overlay;
use crate::pointer::{PointerEvent, PointerKind};

/// Smallest crop edge, in logical pixels.
pub const DEFAULT_MIN_SIZE: f64 = 50.0;
/// Default crop margin on each side, as a fraction of the image.
pub const DEFAULT_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RectState {
    #[default]
    Idle,
    Moving,
    Resizing(ResizeHandle),
}

/// State captured at pointer-down and discarded at pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    mode: RectState,
    /// Logical cursor position at pointer-down.
    anchor: Point,
    /// Display scale at pointer-down.
    scale: (f64, f64),
    /// Rectangle at pointer-down.
    start: Rect,
}

/// Axis-aligned crop rectangle editor.
///
/// After every mutation the rectangle satisfies `width >= min`,
/// `height >= min`, `x >= 0`, `y >= 0`, `x + width <= image width` and
/// `y + height <= image height`, where `min` is the configured minimum size
/// capped at the image extent along that axis.
pub struct RectangleEditor {
    image_width: f64,
    image_height: f64,
    min_size: f64,
    margin: f64,
    rect: Rect,
    session: Option<DragSession>,
    on_render: Option<RenderHook>,
}

impl RectangleEditor {
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self::with_limits(image_width, image_height, DEFAULT_MIN_SIZE, DEFAULT_MARGIN)
    }

    /// Build an editor with a custom minimum size and default margin.
    pub fn with_limits(image_width: u32, image_height: u32, min_size: f64, margin: f64) -> Self {
        let mut editor = Self {
            image_width: image_width as f64,
            image_height: image_height as f64,
            min_size: min_size.max(0.0),
            margin: margin.clamp(0.0, 0.5),
            rect: Rect::default(),
            session: None,
            on_render: None,
        };
        editor.rect = editor.default_rect();
        editor
    }

    /// Install the callback run after every mutation, and run it once.
    pub fn set_render_hook(&mut self, hook: impl FnMut(&Overlay) + 'static) {
        self.on_render = Some(Box::new(hook));
        self.render();
    }

    /// Re-initialise for a new image, discarding any drag in progress.
    #[instrument(skip(self))]
    pub fn load(&mut self, image_width: u32, image_height: u32) {
        self.image_width = image_width as f64;
        self.image_height = image_height as f64;
        self.session = None;
        self.rect = self.default_rect();
        self.render();
    }

    /// Restore the centred default rectangle and return to idle.
    pub fn reset(&mut self) {
        self.session = None;
        self.rect = self.default_rect();
        debug!(rect = ?self.rect, "crop rectangle reset");
        self.render();
    }

    /// Snapshot of the current rectangle.
    pub fn rectangle(&self) -> Rect {
        self.rect
    }

    pub fn state(&self) -> RectState {
        self.session.map_or(RectState::Idle, |session| session.mode)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    /// Effective `(min_width, min_height)` for the current image.
    pub fn min_size(&self) -> (f64, f64) {
        (
            self.min_size.min(self.image_width),
            self.min_size.min(self.image_height),
        )
    }

    /// Current overlay, computed from scratch.
    pub fn overlay(&self) -> Overlay {
        Overlay::for_rectangle(&self.rect)
    }

    /// Feed one pointer event. `display` is where the image is shown right
    /// now. Returns `true` if the rectangle changed.
    pub fn handle_event(&mut self, event: &PointerEvent, display: DisplayRect) -> bool {
        match event.kind {
            PointerKind::Up | PointerKind::Cancel => {
                if let Some(session) = self.session.take() {
                    debug!(mode = ?session.mode, rect = ?self.rect, "crop drag ended");
                }
                false
            }
            PointerKind::Down => {
                self.begin_drag(event, display);
                false
            }
            PointerKind::Move => self.drag(event, display),
        }
    }

    fn begin_drag(&mut self, event: &PointerEvent, display: DisplayRect) {
        if self.session.is_some() || display.is_degenerate() {
            return;
        }
        let mapper = CoordinateMapper::new(display, self.image_width, self.image_height);
        let anchor = mapper.to_logical(event.x, event.y);
        if !anchor.x.is_finite() || !anchor.y.is_finite() {
            return;
        }

        let target = event
            .target
            .or_else(|| self.overlay().hit_test(anchor));
        let mode = match target {
            Some(HandleTarget::Resize(handle)) => RectState::Resizing(handle),
            Some(HandleTarget::Body) => RectState::Moving,
            _ => return,
        };

        debug!(?mode, ?anchor, "crop drag started");
        self.session = Some(DragSession {
            mode,
            anchor,
            scale: mapper.scale(),
            start: self.rect,
        });
    }

    fn drag(&mut self, event: &PointerEvent, display: DisplayRect) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if display.is_degenerate() {
            debug!("ignoring move over zero-sized display");
            return false;
        }
        let mapper = CoordinateMapper::new(display, self.image_width, self.image_height);
        let cursor = mapper.to_logical(event.x, event.y);
        let dx = cursor.x - session.anchor.x;
        let dy = cursor.y - session.anchor.y;
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        if mapper.scale() != session.scale {
            debug!(from = ?session.scale, to = ?mapper.scale(), "display scale changed mid-drag");
        }

        let next = match session.mode {
            RectState::Moving => {
                moved(&session.start, dx, dy, self.image_width, self.image_height)
            }
            RectState::Resizing(handle) => {
                let (min_w, min_h) = self.min_size();
                resized(
                    handle,
                    &session.start,
                    dx,
                    dy,
                    (self.image_width, self.image_height),
                    (min_w, min_h),
                )
            }
            RectState::Idle => return false,
        };

        self.rect = next;
        self.render();
        true
    }

    /// Centred rectangle with `margin` on each side, widened to the
    /// effective minimum when the margin leaves too little.
    fn default_rect(&self) -> Rect {
        let (w, h) = (self.image_width, self.image_height);
        let (min_w, min_h) = self.min_size();
        let mut rect = Rect::new(
            w * self.margin,
            h * self.margin,
            w * (1.0 - 2.0 * self.margin),
            h * (1.0 - 2.0 * self.margin),
        );
        if rect.width < min_w {
            rect.width = min_w;
            rect.x = (w - min_w) / 2.0;
        }
        if rect.height < min_h {
            rect.height = min_h;
            rect.y = (h - min_h) / 2.0;
        }
        rect
    }

    fn render(&mut self) {
        let overlay = self.overlay();
        if let Some(hook) = self.on_render.as_mut() {
            hook(&overlay);
        }
    }
}

/// `max(lo, min(value, hi))`, which never panics when `lo > hi`.
fn constrain(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

/// Translate `start` by `(dx, dy)`, keeping it inside the image.
fn moved(start: &Rect, dx: f64, dy: f64, image_width: f64, image_height: f64) -> Rect {
    Rect::new(
        constrain(start.x + dx, 0.0, image_width - start.width),
        constrain(start.y + dy, 0.0, image_height - start.height),
        start.width,
        start.height,
    )
}

/// Resize `start` by dragging `handle` by `(dx, dy)`.
///
/// The edges opposite the handle stay fixed. A dragged left/top edge stops
/// at the image border or `min` before the fixed edge; a dragged right/bottom
/// edge stops at the image border or `min` after the fixed edge.
fn resized(
    handle: ResizeHandle,
    start: &Rect,
    dx: f64,
    dy: f64,
    (image_width, image_height): (f64, f64),
    (min_w, min_h): (f64, f64),
) -> Rect {
    let right = start.right();
    let bottom = start.bottom();

    let drag_left = || constrain(start.x + dx, 0.0, right - min_w);
    let drag_top = || constrain(start.y + dy, 0.0, bottom - min_h);
    let drag_width = || constrain(start.width + dx, min_w, image_width - start.x);
    let drag_height = || constrain(start.height + dy, min_h, image_height - start.y);

    let mut rect = *start;
    match handle {
        ResizeHandle::TopLeft => {
            rect.x = drag_left();
            rect.y = drag_top();
            rect.width = right - rect.x;
            rect.height = bottom - rect.y;
        }
        ResizeHandle::TopRight => {
            rect.y = drag_top();
            rect.width = drag_width();
            rect.height = bottom - rect.y;
        }
        ResizeHandle::BottomLeft => {
            rect.x = drag_left();
            rect.width = right - rect.x;
            rect.height = drag_height();
        }
        ResizeHandle::BottomRight => {
            rect.width = drag_width();
            rect.height = drag_height();
        }
        ResizeHandle::Top => {
            rect.y = drag_top();
            rect.height = bottom - rect.y;
        }
        ResizeHandle::Bottom => {
            rect.height = drag_height();
        }
        ResizeHandle::Left => {
            rect.x = drag_left();
            rect.width = right - rect.x;
        }
        ResizeHandle::Right => {
            rect.width = drag_width();
        }
    }
    rect
}
