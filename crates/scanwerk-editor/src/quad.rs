// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral editor — four independently draggable corner handles used to
// outline a photographed page before perspective correction.

use scanwerk_core::{Corner, Quadrilateral};
use tracing::{debug, instrument};

use crate::RenderHook;
use crate::handle::HandleTarget;
use crate::mapper::{CoordinateMapper, DisplayRect};
use crate::overlay::Overlay;
use crate::pointer::{PointerEvent, PointerKind};

/// Editor state. At most one corner is dragged at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadState {
    #[default]
    Idle,
    Dragging(Corner),
}

/// Free-quadrilateral corner editor.
///
/// Corners start at the image's four extremes. Dragging moves exactly one
/// corner, clamped independently per axis to the image. No convexity is
/// enforced.
pub struct QuadrilateralEditor {
    image_width: f64,
    image_height: f64,
    corners: Quadrilateral,
    state: QuadState,
    on_render: Option<RenderHook>,
}

impl QuadrilateralEditor {
    pub fn new(image_width: u32, image_height: u32) -> Self {
        let (w, h) = (image_width as f64, image_height as f64);
        Self {
            image_width: w,
            image_height: h,
            corners: Quadrilateral::from_image_extremes(w, h),
            state: QuadState::Idle,
            on_render: None,
        }
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
        self.state = QuadState::Idle;
        self.corners = Quadrilateral::from_image_extremes(self.image_width, self.image_height);
        self.render();
    }

    /// Restore the image-extreme corners and return to idle.
    pub fn reset(&mut self) {
        self.state = QuadState::Idle;
        self.corners = Quadrilateral::from_image_extremes(self.image_width, self.image_height);
        debug!("quadrilateral reset");
        self.render();
    }

    /// Snapshot of the current corners.
    pub fn corners(&self) -> Quadrilateral {
        self.corners
    }

    pub fn state(&self) -> QuadState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, QuadState::Dragging(_))
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    /// Current overlay, computed from scratch.
    pub fn overlay(&self) -> Overlay {
        Overlay::for_quadrilateral(&self.corners)
    }

    /// Feed one pointer event. `display` is where the image is shown right
    /// now. Returns `true` if the corners changed.
    pub fn handle_event(&mut self, event: &PointerEvent, display: DisplayRect) -> bool {
        match event.kind {
            PointerKind::Up | PointerKind::Cancel => {
                if let QuadState::Dragging(corner) = self.state {
                    debug!(corner = corner.name(), "corner drag ended");
                }
                self.state = QuadState::Idle;
                false
            }
            PointerKind::Down => {
                if self.is_dragging() {
                    return false;
                }
                let target = match event.target {
                    Some(target) => Some(target),
                    None => self.hit_test(event, display),
                };
                if let Some(HandleTarget::Corner(corner)) = target {
                    debug!(corner = corner.name(), "corner drag started");
                    self.state = QuadState::Dragging(corner);
                }
                false
            }
            PointerKind::Move => {
                let QuadState::Dragging(corner) = self.state else {
                    return false;
                };
                if display.is_degenerate() {
                    debug!("ignoring move over zero-sized display");
                    return false;
                }
                let mapper = CoordinateMapper::new(display, self.image_width, self.image_height);
                let logical = mapper.to_logical(event.x, event.y);
                if !logical.x.is_finite() || !logical.y.is_finite() {
                    return false;
                }
                let constrained = logical.clamped(self.image_width, self.image_height);
                self.corners.set_corner(corner, constrained);
                self.render();
                true
            }
        }
    }

    fn hit_test(&self, event: &PointerEvent, display: DisplayRect) -> Option<HandleTarget> {
        if display.is_degenerate() {
            return None;
        }
        let mapper = CoordinateMapper::new(display, self.image_width, self.image_height);
        self.overlay().hit_test(mapper.to_logical(event.x, event.y))
    }

    fn render(&mut self) {
        let overlay = self.overlay();
        if let Some(hook) = self.on_render.as_mut() {
            hook(&overlay);
        }
    }
}
