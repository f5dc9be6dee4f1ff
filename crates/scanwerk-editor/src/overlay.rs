// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay model — what the host draws over the image, recomputed in full after
// every editor mutation, plus the handle table used for hit testing.

use scanwerk_core::{Corner, Point, Quadrilateral, Rect};

use crate::handle::{HandleTarget, ResizeHandle};

/// Quadrilateral corner handle radius (sized for touch targets).
pub const CORNER_HANDLE_RADIUS: f64 = 20.0;
/// Crop-rectangle corner handle radius.
pub const RESIZE_HANDLE_RADIUS: f64 = 16.0;
/// Crop-rectangle edge handle edge length.
pub const EDGE_HANDLE_SIZE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleShape {
    Circle { radius: f64 },
    Square { size: f64 },
}

/// A draggable handle in logical pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub target: HandleTarget,
    pub center: Point,
    pub shape: HandleShape,
}

impl Handle {
    pub fn contains(&self, point: Point) -> bool {
        match self.shape {
            HandleShape::Circle { radius } => self.center.distance(&point) <= radius,
            HandleShape::Square { size } => {
                let half = size / 2.0;
                (point.x - self.center.x).abs() <= half && (point.y - self.center.y).abs() <= half
            }
        }
    }
}

/// Everything needed to draw an editor overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Outline polygon, `[top_left, top_right, bottom_right, bottom_left]`.
    pub outline: [Point; 4],
    /// Draggable body, present for the crop rectangle only.
    pub body: Option<Rect>,
    /// Handles in drawing order; later entries sit on top.
    pub handles: Vec<Handle>,
}

impl Overlay {
    pub fn for_quadrilateral(quad: &Quadrilateral) -> Self {
        let handles = Corner::ALL
            .into_iter()
            .map(|corner| Handle {
                target: HandleTarget::Corner(corner),
                center: quad.corner(corner),
                shape: HandleShape::Circle {
                    radius: CORNER_HANDLE_RADIUS,
                },
            })
            .collect();
        Self {
            outline: quad.points(),
            body: None,
            handles,
        }
    }

    pub fn for_rectangle(rect: &Rect) -> Self {
        let mid_x = rect.x + rect.width / 2.0;
        let mid_y = rect.y + rect.height / 2.0;
        let corner = |handle, x, y| Handle {
            target: HandleTarget::Resize(handle),
            center: Point::new(x, y),
            shape: HandleShape::Circle {
                radius: RESIZE_HANDLE_RADIUS,
            },
        };
        let edge = |handle, x, y| Handle {
            target: HandleTarget::Resize(handle),
            center: Point::new(x, y),
            shape: HandleShape::Square {
                size: EDGE_HANDLE_SIZE,
            },
        };

        let handles = vec![
            corner(ResizeHandle::TopLeft, rect.x, rect.y),
            corner(ResizeHandle::TopRight, rect.right(), rect.y),
            corner(ResizeHandle::BottomLeft, rect.x, rect.bottom()),
            corner(ResizeHandle::BottomRight, rect.right(), rect.bottom()),
            edge(ResizeHandle::Top, mid_x, rect.y),
            edge(ResizeHandle::Bottom, mid_x, rect.bottom()),
            edge(ResizeHandle::Left, rect.x, mid_y),
            edge(ResizeHandle::Right, rect.right(), mid_y),
        ];

        Self {
            outline: rect.corners(),
            body: Some(*rect),
            handles,
        }
    }

    /// Resolve a logical point to the handle under it. Handles take priority
    /// over the body; among overlapping handles the topmost wins.
    pub fn hit_test(&self, point: Point) -> Option<HandleTarget> {
        self.handles
            .iter()
            .rev()
            .find(|handle| handle.contains(point))
            .map(|handle| handle.target)
            .or_else(|| {
                self.body
                    .filter(|body| body.contains(point))
                    .map(|_| HandleTarget::Body)
            })
    }
}
