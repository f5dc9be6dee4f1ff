// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display-surface to logical-pixel coordinate mapping.

use scanwerk_core::Point;

/// The screen rectangle a display surface currently occupies.
///
/// This changes with layout and zoom, so it is re-read for every pointer
/// event rather than cached.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the rectangle has no usable area. Mapping through a
    /// degenerate rectangle produces non-finite or meaningless values.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
            || !self.left.is_finite()
            || !self.top.is_finite()
    }
}

/// Maps pointer positions on a possibly rescaled display surface into logical
/// pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    display: DisplayRect,
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    /// Build a mapper for the given display rectangle and logical image size.
    ///
    /// No validation is performed: a zero-sized display yields infinite
    /// scale factors. Check [`DisplayRect::is_degenerate`] first.
    pub fn new(display: DisplayRect, image_width: f64, image_height: f64) -> Self {
        Self {
            display,
            scale_x: image_width / display.width,
            scale_y: image_height / display.height,
        }
    }

    /// `(scale_x, scale_y)`: logical pixels per display unit.
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    pub fn display(&self) -> DisplayRect {
        self.display
    }

    pub fn to_logical(&self, screen_x: f64, screen_y: f64) -> Point {
        Point::new(
            (screen_x - self.display.left) * self.scale_x,
            (screen_y - self.display.top) * self.scale_y,
        )
    }

    /// Inverse of [`to_logical`](Self::to_logical), for hosts that draw the
    /// overlay in screen space.
    pub fn to_display(&self, point: Point) -> (f64, f64) {
        (
            point.x / self.scale_x + self.display.left,
            point.y / self.scale_y + self.display.top,
        )
    }
}
