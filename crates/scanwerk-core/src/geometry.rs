// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry value types in logical pixel space — points, the four-corner
// quadrilateral used for perspective correction, and the axis-aligned crop
// rectangle.

use serde::{Deserialize, Serialize};

/// Slack allowed when comparing rectangle edges against image bounds.
const BOUNDS_EPSILON: f64 = 1e-6;

/// A real-valued position in logical pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Clamp both axes independently to `[0, width] x [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, width.max(0.0)),
            y: self.y.clamp(0.0, height.max(0.0)),
        }
    }
}

/// Names of the four quadrilateral corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in polygon order (clockwise from top-left).
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopLeft => "topLeft",
            Self::TopRight => "topRight",
            Self::BottomRight => "bottomRight",
            Self::BottomLeft => "bottomLeft",
        }
    }
}

/// Four named corners. No convexity or ordering is enforced: a user may drag
/// the corners into a self-intersecting or collapsed shape, and consumers
/// must cope with that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quadrilateral {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quadrilateral {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// The four extreme corners of a `width` x `height` image.
    pub fn from_image_extremes(width: f64, height: f64) -> Self {
        Self {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(width, 0.0),
            bottom_right: Point::new(width, height),
            bottom_left: Point::new(0.0, height),
        }
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    pub fn set_corner(&mut self, corner: Corner, point: Point) {
        match corner {
            Corner::TopLeft => self.top_left = point,
            Corner::TopRight => self.top_right = point,
            Corner::BottomRight => self.bottom_right = point,
            Corner::BottomLeft => self.bottom_left = point,
        }
    }

    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn top_length(&self) -> f64 {
        self.top_left.distance(&self.top_right)
    }

    pub fn bottom_length(&self) -> f64 {
        self.bottom_left.distance(&self.bottom_right)
    }

    pub fn left_length(&self) -> f64 {
        self.top_left.distance(&self.bottom_left)
    }

    pub fn right_length(&self) -> f64 {
        self.top_right.distance(&self.bottom_right)
    }

    /// Absolute polygon area by the shoelace formula. Self-intersecting
    /// shapes yield the net (possibly cancelled) area.
    pub fn area(&self) -> f64 {
        let pts = self.points();
        let mut area = 0.0;
        for i in 0..pts.len() {
            let j = (i + 1) % pts.len();
            area += pts[i].x * pts[j].y;
            area -= pts[j].x * pts[i].y;
        }
        area.abs() / 2.0
    }

    /// Every corner clamped to `[0, width] x [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            top_left: self.top_left.clamped(width, height),
            top_right: self.top_right.clamped(width, height),
            bottom_right: self.bottom_right.clamped(width, height),
            bottom_left: self.bottom_left.clamped(width, height),
        }
    }

    /// Axis-aligned bounding box of the four corners.
    pub fn bounding_box(&self) -> Rect {
        let pts = self.points();
        let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Axis-aligned region in logical pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle has a positive size and lies entirely inside
    /// `[0, width] x [0, height]`.
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.width > 0.0
            && self.height > 0.0
            && self.x >= -BOUNDS_EPSILON
            && self.y >= -BOUNDS_EPSILON
            && self.right() <= width + BOUNDS_EPSILON
            && self.bottom() <= height + BOUNDS_EPSILON
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The image-extreme quadrilateral spans the full image.
    #[test]
    fn image_extremes_cover_image() {
        let quad = Quadrilateral::from_image_extremes(400.0, 300.0);
        assert_eq!(quad.top_right, Point::new(400.0, 0.0));
        assert_eq!(quad.bottom_left, Point::new(0.0, 300.0));
        assert!((quad.area() - 120_000.0).abs() < 1e-9);
        assert_eq!(quad.bounding_box(), Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    /// Setting one corner leaves the other three untouched.
    #[test]
    fn set_corner_is_local() {
        let mut quad = Quadrilateral::from_image_extremes(100.0, 100.0);
        quad.set_corner(Corner::BottomRight, Point::new(70.0, 80.0));
        assert_eq!(quad.corner(Corner::BottomRight), Point::new(70.0, 80.0));
        assert_eq!(quad.top_left, Point::new(0.0, 0.0));
        assert_eq!(quad.top_right, Point::new(100.0, 0.0));
        assert_eq!(quad.bottom_left, Point::new(0.0, 100.0));
    }

    /// Bounding box of a skewed quad uses the extreme coordinates.
    #[test]
    fn bounding_box_of_skewed_quad() {
        let quad = Quadrilateral::new(
            Point::new(12.0, 5.0),
            Point::new(90.0, 20.0),
            Point::new(80.0, 95.0),
            Point::new(3.0, 70.0),
        );
        assert_eq!(quad.bounding_box(), Rect::new(3.0, 5.0, 87.0, 90.0));
    }

    /// Opposite-side lengths are Euclidean distances.
    #[test]
    fn side_lengths() {
        let quad = Quadrilateral::new(
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 14.0),
            Point::new(0.0, 10.0),
        );
        assert!((quad.top_length() - 5.0).abs() < 1e-12);
        assert!((quad.bottom_length() - 5.0).abs() < 1e-12);
        assert!((quad.left_length() - 10.0).abs() < 1e-12);
        assert!((quad.right_length() - 10.0).abs() < 1e-12);
    }

    /// Point clamping works per axis.
    #[test]
    fn point_clamped_per_axis() {
        assert_eq!(Point::new(-5.0, 50.0).clamped(100.0, 40.0), Point::new(0.0, 40.0));
        assert_eq!(Point::new(150.0, -1.0).clamped(100.0, 40.0), Point::new(100.0, 0.0));
    }

    /// Far-out corners are pulled back onto the image edges.
    #[test]
    fn quad_clamped_to_image() {
        let quad = Quadrilateral::new(
            Point::new(-20.0, 0.0),
            Point::new(1e9, 0.0),
            Point::new(1e9, 1e9),
            Point::new(0.0, 1e9),
        )
        .clamped(100.0, 80.0);
        assert_eq!(quad, Quadrilateral::from_image_extremes(100.0, 80.0));
    }

    /// A rectangle fits only when it is non-empty and inside the bounds.
    #[test]
    fn rect_fits_within_bounds() {
        assert!(Rect::new(0.0, 0.0, 160.0, 120.0).fits_within(160.0, 120.0));
        assert!(Rect::new(10.0, 10.0, 60.0, 60.0).fits_within(160.0, 120.0));
        assert!(Rect::new(200.0 - 160.1, 0.0, 160.1, 120.0).fits_within(200.0, 120.0));
        assert!(!Rect::new(1000.0, 1000.0, 60.0, 60.0).fits_within(160.0, 120.0));
        assert!(!Rect::new(120.0, 10.0, 60.0, 60.0).fits_within(160.0, 120.0));
        assert!(!Rect::new(-1.0, 0.0, 60.0, 60.0).fits_within(160.0, 120.0));
        assert!(!Rect::new(0.0, 0.0, 0.0, 60.0).fits_within(160.0, 120.0));
        assert!(!Rect::new(0.0, f64::NAN, 60.0, 60.0).fits_within(160.0, 120.0));
    }

    /// Corner names match the serialised field names.
    #[test]
    fn corner_names_match_serde() {
        let json = serde_json::to_string(&Corner::BottomLeft).expect("serialize corner");
        assert_eq!(json, format!("\"{}\"", Corner::BottomLeft.name()));
    }
}
