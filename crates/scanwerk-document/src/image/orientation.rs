// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orientation normalisation — undo the rotation/flip a camera recorded in the
// EXIF orientation tag (0x0112).
//
// Two views of the same correction are provided: an `OrientationPlan` (canvas
// size plus the translate/rotate/scale sequence a drawing surface applies
// before painting the raw image) and `OrientationNormalizer::apply`, which
// composites the pixels directly with the `image` crate. The plan is also an
// affine map, so the two can be checked against each other.

use std::io::Cursor;

use image::DynamicImage;
use tracing::{debug, instrument};

/// Camera-reported orientation, EXIF codes 1–8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExifOrientation {
    /// 1: no transform.
    #[default]
    Normal,
    /// 2: mirror left/right.
    FlipHorizontal,
    /// 3: rotate 180°.
    Rotate180,
    /// 4: mirror top/bottom.
    FlipVertical,
    /// 5: rotate 90° CCW, then mirror left/right.
    Transpose,
    /// 6: rotate 90° CW.
    Rotate90Cw,
    /// 7: rotate 90° CW, then mirror left/right.
    Transverse,
    /// 8: rotate 90° CCW.
    Rotate90Ccw,
}

impl ExifOrientation {
    /// Map an EXIF code to an orientation. Unknown codes are `Normal`.
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90Cw,
            7 => Self::Transverse,
            8 => Self::Rotate90Ccw,
            _ => Self::Normal,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Transpose => 5,
            Self::Rotate90Cw => 6,
            Self::Transverse => 7,
            Self::Rotate90Ccw => 8,
        }
    }

    /// Codes 5–8 swap width and height.
    pub fn swaps_dimensions(&self) -> bool {
        self.code() >= 5
    }
}

/// One drawing-surface transform step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasOp {
    Translate { x: f64, y: f64 },
    /// Rotation by `quarter_turns * 90°`, clockwise on a y-down surface.
    Rotate { quarter_turns: i32 },
    Scale { x: f64, y: f64 },
}

impl CanvasOp {
    pub fn radians(quarter_turns: i32) -> f64 {
        quarter_turns as f64 * std::f64::consts::FRAC_PI_2
    }

    fn matrix(&self) -> Affine {
        match *self {
            Self::Translate { x, y } => Affine {
                e: x,
                f: y,
                ..Affine::IDENTITY
            },
            Self::Scale { x, y } => Affine {
                a: x,
                d: y,
                ..Affine::IDENTITY
            },
            Self::Rotate { quarter_turns } => {
                let (cos, sin) = match quarter_turns.rem_euclid(4) {
                    0 => (1.0, 0.0),
                    1 => (0.0, 1.0),
                    2 => (-1.0, 0.0),
                    _ => (0.0, -1.0),
                };
                Affine {
                    a: cos,
                    b: sin,
                    c: -sin,
                    d: cos,
                    e: 0.0,
                    f: 0.0,
                }
            }
        }
    }
}

/// 2D affine transform `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// `self * other`: `other` applies to the point first.
    fn then_local(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Canvas size and ordered transform steps for drawing a raw image upright.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationPlan {
    pub orientation: ExifOrientation,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Applied to the surface in order before the raw image is drawn at (0, 0).
    pub ops: Vec<CanvasOp>,
}

impl OrientationPlan {
    /// Where a raw-image point lands on the canvas.
    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        self.ops
            .iter()
            .fold(Affine::IDENTITY, |acc, op| acc.then_local(&op.matrix()))
            .apply(x, y)
    }
}

/// Source of the orientation tag in an encoded photo.
pub trait MetadataExtractor {
    /// Orientation code 1–8, or `None` if absent or unreadable.
    fn extract_orientation(&self, file_bytes: &[u8]) -> Option<u32>;
}

/// Reads EXIF tag 0x0112 from the primary IFD via `kamadak-exif`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadataExtractor;

impl MetadataExtractor for ExifMetadataExtractor {
    fn extract_orientation(&self, file_bytes: &[u8]) -> Option<u32> {
        let mut cursor = Cursor::new(file_bytes);
        let reader = match exif::Reader::new().read_from_container(&mut cursor) {
            Ok(reader) => reader,
            Err(err) => {
                debug!(error = %err, "no readable EXIF data");
                return None;
            }
        };
        reader
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .filter(|code| (1..=8).contains(code))
    }
}

/// Computes and applies the eight canonical orientation corrections.
pub struct OrientationNormalizer;

impl OrientationNormalizer {
    /// Plan the correction for a raw `width` x `height` image.
    pub fn plan(orientation: ExifOrientation, width: u32, height: u32) -> OrientationPlan {
        let (canvas_width, canvas_height) = if orientation.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        };
        let (cw, ch) = (canvas_width as f64, canvas_height as f64);

        let ops = match orientation {
            ExifOrientation::Normal => vec![],
            ExifOrientation::FlipHorizontal => vec![
                CanvasOp::Translate { x: cw, y: 0.0 },
                CanvasOp::Scale { x: -1.0, y: 1.0 },
            ],
            ExifOrientation::Rotate180 => vec![
                CanvasOp::Translate { x: cw, y: ch },
                CanvasOp::Rotate { quarter_turns: 2 },
            ],
            ExifOrientation::FlipVertical => vec![
                CanvasOp::Translate { x: 0.0, y: ch },
                CanvasOp::Scale { x: 1.0, y: -1.0 },
            ],
            ExifOrientation::Transpose => vec![
                CanvasOp::Rotate { quarter_turns: -1 },
                CanvasOp::Scale { x: -1.0, y: 1.0 },
            ],
            ExifOrientation::Rotate90Cw => vec![
                CanvasOp::Translate { x: cw, y: 0.0 },
                CanvasOp::Rotate { quarter_turns: 1 },
            ],
            ExifOrientation::Transverse => vec![
                CanvasOp::Translate { x: cw, y: ch },
                CanvasOp::Rotate { quarter_turns: 1 },
                CanvasOp::Scale { x: -1.0, y: 1.0 },
            ],
            ExifOrientation::Rotate90Ccw => vec![
                CanvasOp::Translate { x: 0.0, y: ch },
                CanvasOp::Rotate { quarter_turns: -1 },
            ],
        };

        OrientationPlan {
            orientation,
            canvas_width,
            canvas_height,
            ops,
        }
    }

    /// Produce an upright copy of `image`.
    #[instrument(skip(image), fields(width = image.width(), height = image.height(), code = orientation.code()))]
    pub fn apply(image: &DynamicImage, orientation: ExifOrientation) -> DynamicImage {
        debug!("Applying orientation correction");
        match orientation {
            ExifOrientation::Normal => image.clone(),
            ExifOrientation::FlipHorizontal => image.fliph(),
            ExifOrientation::Rotate180 => image.rotate180(),
            ExifOrientation::FlipVertical => image.flipv(),
            ExifOrientation::Transpose => image.rotate90().fliph(),
            ExifOrientation::Rotate90Cw => image.rotate90(),
            ExifOrientation::Transverse => image.rotate270().fliph(),
            ExifOrientation::Rotate90Ccw => image.rotate270(),
        }
    }
}

/// A `width` x `height` JPEG whose APP1 segment carries a big-endian EXIF
/// block with a single Orientation entry set to `code`.
#[cfg(test)]
pub(crate) fn jpeg_with_orientation(width: u32, height: u32, code: u16) -> Vec<u8> {
    use crate::image::processor::encode_jpeg;

    let pixels = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 8) as u8, (y * 8) as u8, 128])
    });
    let jpeg = encode_jpeg(&DynamicImage::ImageRgb8(pixels), 90).expect("encode jpeg");

    let [hi, lo] = code.to_be_bytes();
    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    // TIFF header, then IFD0 with one SHORT entry and no next IFD.
    app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    app1.extend_from_slice(&[0x00, 0x01]);
    app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, hi, lo, 0x00, 0x00]);
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut tagged = jpeg[..2].to_vec();
    tagged.extend_from_slice(&app1);
    tagged.extend_from_slice(&jpeg[2..]);
    tagged
}
