// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — the single owner of every stage output between the decoded
// photo and the exported page.
//
// Stages run in order: orientation, corner correction (optional), rectangular
// crop with grayscale (optional crop), threshold, export. Each stage reads its
// predecessor's output and stores a fresh image of its own, so no stage keeps
// a handle on anything downstream. Replacing a stage output clears everything
// after it.

use image::{DynamicImage, RgbaImage};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Quadrilateral, Rect, ScanConfig};
use scanwerk_editor::{QuadrilateralEditor, RectangleEditor};
use tracing::{debug, info, instrument};

use crate::image::orientation::{ExifOrientation, MetadataExtractor};
use crate::image::processor::{ImageProcessor, crop_rect, crop_to_bounding_box};
use crate::pdf::writer::{PageAssembler, PageLayout};
use crate::scan::binarize::{AdaptiveBinarizer, BinarizeParams};
use crate::scan::luminance::LuminanceConverter;
use crate::scan::warp::{Correction, WarpProvider, correct_perspective};

/// Which corner-stage preview becomes the crop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerChoice {
    /// Bounding-box crop of the corners.
    Cropped,
    /// Perspective-corrected result (itself a bounding-box crop if the warp failed).
    Corrected,
}

/// Both results of the corner stage, for side-by-side comparison.
#[derive(Debug, Clone)]
pub struct QuadPreview {
    pub corners: Quadrilateral,
    pub cropped: RgbaImage,
    pub corrected: Correction,
}

/// Explicit context for one document capture.
pub struct ScanPipeline {
    config: ScanConfig,
    orientation: ExifOrientation,
    source: RgbaImage,
    preview: Option<QuadPreview>,
    crop_target: Option<RgbaImage>,
    cropped: Option<RgbaImage>,
    grayscale: Option<RgbaImage>,
    binarized: Option<RgbaImage>,
    params: Option<BinarizeParams>,
}

impl ScanPipeline {
    // -- Construction ---------------------------------------------------------

    /// Decode an encoded photo and undo its camera orientation.
    #[instrument(skip(bytes, extractor, config), fields(bytes_len = bytes.len()))]
    pub fn from_bytes(
        bytes: &[u8],
        extractor: &dyn MetadataExtractor,
        config: ScanConfig,
    ) -> Result<Self> {
        let orientation = extractor
            .extract_orientation(bytes)
            .map(ExifOrientation::from_code)
            .unwrap_or_default();
        let image = ImageProcessor::from_bytes(bytes)?.into_dynamic();
        Ok(Self::from_image(image, orientation, config))
    }

    /// Start from an already-decoded image with a known orientation.
    pub fn from_image(image: DynamicImage, orientation: ExifOrientation, config: ScanConfig) -> Self {
        let source = ImageProcessor::from_dynamic(image)
            .orient(orientation)
            .into_rgba8();
        info!(
            code = orientation.code(),
            width = source.width(),
            height = source.height(),
            "Pipeline source ready"
        );
        Self {
            config,
            orientation,
            source,
            preview: None,
            crop_target: None,
            cropped: None,
            grayscale: None,
            binarized: None,
            params: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn orientation(&self) -> ExifOrientation {
        self.orientation
    }

    /// The upright source image.
    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn preview(&self) -> Option<&QuadPreview> {
        self.preview.as_ref()
    }

    pub fn crop_target(&self) -> Option<&RgbaImage> {
        self.crop_target.as_ref()
    }

    pub fn cropped(&self) -> Option<&RgbaImage> {
        self.cropped.as_ref()
    }

    pub fn grayscale(&self) -> Option<&RgbaImage> {
        self.grayscale.as_ref()
    }

    pub fn binarized(&self) -> Option<&RgbaImage> {
        self.binarized.as_ref()
    }

    /// Parameters of the last successful threshold.
    pub fn threshold_params(&self) -> Option<BinarizeParams> {
        self.params
    }

    /// Threshold parameters from the configuration.
    pub fn default_params(&self) -> BinarizeParams {
        BinarizeParams::new(self.config.block_size, self.config.constant_c)
    }

    /// A corner editor sized to the source image.
    pub fn corner_editor(&self) -> QuadrilateralEditor {
        QuadrilateralEditor::new(self.source.width(), self.source.height())
    }

    /// A crop editor sized to the crop target, with the configured limits.
    pub fn crop_editor(&self) -> Result<RectangleEditor> {
        let target = self
            .crop_target
            .as_ref()
            .ok_or(ScanwerkError::StageUnavailable("crop target"))?;
        Ok(RectangleEditor::with_limits(
            target.width(),
            target.height(),
            self.config.min_crop_size,
            self.config.crop_margin,
        ))
    }

    // -- Corner stage ---------------------------------------------------------

    /// Compute both corner-stage results for `corners`, clamped to the
    /// source. Discards any previous preview and everything downstream.
    #[instrument(skip(self, provider))]
    pub fn preview_corners(
        &mut self,
        corners: &Quadrilateral,
        provider: &dyn WarpProvider,
    ) -> &QuadPreview {
        self.clear_from_corners();
        let corners = corners.clamped(self.source.width() as f64, self.source.height() as f64);
        let cropped = crop_to_bounding_box(&self.source, &corners);
        let corrected = correct_perspective(&self.source, &corners, provider);
        debug!(method = ?corrected.method, "Corner previews computed");
        self.preview.insert(QuadPreview {
            corners,
            cropped,
            corrected,
        })
    }

    /// Promote one preview to the crop target.
    pub fn select_corner_result(&mut self, choice: CornerChoice) -> Result<&RgbaImage> {
        let preview = self
            .preview
            .as_ref()
            .ok_or(ScanwerkError::StageUnavailable("corner preview"))?;
        let chosen = match choice {
            CornerChoice::Cropped => preview.cropped.clone(),
            CornerChoice::Corrected => preview.corrected.image.clone(),
        };
        info!(?choice, "Corner result selected");
        Ok(self.set_crop_target(chosen))
    }

    /// Use the whole upright source as the crop target.
    pub fn skip_corners(&mut self) -> &RgbaImage {
        self.clear_from_corners();
        info!("Corner stage skipped");
        let source = self.source.clone();
        self.set_crop_target(source)
    }

    // -- Crop stage -----------------------------------------------------------

    /// Crop the target to `rect` and convert it to grayscale. The rectangle
    /// must be non-empty and lie inside the crop target.
    #[instrument(skip(self))]
    pub fn confirm_crop(&mut self, rect: &Rect) -> Result<&RgbaImage> {
        let target = self
            .crop_target
            .as_ref()
            .ok_or(ScanwerkError::StageUnavailable("crop target"))?;
        if !rect.fits_within(target.width() as f64, target.height() as f64) {
            return Err(ScanwerkError::InvalidInput(format!(
                "crop {},{} {}x{} is outside the {}x{} image",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                target.width(),
                target.height()
            )));
        }
        let cropped = crop_rect(target, rect);
        self.set_cropped(cropped)
    }

    /// Take the target uncropped and convert it to grayscale.
    pub fn skip_crop(&mut self) -> Result<&RgbaImage> {
        let target = self
            .crop_target
            .clone()
            .ok_or(ScanwerkError::StageUnavailable("crop target"))?;
        info!("Crop stage skipped");
        self.set_cropped(target)
    }

    // -- Threshold stage ------------------------------------------------------

    /// Binarize the grayscale page. Safe to call repeatedly with different
    /// parameters; each call starts from the same grayscale input. On failure
    /// no binarized output remains.
    #[instrument(skip(self))]
    pub fn threshold(&mut self, params: BinarizeParams) -> Result<&RgbaImage> {
        let gray = self
            .grayscale
            .as_ref()
            .ok_or(ScanwerkError::StageUnavailable("grayscale"))?;
        self.binarized = None;
        self.params = None;
        let binary = AdaptiveBinarizer::new(params).binarize(gray)?;
        self.params = Some(params);
        Ok(self.binarized.insert(binary))
    }

    // -- Export ---------------------------------------------------------------

    /// Encode the binarized page as JPEG and hand it to `assembler`.
    #[instrument(skip(self, assembler))]
    pub fn export_pdf(&self, assembler: &dyn PageAssembler) -> Result<Vec<u8>> {
        let page = self
            .binarized
            .as_ref()
            .ok_or(ScanwerkError::StageUnavailable("binarized page"))?;
        let layout = PageLayout::fit(assembler.paper_size(), page.width(), page.height())?;
        let jpeg = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(page.clone()))
            .to_jpeg_bytes(self.config.jpeg_quality)?;
        debug!(jpeg_bytes = jpeg.len(), scale = layout.scale, "Page encoded");
        let pdf = assembler.assemble(&jpeg, &layout)?;
        info!(pdf_bytes = pdf.len(), "Page exported");
        Ok(pdf)
    }

    // -- Internal -------------------------------------------------------------

    fn set_crop_target(&mut self, image: RgbaImage) -> &RgbaImage {
        self.clear_from_crop();
        self.crop_target.insert(image)
    }

    fn set_cropped(&mut self, cropped: RgbaImage) -> Result<&RgbaImage> {
        self.clear_from_crop();
        let grayscale = LuminanceConverter::convert(&cropped)?;
        self.cropped = Some(cropped);
        Ok(self.grayscale.insert(grayscale))
    }

    fn clear_from_corners(&mut self) {
        self.preview = None;
        self.crop_target = None;
        self.clear_from_crop();
    }

    fn clear_from_crop(&mut self) {
        self.cropped = None;
        self.grayscale = None;
        self.binarized = None;
        self.params = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::image::orientation::ExifMetadataExtractor;
    use crate::scan::warp::{CorrectionMethod, ImageprocWarp};
    use image::Rgba;
    use scanwerk_core::{PaperSize, Point};

    /// White page with a dark 40x40 block, on a 200x150 photo.
    fn page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(200, 150, |x, y| {
            if (80..120).contains(&x) && (50..90).contains(&y) {
                Rgba([20, 20, 20, 255])
            } else {
                Rgba([230, 230, 230, 255])
            }
        }))
    }

    fn pipeline() -> ScanPipeline {
        ScanPipeline::from_image(page(), ExifOrientation::Normal, ScanConfig::default())
    }

    struct FixedOrientation(Option<u32>);

    impl MetadataExtractor for FixedOrientation {
        fn extract_orientation(&self, _file_bytes: &[u8]) -> Option<u32> {
            self.0
        }
    }

    /// Captures what the assembler was given.
    struct RecordingAssembler {
        seen: RefCell<Option<(usize, PageLayout)>>,
    }

    impl PageAssembler for RecordingAssembler {
        fn paper_size(&self) -> PaperSize {
            PaperSize::A4
        }

        fn assemble(&self, image_bytes: &[u8], layout: &PageLayout) -> Result<Vec<u8>> {
            *self.seen.borrow_mut() = Some((image_bytes.len(), *layout));
            Ok(b"%PDF-stub".to_vec())
        }
    }

    /// Orientation from metadata is applied before anything else.
    #[test]
    fn from_bytes_applies_orientation() {
        let mut png = Vec::new();
        page()
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .expect("encode");
        let rotated =
            ScanPipeline::from_bytes(&png, &FixedOrientation(Some(6)), ScanConfig::default())
                .expect("pipeline");
        assert_eq!(rotated.orientation(), ExifOrientation::Rotate90Cw);
        assert_eq!(rotated.source().dimensions(), (150, 200));

        let plain = ScanPipeline::from_bytes(&png, &FixedOrientation(None), ScanConfig::default())
            .expect("pipeline");
        assert_eq!(plain.source().dimensions(), (200, 150));
    }

    /// A JPEG tagged Orientation=6 is read by the EXIF extractor and turned
    /// upright.
    #[test]
    fn from_bytes_reads_exif_orientation() {
        let jpeg = crate::image::orientation::jpeg_with_orientation(40, 20, 6);
        let pipeline =
            ScanPipeline::from_bytes(&jpeg, &ExifMetadataExtractor, ScanConfig::default())
                .expect("pipeline");
        assert_eq!(pipeline.orientation(), ExifOrientation::Rotate90Cw);
        assert_eq!(pipeline.source().dimensions(), (20, 40));
        assert_eq!(pipeline.corner_editor().image_size(), (20.0, 40.0));
    }

    /// Corners far outside the photo are clamped to its edges, so both
    /// previews cover the whole source.
    #[test]
    fn far_out_corners_are_clamped() {
        let mut pipeline = pipeline();
        let corners = Quadrilateral::new(
            Point::new(-1e9, -1e9),
            Point::new(1e9, 0.0),
            Point::new(1e9, 1e9),
            Point::new(0.0, 1e9),
        );
        let preview = pipeline.preview_corners(&corners, &ImageprocWarp::default());
        assert_eq!(preview.corners, Quadrilateral::from_image_extremes(200.0, 150.0));
        assert_eq!(preview.corrected.method, CorrectionMethod::Warped);
        assert_eq!(preview.corrected.image.dimensions(), (200, 150));
        assert_eq!(preview.cropped.dimensions(), (200, 150));
    }

    /// A crop rectangle outside the crop target is refused and leaves the
    /// stage untouched.
    #[test]
    fn crop_outside_target_is_rejected() {
        let mut pipeline = pipeline();
        pipeline.skip_corners();
        for rect in [
            Rect::new(1000.0, 1000.0, 60.0, 60.0),
            Rect::new(150.0, 0.0, 60.0, 60.0),
            Rect::new(-1.0, 0.0, 60.0, 60.0),
        ] {
            assert!(matches!(
                pipeline.confirm_crop(&rect),
                Err(ScanwerkError::InvalidInput(_))
            ));
        }
        assert!(pipeline.cropped().is_none());

        let gray = pipeline
            .confirm_crop(&Rect::new(140.0, 90.0, 60.0, 60.0))
            .expect("edge crop");
        assert_eq!(gray.dimensions(), (60, 60));
    }

    /// The full flow produces a binarized page with the dark block black.
    #[test]
    fn full_flow() {
        let mut pipeline = pipeline();
        let corners = Quadrilateral::new(
            Point::new(10.0, 10.0),
            Point::new(190.0, 10.0),
            Point::new(190.0, 140.0),
            Point::new(10.0, 140.0),
        );
        let preview = pipeline.preview_corners(&corners, &ImageprocWarp::default());
        assert_eq!(preview.corrected.method, CorrectionMethod::Warped);
        assert_eq!(preview.corrected.image.dimensions(), (180, 130));
        assert_eq!(preview.cropped.dimensions(), (180, 130));

        pipeline
            .select_corner_result(CornerChoice::Corrected)
            .expect("select");
        let gray = pipeline
            .confirm_crop(&Rect::new(20.0, 20.0, 140.0, 90.0))
            .expect("crop");
        assert_eq!(gray.dimensions(), (140, 90));
        let [r, g, b, _] = gray.get_pixel(0, 0).0;
        assert!(r == g && g == b);

        let binary = pipeline.threshold(BinarizeParams::new(11, 2)).expect("threshold");
        // Cropped (51, 21) is source (81, 51), just inside the dark block.
        assert_eq!(binary.get_pixel(51, 21).0[0], 0);
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

        let assembler = RecordingAssembler {
            seen: RefCell::new(None),
        };
        let pdf = pipeline.export_pdf(&assembler).expect("export");
        assert_eq!(pdf, b"%PDF-stub");
        let (len, layout) = assembler.seen.borrow().expect("assembled");
        assert!(len > 0);
        assert!((layout.width_mm - 210.0).abs() < 1e-9);
    }

    /// Stages without their input report which input is missing.
    #[test]
    fn missing_inputs_are_stage_unavailable() {
        let mut pipeline = pipeline();
        assert!(matches!(
            pipeline.select_corner_result(CornerChoice::Cropped),
            Err(ScanwerkError::StageUnavailable(_))
        ));
        assert!(matches!(
            pipeline.confirm_crop(&Rect::new(0.0, 0.0, 10.0, 10.0)),
            Err(ScanwerkError::StageUnavailable(_))
        ));
        assert!(matches!(pipeline.skip_crop(), Err(ScanwerkError::StageUnavailable(_))));
        assert!(matches!(
            pipeline.threshold(BinarizeParams::default()),
            Err(ScanwerkError::StageUnavailable(_))
        ));
        let assembler = RecordingAssembler {
            seen: RefCell::new(None),
        };
        assert!(matches!(
            pipeline.export_pdf(&assembler),
            Err(ScanwerkError::StageUnavailable(_))
        ));
        assert!(pipeline.crop_editor().is_err());
    }

    /// Redoing an upstream stage clears every downstream output.
    #[test]
    fn upstream_change_clears_downstream() {
        let mut pipeline = pipeline();
        pipeline.skip_corners();
        pipeline.skip_crop().expect("crop");
        pipeline.threshold(BinarizeParams::default()).expect("threshold");
        assert!(pipeline.binarized().is_some());

        pipeline.confirm_crop(&Rect::new(0.0, 0.0, 100.0, 100.0)).expect("crop");
        assert!(pipeline.grayscale().is_some());
        assert!(pipeline.binarized().is_none());
        assert!(pipeline.threshold_params().is_none());

        pipeline.skip_corners();
        assert!(pipeline.cropped().is_none());
        assert!(pipeline.grayscale().is_none());
        assert_eq!(pipeline.crop_target().map(|t| t.dimensions()), Some((200, 150)));
    }

    /// Thresholding twice with the same parameters gives the same page, and
    /// new parameters start again from the grayscale image.
    #[test]
    fn threshold_is_repeatable() {
        let mut pipeline = pipeline();
        pipeline.skip_corners();
        pipeline.skip_crop().expect("crop");
        let first = pipeline.threshold(BinarizeParams::new(15, 5)).expect("first").clone();
        pipeline.threshold(BinarizeParams::new(3, -20)).expect("other");
        let again = pipeline.threshold(BinarizeParams::new(15, 5)).expect("again");
        assert_eq!(&first, again);
        assert_eq!(pipeline.threshold_params(), Some(BinarizeParams::new(15, 5)));
    }

    /// A collapsed quad still yields a usable crop target.
    #[test]
    fn degenerate_corners_fall_back() {
        let mut pipeline = pipeline();
        let corners = Quadrilateral::new(
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(100.0, 90.0),
            Point::new(100.0, 90.0),
        );
        let preview = pipeline.preview_corners(&corners, &ImageprocWarp::default());
        assert_eq!(preview.corrected.method, CorrectionMethod::BoundingBox);
        let target = pipeline
            .select_corner_result(CornerChoice::Corrected)
            .expect("select");
        assert_eq!(target.dimensions(), (90, 80));
    }

    /// The crop editor uses the crop target size and configured limits.
    #[test]
    fn crop_editor_matches_target() {
        let mut pipeline = pipeline();
        pipeline.skip_corners();
        let editor = pipeline.crop_editor().expect("editor");
        assert_eq!(editor.image_size(), (200.0, 150.0));
        let rect = editor.rectangle();
        assert!((rect.x - 20.0).abs() < 1e-9 && (rect.y - 15.0).abs() < 1e-9);
        assert_eq!(pipeline.corner_editor().image_size(), (200.0, 150.0));
    }
}
