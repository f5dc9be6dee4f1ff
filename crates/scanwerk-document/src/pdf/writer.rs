// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — place a single scanned page image on a fixed paper size using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanwerk_core::PaperSize;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// Nominal resolution used to convert pixels to points before scaling.
const PLACEMENT_DPI: f32 = 300.0;

/// Where an image sits on a page, in millimetres from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    /// Millimetres per image pixel.
    pub scale: f64,
}

impl PageLayout {
    /// Fit an `image_width` x `image_height` image to `paper`, preserving
    /// aspect ratio and centring it. The image is scaled up or down so that
    /// one dimension fills the page exactly.
    pub fn fit(paper: PaperSize, image_width: u32, image_height: u32) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(ScanwerkError::PdfError(format!(
                "cannot place a {image_width}x{image_height} image"
            )));
        }
        let (page_w, page_h) = paper.dimensions_mm();
        let (page_w, page_h) = (page_w as f64, page_h as f64);
        let scale = (page_w / image_width as f64).min(page_h / image_height as f64);
        let width_mm = image_width as f64 * scale;
        let height_mm = image_height as f64 * scale;

        Ok(Self {
            page_width_mm: page_w,
            page_height_mm: page_h,
            x_mm: (page_w - width_mm) / 2.0,
            y_mm: (page_h - height_mm) / 2.0,
            width_mm,
            height_mm,
            scale,
        })
    }
}

/// Assembles an encoded page image into a printable document.
pub trait PageAssembler {
    /// Target paper size.
    fn paper_size(&self) -> PaperSize;

    /// Place `image_bytes` (JPEG or PNG) at `layout` on a single page and
    /// return the serialised document.
    fn assemble(&self, image_bytes: &[u8], layout: &PageLayout) -> Result<Vec<u8>>;
}

/// Creates single-page PDF documents from scanned page images.
pub struct PdfWriter {
    /// Paper size for page creation.
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }
}

impl PageAssembler for PdfWriter {
    fn paper_size(&self) -> PaperSize {
        self.paper_size
    }

    #[instrument(skip(self, image_bytes, layout), fields(bytes_len = image_bytes.len()))]
    fn assemble(&self, image_bytes: &[u8], layout: &PageLayout) -> Result<Vec<u8>> {
        let title = self.title.as_deref().unwrap_or("Scanwerk Document");
        info!(paper = ?self.paper_size, title, "Creating image PDF");

        // Decode the image to get its dimensions and pixel data.
        let dynamic_image = ::image::load_from_memory(image_bytes).map_err(|err| {
            ScanwerkError::ImageError(format!("failed to decode image for PDF: {}", err))
        })?;

        let img_width = dynamic_image.width() as usize;
        let img_height = dynamic_image.height() as usize;
        if img_width == 0 || img_height == 0 {
            return Err(ScanwerkError::PdfError("image has no pixels".into()));
        }

        // Convert to RGB8 for printpdf.
        let rgb_image = dynamic_image.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb_image.into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let page_w = Mm(layout.page_width_mm as f32);
        let page_h = Mm(layout.page_height_mm as f32);

        let mut doc = PdfDocument::new(title);
        let xobject_id = doc.add_image(&raw);

        // Native size at PLACEMENT_DPI, then stretch to the layout rectangle.
        let native_w_pt = img_width as f32 / PLACEMENT_DPI * 72.0;
        let native_h_pt = img_height as f32 / PLACEMENT_DPI * 72.0;
        let target_w_pt = Mm(layout.width_mm as f32).into_pt().0;
        let target_h_pt = Mm(layout.height_mm as f32).into_pt().0;
        let scale_x = target_w_pt / native_w_pt;
        let scale_y = target_h_pt / native_h_pt;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(Mm(layout.x_mm as f32).into_pt().0)),
                translate_y: Some(Pt(Mm(layout.y_mm as f32).into_pt().0)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(PLACEMENT_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        debug!(target_w_pt, target_h_pt, scale_x, scale_y, "Image placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "PDF serialised with warnings");
        }

        Ok(output)
    }
}
