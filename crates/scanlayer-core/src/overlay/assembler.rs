//! Page assembly: base image, overlay, save.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{AcceptedRegion, CoordinateMapper, OverlayRenderer};
use crate::correction::{Correction, Corrector, TextCorrector};
use crate::error::{Result, ScanlayerError};
use crate::models::config::OverlayConfig;
use crate::ocr::{filter_regions, Region};
use crate::pdf::PageCanvas;

/// Progress of one assembly. `Saved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblyStage {
    Empty,
    ImageDrawn,
    OverlaysDrawn,
    Saved,
}

/// Per-document counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    /// Regions received from the OCR result.
    pub regions_seen: usize,
    /// Regions above the confidence threshold.
    pub accepted: usize,
    /// Text draws issued.
    pub drawn: usize,
    /// Accepted regions skipped for degenerate geometry.
    pub malformed: usize,
    /// Regions whose text the corrector changed.
    pub corrected: usize,
    /// Regions kept as recognized because no correction was available.
    pub correction_unavailable: usize,
}

/// The finished single-page searchable document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    page_size: (u32, u32),
    data: Vec<u8>,
    report: AssemblyReport,
}

impl Document {
    /// Page width and height in points (equal to the image's pixels).
    pub fn page_size(&self) -> (u32, u32) {
        self.page_size
    }

    /// Serialized PDF.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the serialized PDF.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Counters collected while assembling.
    pub fn report(&self) -> &AssemblyReport {
        &self.report
    }
}

/// Orchestrates the overlay pipeline for one page.
pub struct PageAssembler<K> {
    corrector: TextCorrector<K>,
    renderer: OverlayRenderer,
}

impl<K: Corrector> PageAssembler<K> {
    /// Create an assembler from a corrector and a renderer.
    pub fn new(corrector: K, renderer: OverlayRenderer) -> Self {
        Self {
            corrector: TextCorrector::new(corrector),
            renderer,
        }
    }

    /// Create an assembler from overlay configuration.
    pub fn from_config(corrector: K, config: &OverlayConfig) -> Self {
        Self::new(corrector, OverlayRenderer::from_config(config))
    }

    /// Build the document on `canvas`.
    ///
    /// Fatal errors (empty image, unregistered font, canvas failures) are
    /// returned before anything is saved. Malformed regions and missing
    /// corrections are handled per region.
    pub fn assemble<C, I>(
        &self,
        canvas: &mut C,
        image: &DynamicImage,
        regions: I,
        min_confidence: f32,
    ) -> Result<Document>
    where
        C: PageCanvas,
        I: IntoIterator<Item = Region>,
    {
        let start = Instant::now();
        let mut stage = AssemblyStage::Empty;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanlayerError::MissingInput(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }
        if !canvas.has_font(self.renderer.font()) {
            return Err(ScanlayerError::FontNotRegistered(
                self.renderer.font().to_string(),
            ));
        }

        let (page_width, page_height) = (width as f32, height as f32);
        canvas.begin_page(page_width, page_height)?;
        canvas.draw_image(image, 0.0, 0.0, page_width, page_height)?;
        stage = advance(stage, AssemblyStage::ImageDrawn);

        self.renderer.prepare(canvas)?;

        let mapper = CoordinateMapper::new(page_height);
        let mut report = AssemblyReport::default();
        let mut accepted = filter_regions(regions, min_confidence);

        while let Some((index, region)) = accepted.next_indexed() {
            let mut overlay = match AcceptedRegion::new(index, &region, &mapper) {
                Ok(overlay) => overlay,
                Err(issue) => {
                    warn!("Skipping region: {}", issue);
                    report.malformed += 1;
                    continue;
                }
            };

            let correction = self.corrector.apply(&region.text);
            match &correction {
                Correction::Corrected { original, corrected } => {
                    debug!("Corrected {:?} -> {:?}", original, corrected);
                    report.corrected += 1;
                }
                Correction::Unavailable(_) => {
                    if let Some(issue) = correction.issue() {
                        debug!("Keeping recognized text: {}", issue);
                    }
                    report.correction_unavailable += 1;
                }
                Correction::Unchanged(_) => {}
            }
            overlay.text = correction.into_text();

            self.renderer.render(canvas, &overlay)?;
            report.drawn += 1;
        }
        report.regions_seen = accepted.seen();
        report.accepted = accepted.kept();
        stage = advance(stage, AssemblyStage::OverlaysDrawn);

        let data = canvas.save()?;
        stage = advance(stage, AssemblyStage::Saved);
        debug!("Assembly reached {:?}", stage);

        info!(
            "Assembled {}x{} page: {} of {} regions drawn ({} malformed, {} corrected) in {}ms",
            width,
            height,
            report.drawn,
            report.regions_seen,
            report.malformed,
            report.corrected,
            start.elapsed().as_millis()
        );

        Ok(Document {
            page_size: (width, height),
            data,
            report,
        })
    }
}

fn advance(from: AssemblyStage, to: AssemblyStage) -> AssemblyStage {
    debug!("Assembly stage {:?} -> {:?}", from, to);
    to
}
