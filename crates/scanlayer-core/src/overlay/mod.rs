//! Invisible text overlay: maps accepted OCR regions onto the page and
//! assembles the searchable document.

mod assembler;
mod mapper;
mod renderer;

pub use assembler::{AssemblyReport, Document, PageAssembler};
pub use mapper::{map_point, CoordinateMapper, PagePoint};
pub use renderer::OverlayRenderer;

use crate::error::RegionError;
use crate::ocr::Region;

/// A region that passed filtering, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedRegion {
    /// Position of the region in the OCR result.
    pub index: usize,
    /// Text to write: corrected, or the original when no correction exists.
    pub text: String,
    /// Baseline origin in page space.
    pub position: PagePoint,
    /// Font size in points, equal to the box height in pixels.
    pub font_size: f32,
}

impl AcceptedRegion {
    /// Derive font size and baseline from the region's box, carrying the
    /// recognized text until a correction replaces it.
    ///
    /// The font size is the box height. The baseline is the mapped top-left
    /// corner moved down by one font size, i.e. the bottom edge of the box.
    /// Degenerate boxes are rejected here and nowhere else.
    pub fn new(
        index: usize,
        region: &Region,
        mapper: &CoordinateMapper,
    ) -> Result<Self, RegionError> {
        region.check_geometry(index)?;

        let font_size = region.height();
        let top_left = mapper.map(region.top_left());

        Ok(Self {
            index,
            text: region.text.clone(),
            position: PagePoint {
                x: top_left.x,
                y: top_left.y - font_size,
            },
            font_size,
        })
    }
}
