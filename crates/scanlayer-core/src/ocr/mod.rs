//! OCR regions and the recognizers that produce them.

mod filter;
mod fixture;
mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use filter::{filter_regions, RegionFilter};
pub use fixture::FixtureRecognizer;
pub use preprocessing::{otsu_threshold, ImagePreprocessor};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{OcrError, RegionError};

/// A point in image pixel space (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// One OCR detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegionRecord")]
pub struct Region {
    /// Corner points, clockwise from top-left.
    pub bbox: [Point; 4],

    /// Recognized text, possibly empty.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl Region {
    /// Create a region from its four corners.
    pub fn new(bbox: [Point; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Create an axis-aligned region from its top-left and bottom-right corners.
    pub fn from_corners(
        top_left: (f32, f32),
        bottom_right: (f32, f32),
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        let (x1, y1) = top_left;
        let (x2, y2) = bottom_right;
        Self::new(
            [
                Point::new(x1, y1),
                Point::new(x2, y1),
                Point::new(x2, y2),
                Point::new(x1, y2),
            ],
            text,
            confidence,
        )
    }

    /// Top-left corner of the box.
    pub fn top_left(&self) -> Point {
        self.bbox[0]
    }

    /// Bottom-right corner of the box.
    pub fn bottom_right(&self) -> Point {
        self.bbox[2]
    }

    /// Horizontal extent between the top-left and bottom-right corners.
    pub fn width(&self) -> f32 {
        self.bottom_right().x - self.top_left().x
    }

    /// Vertical extent between the top-left and bottom-right corners.
    pub fn height(&self) -> f32 {
        self.bottom_right().y - self.top_left().y
    }

    /// Reject boxes with non-finite coordinates or no positive extent.
    ///
    /// `index` is the region's position in the OCR result and only
    /// identifies it in the error.
    pub fn check_geometry(&self, index: usize) -> Result<(), RegionError> {
        if !self.bbox.iter().all(Point::is_finite) {
            return Err(RegionError::Malformed {
                index,
                reason: "non-finite coordinates".to_string(),
            });
        }

        let (width, height) = (self.width(), self.height());
        if width <= 0.0 || height <= 0.0 {
            return Err(RegionError::Malformed {
                index,
                reason: format!("degenerate box {}x{}", width, height),
            });
        }

        Ok(())
    }
}

/// Accepted shapes of a region in JSON input: the `(bbox, text, confidence)`
/// tuple emitted by EasyOCR-style engines, or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum RegionRecord {
    Tuple([Point; 4], String, f32),
    Object {
        bbox: [Point; 4],
        #[serde(default)]
        text: String,
        confidence: f32,
    },
}

impl From<RegionRecord> for Region {
    fn from(record: RegionRecord) -> Self {
        match record {
            RegionRecord::Tuple(bbox, text, confidence)
            | RegionRecord::Object {
                bbox,
                text,
                confidence,
            } => Region {
                bbox,
                text,
                confidence,
            },
        }
    }
}

/// Source of OCR regions for an image.
///
/// The pipeline receives this as an explicit dependency so a fixture can
/// stand in for a real engine.
pub trait Recognizer {
    /// Detect and recognize text regions, in the engine's result order.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Region>, OcrError>;
}

impl<R: Recognizer + ?Sized> Recognizer for &R {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Region>, OcrError> {
        (**self).recognize(image)
    }
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Region>, OcrError> {
        (**self).recognize(image)
    }
}

/// Parse a JSON array of regions.
pub fn parse_regions(json: &str) -> Result<Vec<Region>, OcrError> {
    serde_json::from_str(json).map_err(|e| OcrError::RegionData(e.to_string()))
}

/// Load a JSON array of regions from a file.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, OcrError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| OcrError::RegionData(format!("{}: {}", path.display(), e)))?;
    parse_regions(&content)
}
