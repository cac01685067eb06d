//! Recognizer that replays a precomputed OCR result.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use super::{load_regions, Recognizer, Region};
use crate::error::OcrError;

/// Returns the same regions for every image.
///
/// Used for region files produced by an external OCR engine and as a test
/// double for the native engine.
#[derive(Debug, Clone, Default)]
pub struct FixtureRecognizer {
    regions: Vec<Region>,
}

impl FixtureRecognizer {
    /// Create a recognizer from regions.
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Load regions from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, OcrError> {
        let regions = load_regions(path)?;
        debug!("Loaded {} regions from {}", regions.len(), path.display());
        Ok(Self::new(regions))
    }

    /// The replayed regions.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Recognizer for FixtureRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<Region>, OcrError> {
        Ok(self.regions.clone())
    }
}
