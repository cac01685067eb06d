//! Core library for turning scanned page images into searchable PDFs.
//!
//! This crate provides:
//! - OCR region types, JSON region files and a native recognizer
//! - Image preprocessing (blur and Otsu binarization)
//! - Frequency-dictionary spelling correction
//! - A single-page PDF canvas with standard and embedded TrueType fonts
//! - The overlay pipeline that writes recognized text over the page image

pub mod correction;
pub mod error;
pub mod models;
pub mod ocr;
pub mod overlay;
pub mod pdf;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use correction::{Corrector, FrequencyDictionary, NoCorrection, TextCorrector};
pub use error::{CanvasError, OcrError, RegionError, Result, ScanlayerError};
pub use models::config::ScanlayerConfig;
pub use ocr::{load_regions, parse_regions, FixtureRecognizer, ImagePreprocessor, Point, Recognizer, Region};
#[cfg(feature = "native")]
pub use ocr::PureOcrRecognizer;
pub use overlay::{AssemblyReport, CoordinateMapper, Document, OverlayRenderer, PageAssembler};
pub use pdf::{FontResource, PageCanvas, PdfCanvas, TextRenderMode};
pub use pipeline::{load_corrector, SearchablePdfPipeline};
