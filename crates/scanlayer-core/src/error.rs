//! Error types for the scanlayer-core library.

use thiserror::Error;

/// Main error type for the scanlayer library.
///
/// Every variant is fatal for the document being assembled. Per-region
/// problems that only skip one detection are reported as [`RegionError`].
#[derive(Error, Debug)]
pub enum ScanlayerError {
    /// Image or region source absent or unreadable.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// The configured font resource has not been registered with the canvas.
    #[error("font not registered: {0}")]
    FontNotRegistered(String),

    /// Page canvas error.
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a page canvas.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Operation not permitted in the canvas' current state.
    #[error("cannot {operation} while canvas is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// A text operation referenced a font that was never registered.
    #[error("font not registered: {0}")]
    FontNotRegistered(String),

    /// Font data could not be parsed or embedded.
    #[error("invalid font {name}: {reason}")]
    InvalidFont { name: String, reason: String },

    /// Page dimensions are not positive and finite.
    #[error("invalid page size {width}x{height}")]
    InvalidPageSize { width: f32, height: f32 },

    /// Failed to encode or serialize PDF objects.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

impl From<lopdf::Error> for CanvasError {
    fn from(err: lopdf::Error) -> Self {
        CanvasError::Write(err.to_string())
    }
}

impl From<std::io::Error> for CanvasError {
    fn from(err: std::io::Error) -> Self {
        CanvasError::Write(err.to_string())
    }
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// A region file could not be parsed.
    #[error("invalid region data: {0}")]
    RegionData(String),
}

/// Non-fatal problems with a single region. The region is skipped or
/// degraded and assembly continues with the next one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// Degenerate geometry: non-positive extent or non-finite coordinates.
    #[error("malformed region #{index}: {reason}")]
    Malformed { index: usize, reason: String },

    /// The corrector had no suggestion; the recognized text is kept.
    #[error("no correction available for {text:?}")]
    CorrectionUnavailable { text: String },
}

/// Result type for the scanlayer library.
pub type Result<T> = std::result::Result<T, ScanlayerError>;
