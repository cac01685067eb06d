//! PDF page canvas: the drawing surface the overlay pipeline writes to.

mod canvas;
mod font;

pub use canvas::PdfCanvas;
pub use font::{encode_win_ansi, FontResource, StandardFont, TrueTypeFont};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::CanvasError;

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// How text is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRenderMode {
    /// Fill glyphs with the current fill colour and alpha.
    #[default]
    Fill,
    /// Neither fill nor stroke: selectable and searchable, never visible.
    Invisible,
}

impl TextRenderMode {
    /// PDF `Tr` operand.
    pub fn operand(self) -> i64 {
        match self {
            TextRenderMode::Fill => 0,
            TextRenderMode::Invisible => 3,
        }
    }
}

/// RGB fill colour with opacity, all components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
}

impl FillColor {
    /// Black at the given opacity.
    pub fn black(alpha: f32) -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

impl Default for FillColor {
    fn default() -> Self {
        Self::black(1.0)
    }
}

/// A single-page drawing surface.
///
/// Coordinates are page points with the origin at the bottom-left. Draws are
/// append-only; `save` finalizes the page and nothing may be drawn after it.
pub trait PageCanvas {
    /// Make `font` available to `set_font` under `name`.
    fn register_font(&mut self, name: &str, font: FontResource) -> Result<()>;

    /// Whether a font was registered under `name`.
    fn has_font(&self, name: &str) -> bool;

    /// Open the page with the given size in points.
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()>;

    /// Paint a raster image into the given rectangle.
    fn draw_image(
        &mut self,
        image: &DynamicImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()>;

    /// Select a registered font for subsequent text.
    fn set_font(&mut self, name: &str, size: f32) -> Result<()>;

    /// Set the text fill colour and opacity.
    fn set_fill_color(&mut self, color: FillColor) -> Result<()>;

    /// Set the text render mode.
    fn set_text_render_mode(&mut self, mode: TextRenderMode) -> Result<()>;

    /// Draw `text` with its baseline starting at (`x`, `y`).
    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<()>;

    /// Finalize the page and return the serialized document.
    fn save(&mut self) -> Result<Vec<u8>>;
}
