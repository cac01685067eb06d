//! Draws accepted regions as alpha-blended text.

use tracing::trace;

use super::AcceptedRegion;
use crate::error::{CanvasError, ScanlayerError};
use crate::models::config::OverlayConfig;
use crate::pdf::{FillColor, PageCanvas, TextRenderMode};

/// Issues one text draw per accepted region.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    font: String,
    fill: FillColor,
    render_mode: TextRenderMode,
}

impl OverlayRenderer {
    /// Create a renderer using a registered font name.
    pub fn new(font: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            fill: FillColor::black(0.5),
            render_mode: TextRenderMode::Fill,
        }
    }

    /// Create a renderer from overlay configuration.
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.font_resource.clone())
            .with_alpha(config.fill_alpha)
            .with_render_mode(config.render_mode)
    }

    /// Set text opacity.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.fill = FillColor::black(alpha);
        self
    }

    /// Set the text render mode.
    pub fn with_render_mode(mut self, mode: TextRenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Name of the font every draw uses.
    pub fn font(&self) -> &str {
        &self.font
    }

    /// Check the font is registered and set the render mode. Must run
    /// before the first region so a missing font aborts the document.
    pub fn prepare<C: PageCanvas>(&self, canvas: &mut C) -> Result<(), ScanlayerError> {
        if !canvas.has_font(&self.font) {
            return Err(ScanlayerError::FontNotRegistered(self.font.clone()));
        }
        canvas.set_text_render_mode(self.render_mode)?;
        Ok(())
    }

    /// Draw one region's text at its baseline.
    pub fn render<C: PageCanvas>(
        &self,
        canvas: &mut C,
        region: &AcceptedRegion,
    ) -> Result<(), CanvasError> {
        canvas.set_font(&self.font, region.font_size)?;
        canvas.set_fill_color(self.fill)?;
        canvas.draw_string(region.position.x, region.position.y, &region.text)?;

        trace!(
            "Region #{} {:?} at ({:.1}, {:.1}) size {:.1}",
            region.index,
            region.text,
            region.position.x,
            region.position.y,
            region.font_size
        );
        Ok(())
    }
}
