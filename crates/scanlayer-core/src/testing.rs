//! Test double for [`PageCanvas`] that records every call.

use std::collections::BTreeSet;

use image::DynamicImage;

use crate::error::CanvasError;
use crate::pdf::{FillColor, FontResource, PageCanvas, Result, TextRenderMode};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CanvasOp {
    BeginPage(f32, f32),
    Image(u32, u32, f32, f32, f32, f32),
    RenderMode(TextRenderMode),
    Font(String, f32),
    Fill(FillColor),
    Text(f32, f32, String),
    Save,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub fonts: BTreeSet<String>,
    pub ops: Vec<CanvasOp>,
    saved: bool,
}

impl RecordingCanvas {
    pub fn with_fonts(fonts: &[&str]) -> Self {
        Self {
            fonts: fonts.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<(f32, f32, String)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Text(x, y, text) => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    fn check_open(&self, operation: &'static str) -> Result<()> {
        if self.saved {
            return Err(CanvasError::InvalidState {
                operation,
                state: "saved",
            });
        }
        Ok(())
    }
}

impl PageCanvas for RecordingCanvas {
    fn register_font(&mut self, name: &str, _font: FontResource) -> Result<()> {
        self.fonts.insert(name.to_string());
        Ok(())
    }

    fn has_font(&self, name: &str) -> bool {
        self.fonts.contains(name)
    }

    fn begin_page(&mut self, width: f32, height: f32) -> Result<()> {
        self.check_open("begin a page")?;
        self.ops.push(CanvasOp::BeginPage(width, height));
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &DynamicImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.check_open("draw an image")?;
        self.ops
            .push(CanvasOp::Image(image.width(), image.height(), x, y, width, height));
        Ok(())
    }

    fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        self.check_open("set a font")?;
        if !self.fonts.contains(name) {
            return Err(CanvasError::FontNotRegistered(name.to_string()));
        }
        self.ops.push(CanvasOp::Font(name.to_string(), size));
        Ok(())
    }

    fn set_fill_color(&mut self, color: FillColor) -> Result<()> {
        self.check_open("set the fill colour")?;
        self.ops.push(CanvasOp::Fill(color));
        Ok(())
    }

    fn set_text_render_mode(&mut self, mode: TextRenderMode) -> Result<()> {
        self.check_open("set the render mode")?;
        self.ops.push(CanvasOp::RenderMode(mode));
        Ok(())
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        self.check_open("draw text")?;
        self.ops.push(CanvasOp::Text(x, y, text.to_string()));
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        self.check_open("save")?;
        self.saved = true;
        self.ops.push(CanvasOp::Save);
        Ok(format!("{:?}", self.ops).into_bytes())
    }
}
