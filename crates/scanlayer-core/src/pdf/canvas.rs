//! Single-page PDF canvas written with lopdf.

use std::collections::BTreeMap;

use image::{DynamicImage, GenericImageView};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, trace};

use super::font::{encode_win_ansi, FontResource, StandardFont, TrueTypeFont, FIRST_CHAR, LAST_CHAR};
use super::{FillColor, PageCanvas, Result, TextRenderMode};
use crate::error::CanvasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanvasState {
    Empty,
    PageOpen,
    Saved,
}

impl CanvasState {
    fn as_str(self) -> &'static str {
        match self {
            CanvasState::Empty => "empty",
            CanvasState::PageOpen => "open",
            CanvasState::Saved => "saved",
        }
    }
}

struct RegisteredFont {
    key: String,
    id: ObjectId,
    symbolic: bool,
}

/// PDF canvas holding one page in memory until `save`.
pub struct PdfCanvas {
    doc: Document,
    state: CanvasState,
    page_size: (f32, f32),
    fonts: BTreeMap<String, RegisteredFont>,
    images: Vec<(String, ObjectId)>,
    // Keyed by alpha in thousandths so equal opacities share one object
    ext_gstates: BTreeMap<u32, (String, ObjectId)>,
    operations: Vec<Operation>,
    current_font: Option<(String, f32)>,
    fill: FillColor,
    render_mode: TextRenderMode,
}

impl PdfCanvas {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            state: CanvasState::Empty,
            page_size: (0.0, 0.0),
            fonts: BTreeMap::new(),
            images: Vec::new(),
            ext_gstates: BTreeMap::new(),
            operations: Vec::new(),
            current_font: None,
            fill: FillColor::default(),
            render_mode: TextRenderMode::Fill,
        }
    }

    /// Page size in points, once the page is open.
    pub fn page_size(&self) -> Option<(f32, f32)> {
        match self.state {
            CanvasState::Empty => None,
            _ => Some(self.page_size),
        }
    }

    fn require(&self, expected: CanvasState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CanvasError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    fn add_font_objects(&mut self, font: &FontResource) -> Result<ObjectId> {
        let id = match font {
            FontResource::Standard(standard) => {
                let mut dict = dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => standard.base_name(),
                };
                if !standard.is_symbolic() {
                    dict.set("Encoding", "WinAnsiEncoding");
                }
                self.doc.add_object(dict)
            }
            FontResource::TrueType(truetype) => self.add_truetype(truetype)?,
        };
        Ok(id)
    }

    fn add_truetype(&mut self, font: &TrueTypeFont) -> Result<ObjectId> {
        let mut program = Stream::new(
            dictionary! { "Length1" => font.data().len() as i64 },
            font.data().to_vec(),
        );
        program.compress()?;
        let program_id = self.doc.add_object(program);

        let name = font.postscript_name().as_bytes().to_vec();
        let (ascent, descent, cap_height, bbox) = font.metrics();
        let descriptor_id = self.doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(name.clone()),
            // Nonsymbolic
            "Flags" => 32,
            "FontBBox" => bbox.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => descent,
            "CapHeight" => cap_height,
            "StemV" => 80,
            "FontFile2" => program_id,
        });

        Ok(self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => Object::Name(name),
            "FirstChar" => i64::from(FIRST_CHAR),
            "LastChar" => i64::from(LAST_CHAR),
            "Widths" => font.widths().iter().map(|&w| Object::Integer(w)).collect::<Vec<_>>(),
            "FontDescriptor" => descriptor_id,
            "Encoding" => "WinAnsiEncoding",
        }))
    }

    fn ext_gstate_for(&mut self, alpha: f32) -> String {
        let millis = (alpha.clamp(0.0, 1.0) * 1000.0).round() as u32;
        if let Some((key, _)) = self.ext_gstates.get(&millis) {
            return key.clone();
        }

        let key = format!("GS{}", self.ext_gstates.len() + 1);
        let id = self.doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => millis as f32 / 1000.0,
            "CA" => millis as f32 / 1000.0,
        });
        self.ext_gstates.insert(millis, (key.clone(), id));
        key
    }

    fn resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for font in self.fonts.values() {
            fonts.set(font.key.clone(), font.id);
        }
        let mut images = Dictionary::new();
        for (key, id) in &self.images {
            images.set(key.clone(), *id);
        }
        let mut states = Dictionary::new();
        for (key, id) in self.ext_gstates.values() {
            states.set(key.clone(), *id);
        }

        dictionary! {
            "Font" => fonts,
            "XObject" => images,
            "ExtGState" => states,
        }
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCanvas for PdfCanvas {
    fn register_font(&mut self, name: &str, font: FontResource) -> Result<()> {
        if self.state == CanvasState::Saved {
            return Err(CanvasError::InvalidState {
                operation: "register a font",
                state: self.state.as_str(),
            });
        }
        if self.fonts.contains_key(name) {
            return Err(CanvasError::InvalidFont {
                name: name.to_string(),
                reason: "already registered".to_string(),
            });
        }

        let symbolic = matches!(font, FontResource::Standard(s) if s.is_symbolic());
        let id = self.add_font_objects(&font)?;
        let key = format!("F{}", self.fonts.len() + 1);
        debug!("Registered font {} as /{}", name, key);
        self.fonts.insert(name.to_string(), RegisteredFont { key, id, symbolic });
        Ok(())
    }

    fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    fn begin_page(&mut self, width: f32, height: f32) -> Result<()> {
        self.require(CanvasState::Empty, "begin a page")?;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CanvasError::InvalidPageSize { width, height });
        }
        self.page_size = (width, height);
        self.state = CanvasState::PageOpen;
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
        self.require(CanvasState::PageOpen, "draw an image")?;

        let (pixel_width, pixel_height) = image.dimensions();
        let (color_space, samples) = match image {
            DynamicImage::ImageLuma8(gray) => ("DeviceGray", gray.as_raw().clone()),
            other => ("DeviceRGB", other.to_rgb8().into_raw()),
        };

        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(pixel_width),
                "Height" => i64::from(pixel_height),
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
            },
            samples,
        );
        stream.compress()?;
        let id = self.doc.add_object(stream);

        let key = format!("Im{}", self.images.len() + 1);
        self.images.push((key.clone(), id));

        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(key.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);

        trace!("Image {}x{} drawn at ({}, {}) size {}x{}", pixel_width, pixel_height, x, y, width, height);
        Ok(())
    }

    fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        self.require(CanvasState::PageOpen, "set a font")?;
        if !self.fonts.contains_key(name) {
            return Err(CanvasError::FontNotRegistered(name.to_string()));
        }
        self.current_font = Some((name.to_string(), size));
        Ok(())
    }

    fn set_fill_color(&mut self, color: FillColor) -> Result<()> {
        self.require(CanvasState::PageOpen, "set the fill colour")?;
        self.fill = color;
        Ok(())
    }

    fn set_text_render_mode(&mut self, mode: TextRenderMode) -> Result<()> {
        self.require(CanvasState::PageOpen, "set the render mode")?;
        self.render_mode = mode;
        Ok(())
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        self.require(CanvasState::PageOpen, "draw text")?;

        let (name, size) = self
            .current_font
            .clone()
            .ok_or_else(|| CanvasError::FontNotRegistered("<no font selected>".to_string()))?;
        let font = self
            .fonts
            .get(&name)
            .ok_or_else(|| CanvasError::FontNotRegistered(name.clone()))?;
        let font_key = font.key.clone();
        let bytes = if font.symbolic {
            text.as_bytes().to_vec()
        } else {
            encode_win_ansi(text)
        };

        let fill = self.fill;
        let mut ops = vec![Operation::new("q", vec![])];
        if fill.alpha < 1.0 {
            let state = self.ext_gstate_for(fill.alpha);
            ops.push(Operation::new("gs", vec![Object::Name(state.into_bytes())]));
        }
        ops.extend([
            Operation::new("rg", vec![fill.r.into(), fill.g.into(), fill.b.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font_key.into_bytes()), size.into()]),
            Operation::new("Tr", vec![self.render_mode.operand().into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::String(bytes, StringFormat::Literal)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.operations.extend(ops);

        trace!("Text {:?} at ({}, {}) size {}", text, x, y, size);
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        self.require(CanvasState::PageOpen, "save")?;

        let (width, height) = self.page_size;
        let content = Content {
            operations: std::mem::take(&mut self.operations),
        };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let resources_id = self.doc.add_object(self.resources());

        let pages_id = self.doc.new_object_id();
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        self.doc.save_to(&mut data)?;
        self.state = CanvasState::Saved;

        debug!("Saved {}x{} page ({} bytes)", width, height, data.len());
        Ok(data)
    }
}
