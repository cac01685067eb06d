//! Font resources that can be registered with a canvas.
//!
//! Text is written as single-byte WinAnsi strings, so a TrueType font is
//! embedded as a simple font with widths for codes 32-255.

use std::path::Path;

use ttf_parser::{name_id, Face};

use crate::error::CanvasError;

/// First character code with a width entry.
pub(crate) const FIRST_CHAR: u8 = 32;
/// Last character code with a width entry.
pub(crate) const LAST_CHAR: u8 = 255;

/// The standard PDF base fonts every reader provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    const ALL: [StandardFont; 14] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
        StandardFont::Symbol,
        StandardFont::ZapfDingbats,
    ];

    /// PostScript base font name.
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Look up a base font by its PostScript name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|font| font.base_name() == name)
    }

    /// Whether the font uses its own built-in encoding instead of WinAnsi.
    pub(crate) fn is_symbolic(self) -> bool {
        matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }
}

/// A parsed TrueType font ready for embedding.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    postscript_name: String,
    data: Vec<u8>,
    widths: Vec<i64>,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    bbox: [i64; 4],
}

impl TrueTypeFont {
    /// Parse font data. `fallback_name` is used when the font has no
    /// PostScript name record.
    pub fn parse(data: Vec<u8>, fallback_name: &str) -> Result<Self, CanvasError> {
        let invalid = |reason: String| CanvasError::InvalidFont {
            name: fallback_name.to_string(),
            reason,
        };

        if data.is_empty() {
            return Err(invalid("font file is empty".to_string()));
        }

        let face = Face::parse(&data, 0).map_err(|e| invalid(e.to_string()))?;
        let units_per_em = i64::from(face.units_per_em().max(1));
        let scale = |value: i64| value * 1000 / units_per_em;

        let missing_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|advance| scale(i64::from(advance)))
            .unwrap_or(500);

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let Some(c) = win_ansi_char(code) else {
                    return 0;
                };
                face.glyph_index(c)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| scale(i64::from(advance)))
                    .unwrap_or(missing_width)
            })
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
            .unwrap_or_else(|| fallback_name.to_string())
            .chars()
            .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
            .collect::<String>();

        let global = face.global_bounding_box();
        let ascent = scale(i64::from(face.ascender()));
        let descent = scale(i64::from(face.descender()));
        let cap_height = face
            .capital_height()
            .map(|h| scale(i64::from(h)))
            .unwrap_or(ascent);

        let font = Self {
            postscript_name,
            widths,
            ascent,
            descent,
            cap_height,
            bbox: [
                scale(i64::from(global.x_min)),
                scale(i64::from(global.y_min)),
                scale(i64::from(global.x_max)),
                scale(i64::from(global.y_max)),
            ],
            data,
        };

        Ok(font)
    }

    /// Read and parse a font file.
    pub fn from_file(path: &Path) -> Result<Self, CanvasError> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("EmbeddedFont")
            .to_string();
        let data = std::fs::read(path).map_err(|e| CanvasError::InvalidFont {
            name: name.clone(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::parse(data, &name)
    }

    /// PostScript name written as `BaseFont`.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Raw font program.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Widths for codes `FIRST_CHAR..=LAST_CHAR` in 1/1000 em.
    pub fn widths(&self) -> &[i64] {
        &self.widths
    }

    pub(crate) fn metrics(&self) -> (i64, i64, i64, [i64; 4]) {
        (self.ascent, self.descent, self.cap_height, self.bbox)
    }
}

/// A font that can be registered with a canvas.
#[derive(Debug, Clone)]
pub enum FontResource {
    /// One of the standard base fonts.
    Standard(StandardFont),
    /// An embedded TrueType font.
    TrueType(TrueTypeFont),
}

impl FontResource {
    /// Resolve a font: from `file` when given, otherwise `name` must be a
    /// standard base font. There is no fallback to another font.
    pub fn resolve(name: &str, file: Option<&Path>) -> Result<Self, CanvasError> {
        match file {
            Some(path) => Ok(FontResource::TrueType(TrueTypeFont::from_file(path)?)),
            None => StandardFont::from_name(name)
                .map(FontResource::Standard)
                .ok_or_else(|| CanvasError::FontNotRegistered(name.to_string())),
        }
    }
}

/// Codes 0x80-0x9F that WinAnsiEncoding assigns. The rest of that range
/// (0x81, 0x8D, 0x8F, 0x90, 0x9D) is undefined.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Character a WinAnsi code stands for, if the code is defined.
pub(crate) fn win_ansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        0x80..=0x9F => WIN_ANSI_HIGH
            .iter()
            .find(|(byte, _)| *byte == code)
            .map(|&(_, c)| c),
        _ => None,
    }
}

/// WinAnsi code for a character, if it has one.
fn win_ansi_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|&&(_, mapped)| mapped == c)
            .map(|&(byte, _)| byte),
    }
}

/// Encode text as WinAnsi bytes. Characters with no WinAnsi code become `?`;
/// control characters become spaces.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match win_ansi_byte(c) {
            Some(byte) => byte,
            None if u32::from(c) < 0x20 => b' ',
            None => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_font_lookup() {
        assert_eq!(StandardFont::from_name("Helvetica"), Some(StandardFont::Helvetica));
        assert_eq!(StandardFont::from_name("Times-Roman"), Some(StandardFont::TimesRoman));
        assert_eq!(StandardFont::from_name("Arial"), None);
    }

    #[test]
    fn test_resolve_without_file_requires_standard_font() {
        assert!(matches!(
            FontResource::resolve("Courier", None),
            Ok(FontResource::Standard(StandardFont::Courier))
        ));
        assert!(matches!(
            FontResource::resolve("Arial", None),
            Err(CanvasError::FontNotRegistered(name)) if name == "Arial"
        ));
    }

    #[test]
    fn test_truetype_rejects_garbage() {
        assert!(TrueTypeFont::parse(Vec::new(), "Empty").is_err());
        assert!(TrueTypeFont::parse(b"not a font".to_vec(), "Junk").is_err());
    }

    #[test]
    fn test_missing_font_file() {
        let result = FontResource::resolve("Arial", Some(Path::new("/nonexistent/arial.ttf")));
        assert!(matches!(result, Err(CanvasError::InvalidFont { .. })));
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("hello"), b"hello".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("a\tb"), b"a b".to_vec());
        assert_eq!(encode_win_ansi("Ω"), b"?".to_vec());
    }

    #[test]
    fn test_encode_win_ansi_typographic_punctuation() {
        assert_eq!(
            encode_win_ansi("don\u{2019}t \u{2014} \u{20AC}5"),
            vec![b'd', b'o', b'n', 0x92, b't', b' ', 0x97, b' ', 0x80, b'5']
        );
        assert_eq!(
            encode_win_ansi("\u{201C}quote\u{201D} \u{2022} \u{2026} \u{2122} \u{2013}"),
            vec![0x93, b'q', b'u', b'o', b't', b'e', 0x94, b' ', 0x95, b' ', 0x85, b' ', 0x99, b' ', 0x96]
        );
        // C1 controls have no WinAnsi meaning
        assert_eq!(encode_win_ansi("\u{0092}"), b"?".to_vec());
    }

    #[test]
    fn test_win_ansi_table_round_trips() {
        for code in FIRST_CHAR..=LAST_CHAR {
            if let Some(c) = win_ansi_char(code) {
                assert_eq!(encode_win_ansi(&c.to_string()), vec![code], "code {:#x}", code);
            }
        }
        for undefined in [0x7F, 0x81, 0x8D, 0x8F, 0x90, 0x9D] {
            assert_eq!(win_ansi_char(undefined), None);
        }
    }

    fn dejavu_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/DejaVuSansMono.ttf")
    }

    #[test]
    fn test_truetype_parse_real_font() {
        let font = TrueTypeFont::from_file(&dejavu_path()).unwrap();

        assert_eq!(font.postscript_name(), "DejaVuSansMono");
        assert_eq!(font.widths().len(), 224);

        // Monospaced: 1233 units at 2048 per em
        let width = |code: u8| font.widths()[usize::from(code - FIRST_CHAR)];
        assert_eq!(width(b'A'), 602);
        assert_eq!(width(b'i'), 602);
        assert_eq!(width(0x92), 602);
        assert_eq!(width(0x97), 602);
        assert_eq!(width(0x81), 0);

        let (ascent, descent, cap_height, bbox) = font.metrics();
        assert!(ascent > 0);
        assert!(descent < 0);
        assert!(cap_height > 0);
        assert!(bbox[2] > bbox[0] && bbox[3] > bbox[1]);
    }

    #[test]
    fn test_resolve_with_file_uses_truetype() {
        let resolved = FontResource::resolve("Mono", Some(&dejavu_path())).unwrap();
        assert!(matches!(resolved, FontResource::TrueType(font) if font.postscript_name() == "DejaVuSansMono"));
    }
}
