//! Simple-font metrics and byte decoding.
//!
//! Reads `/Widths`, `/FirstChar` and the `/FontDescriptor` ascent and descent
//! from a font dictionary and decodes single-byte strings through the font's
//! base encoding.

use encoding_rs::{Encoding, MACINTOSH, WINDOWS_1252};

use crate::lopdf_backend::{object_to_f64, resolve_object};
use crate::standard_fonts;

/// Ascent used when the font descriptor gives none (1/1000 em).
pub const DEFAULT_ASCENT: f64 = 750.0;
/// Descent used when the font descriptor gives none (1/1000 em).
pub const DEFAULT_DESCENT: f64 = -250.0;
/// Advance width for glyphs without any width information (1/1000 em).
pub const DEFAULT_WIDTH: f64 = 500.0;

/// Single-byte base encoding of a simple font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontEncoding {
    WinAnsi,
    MacRoman,
}

impl FontEncoding {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" | b"StandardEncoding" => Some(FontEncoding::WinAnsi),
            b"MacRomanEncoding" => Some(FontEncoding::MacRoman),
            _ => None,
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            FontEncoding::WinAnsi => WINDOWS_1252,
            FontEncoding::MacRoman => MACINTOSH,
        }
    }
}

/// Everything the interpreter needs to lay out glyphs of one font.
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub base_font: String,
    first_char: u32,
    widths: Vec<f64>,
    standard_widths: Option<&'static [u16; 256]>,
    missing_width: f64,
    pub ascent: f64,
    pub descent: f64,
    pub encoding: FontEncoding,
    /// Type0 font: multi-byte codes this backend does not decode.
    pub composite: bool,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            base_font: String::new(),
            first_char: 0,
            widths: Vec::new(),
            standard_widths: None,
            missing_width: DEFAULT_WIDTH,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            encoding: FontEncoding::WinAnsi,
            composite: false,
        }
    }
}

impl FontInfo {
    /// Read metrics and encoding from a font dictionary.
    pub fn from_dict(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Self {
        let name = |key: &[u8]| {
            dict.get(key)
                .ok()
                .map(|o| resolve_object(doc, o))
                .and_then(|o| o.as_name().ok())
        };

        let base_font = name(b"BaseFont")
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let composite = name(b"Subtype") == Some(b"Type0".as_slice());

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| object_to_f64(resolve_object(doc, o)).ok())
            .map_or(0, |v| v as u32);

        let widths: Vec<f64> = dict
            .get(b"Widths")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(resolve_object(doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let descriptor = dict
            .get(b"FontDescriptor")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_dict().ok());
        let descriptor_value = |key: &[u8], default: f64| {
            descriptor
                .and_then(|d| d.get(key).ok())
                .and_then(|o| object_to_f64(resolve_object(doc, o)).ok())
                .unwrap_or(default)
        };
        let mut ascent = descriptor_value(b"Ascent", DEFAULT_ASCENT);
        let mut descent = descriptor_value(b"Descent", DEFAULT_DESCENT);
        // Some producers write zeros; a zero-height box is useless.
        if ascent <= descent {
            ascent = DEFAULT_ASCENT;
            descent = DEFAULT_DESCENT;
        }
        let missing_width = descriptor_value(b"MissingWidth", DEFAULT_WIDTH);

        let encoding = match dict.get(b"Encoding").ok().map(|o| resolve_object(doc, o)) {
            Some(lopdf::Object::Name(n)) => FontEncoding::from_name(n),
            Some(lopdf::Object::Dictionary(d)) => d
                .get(b"BaseEncoding")
                .ok()
                .and_then(|o| o.as_name().ok())
                .and_then(FontEncoding::from_name),
            _ => None,
        }
        .unwrap_or(FontEncoding::WinAnsi);

        let standard_widths = if widths.is_empty() {
            standard_fonts::widths(&base_font)
        } else {
            None
        };

        Self {
            base_font,
            first_char,
            widths,
            standard_widths,
            missing_width,
            ascent,
            descent,
            encoding,
            composite,
        }
    }

    /// Advance width of `code` in 1/1000 em.
    pub fn width(&self, code: u8) -> f64 {
        let code = u32::from(code);
        if let Some(w) = code
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
        {
            return *w;
        }
        if let Some(table) = self.standard_widths {
            return f64::from(table[code as usize]);
        }
        self.missing_width
    }

    /// Decode one byte to a character.
    pub fn decode(&self, code: u8) -> char {
        let (text, _) = self
            .encoding
            .encoding()
            .decode_without_bom_handling(std::slice::from_ref(&code));
        text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}
