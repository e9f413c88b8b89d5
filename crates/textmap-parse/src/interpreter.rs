//! Content stream interpreter producing positioned words.
//!
//! Handles the graphics state operators that move text (`q Q cm`), the text
//! object and text state operators, the text showing operators and form
//! XObjects. Everything else in the stream is ignored.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId};
use textmap_core::{BBox, ExtractResult, RawWord, Warning, WarningCode};

use crate::fonts::FontInfo;
use crate::lopdf_backend::{object_to_f64, resolve_object, stream_bytes};
use crate::matrix::Matrix;
use crate::page_geometry::PageGeometry;
use crate::text_state::{TextState, TextStateSnapshot};
use crate::words::{Glyph, WordBuilder};

/// Maximum nesting of form XObjects.
pub const MAX_FORM_DEPTH: usize = 10;

/// Interpret a page content stream and return its words.
///
/// Block ids count the `BT`/`ET` text objects of the page in stream order,
/// including those inside form XObjects.
pub fn extract_words(
    doc: &lopdf::Document,
    geometry: PageGeometry,
    page_number: usize,
    content: &[u8],
    resources: &Dictionary,
) -> ExtractResult<Vec<RawWord>> {
    let mut interpreter = Interpreter::new(doc, geometry, page_number);
    interpreter.run(content, resources, 0);
    interpreter.finish()
}

struct SavedState {
    ctm: Matrix,
    text: TextStateSnapshot,
    font: Rc<FontInfo>,
}

struct Interpreter<'a> {
    doc: &'a lopdf::Document,
    geometry: PageGeometry,
    page_number: usize,
    ctm: Matrix,
    text: TextState,
    font: Rc<FontInfo>,
    stack: Vec<SavedState>,
    words: WordBuilder,
    warnings: Vec<Warning>,
    font_cache: HashMap<ObjectId, Rc<FontInfo>>,
    reported_fonts: HashSet<String>,
    next_block: u32,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a lopdf::Document, geometry: PageGeometry, page_number: usize) -> Self {
        Self {
            doc,
            geometry,
            page_number,
            ctm: Matrix::identity(),
            text: TextState::new(),
            font: Rc::new(FontInfo::default()),
            stack: Vec::new(),
            words: WordBuilder::new(),
            warnings: Vec::new(),
            font_cache: HashMap::new(),
            reported_fonts: HashSet::new(),
            next_block: 0,
        }
    }

    fn finish(self) -> ExtractResult<Vec<RawWord>> {
        ExtractResult::with_warnings(self.words.finish(), self.warnings)
    }

    fn warn(&mut self, code: WarningCode, description: String) {
        self.warnings
            .push(Warning::new(code, description).on_page(self.page_number));
    }

    fn run(&mut self, content: &[u8], resources: &Dictionary, depth: usize) {
        let content = match Content::decode(content) {
            Ok(c) => c,
            Err(e) => {
                self.warn(
                    WarningCode::MalformedContent,
                    format!("content stream could not be decoded: {e}"),
                );
                return;
            }
        };
        for op in &content.operations {
            self.apply(op, resources, depth);
        }
    }

    fn apply(&mut self, op: &Operation, resources: &Dictionary, depth: usize) {
        let nums: Vec<f64> = op
            .operands
            .iter()
            .filter_map(|o| object_to_f64(o).ok())
            .collect();

        match op.operator.as_str() {
            "q" => self.stack.push(SavedState {
                ctm: self.ctm,
                text: self.text.save_snapshot(),
                font: Rc::clone(&self.font),
            }),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.ctm = saved.ctm;
                    self.text.restore_snapshot(saved.text);
                    self.font = saved.font;
                }
            }
            "cm" => match Matrix::from_slice(&nums) {
                Some(m) => self.ctm = m.concat(&self.ctm),
                None => self.malformed(op),
            },
            "BT" => {
                self.text.begin_text();
                self.words.start_block(self.next_block);
                self.next_block += 1;
            }
            "ET" => {
                self.text.end_text();
                self.words.flush();
            }
            "Tf" => {
                let name = op.operands.first().and_then(|o| o.as_name().ok());
                match (name, nums.first()) {
                    (Some(name), Some(&size)) => {
                        self.font = self.load_font(name, resources);
                        self.text
                            .set_font(String::from_utf8_lossy(name).into_owned(), size);
                    }
                    _ => self.malformed(op),
                }
            }
            "Tc" | "Tw" | "Tz" | "TL" | "Ts" => {
                let Some(&v) = nums.first() else {
                    return self.malformed(op);
                };
                match op.operator.as_str() {
                    "Tc" => self.text.char_spacing = v,
                    "Tw" => self.text.word_spacing = v,
                    "Tz" => self.text.h_scaling = v,
                    "TL" => self.text.leading = v,
                    _ => self.text.rise = v,
                }
            }
            "Td" | "TD" => {
                let [tx, ty] = nums[..] else {
                    return self.malformed(op);
                };
                let before = *self.text.line_matrix();
                if op.operator == "Td" {
                    self.text.move_text_position(tx, ty);
                } else {
                    self.text.move_text_position_and_set_leading(tx, ty);
                }
                self.line_moved(&before);
            }
            "Tm" => match Matrix::from_slice(&nums) {
                Some(m) => {
                    let before = *self.text.line_matrix();
                    self.text.set_text_matrix(m);
                    self.line_moved(&before);
                }
                None => self.malformed(op),
            },
            "T*" => {
                self.text.move_to_next_line();
                self.words.next_line();
            }
            "Tj" => match op.operands.first() {
                Some(Object::String(bytes, _)) => self.show_string(bytes),
                _ => self.malformed(op),
            },
            "'" => {
                self.text.move_to_next_line();
                self.words.next_line();
                match op.operands.first() {
                    Some(Object::String(bytes, _)) => self.show_string(bytes),
                    _ => self.malformed(op),
                }
            }
            "\"" => match (&nums[..], op.operands.get(2)) {
                ([aw, ac], Some(Object::String(bytes, _))) => {
                    self.text.word_spacing = *aw;
                    self.text.char_spacing = *ac;
                    self.text.move_to_next_line();
                    self.words.next_line();
                    self.show_string(bytes);
                }
                _ => self.malformed(op),
            },
            "TJ" => match op.operands.first() {
                Some(Object::Array(items)) => {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show_string(bytes),
                            other => {
                                if let Ok(adjust) = object_to_f64(other) {
                                    let tx = -adjust / 1000.0
                                        * self.text.font_size
                                        * self.text.h_scaling_normalized();
                                    self.text.advance_text_position(tx);
                                }
                            }
                        }
                    }
                }
                _ => self.malformed(op),
            },
            "Do" => match op.operands.first().and_then(|o| o.as_name().ok()) {
                Some(name) => self.invoke_xobject(name, resources, depth),
                None => self.malformed(op),
            },
            _ => {}
        }
    }

    fn malformed(&mut self, op: &Operation) {
        self.warn(
            WarningCode::MalformedContent,
            format!(
                "operator '{}' has unexpected operands: {:?}",
                op.operator, op.operands
            ),
        );
    }

    /// A line-positioning operator that changes the baseline starts a new line.
    fn line_moved(&mut self, before: &Matrix) {
        let after = self.text.line_matrix();
        let moved = (after.f - before.f).abs() > 1e-6
            || (after.b - before.b).abs() > 1e-6
            || (after.d - before.d).abs() > 1e-6;
        if moved {
            self.words.next_line();
        }
    }

    fn load_font(&mut self, name: &[u8], resources: &Dictionary) -> Rc<FontInfo> {
        let doc = self.doc;
        let label = String::from_utf8_lossy(name).into_owned();
        let entry = resources
            .get(b"Font")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok());

        let Some(entry) = entry else {
            if self.reported_fonts.insert(label.clone()) {
                self.warn(
                    WarningCode::MissingFont,
                    format!("font /{label} not found in page resources, using default metrics"),
                );
            }
            return Rc::new(FontInfo::default());
        };

        let id = entry.as_reference().ok();
        if let Some(font) = id.and_then(|id| self.font_cache.get(&id)) {
            return Rc::clone(font);
        }

        let Ok(dict) = resolve_object(doc, entry).as_dict() else {
            self.warn(
                WarningCode::MalformedContent,
                format!("font /{label} is not a dictionary"),
            );
            return Rc::new(FontInfo::default());
        };

        let font = Rc::new(FontInfo::from_dict(doc, dict));
        if font.composite && self.reported_fonts.insert(font.base_font.clone()) {
            self.warn(
                WarningCode::UnsupportedFont,
                format!(
                    "composite font /{label} ({}) is not supported, its text is skipped",
                    font.base_font
                ),
            );
        }
        if let Some(id) = id {
            self.font_cache.insert(id, Rc::clone(&font));
        }
        font
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let font = Rc::clone(&self.font);
        if font.composite {
            return;
        }
        let size = self.text.font_size;
        let h_scale = self.text.h_scaling_normalized();
        let rise = self.text.rise;
        let y_lo = rise + font.descent / 1000.0 * size;
        let y_hi = rise + font.ascent / 1000.0 * size;

        for &code in bytes {
            let width = font.width(code) / 1000.0;
            let trm = self.text.text_matrix().concat(&self.ctm);
            let x_end = width * size * h_scale;

            let corners = [(0.0, y_lo), (x_end, y_lo), (0.0, y_hi), (x_end, y_hi)]
                .map(|(x, y)| {
                    let (px, py) = trm.transform_point(x, y);
                    self.geometry.to_top_left(px, py)
                });
            let bbox = corners.iter().skip(1).fold(
                BBox::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1),
                |acc, &(x, y)| acc.union(&BBox::new(x, y, x, y)),
            );
            let (bx, by) = trm.transform_point(0.0, rise);

            self.words.push(Glyph {
                ch: font.decode(code),
                bbox,
                baseline: self.geometry.to_top_left(bx, by).1,
                size: size * trm.vertical_scale(),
            });

            let mut advance = width * size + self.text.char_spacing;
            if code == b' ' {
                advance += self.text.word_spacing;
            }
            self.text.advance_text_position(advance * h_scale);
        }
    }

    fn invoke_xobject(&mut self, name: &[u8], resources: &Dictionary, depth: usize) {
        let doc = self.doc;
        let label = String::from_utf8_lossy(name).into_owned();
        let stream = resources
            .get(b"XObject")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_stream().ok());
        let Some(stream) = stream else {
            self.warn(
                WarningCode::MalformedContent,
                format!("XObject /{label} not found in resources"),
            );
            return;
        };
        if stream.dict.get(b"Subtype").and_then(|o| o.as_name()).ok() != Some(b"Form".as_slice())
        {
            return;
        }
        if depth >= MAX_FORM_DEPTH {
            self.warn(
                WarningCode::MalformedContent,
                format!("form XObject /{label} nested deeper than {MAX_FORM_DEPTH} levels, skipped"),
            );
            return;
        }

        let bytes = match stream_bytes(stream) {
            Ok(b) => b,
            Err(e) => {
                self.warn(WarningCode::MalformedContent, format!("form /{label}: {e}"));
                return;
            }
        };
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| {
                let values: Vec<f64> = arr.iter().filter_map(|o| object_to_f64(o).ok()).collect();
                Matrix::from_slice(&values)
            })
            .unwrap_or_default();
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_dict().ok())
            .unwrap_or(resources);

        let saved_ctm = self.ctm;
        let saved_text = self.text.save_snapshot();
        let saved_font = Rc::clone(&self.font);
        let saved_depth = self.stack.len();

        self.ctm = matrix.concat(&self.ctm);
        self.run(&bytes, form_resources, depth + 1);

        self.stack.truncate(saved_depth);
        self.ctm = saved_ctm;
        self.text.restore_snapshot(saved_text);
        self.font = saved_font;
    }
}
