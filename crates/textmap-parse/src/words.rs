//! Grouping positioned glyphs into words.

use textmap_core::{BBox, RawWord};

/// Horizontal gap, as a fraction of the font size, that ends a word.
pub const WORD_GAP_RATIO: f64 = 0.25;

/// Baseline shift, as a fraction of the font size, that ends a word.
pub const BASELINE_SHIFT_RATIO: f64 = 0.5;

/// A decoded glyph in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub bbox: BBox,
    /// Baseline position, distance from the top of the page.
    pub baseline: f64,
    /// Font size in page units.
    pub size: f64,
}

#[derive(Debug)]
struct PendingWord {
    text: String,
    bbox: BBox,
    baseline: f64,
    size: f64,
}

/// Accumulates glyphs into [`RawWord`]s.
///
/// Words break at whitespace, at horizontal gaps wider than
/// [`WORD_GAP_RATIO`] of the font size, at backward jumps, at baseline shifts
/// and whenever the caller starts a new line or block.
#[derive(Debug, Default)]
pub struct WordBuilder {
    words: Vec<RawWord>,
    pending: Option<PendingWord>,
    block: u32,
    line: u32,
    word: u32,
}

impl WordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new block; the next word is on line 0 of it.
    pub fn start_block(&mut self, block: u32) {
        self.flush();
        self.block = block;
        self.line = 0;
        self.word = 0;
    }

    /// Move to the next line of the current block.
    pub fn next_line(&mut self) {
        self.flush();
        if self.word > 0 {
            self.line += 1;
            self.word = 0;
        }
    }

    pub fn push(&mut self, glyph: Glyph) {
        if glyph.ch.is_whitespace() || glyph.ch.is_control() {
            self.flush();
            return;
        }

        if let Some(p) = &self.pending {
            let size = p.size.max(glyph.size);
            let gap = glyph.bbox.x0 - p.bbox.x1;
            let broken = gap > size * WORD_GAP_RATIO
                || gap < -size
                || (glyph.baseline - p.baseline).abs() > size * BASELINE_SHIFT_RATIO;
            if broken {
                self.flush();
            }
        }

        match &mut self.pending {
            Some(p) => {
                p.text.push(glyph.ch);
                p.bbox = p.bbox.union(&glyph.bbox);
            }
            None => {
                self.pending = Some(PendingWord {
                    text: glyph.ch.to_string(),
                    bbox: glyph.bbox,
                    baseline: glyph.baseline,
                    size: glyph.size,
                });
            }
        }
    }

    /// Close the word in progress, if any.
    pub fn flush(&mut self) {
        if let Some(p) = self.pending.take() {
            self.words.push(RawWord {
                text: p.text,
                bbox: p.bbox,
                block: self.block,
                line: self.line,
                word: self.word,
            });
            self.word += 1;
        }
    }

    pub fn finish(mut self) -> Vec<RawWord> {
        self.flush();
        self.words
    }
}
