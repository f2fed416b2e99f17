//! The shaping collaborator seam.

use crate::{
  font::FontHandle,
  font_cache::ColorGlyphCapability,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Color {
  pub const BLACK: Color = Color::rgb(0, 0, 0);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 0xff }
  }
}

/// Formatting shared by every run in a line unless a style overrides it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRunProperties {
  pub font_size:  f32,
  pub foreground: Color,
  pub bold:       bool,
  pub italic:     bool,
}

impl Default for TextRunProperties {
  fn default() -> Self {
    Self {
      font_size:  14.0,
      foreground: Color::BLACK,
      bold:       false,
      italic:     false,
    }
  }
}

/// A span of prepared text rendered with one physical font.
///
/// Offsets are char indices into [`PreparedLine::text`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedGlyphRun {
  pub char_start: usize,
  pub char_len:   usize,
  pub font:       FontHandle,
}

impl IndexedGlyphRun {
  pub fn char_end(&self) -> usize {
    self.char_start + self.char_len
  }
}

/// A formatted, measured line of text. Preparing is linear in the text
/// length, so callers keep the last one around and reuse it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLine {
  pub text:       String,
  pub glyph_runs: Vec<IndexedGlyphRun>,
  pub width:      f32,
  pub height:     f32,
  pub baseline:   f32,
}

/// One positioned glyph, advances and offsets in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedGlyph {
  /// Char offset into the planned text of the codepoint group this glyph
  /// belongs to.
  pub input_offset: usize,
  pub glyph_id:     u16,
  pub advance:      f32,
  pub offset_x:     f32,
  pub offset_y:     f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphPlan {
  glyphs: Vec<PlannedGlyph>,
}

impl GlyphPlan {
  pub fn new(glyphs: Vec<PlannedGlyph>) -> Self {
    Self { glyphs }
  }

  pub fn glyphs(&self) -> &[PlannedGlyph] {
    &self.glyphs
  }

  pub fn len(&self) -> usize {
    self.glyphs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.glyphs.is_empty()
  }

  /// Sum of advances in font units.
  pub fn total_advance(&self) -> f32 {
    self.glyphs.iter().map(|glyph| glyph.advance).sum()
  }

  /// Input offsets of the distinct codepoint groups, in glyph order.
  ///
  /// Glyphs produced from the same group (a base glyph plus marks, say)
  /// collapse into one entry.
  pub fn group_offsets(&self) -> Vec<usize> {
    let mut offsets: Vec<usize> = self.glyphs.iter().map(|glyph| glyph.input_offset).collect();
    offsets.dedup();
    offsets
  }
}

/// Font-aware measurement and glyph planning, implemented by the embedder's
/// text stack. Implementations must be deterministic for a given input.
pub trait TextShaper: Send + Sync {
  /// Formats `text` as a single line and reports which physical font renders
  /// each span.
  fn prepare_line(&self, text: &str, properties: &TextRunProperties) -> PreparedLine;

  /// Plans glyphs for `text` using the color font behind `capability`.
  fn plan_glyphs(&self, capability: &ColorGlyphCapability, text: &str) -> GlyphPlan;
}
