//! Deterministic collaborators for unit tests.

use std::sync::{
  Arc,
  atomic::{
    AtomicUsize,
    Ordering,
  },
};

use the_core::chars::char_is_zwj;
use the_shape::{
  Color,
  ColorGlyphCapability,
  FontHandle,
  FontId,
  FontInspector,
  FontShapeCache,
  GlyphPlan,
  IndexedGlyphRun,
  InspectError,
  PlannedGlyph,
  PreparedLine,
  TextRunProperties,
  TextShaper,
};

use crate::{
  marker::MarkerCache,
  run::{
    DrawingSurface,
    Point,
  },
};

pub const TEXT_FONT: FontId = FontId::new(1);
pub const EMOJI_FONT: FontId = FontId::new(2);

/// Fonts with an even id carry color glyphs.
#[derive(Debug, Default)]
pub struct EvenIdInspector {
  pub calls: AtomicUsize,
}

impl FontInspector for EvenIdInspector {
  fn inspect(&self, font: &FontHandle) -> Result<Option<ColorGlyphCapability>, InspectError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let colored = font.id().get() % 2 == 0;
    Ok(colored.then(|| ColorGlyphCapability::new(font.clone(), Vec::new(), 1000)))
  }
}

pub fn color_cache() -> FontShapeCache {
  FontShapeCache::with_inspector(EvenIdInspector::default())
}

pub fn marker_cache() -> Arc<MarkerCache> {
  Arc::new(MarkerCache::new(Arc::new(ClusterShaper::default())))
}

/// Renders astral-plane chars and ZWJs with [`EMOJI_FONT`], everything else
/// with [`TEXT_FONT`]. Plans one 1000-unit glyph per char.
#[derive(Debug, Default)]
pub struct ClusterShaper {
  prepares: AtomicUsize,
}

impl ClusterShaper {
  /// Lines are two pixels taller than the font size; the baseline sits at
  /// the font size.
  pub fn line_height(font_size: f32) -> f32 {
    font_size + 2.0
  }

  pub fn prepare_calls(&self) -> usize {
    self.prepares.load(Ordering::SeqCst)
  }

  fn font_for(ch: char) -> FontId {
    if char_is_zwj(ch) || u32::from(ch) >= 0x1_0000 {
      EMOJI_FONT
    } else {
      TEXT_FONT
    }
  }
}

impl TextShaper for ClusterShaper {
  fn prepare_line(&self, text: &str, properties: &TextRunProperties) -> PreparedLine {
    self.prepares.fetch_add(1, Ordering::SeqCst);
    let mut glyph_runs: Vec<IndexedGlyphRun> = Vec::new();
    for (idx, ch) in text.chars().enumerate() {
      let font = Self::font_for(ch);
      match glyph_runs.last_mut() {
        Some(run) if run.font.id() == font => run.char_len += 1,
        _ => {
          glyph_runs.push(IndexedGlyphRun {
            char_start: idx,
            char_len:   1,
            font:       FontHandle::from_memory(font, Vec::new(), 0),
          })
        },
      }
    }
    PreparedLine {
      text: text.to_string(),
      width: 10.0 * text.chars().count() as f32,
      height: Self::line_height(properties.font_size),
      baseline: properties.font_size,
      glyph_runs,
    }
  }

  fn plan_glyphs(&self, _capability: &ColorGlyphCapability, text: &str) -> GlyphPlan {
    GlyphPlan::new(
      (0..text.chars().count())
        .map(|input_offset| PlannedGlyph {
          input_offset,
          glyph_id: 1,
          advance: 1000.0,
          offset_x: 0.0,
          offset_y: 0.0,
        })
        .collect(),
    )
  }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
  pub glyphs: Vec<(u16, Point)>,
  pub texts:  Vec<String>,
}

impl DrawingSurface for RecordingSurface {
  fn draw_glyph(
    &mut self,
    _font: &FontHandle,
    glyph_id: u16,
    origin: Point,
    _font_size: f32,
    _color: Color,
  ) {
    self.glyphs.push((glyph_id, origin));
  }

  fn draw_text(&mut self, text: &str, _origin: Point, _properties: &TextRunProperties) {
    self.texts.push(text.to_string());
  }
}
