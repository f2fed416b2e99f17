//! Default [`TextShaper`] backed by `rustybuzz`.
//!
//! Text is split into grapheme clusters, each cluster is assigned the first
//! loaded font whose cmap covers its leading codepoint, and consecutive
//! clusters on the same font form one glyph run. Only left-to-right shaping
//! is performed.

use std::{
  io::Read,
  sync::Arc,
};

use rustybuzz::{
  Direction,
  Face,
  UnicodeBuffer,
};
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
  font::FontHandle,
  font_cache::{
    ColorGlyphCapability,
    InspectError,
  },
  shaper::{
    GlyphPlan,
    IndexedGlyphRun,
    PlannedGlyph,
    PreparedLine,
    TextRunProperties,
    TextShaper,
  },
};

struct LoadedFont {
  handle:       FontHandle,
  data:         Arc<[u8]>,
  units_per_em: f32,
  ascender:     f32,
  descender:    f32,
}

impl LoadedFont {
  fn face(&self) -> Option<Face<'_>> {
    Face::from_slice(&self.data, self.handle.face_index())
  }
}

/// Fonts in priority order; the first one is the primary font and provides
/// line metrics.
#[derive(Default)]
pub struct FallbackShaper {
  fonts: Vec<LoadedFont>,
}

impl FallbackShaper {
  pub fn new() -> Self {
    Self::default()
  }

  /// Loads every font it can, skipping (and logging) the ones that fail.
  pub fn with_fonts(fonts: impl IntoIterator<Item = FontHandle>) -> Self {
    let mut shaper = Self::new();
    for font in fonts {
      if let Err(err) = shaper.push_font(font.clone()) {
        warn!(font = font.id().get(), %err, "skipping unusable fallback font");
      }
    }
    shaper
  }

  /// Appends `font` to the fallback chain.
  pub fn push_font(&mut self, handle: FontHandle) -> Result<(), InspectError> {
    let mut data = Vec::new();
    handle
      .open_stream()
      .map_err(InspectError::Open)?
      .read_to_end(&mut data)
      .map_err(InspectError::Read)?;

    let face = rustybuzz::ttf_parser::Face::parse(&data, handle.face_index())
      .map_err(InspectError::Parse)?;
    let units_per_em = f32::from(face.units_per_em());
    let ascender = f32::from(face.ascender());
    let descender = f32::from(face.descender());

    self.fonts.push(LoadedFont {
      handle,
      data: data.into(),
      units_per_em,
      ascender,
      descender,
    });
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.fonts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fonts.is_empty()
  }

  fn font_for_cluster(&self, faces: &[Option<Face<'_>>], cluster: &str) -> usize {
    let Some(ch) = cluster.chars().next() else {
      return 0;
    };
    faces
      .iter()
      .position(|face| face.as_ref().is_some_and(|face| face.glyph_index(ch).is_some()))
      .unwrap_or(0)
  }
}

impl TextShaper for FallbackShaper {
  fn prepare_line(&self, text: &str, properties: &TextRunProperties) -> PreparedLine {
    let font_size = properties.font_size;
    let (height, baseline) = match self.fonts.first() {
      Some(primary) if primary.units_per_em > 0.0 => {
        let scale = font_size / primary.units_per_em;
        (
          (primary.ascender - primary.descender) * scale,
          primary.ascender * scale,
        )
      },
      _ => (font_size, font_size),
    };

    let mut line = PreparedLine {
      text: text.to_string(),
      glyph_runs: Vec::new(),
      width: 0.0,
      height,
      baseline,
    };
    if self.fonts.is_empty() {
      return line;
    }

    let faces: Vec<Option<Face<'_>>> = self.fonts.iter().map(LoadedFont::face).collect();
    let mut char_pos = 0;
    let mut run_text_ranges: Vec<(usize, usize, usize)> = Vec::new();
    for cluster in text.graphemes(true) {
      let font_idx = self.font_for_cluster(&faces, cluster);
      let cluster_chars = cluster.chars().count();
      match run_text_ranges.last_mut() {
        Some((idx, _, len)) if *idx == font_idx => *len += cluster_chars,
        _ => run_text_ranges.push((font_idx, char_pos, cluster_chars)),
      }
      char_pos += cluster_chars;
    }

    for (font_idx, char_start, char_len) in run_text_ranges {
      let font = &self.fonts[font_idx];
      if let Some(face) = &faces[font_idx] {
        let scale = if font.units_per_em > 0.0 {
          font_size / font.units_per_em
        } else {
          0.0
        };
        let slice = the_core::chars::char_slice(text, char_start, char_len);
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(slice);
        buffer.set_direction(Direction::LeftToRight);
        let glyphs = rustybuzz::shape(face, &[], buffer);
        line.width += glyphs
          .glyph_positions()
          .iter()
          .map(|pos| pos.x_advance as f32 * scale)
          .sum::<f32>();
      }
      line.glyph_runs.push(IndexedGlyphRun {
        char_start,
        char_len,
        font: font.handle.clone(),
      });
    }

    line
  }

  fn plan_glyphs(&self, capability: &ColorGlyphCapability, text: &str) -> GlyphPlan {
    let Some(face) = Face::from_slice(capability.data(), capability.font().face_index()) else {
      return GlyphPlan::default();
    };

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(Direction::LeftToRight);
    let glyphs = rustybuzz::shape(&face, &[], buffer);

    // Clusters are byte offsets; the joiner works in codepoints.
    let mut byte_to_char = vec![0; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
      byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = text.chars().count();

    let planned = glyphs
      .glyph_infos()
      .iter()
      .zip(glyphs.glyph_positions())
      .map(|(info, pos)| {
        PlannedGlyph {
          input_offset: byte_to_char
            .get(info.cluster as usize)
            .copied()
            .unwrap_or(0),
          glyph_id:     info.glyph_id as u16,
          advance:      pos.x_advance as f32,
          offset_x:     pos.x_offset as f32,
          offset_y:     pos.y_offset as f32,
        }
      })
      .collect();
    GlyphPlan::new(planned)
  }
}

impl std::fmt::Debug for FallbackShaper {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FallbackShaper")
      .field("fonts", &self.fonts.len())
      .finish()
  }
}
