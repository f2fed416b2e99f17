//! Color emoji substitution.
//!
//! For the rest of the line the generator asks the shaper which physical font
//! renders each span, and for the spans whose font carries color glyphs it
//! lets the joiner pick the cluster the font draws as one unit. Each cluster
//! becomes a one-column [`ColorGlyphElement`] drawn through the color font.

use std::{
  fmt,
  sync::{
    Arc,
    Weak,
  },
};

use the_core::chars::char_slice;
use the_shape::{
  ColorGlyphCapability,
  FontHandle,
  FontShapeCache,
  GlyphPlan,
  PreparedLine,
  TextRunProperties,
  TextShaper,
  joiner,
};
use tracing::trace;

use crate::{
  Tendril,
  context::ConstructionContext,
  element::{
    Placement,
    VisualLineElement,
  },
  generator::ElementGenerator,
  run::{
    DrawingSurface,
    EmbeddedObject,
    FlowDirection,
    LineBreakCondition,
    Point,
    Rect,
    RunMetrics,
    TextRun,
  },
};

/// The last prepared line, keyed by the exact text and formatting it was
/// prepared with.
#[derive(Debug, Default)]
struct PreparedLineCache {
  slot:     Option<(String, TextRunProperties, Arc<PreparedLine>)>,
  prepares: usize,
}

impl PreparedLineCache {
  fn get_or_prepare(
    &mut self,
    text: &str,
    properties: &TextRunProperties,
    prepare: impl FnOnce() -> PreparedLine,
  ) -> Arc<PreparedLine> {
    if let Some((cached_text, cached_properties, line)) = &self.slot
      && cached_text == text
      && cached_properties == properties
    {
      trace!(len = text.len(), "reusing prepared line");
      return line.clone();
    }
    let line = Arc::new(prepare());
    self.prepares += 1;
    self.slot = Some((text.to_string(), properties.clone(), line.clone()));
    line
  }
}

struct ColorMatch {
  offset:     usize,
  text:       String,
  capability: Arc<ColorGlyphCapability>,
  line:       Arc<PreparedLine>,
}

pub struct ColorFontElementGenerator {
  shaper:        Arc<dyn TextShaper>,
  cache:         Arc<FontShapeCache>,
  previous_line: PreparedLineCache,
}

impl ColorFontElementGenerator {
  /// Uses the process-wide font capability cache.
  pub fn new(shaper: Arc<dyn TextShaper>) -> Self {
    Self::with_cache(shaper, FontShapeCache::global())
  }

  pub fn with_cache(shaper: Arc<dyn TextShaper>, cache: Arc<FontShapeCache>) -> Self {
    Self {
      shaper,
      cache,
      previous_line: PreparedLineCache::default(),
    }
  }

  /// How many times a line had to be prepared rather than reused.
  pub fn prepared_lines(&self) -> usize {
    self.previous_line.prepares
  }

  fn find_color_glyph(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    start: usize,
  ) -> Option<ColorMatch> {
    let end = ctx.line().end;
    if start >= end {
      return None;
    }
    let properties = ctx.properties();
    let segment = ctx.text(start, end - start);
    let shaper = &self.shaper;
    let line = self
      .previous_line
      .get_or_prepare(segment.text, properties, || {
        shaper.prepare_line(segment.text, properties)
      });

    let (seg_start, seg_end) = (segment.offset, segment.end());
    let candidates = line.glyph_runs.iter().filter(|run| {
      (run.char_start >= seg_start && run.char_end() <= seg_end)
        || (run.char_start < seg_start && run.char_end() > seg_start)
    });
    for run in candidates {
      let Some(capability) = self.cache.capability_for(&run.font) else {
        continue;
      };
      // Runs straddling the segment start are matched from the segment start.
      let (offset, characters) = if run.char_start >= seg_start {
        (
          start + (run.char_start - seg_start),
          char_slice(segment.text, run.char_start, seg_end - run.char_start),
        )
      } else {
        (start, segment.as_str())
      };

      let joined = joiner::join(&**shaper, &capability, characters);
      if joined.is_empty() {
        trace!(offset, "color font planned no glyphs");
        continue;
      }
      return Some(ColorMatch {
        offset,
        text: joined.text.to_string(),
        capability,
        line: line.clone(),
      });
    }
    None
  }
}

impl ElementGenerator for ColorFontElementGenerator {
  fn first_interested_offset(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    start: usize,
  ) -> Option<usize> {
    self
      .find_color_glyph(ctx, start)
      .map(|found| found.offset)
  }

  fn construct_element(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    offset: usize,
  ) -> Option<Box<dyn VisualLineElement>> {
    let found = self
      .find_color_glyph(ctx, offset)
      .filter(|found| found.offset == offset)?;
    let plan = self.shaper.plan_glyphs(&found.capability, &found.text);
    Some(Box::new(ColorGlyphElement::new(
      found.text,
      &found.capability,
      plan,
      found.line,
      ctx.properties().clone(),
    )))
  }
}

impl fmt::Debug for ColorFontElementGenerator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ColorFontElementGenerator")
      .field("cache", &self.cache)
      .field("prepared_lines", &self.previous_line.prepares)
      .finish_non_exhaustive()
  }
}

/// A ligated color glyph cluster: one column, `source_text` chars.
///
/// The capability belongs to the font cache; the element only observes it.
#[derive(Debug, Clone)]
pub struct ColorGlyphElement {
  source_text:  Tendril,
  document_len: usize,
  capability:   Weak<ColorGlyphCapability>,
  font:         FontHandle,
  units_per_em: u16,
  plan:         Arc<GlyphPlan>,
  line:         Arc<PreparedLine>,
  properties:   TextRunProperties,
}

impl ColorGlyphElement {
  pub fn new(
    source_text: impl Into<Tendril>,
    capability: &Arc<ColorGlyphCapability>,
    plan: GlyphPlan,
    line: Arc<PreparedLine>,
    properties: TextRunProperties,
  ) -> Self {
    let source_text = source_text.into();
    Self {
      document_len: source_text.chars().count(),
      source_text,
      capability: Arc::downgrade(capability),
      font: capability.font().clone(),
      units_per_em: capability.units_per_em(),
      plan: Arc::new(plan),
      line,
      properties,
    }
  }

  pub fn source_text(&self) -> &str {
    &self.source_text
  }

  pub fn plan(&self) -> &GlyphPlan {
    &self.plan
  }

  pub fn prepared_line(&self) -> &Arc<PreparedLine> {
    &self.line
  }

  /// The capability, while the font cache still holds it.
  pub fn capability(&self) -> Option<Arc<ColorGlyphCapability>> {
    self.capability.upgrade()
  }
}

impl VisualLineElement for ColorGlyphElement {
  fn document_length(&self) -> usize {
    self.document_len
  }

  fn visual_length(&self) -> usize {
    1
  }

  fn properties(&self) -> &TextRunProperties {
    &self.properties
  }

  fn properties_mut(&mut self) -> &mut TextRunProperties {
    &mut self.properties
  }

  fn create_text_run(
    &self,
    _placement: Placement,
    _column: usize,
    _ctx: &mut ConstructionContext<'_>,
  ) -> TextRun {
    TextRun::Embedded(Arc::new(ColorGlyphRun {
      source_text:  self.source_text.clone(),
      capability:   self.capability.clone(),
      font:         self.font.clone(),
      units_per_em: self.units_per_em,
      plan:         self.plan.clone(),
      line:         self.line.clone(),
      properties:   self.properties.clone(),
    }))
  }
}

#[derive(Debug)]
pub struct ColorGlyphRun {
  source_text:  Tendril,
  capability:   Weak<ColorGlyphCapability>,
  font:         FontHandle,
  units_per_em: u16,
  plan:         Arc<GlyphPlan>,
  line:         Arc<PreparedLine>,
  properties:   TextRunProperties,
}

impl ColorGlyphRun {
  fn scale(&self) -> f32 {
    if self.units_per_em == 0 {
      return 0.0;
    }
    self.properties.font_size / f32::from(self.units_per_em)
  }

  pub fn width(&self) -> f32 {
    self.plan.total_advance() * self.scale()
  }
}

impl EmbeddedObject for ColorGlyphRun {
  fn len(&self) -> usize {
    1
  }

  fn measure(&self, _remaining_width: f32) -> RunMetrics {
    RunMetrics {
      width:    self.width(),
      height:   self.line.height,
      baseline: self.line.baseline,
    }
  }

  fn break_before(&self) -> LineBreakCondition {
    LineBreakCondition::BreakPossible
  }

  fn break_after(&self) -> LineBreakCondition {
    LineBreakCondition::BreakDesired
  }

  fn has_fixed_size(&self) -> bool {
    true
  }

  fn bounding_box(&self, _direction: FlowDirection) -> Rect {
    Rect::new(0.0, 0.0, self.width(), self.properties.font_size)
  }

  fn draw(&self, surface: &mut dyn DrawingSurface, origin: Point, direction: FlowDirection) {
    let font_size = self.properties.font_size;
    if self.plan.is_empty() || font_size <= 0.0 {
      return;
    }
    if self.capability.upgrade().is_none() {
      // The cache was cleared under us; the plan may not match the font
      // anymore.
      surface.draw_text(&self.source_text, origin, &self.properties);
      return;
    }

    let scale = self.scale();
    let mut x = match direction {
      FlowDirection::LeftToRight => origin.x,
      FlowDirection::RightToLeft => origin.x + self.width(),
    };
    for glyph in self.plan.glyphs() {
      let advance = glyph.advance * scale;
      if direction == FlowDirection::RightToLeft {
        x -= advance;
      }
      surface.draw_glyph(
        &self.font,
        glyph.glyph_id,
        Point::new(x + glyph.offset_x * scale, origin.y + glyph.offset_y * scale),
        font_size,
        self.properties.foreground,
      );
      if direction == FlowDirection::LeftToRight {
        x += advance;
      }
    }
  }
}
