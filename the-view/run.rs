//! Runs handed to the layout consumer, and the drawing seam embedded runs
//! render through.

use std::{
  fmt,
  sync::Arc,
};

use the_shape::{
  Color,
  FontHandle,
  TextRunProperties,
};

use crate::Tendril;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f32,
  pub y: f32,
}

impl Point {
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
  #[default]
  LeftToRight,
  RightToLeft,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunMetrics {
  pub width:    f32,
  pub height:   f32,
  pub baseline: f32,
}

/// The drawing backend. The core computes geometry; pixels are the
/// surface's business.
pub trait DrawingSurface {
  fn draw_glyph(
    &mut self,
    font: &FontHandle,
    glyph_id: u16,
    origin: Point,
    font_size: f32,
    color: Color,
  );

  fn draw_text(&mut self, text: &str, origin: Point, properties: &TextRunProperties);
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
  pub x:      f32,
  pub y:      f32,
  pub width:  f32,
  pub height: f32,
}

impl Rect {
  pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }
}

/// Whether a line may be broken next to a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineBreakCondition {
  BreakDesired,
  #[default]
  BreakPossible,
  BreakRestrained,
  BreakAlways,
}

/// A run the layout consumer cannot format itself: it asks the object for
/// its metrics and lets it draw.
pub trait EmbeddedObject: fmt::Debug {
  /// Visual columns the object occupies.
  fn len(&self) -> usize;

  fn measure(&self, remaining_width: f32) -> RunMetrics;

  fn draw(&self, surface: &mut dyn DrawingSurface, origin: Point, direction: FlowDirection);

  fn break_before(&self) -> LineBreakCondition {
    LineBreakCondition::BreakPossible
  }

  fn break_after(&self) -> LineBreakCondition {
    LineBreakCondition::BreakPossible
  }

  /// Whether the metrics are independent of the remaining width.
  fn has_fixed_size(&self) -> bool {
    false
  }

  /// Ink bounds relative to the run origin.
  fn bounding_box(&self, _direction: FlowDirection) -> Rect {
    let metrics = self.measure(f32::INFINITY);
    Rect::new(0.0, 0.0, metrics.width, metrics.height)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRun {
  pub text:       Tendril,
  pub properties: TextRunProperties,
}

/// A visible line terminator marker. It never takes horizontal space.
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfLineRun {
  pub text:       Tendril,
  pub properties: TextRunProperties,
  metrics:        RunMetrics,
}

impl EndOfLineRun {
  /// `metrics` are those of the prepared marker text; the width is dropped.
  pub fn new(text: impl Into<Tendril>, properties: TextRunProperties, metrics: RunMetrics) -> Self {
    Self {
      text: text.into(),
      properties,
      metrics: RunMetrics {
        width: 0.0,
        ..metrics
      },
    }
  }

  pub fn measure(&self, _remaining_width: f32) -> RunMetrics {
    self.metrics
  }
}

#[derive(Debug, Clone)]
pub enum TextRun {
  Characters(CharacterRun),
  Embedded(Arc<dyn EmbeddedObject>),
  EndOfLine(EndOfLineRun),
  EndOfParagraph { length: usize },
}

impl TextRun {
  /// Visual columns covered by the run.
  pub fn len(&self) -> usize {
    match self {
      TextRun::Characters(run) => run.text.chars().count(),
      TextRun::Embedded(object) => object.len(),
      TextRun::EndOfLine(_) => 1,
      TextRun::EndOfParagraph { length } => *length,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn text(&self) -> Option<&str> {
    match self {
      TextRun::Characters(run) => Some(run.text.as_str()),
      TextRun::EndOfLine(run) => Some(run.text.as_str()),
      TextRun::Embedded(_) | TextRun::EndOfParagraph { .. } => None,
    }
  }
}

/// Text preceding a column, for the consumer's line breaking and shaping
/// context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSpan {
  pub text: Tendril,
}

impl TextSpan {
  pub fn new(text: impl Into<Tendril>) -> Self {
    Self { text: text.into() }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.text.chars().count()
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }
}
