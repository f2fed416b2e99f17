//! Visual line construction and text run synthesis.
//!
//! A [`VisualLine`] is built for one document line by running an ordered list
//! of [`ElementGenerator`]s over it; plain text fills the gaps between the
//! elements they produce. A [`VisualLineTextSource`] then hands the line to a
//! layout consumer one [`TextRun`] at a time.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod color_font;
pub mod context;
pub mod document;
pub mod element;
pub mod end_of_line;
pub mod error;
pub mod generator;
pub mod highlight;
pub mod marker;
pub mod options;
pub mod run;
pub mod text_cache;
pub mod text_source;
pub mod visual_line;

#[cfg(test)]
pub(crate) mod test_support;

pub type Tendril = SmartString<LazyCompact>;

pub use color_font::{
  ColorFontElementGenerator,
  ColorGlyphElement,
  ColorGlyphRun,
};
pub use context::ConstructionContext;
pub use document::{
  DocumentLine,
  RopeDocument,
  TextDocument,
};
pub use element::{
  Placement,
  TextElement,
  VisualLineElement,
};
pub use end_of_line::{
  EndOfLineElement,
  EndOfLineGenerator,
};
pub use error::{
  LayoutError,
  OptionsError,
  Result,
};
pub use generator::ElementGenerator;
pub use highlight::{
  StyledRange,
  TextStyle,
};
pub use marker::MarkerCache;
pub use options::TextViewOptions;
pub use run::{
  CharacterRun,
  DrawingSurface,
  EmbeddedObject,
  EndOfLineRun,
  FlowDirection,
  LineBreakCondition,
  Point,
  Rect,
  RunMetrics,
  TextRun,
  TextSpan,
};
pub use text_cache::{
  TextFetchCache,
  TextSegment,
};
pub use text_source::VisualLineTextSource;
pub use visual_line::{
  PlacedElement,
  VisualLine,
  VisualLineBuilder,
};
