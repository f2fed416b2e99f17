//! Font capability inspection and the shaping collaborator seam.
//!
//! The view layer never touches font files directly. It asks a
//! [`TextShaper`] to prepare lines and plan glyphs, and asks the shared
//! [`FontShapeCache`] whether a physical font carries color glyphs at all.
//! [`joiner`] decides how much text one color glyph unit consumes.

pub mod fallback;
pub mod font;
pub mod font_cache;
pub mod joiner;
pub mod shaper;

pub use fallback::FallbackShaper;
pub use font::{
  FontHandle,
  FontId,
  FontSource,
  FontStream,
};
pub use font_cache::{
  ColorGlyphCapability,
  FontInspector,
  FontShapeCache,
  InspectError,
  OpenTypeInspector,
};
pub use joiner::{
  LigatedRun,
  longest_ligated_run,
};
pub use shaper::{
  Color,
  GlyphPlan,
  IndexedGlyphRun,
  PlannedGlyph,
  PreparedLine,
  TextRunProperties,
  TextShaper,
};
