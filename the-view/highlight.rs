//! Highlighter output applied on top of generated elements.

use the_shape::{
  Color,
  TextRunProperties,
};

/// Attribute overrides; `None` keeps the line's value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TextStyle {
  pub foreground: Option<Color>,
  pub bold:       Option<bool>,
  pub italic:     Option<bool>,
}

impl TextStyle {
  pub fn fg(color: Color) -> Self {
    Self {
      foreground: Some(color),
      ..Self::default()
    }
  }

  pub fn apply(&self, properties: &mut TextRunProperties) {
    if let Some(foreground) = self.foreground {
      properties.foreground = foreground;
    }
    if let Some(bold) = self.bold {
      properties.bold = bold;
    }
    if let Some(italic) = self.italic {
      properties.italic = italic;
    }
  }
}

/// A styled `[start, end)` char range, in absolute document offsets.
///
/// Ranges passed to a build are sorted and do not overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledRange {
  pub start: usize,
  pub end:   usize,
  pub style: TextStyle,
}

impl StyledRange {
  pub fn new(start: usize, end: usize, style: TextStyle) -> Self {
    Self { start, end, style }
  }

  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  pub fn overlaps(&self, start: usize, end: usize) -> bool {
    self.start < end && start < self.end
  }
}
