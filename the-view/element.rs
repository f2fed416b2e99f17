//! The element model.
//!
//! An element consumes `document_length` chars of the line and occupies
//! `visual_length` columns; the two differ when a generator collapses
//! several chars into one unit. Where an element sits is decided by the
//! [`VisualLine`](crate::VisualLine) that holds it and is passed back in as a
//! [`Placement`] whenever the element is asked for runs.

use std::fmt;

use the_shape::TextRunProperties;

use crate::{
  Tendril,
  context::ConstructionContext,
  run::{
    CharacterRun,
    TextRun,
    TextSpan,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
  pub visual_column:   usize,
  /// Absolute document offset of the element's first char.
  pub document_offset: usize,
}

pub trait VisualLineElement: fmt::Debug {
  fn document_length(&self) -> usize;

  fn visual_length(&self) -> usize;

  fn properties(&self) -> &TextRunProperties;

  fn properties_mut(&mut self) -> &mut TextRunProperties;

  /// Creates the run starting `column` columns into the element. The run
  /// must be non-empty and must not extend past the element.
  fn create_text_run(
    &self,
    placement: Placement,
    column: usize,
    ctx: &mut ConstructionContext<'_>,
  ) -> TextRun;

  /// Text before `column` within the element, at most `column` chars long.
  fn preceding_text(
    &self,
    _placement: Placement,
    _column: usize,
    _ctx: &mut ConstructionContext<'_>,
  ) -> Option<TextSpan> {
    None
  }

  /// Column, relative to the element, of a char offset relative to the
  /// element. Offsets inside a collapsed element snap to its start.
  fn visual_column_for_relative_offset(&self, relative_offset: usize) -> usize {
    if relative_offset >= self.document_length() && self.document_length() > 0 {
      self.visual_length()
    } else {
      0
    }
  }

  /// Inverse of [`Self::visual_column_for_relative_offset`].
  fn relative_offset_for_visual_column(&self, column: usize) -> usize {
    if column >= self.visual_length() {
      self.document_length()
    } else {
      0
    }
  }

  /// Splits the element at `relative_offset`, keeping the head and returning
  /// the tail. Elements that are one visual unit cannot be split.
  fn split(&mut self, _relative_offset: usize) -> Option<Box<dyn VisualLineElement>> {
    None
  }

  /// Marks the element as the rendering of the line's terminator.
  fn is_end_of_line(&self) -> bool {
    false
  }

  fn type_name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }
}

/// Plain document text: one column per char.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
  length:     usize,
  properties: TextRunProperties,
}

impl TextElement {
  pub fn new(length: usize, properties: TextRunProperties) -> Self {
    Self { length, properties }
  }
}

impl VisualLineElement for TextElement {
  fn document_length(&self) -> usize {
    self.length
  }

  fn visual_length(&self) -> usize {
    self.length
  }

  fn properties(&self) -> &TextRunProperties {
    &self.properties
  }

  fn properties_mut(&mut self) -> &mut TextRunProperties {
    &mut self.properties
  }

  fn create_text_run(
    &self,
    placement: Placement,
    column: usize,
    ctx: &mut ConstructionContext<'_>,
  ) -> TextRun {
    let column = column.min(self.length);
    let segment = ctx.text(placement.document_offset + column, self.length - column);
    TextRun::Characters(CharacterRun {
      text:       Tendril::from(segment.as_str()),
      properties: self.properties.clone(),
    })
  }

  fn preceding_text(
    &self,
    placement: Placement,
    column: usize,
    ctx: &mut ConstructionContext<'_>,
  ) -> Option<TextSpan> {
    let column = column.min(self.length);
    let segment = ctx.text(placement.document_offset, column);
    Some(TextSpan::new(segment.as_str()))
  }

  fn visual_column_for_relative_offset(&self, relative_offset: usize) -> usize {
    relative_offset.min(self.length)
  }

  fn relative_offset_for_visual_column(&self, column: usize) -> usize {
    column.min(self.length)
  }

  fn split(&mut self, relative_offset: usize) -> Option<Box<dyn VisualLineElement>> {
    if relative_offset == 0 || relative_offset >= self.length {
      return None;
    }
    let tail = TextElement::new(self.length - relative_offset, self.properties.clone());
    self.length = relative_offset;
    Some(Box::new(tail))
  }
}
