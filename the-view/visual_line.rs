//! Building a [`VisualLine`] out of generator output and plain text.
//!
//! The build walks the line with a cursor. At each step every generator is
//! asked for its next interesting offset; the smallest one is the cut point
//! and the text up to it becomes plain text. Generators interested exactly
//! at the cursor are then offered the slot in registration order. The first
//! element that consumes text wins and moves the cursor past it; elements
//! that consume nothing are kept and the remaining generators still get
//! their turn. If nothing consumed text, the next scan starts one past the
//! cursor so no generator is offered the same offset twice.

use std::sync::Arc;

use the_shape::{
  TextRunProperties,
  TextShaper,
};
use tracing::error;

use crate::{
  context::ConstructionContext,
  document::{
    DocumentLine,
    TextDocument,
  },
  element::{
    Placement,
    TextElement,
    VisualLineElement,
  },
  error::{
    LayoutError,
    Result,
  },
  generator::ElementGenerator,
  highlight::StyledRange,
  marker::MarkerCache,
  options::TextViewOptions,
  text_source::VisualLineTextSource,
};

/// An element together with where the line placed it.
#[derive(Debug)]
pub struct PlacedElement {
  visual_column:   usize,
  relative_offset: usize,
  element:         Box<dyn VisualLineElement>,
}

impl PlacedElement {
  pub fn visual_column(&self) -> usize {
    self.visual_column
  }

  /// Char offset of the element's start, relative to the line start.
  pub fn relative_offset(&self) -> usize {
    self.relative_offset
  }

  pub fn visual_length(&self) -> usize {
    self.element.visual_length()
  }

  pub fn document_length(&self) -> usize {
    self.element.document_length()
  }

  pub fn visual_end(&self) -> usize {
    self.visual_column + self.element.visual_length()
  }

  pub fn element(&self) -> &dyn VisualLineElement {
    &*self.element
  }

  pub fn contains_column(&self, column: usize) -> bool {
    self.visual_column <= column && column < self.visual_end()
  }
}

/// The rendered form of one document line. Immutable once built; rebuild it
/// when the line changes.
#[derive(Debug)]
pub struct VisualLine {
  line:          DocumentLine,
  elements:      Vec<PlacedElement>,
  visual_length: usize,
}

impl VisualLine {
  /// Builds `line` without highlighting.
  pub fn build(
    document: &dyn TextDocument,
    line: DocumentLine,
    generators: &mut [Box<dyn ElementGenerator>],
    options: &TextViewOptions,
    properties: &TextRunProperties,
    markers: &MarkerCache,
  ) -> Result<VisualLine> {
    build_line(document, line, generators, options, properties, markers, &[])
  }

  pub fn document_line(&self) -> DocumentLine {
    self.line
  }

  pub fn start_offset(&self) -> usize {
    self.line.start
  }

  pub fn end_offset(&self) -> usize {
    self.line.end
  }

  pub fn elements(&self) -> &[PlacedElement] {
    &self.elements
  }

  pub fn visual_length(&self) -> usize {
    self.visual_length
  }

  pub fn element_at_visual_column(&self, column: usize) -> Option<&PlacedElement> {
    self
      .elements
      .iter()
      .find(|placed| placed.contains_column(column))
  }

  /// Whether the last element renders the line terminator.
  pub fn ends_with_end_of_line(&self) -> bool {
    self
      .elements
      .last()
      .is_some_and(|placed| placed.element.is_end_of_line())
  }

  /// Visual column of a document offset. Offsets outside the line are
  /// clamped to it; offsets inside a collapsed element map to its start.
  pub fn visual_column_for_offset(&self, offset: usize) -> usize {
    let relative = offset.clamp(self.line.start, self.line.end) - self.line.start;
    self
      .elements
      .iter()
      .find(|placed| {
        placed.relative_offset <= relative
          && relative <= placed.relative_offset + placed.document_length()
      })
      .map_or(self.visual_length, |placed| {
        placed.visual_column
          + placed
            .element
            .visual_column_for_relative_offset(relative - placed.relative_offset)
      })
  }

  /// Document offset of a visual column. Columns past the end map to the
  /// line end.
  pub fn offset_for_visual_column(&self, column: usize) -> usize {
    self
      .element_at_visual_column(column)
      .map_or(self.line.end, |placed| {
        self.line.start
          + placed.relative_offset
          + placed
            .element
            .relative_offset_for_visual_column(column - placed.visual_column)
      })
  }

  pub fn text_source<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    options: &'a TextViewOptions,
    properties: &'a TextRunProperties,
    markers: &'a MarkerCache,
  ) -> VisualLineTextSource<'a> {
    VisualLineTextSource::new(self, document, options, properties, markers)
  }

  fn placement(&self, placed: &PlacedElement) -> Placement {
    Placement {
      visual_column:   placed.visual_column,
      document_offset: self.line.start + placed.relative_offset,
    }
  }

  pub(crate) fn placement_of(&self, index: usize) -> Placement {
    self.placement(&self.elements[index])
  }

  fn split_at(&mut self, offset: usize) {
    let Some(offset) = offset.checked_sub(self.line.start) else {
      return;
    };
    let Some(idx) = self.elements.iter().position(|placed| {
      placed.relative_offset < offset && offset < placed.relative_offset + placed.document_length()
    }) else {
      return;
    };
    let placed = &mut self.elements[idx];
    let relative = offset - placed.relative_offset;
    if let Some(tail) = placed.element.split(relative) {
      let tail = PlacedElement {
        visual_column:   placed.visual_end(),
        relative_offset: offset,
        element:         tail,
      };
      self.elements.insert(idx + 1, tail);
    }
  }

  fn apply_highlight(&mut self, range: &StyledRange) {
    if range.is_empty() {
      return;
    }
    self.split_at(range.start);
    self.split_at(range.end);
    let start = self.line.start;
    for placed in &mut self.elements {
      let element_start = start + placed.relative_offset;
      let element_end = element_start + placed.element.document_length();
      if range.overlaps(element_start, element_end) {
        range.style.apply(placed.element.properties_mut());
      }
    }
  }
}

/// Owns the generator list and formatting used for every line of a view.
pub struct VisualLineBuilder {
  generators: Vec<Box<dyn ElementGenerator>>,
  options:    TextViewOptions,
  properties: TextRunProperties,
  markers:    Arc<MarkerCache>,
}

impl VisualLineBuilder {
  /// `shaper` formats the terminator markers.
  pub fn new(
    options: TextViewOptions,
    properties: TextRunProperties,
    shaper: Arc<dyn TextShaper>,
  ) -> Self {
    Self::with_markers(options, properties, Arc::new(MarkerCache::new(shaper)))
  }

  /// Shares an existing marker cache, for several views on one document.
  pub fn with_markers(
    options: TextViewOptions,
    properties: TextRunProperties,
    markers: Arc<MarkerCache>,
  ) -> Self {
    Self {
      generators: Vec::new(),
      options,
      properties,
      markers,
    }
  }

  /// Registers a generator after all previously registered ones; earlier
  /// generators win ties.
  pub fn with_generator(mut self, generator: impl ElementGenerator + 'static) -> Self {
    self.push_generator(Box::new(generator));
    self
  }

  pub fn push_generator(&mut self, generator: Box<dyn ElementGenerator>) {
    self.generators.push(generator);
  }

  pub fn generators(&self) -> &[Box<dyn ElementGenerator>] {
    &self.generators
  }

  pub fn options(&self) -> &TextViewOptions {
    &self.options
  }

  pub fn set_options(&mut self, options: TextViewOptions) {
    self.options = options;
  }

  pub fn properties(&self) -> &TextRunProperties {
    &self.properties
  }

  pub fn set_properties(&mut self, properties: TextRunProperties) {
    self.properties = properties;
  }

  pub fn markers(&self) -> &Arc<MarkerCache> {
    &self.markers
  }

  /// A text source for `line` using this builder's options and formatting.
  pub fn text_source<'a>(
    &'a self,
    line: &'a VisualLine,
    document: &'a dyn TextDocument,
  ) -> VisualLineTextSource<'a> {
    line.text_source(document, &self.options, &self.properties, &self.markers)
  }

  pub fn build(&mut self, document: &dyn TextDocument, line: DocumentLine) -> Result<VisualLine> {
    self.build_highlighted(document, line, &[])
  }

  /// Builds `line` and styles it with `highlights`, which must be sorted and
  /// non-overlapping.
  pub fn build_highlighted(
    &mut self,
    document: &dyn TextDocument,
    line: DocumentLine,
    highlights: &[StyledRange],
  ) -> Result<VisualLine> {
    build_line(
      document,
      line,
      &mut self.generators,
      &self.options,
      &self.properties,
      &self.markers,
      highlights,
    )
  }
}

impl std::fmt::Debug for VisualLineBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let names: Vec<_> = self.generators.iter().map(|generator| generator.name()).collect();
    f.debug_struct("VisualLineBuilder")
      .field("generators", &names)
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

struct ElementList {
  line_start:    usize,
  elements:      Vec<PlacedElement>,
  visual_length: usize,
  pending_start: usize,
  pending_len:   usize,
}

impl ElementList {
  fn new(line_start: usize) -> Self {
    Self {
      line_start,
      elements: Vec::new(),
      visual_length: 0,
      pending_start: line_start,
      pending_len: 0,
    }
  }

  /// Plain text is accumulated so a declined offset does not split it.
  fn push_text(&mut self, start: usize, len: usize) {
    if len == 0 {
      return;
    }
    if self.pending_len == 0 {
      self.pending_start = start;
    }
    self.pending_len += len;
  }

  fn flush_text(&mut self, properties: &TextRunProperties) {
    if self.pending_len == 0 {
      return;
    }
    let element = TextElement::new(self.pending_len, properties.clone());
    self.place(self.pending_start, Box::new(element));
    self.pending_len = 0;
  }

  fn place(&mut self, offset: usize, element: Box<dyn VisualLineElement>) {
    let visual_column = self.visual_length;
    self.visual_length += element.visual_length();
    self.elements.push(PlacedElement {
      visual_column,
      relative_offset: offset - self.line_start,
      element,
    });
  }
}

fn build_line(
  document: &dyn TextDocument,
  line: DocumentLine,
  generators: &mut [Box<dyn ElementGenerator>],
  options: &TextViewOptions,
  properties: &TextRunProperties,
  markers: &MarkerCache,
  highlights: &[StyledRange],
) -> Result<VisualLine> {
  let mut ctx = ConstructionContext::new(document, line, options, properties, markers);
  for generator in generators.iter_mut() {
    generator.fetch_options(options);
  }

  let end = line.end;
  let mut list = ElementList::new(line.start);
  let mut interests: Vec<Option<usize>> = vec![None; generators.len()];
  let mut offset = line.start;
  let mut ask = 0;

  while offset + ask <= end {
    let start = offset + ask;
    let mut cut = end;
    for (generator, interest) in generators.iter_mut().zip(interests.iter_mut()) {
      *interest = generator.first_interested_offset(&mut ctx, start);
      if let Some(reported) = *interest {
        if reported < start {
          let err = LayoutError::InterestBeforeStart {
            generator: generator.name(),
            start,
            reported,
          };
          error!(%err, "generator broke the scan contract");
          return Err(err);
        }
        cut = cut.min(reported);
      }
    }

    list.push_text(offset, cut - offset);
    offset = cut;

    ask = 1;
    for (generator, interest) in generators.iter_mut().zip(interests.iter()) {
      if *interest != Some(offset) {
        continue;
      }
      let Some(element) = generator.construct_element(&mut ctx, offset) else {
        continue;
      };
      check_element(&**generator, &*element, offset, end)?;

      let consumed = element.document_length();
      list.flush_text(properties);
      list.place(offset, element);
      if consumed > 0 {
        offset += consumed;
        ask = 0;
        break;
      }
    }
  }
  list.flush_text(properties);

  let mut visual_line = VisualLine {
    line,
    elements: list.elements,
    visual_length: list.visual_length,
  };
  for range in highlights {
    visual_line.apply_highlight(range);
  }
  Ok(visual_line)
}

fn check_element(
  generator: &dyn ElementGenerator,
  element: &dyn VisualLineElement,
  offset: usize,
  line_end: usize,
) -> Result<()> {
  let err = if element.visual_length() == 0 {
    LayoutError::ZeroVisualLength {
      generator: generator.name(),
      element: element.type_name(),
      offset,
    }
  } else if offset + element.document_length() > line_end {
    LayoutError::PastLineEnd {
      generator: generator.name(),
      element: element.type_name(),
      offset,
      end: offset + element.document_length(),
      line_end,
    }
  } else {
    return Ok(());
  };
  error!(%err, "generator broke the element contract");
  Err(err)
}
