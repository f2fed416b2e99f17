//! Visible line terminators as a generated element.

use the_shape::TextRunProperties;

use crate::{
  Tendril,
  context::ConstructionContext,
  element::{
    Placement,
    VisualLineElement,
  },
  generator::ElementGenerator,
  options::TextViewOptions,
  run::{
    EndOfLineRun,
    TextRun,
  },
};

/// Interested only in the line's end offset, and only when the options ask
/// for that kind of terminator to be shown.
#[derive(Debug, Default, Clone)]
pub struct EndOfLineGenerator {
  options: Option<TextViewOptions>,
}

impl EndOfLineGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  fn shows(&self, ctx: &ConstructionContext<'_>) -> bool {
    let options = self.options.as_ref().unwrap_or(ctx.options());
    options.shows_delimiter(&ctx.line())
  }
}

impl ElementGenerator for EndOfLineGenerator {
  fn fetch_options(&mut self, options: &TextViewOptions) {
    self.options = Some(options.clone());
  }

  fn first_interested_offset(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    start: usize,
  ) -> Option<usize> {
    let end = ctx.line().end;
    (start <= end && self.shows(ctx)).then_some(end)
  }

  fn construct_element(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    offset: usize,
  ) -> Option<Box<dyn VisualLineElement>> {
    if offset != ctx.line().end || !self.shows(ctx) {
      return None;
    }
    let options = self.options.as_ref().unwrap_or(ctx.options());
    let text = options.delimiter_text(ctx.delimiter());
    Some(Box::new(EndOfLineElement::new(
      text,
      ctx.properties().clone(),
    )))
  }
}

/// One column wide, consumes no document text.
#[derive(Debug, Clone, PartialEq)]
pub struct EndOfLineElement {
  text:       Tendril,
  properties: TextRunProperties,
}

impl EndOfLineElement {
  pub fn new(text: impl Into<Tendril>, properties: TextRunProperties) -> Self {
    Self {
      text: text.into(),
      properties,
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }
}

impl VisualLineElement for EndOfLineElement {
  fn document_length(&self) -> usize {
    0
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
    ctx: &mut ConstructionContext<'_>,
  ) -> TextRun {
    let metrics = ctx.marker_metrics(&self.text, &self.properties);
    TextRun::EndOfLine(EndOfLineRun::new(
      self.text.clone(),
      self.properties.clone(),
      metrics,
    ))
  }

  fn is_end_of_line(&self) -> bool {
    true
  }
}
