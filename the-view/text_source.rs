//! Feeds a built [`VisualLine`] to a layout consumer one run at a time.

use the_shape::TextRunProperties;
use tracing::error;

use crate::{
  Tendril,
  context::ConstructionContext,
  document::TextDocument,
  error::{
    LayoutError,
    Result,
  },
  marker::MarkerCache,
  options::TextViewOptions,
  run::{
    EndOfLineRun,
    TextRun,
    TextSpan,
  },
  visual_line::VisualLine,
};

pub struct VisualLineTextSource<'a> {
  line: &'a VisualLine,
  ctx:  ConstructionContext<'a>,
}

impl<'a> VisualLineTextSource<'a> {
  pub fn new(
    line: &'a VisualLine,
    document: &'a dyn TextDocument,
    options: &'a TextViewOptions,
    properties: &'a TextRunProperties,
    markers: &'a MarkerCache,
  ) -> Self {
    Self {
      line,
      ctx: ConstructionContext::new(document, line.document_line(), options, properties, markers),
    }
  }

  pub fn visual_line(&self) -> &'a VisualLine {
    self.line
  }

  pub fn context(&self) -> &ConstructionContext<'a> {
    &self.ctx
  }

  /// The run starting at visual column `index`.
  ///
  /// Asking for one past the last column is routine: it yields the terminator
  /// marker when the options show one, otherwise an end-of-paragraph run.
  pub fn run_at(&mut self, index: usize) -> Result<TextRun> {
    let found = self
      .line
      .elements()
      .iter()
      .position(|placed| placed.contains_column(index));
    if let Some(idx) = found {
      let placed = &self.line.elements()[idx];
      let element = placed.element();
      let column = index - placed.visual_column();
      let run = element.create_text_run(self.line.placement_of(idx), column, &mut self.ctx);

      let err = if run.is_empty() {
        LayoutError::EmptyRun {
          element: element.type_name(),
          column:  index,
        }
      } else if column + run.len() > element.visual_length() {
        LayoutError::RunTooLong {
          element:         element.type_name(),
          relative_column: column,
          run_length:      run.len(),
          visual_length:   element.visual_length(),
        }
      } else {
        return Ok(run);
      };
      error!(%err, "element broke the run contract");
      return Err(err);
    }

    let document_line = self.line.document_line();
    if index == self.line.visual_length()
      && self.ctx.options().shows_delimiter(&document_line)
      && !self.line.ends_with_end_of_line()
    {
      return Ok(self.end_of_line_run());
    }
    Ok(TextRun::EndOfParagraph { length: 1 })
  }

  fn end_of_line_run(&self) -> TextRun {
    let options = self.ctx.options();
    let properties = self.ctx.properties();
    let text = options.delimiter_text(self.ctx.delimiter());
    TextRun::EndOfLine(EndOfLineRun::new(
      Tendril::from(text),
      properties.clone(),
      self.ctx.marker_metrics(text, properties),
    ))
  }

  /// Text of the element ending at or containing `limit`, up to `limit`.
  pub fn preceding_text(&mut self, limit: usize) -> Result<TextSpan> {
    let found = self.line.elements().iter().position(|placed| {
      placed.visual_column() < limit && limit <= placed.visual_end()
    });
    let Some(idx) = found else {
      return Ok(TextSpan::empty());
    };

    let placed = &self.line.elements()[idx];
    let element = placed.element();
    let column = limit - placed.visual_column();
    let Some(span) = element.preceding_text(self.line.placement_of(idx), column, &mut self.ctx)
    else {
      return Ok(TextSpan::empty());
    };
    if span.len() > column {
      let err = LayoutError::PrecedingTextTooLong {
        element:         element.type_name(),
        relative_column: column,
        span_length:     span.len(),
      };
      error!(%err, "element broke the preceding text contract");
      return Err(err);
    }
    Ok(span)
  }

  /// Every run of the line in column order, ending with the terminal run.
  pub fn runs(&mut self) -> Result<Vec<TextRun>> {
    let mut runs = Vec::new();
    let mut index = 0;
    while index < self.line.visual_length() {
      let run = self.run_at(index)?;
      index += run.len();
      runs.push(run);
    }
    runs.push(self.run_at(index)?);
    Ok(runs)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::{
    color_font::ColorFontElementGenerator,
    document::RopeDocument,
    element::{
      Placement,
      VisualLineElement,
    },
    end_of_line::EndOfLineGenerator,
    generator::ElementGenerator,
    run::CharacterRun,
    test_support::{
      ClusterShaper,
      color_cache,
      marker_cache,
    },
    visual_line::VisualLineBuilder,
  };

  fn show_all() -> TextViewOptions {
    TextViewOptions {
      show_end_of_line: true,
      show_end_of_file: true,
      ..TextViewOptions::default()
    }
  }

  fn terminal_run(text: &str, line_number: usize, options: TextViewOptions) -> TextRun {
    let doc = RopeDocument::from(text);
    let props = TextRunProperties::default();
    let mut builder = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    );
    let line = builder.build(&doc, doc.line(line_number)).unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);
    source.run_at(line.visual_length()).unwrap()
  }

  fn marker(run: &TextRun) -> Option<&str> {
    match run {
      TextRun::EndOfLine(run) => Some(run.text.as_str()),
      _ => None,
    }
  }

  #[test]
  fn terminal_run_reflects_the_actual_delimiter() {
    assert_eq!(marker(&terminal_run("ab\r\ncd", 0, show_all())), Some("¶"));
    assert_eq!(marker(&terminal_run("ab\ncd", 0, show_all())), Some("\\n"));
    assert_eq!(marker(&terminal_run("ab\rcd", 0, show_all())), Some("\\r"));
    assert_eq!(marker(&terminal_run("ab\u{2028}cd", 0, show_all())), Some("?"));
    assert_eq!(marker(&terminal_run("ab\ncd", 1, show_all())), Some("¤"));
  }

  #[test]
  fn hidden_delimiters_end_the_paragraph() {
    let run = terminal_run("ab\ncd", 0, TextViewOptions::default());
    assert!(matches!(run, TextRun::EndOfParagraph { length: 1 }));

    let only_eof = TextViewOptions {
      show_end_of_file: true,
      ..TextViewOptions::default()
    };
    let run = terminal_run("ab\ncd", 0, only_eof);
    assert!(matches!(run, TextRun::EndOfParagraph { length: 1 }));
  }

  #[test]
  fn asking_far_past_the_end_is_not_an_error() {
    let doc = RopeDocument::from("ab\n");
    let options = show_all();
    let props = TextRunProperties::default();
    let mut builder = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    );
    let line = builder.build(&doc, doc.line(0)).unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);
    assert!(matches!(
      source.run_at(10).unwrap(),
      TextRun::EndOfParagraph { length: 1 }
    ));
  }

  #[test]
  fn synthesized_markers_take_the_prepared_metrics() {
    let doc = RopeDocument::from("ab\ncd\nef");
    let props = TextRunProperties {
      font_size: 14.0,
      ..TextRunProperties::default()
    };
    let shaper = Arc::new(ClusterShaper::default());
    let mut builder = VisualLineBuilder::new(show_all(), props, shaper.clone());
    let lines = [
      builder.build(&doc, doc.line(0)).unwrap(),
      builder.build(&doc, doc.line(1)).unwrap(),
    ];

    for line in &lines {
      let mut source = builder.text_source(line, &doc);
      let TextRun::EndOfLine(run) = source.run_at(line.visual_length()).unwrap() else {
        panic!("shown delimiters end with a marker run");
      };
      let metrics = run.measure(f32::INFINITY);
      assert_eq!(metrics.width, 0.0);
      assert_eq!(metrics.height, ClusterShaper::line_height(14.0));
      assert_eq!(metrics.baseline, 14.0);
    }
    // Both lines end in "\n": one preparation serves them.
    assert_eq!(builder.markers().prepares(), 1);
    assert_eq!(shaper.prepare_calls(), 1);
  }

  #[test]
  fn builders_can_share_one_marker_cache() {
    let doc = RopeDocument::from("ab\ncd");
    let markers = marker_cache();
    let props = TextRunProperties::default();
    let mut first = VisualLineBuilder::with_markers(show_all(), props.clone(), markers.clone());
    let mut second = VisualLineBuilder::with_markers(show_all(), props, markers.clone());

    for builder in [&mut first, &mut second] {
      let line = builder.build(&doc, doc.line(0)).unwrap();
      let run = builder.text_source(&line, &doc).run_at(line.visual_length()).unwrap();
      assert_eq!(marker(&run), Some("\\n"));
    }
    assert_eq!(markers.prepares(), 1);
  }

  #[test]
  fn generated_end_of_line_is_not_synthesized_twice() {
    let doc = RopeDocument::from("ab\ncd");
    let options = show_all();
    let props = TextRunProperties::default();
    let mut builder = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    )
    .with_generator(EndOfLineGenerator::new());
    let line = builder.build(&doc, doc.line(0)).unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    let runs = source.runs().unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].text(), Some("ab"));
    assert_eq!(marker(&runs[1]), Some("\\n"));
    assert!(matches!(runs[2], TextRun::EndOfParagraph { length: 1 }));
  }

  #[test]
  fn runs_walk_the_elements_in_column_order() {
    let doc = RopeDocument::from("ab😀cd");
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let shaper = Arc::new(ClusterShaper::default());
    let mut builder = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    )
    .with_generator(ColorFontElementGenerator::with_cache(shaper, Arc::new(color_cache())));
    let line = builder.build(&doc, doc.line(0)).unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    let runs = source.runs().unwrap();
    assert_eq!(runs.len(), 4);
    assert_eq!(runs[0].text(), Some("ab"));
    assert!(matches!(runs[1], TextRun::Embedded(_)));
    assert_eq!(runs[2].text(), Some("cd"));
    assert!(matches!(runs[3], TextRun::EndOfParagraph { .. }));

    // Mid-element requests start inside the element.
    assert_eq!(source.run_at(1).unwrap().text(), Some("b"));
  }

  #[test]
  fn preceding_text_stops_at_the_limit() {
    let doc = RopeDocument::from("ab😀cd");
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let shaper = Arc::new(ClusterShaper::default());
    let mut builder = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    )
    .with_generator(ColorFontElementGenerator::with_cache(shaper, Arc::new(color_cache())));
    let line = builder.build(&doc, doc.line(0)).unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    assert_eq!(source.preceding_text(2).unwrap().text.as_str(), "ab");
    assert_eq!(source.preceding_text(1).unwrap().text.as_str(), "a");
    assert_eq!(source.preceding_text(4).unwrap().text.as_str(), "c");
    // The color unit has no text of its own to offer.
    assert!(source.preceding_text(3).unwrap().is_empty());
    assert!(source.preceding_text(0).unwrap().is_empty());
  }

  /// Reports a two-column element but hands out runs of a fixed length.
  #[derive(Debug)]
  struct Misbehaving {
    run_length:    usize,
    preceding_len: usize,
    properties:    TextRunProperties,
  }

  impl VisualLineElement for Misbehaving {
    fn document_length(&self) -> usize {
      2
    }

    fn visual_length(&self) -> usize {
      2
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
      TextRun::Characters(CharacterRun {
        text:       "x".repeat(self.run_length).as_str().into(),
        properties: self.properties.clone(),
      })
    }

    fn preceding_text(
      &self,
      _placement: Placement,
      _column: usize,
      _ctx: &mut ConstructionContext<'_>,
    ) -> Option<TextSpan> {
      Some(TextSpan::new("y".repeat(self.preceding_len).as_str()))
    }
  }

  struct MisbehavingGenerator {
    run_length:    usize,
    preceding_len: usize,
  }

  impl ElementGenerator for MisbehavingGenerator {
    fn first_interested_offset(
      &mut self,
      _ctx: &mut ConstructionContext<'_>,
      start: usize,
    ) -> Option<usize> {
      (start == 0).then_some(0)
    }

    fn construct_element(
      &mut self,
      ctx: &mut ConstructionContext<'_>,
      _offset: usize,
    ) -> Option<Box<dyn VisualLineElement>> {
      Some(Box::new(Misbehaving {
        run_length:    self.run_length,
        preceding_len: self.preceding_len,
        properties:    ctx.properties().clone(),
      }))
    }
  }

  fn misbehaving_line(doc: &RopeDocument, run_length: usize, preceding_len: usize) -> VisualLine {
    let mut builder = VisualLineBuilder::new(
      TextViewOptions::default(),
      TextRunProperties::default(),
      Arc::new(ClusterShaper::default()),
    )
    .with_generator(MisbehavingGenerator {
      run_length,
      preceding_len,
    });
    builder.build(doc, doc.line(0)).unwrap()
  }

  #[test]
  fn empty_runs_are_contract_violations() {
    let doc = RopeDocument::from("abcd");
    let line = misbehaving_line(&doc, 0, 0);
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);
    let err = source.run_at(0).unwrap_err();
    assert!(matches!(err, LayoutError::EmptyRun { column: 0, .. }));
    assert!(err.to_string().contains("Misbehaving"));
  }

  #[test]
  fn overlong_runs_are_contract_violations() {
    let doc = RopeDocument::from("abcd");
    let line = misbehaving_line(&doc, 2, 0);
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    assert_eq!(source.run_at(0).unwrap().len(), 2);
    let err = source.run_at(1).unwrap_err();
    assert!(matches!(
      err,
      LayoutError::RunTooLong {
        relative_column: 1,
        run_length: 2,
        visual_length: 2,
        ..
      }
    ));
    // The plain text after the element is unaffected.
    assert_eq!(source.run_at(2).unwrap().text(), Some("cd"));
  }

  #[test]
  fn overlong_preceding_text_is_a_contract_violation() {
    let doc = RopeDocument::from("abcd");
    let line = misbehaving_line(&doc, 1, 2);
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    assert_eq!(source.preceding_text(2).unwrap().len(), 2);
    let err = source.preceding_text(1).unwrap_err();
    assert!(matches!(
      err,
      LayoutError::PrecedingTextTooLong {
        relative_column: 1,
        span_length: 2,
        ..
      }
    ));
  }

  #[test]
  fn text_elements_share_one_document_fetch() {
    let doc = RopeDocument::from("hello world");
    let options = TextViewOptions::default();
    let props = TextRunProperties::default();
    let line = VisualLineBuilder::new(
      options.clone(),
      props.clone(),
      Arc::new(ClusterShaper::default()),
    )
    .build(&doc, doc.line(0))
    .unwrap();
    let markers = marker_cache();
    let mut source = line.text_source(&doc, &options, &props, &markers);

    source.run_at(0).unwrap();
    source.run_at(6).unwrap();
    source.preceding_text(5).unwrap();
    assert_eq!(source.context().text_cache().fetches(), 1);
  }
}
