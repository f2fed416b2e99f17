use the_core::line_ending::Delimiter;
use the_shape::TextRunProperties;

use crate::{
  document::{
    DocumentLine,
    TextDocument,
  },
  marker::MarkerCache,
  options::TextViewOptions,
  run::RunMetrics,
  text_cache::{
    TextFetchCache,
    TextSegment,
  },
};

/// What generators and elements may consult while a line is built or run.
pub struct ConstructionContext<'a> {
  document:   &'a dyn TextDocument,
  line:       DocumentLine,
  options:    &'a TextViewOptions,
  properties: &'a TextRunProperties,
  markers:    &'a MarkerCache,
  text_cache: TextFetchCache,
}

impl<'a> ConstructionContext<'a> {
  pub fn new(
    document: &'a dyn TextDocument,
    line: DocumentLine,
    options: &'a TextViewOptions,
    properties: &'a TextRunProperties,
    markers: &'a MarkerCache,
  ) -> Self {
    Self {
      document,
      line,
      options,
      properties,
      markers,
      text_cache: TextFetchCache::new(),
    }
  }

  pub fn document(&self) -> &'a dyn TextDocument {
    self.document
  }

  pub fn line(&self) -> DocumentLine {
    self.line
  }

  pub fn options(&self) -> &'a TextViewOptions {
    self.options
  }

  /// Line-wide run formatting.
  pub fn properties(&self) -> &'a TextRunProperties {
    self.properties
  }

  /// Height and baseline of `marker` as the view formats it.
  pub fn marker_metrics(&self, marker: &str, properties: &TextRunProperties) -> RunMetrics {
    self.markers.metrics(marker, properties)
  }

  /// Document text through the one-slot fetch cache.
  pub fn text(&mut self, offset: usize, length: usize) -> TextSegment<'_> {
    self.text_cache.fetch(self.document, offset, length)
  }

  pub fn text_cache(&self) -> &TextFetchCache {
    &self.text_cache
  }

  /// Classifies the terminator actually present after the line.
  ///
  /// Read straight from the document so the cached line text stays put.
  pub fn delimiter(&self) -> Delimiter {
    let terminator = self
      .document
      .text(self.line.end, self.line.delimiter_length);
    Delimiter::classify(&terminator)
  }
}

impl std::fmt::Debug for ConstructionContext<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ConstructionContext")
      .field("line", &self.line)
      .field("options", self.options)
      .finish_non_exhaustive()
  }
}
