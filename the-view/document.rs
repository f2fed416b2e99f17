//! Read-only access to the backing text.

use ropey::Rope;
use the_core::line_ending::get_line_ending;

/// One document line. `end` excludes the delimiter; the next line starts at
/// `end + delimiter_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentLine {
  pub number:           usize,
  pub start:            usize,
  pub end:              usize,
  pub delimiter_length: usize,
}

impl DocumentLine {
  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn end_including_delimiter(&self) -> usize {
    self.end + self.delimiter_length
  }

  /// The last line of a document has no delimiter.
  pub fn is_last(&self) -> bool {
    self.delimiter_length == 0
  }
}

/// The document collaborator. Offsets are char indices.
///
/// Implementations must tolerate repeated, overlapping queries and may clamp
/// ranges that run past the end of the text.
pub trait TextDocument {
  fn len_chars(&self) -> usize;

  fn text(&self, offset: usize, length: usize) -> String;

  fn line_containing(&self, offset: usize) -> DocumentLine;
}

#[derive(Debug, Clone, Default)]
pub struct RopeDocument {
  rope: Rope,
}

impl RopeDocument {
  pub fn new(rope: Rope) -> Self {
    Self { rope }
  }

  pub fn len_lines(&self) -> usize {
    self.rope.len_lines()
  }

  /// Line by zero-based number, clamped to the last line.
  pub fn line(&self, number: usize) -> DocumentLine {
    let number = number.min(self.rope.len_lines().saturating_sub(1));
    self.line_containing(self.rope.line_to_char(number))
  }

  pub fn lines(&self) -> impl Iterator<Item = DocumentLine> + '_ {
    (0..self.rope.len_lines()).map(|number| self.line(number))
  }
}

impl From<&str> for RopeDocument {
  fn from(text: &str) -> Self {
    Self::new(Rope::from_str(text))
  }
}

impl TextDocument for RopeDocument {
  fn len_chars(&self) -> usize {
    self.rope.len_chars()
  }

  fn text(&self, offset: usize, length: usize) -> String {
    let len = self.rope.len_chars();
    let start = offset.min(len);
    let end = offset.saturating_add(length).min(len);
    self.rope.slice(start..end).to_string()
  }

  fn line_containing(&self, offset: usize) -> DocumentLine {
    let offset = offset.min(self.rope.len_chars());
    let number = self.rope.char_to_line(offset);
    let start = self.rope.line_to_char(number);
    let slice = self.rope.line(number);
    let delimiter_length = get_line_ending(&slice).map_or(0, |ending| ending.len_chars());
    DocumentLine {
      number,
      start,
      end: start + slice.len_chars() - delimiter_length,
      delimiter_length,
    }
  }
}
