//! One-slot memo of the last document text fetch.
//!
//! Generators scanning a line ask for the rest of the line from ever larger
//! offsets. Every such request falls inside the first fetch, so it is served
//! as a window into the cached string instead of another document query.

use the_core::chars::char_slice;

use crate::document::TextDocument;

/// A window of `count` chars starting at char `offset` of `text`.
///
/// `text` is the whole cached string, not just the window: consumers that
/// key further caches on it see the same string for every request the fetch
/// covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
  pub text:   &'a str,
  pub offset: usize,
  pub count:  usize,
}

impl<'a> TextSegment<'a> {
  pub fn as_str(&self) -> &'a str {
    char_slice(self.text, self.offset, self.count)
  }

  pub fn end(&self) -> usize {
    self.offset + self.count
  }
}

#[derive(Debug)]
struct CachedText {
  offset:    usize,
  len_chars: usize,
  text:      String,
}

#[derive(Debug, Default)]
pub struct TextFetchCache {
  cached:  Option<CachedText>,
  fetches: usize,
}

impl TextFetchCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fetch<'s>(
    &'s mut self,
    document: &dyn TextDocument,
    offset: usize,
    length: usize,
  ) -> TextSegment<'s> {
    let covered = self.cached.as_ref().is_some_and(|cached| {
      offset >= cached.offset && offset + length <= cached.offset + cached.len_chars
    });
    if !covered {
      let text = document.text(offset, length);
      self.fetches += 1;
      self.cached = Some(CachedText {
        offset,
        len_chars: text.chars().count(),
        text,
      });
    }

    match &self.cached {
      Some(cached) => {
        TextSegment {
          text:   &cached.text,
          offset: offset - cached.offset,
          count:  length.min(cached.len_chars - (offset - cached.offset)),
        }
      },
      None => {
        TextSegment {
          text:   "",
          offset: 0,
          count:  0,
        }
      },
    }
  }

  /// Number of times the document was actually queried.
  pub fn fetches(&self) -> usize {
    self.fetches
  }

  /// Forgets the cached text, for a document that changed under it.
  pub fn clear(&mut self) {
    self.cached = None;
  }
}
