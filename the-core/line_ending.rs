use ropey::RopeSlice;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  #[cfg(feature = "unicode-lines")]
  /// U+000B -- VerticalTab
  VT,

  #[cfg(feature = "unicode-lines")]
  /// U+000C -- FormFeed
  FF,

  /// U+000D -- CarriageReturn
  CR,

  #[cfg(feature = "unicode-lines")]
  /// U+0085 -- NextLine
  Nel,

  /// U+2028 -- Line Separator
  #[cfg(feature = "unicode-lines")]
  LS,

  /// U+2029 -- ParagraphSeparator
  #[cfg(feature = "unicode-lines")]
  PS,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      #[cfg(feature = "unicode-lines")]
      '\u{000B}' => Some(LineEnding::VT),
      #[cfg(feature = "unicode-lines")]
      '\u{000C}' => Some(LineEnding::FF),
      '\u{000D}' => Some(LineEnding::CR),
      #[cfg(feature = "unicode-lines")]
      '\u{0085}' => Some(LineEnding::Nel),
      #[cfg(feature = "unicode-lines")]
      '\u{2028}' => Some(LineEnding::LS),
      #[cfg(feature = "unicode-lines")]
      '\u{2029}' => Some(LineEnding::PS),
      _ => None,
    }
  }
}

/// What a line terminator looks like to the renderer.
///
/// Only CRLF, CR and LF have dedicated markers; every other single-char
/// terminator the buffer accepts is reported as [`Delimiter::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
  CrLf,
  Cr,
  Lf,
  Unrecognized(char),
  /// Last line of the document, no terminator at all.
  EndOfFile,
}

impl Delimiter {
  /// Classifies the terminator text that actually ends a line.
  ///
  /// Two chars are always treated as CRLF: it is the only two-char
  /// terminator the buffer produces.
  pub fn classify(terminator: &str) -> Delimiter {
    let mut chars = terminator.chars();
    match (chars.next(), chars.next()) {
      (None, _) => Delimiter::EndOfFile,
      (Some(_), Some(_)) => Delimiter::CrLf,
      (Some('\r'), None) => Delimiter::Cr,
      (Some('\n'), None) => Delimiter::Lf,
      (Some(ch), None) => Delimiter::Unrecognized(ch),
    }
  }
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  // Ropey guarantees that CRLF is never split across chunks, so checking the
  // last two chars first is enough.
  if len >= 2 && line.char(len - 2) == '\r' && line.char(len - 1) == '\n' {
    return Some(LineEnding::Crlf);
  }
  if len == 0 {
    return None;
  }
  LineEnding::from_char(line.char(len - 1))
}
