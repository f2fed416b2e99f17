use crate::line_ending::LineEnding;

/// U+200D, glues emoji into a single ligated sequence.
pub const ZERO_WIDTH_JOINER: char = '\u{200D}';

#[inline]
pub fn char_is_zwj(ch: char) -> bool {
  ch == ZERO_WIDTH_JOINER
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// Converts a char index into `text` to a byte index, clamping to the end.
#[inline]
pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
  text
    .char_indices()
    .nth(char_idx)
    .map_or(text.len(), |(byte_idx, _)| byte_idx)
}

/// Returns the substring covering chars `start..start + len`, clamped to `text`.
#[inline]
pub fn char_slice(text: &str, start: usize, len: usize) -> &str {
  let from = char_to_byte_idx(text, start);
  let rest = &text[from..];
  &rest[..char_to_byte_idx(rest, len)]
}
