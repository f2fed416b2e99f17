//! Finds the leading grapheme cluster a color font renders as one unit.
//!
//! The shaper reports codepoint groups. A glyph plan of several groups is
//! only one visual unit while the groups are glued together by zero width
//! joiners (family and profession emoji, for example); the first boundary
//! with no ZWJ on either side ends the cluster.

use the_core::chars::{
  char_is_zwj,
  char_to_byte_idx,
};

use crate::{
  font_cache::ColorGlyphCapability,
  shaper::{
    GlyphPlan,
    TextShaper,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LigatedRun<'a> {
  /// Prefix of the input consumed by the unit.
  pub text:           &'a str,
  /// Visual columns the unit occupies: 1, or 0 when nothing was consumed.
  pub visual_columns: usize,
}

impl<'a> LigatedRun<'a> {
  fn new(text: &'a str) -> Self {
    Self {
      text,
      visual_columns: usize::from(!text.is_empty()),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub fn char_len(&self) -> usize {
    self.text.chars().count()
  }
}

/// Returns the longest prefix of `raw_text` that `plan` renders as a single
/// ligated unit. `plan` must have been produced for `raw_text`.
pub fn longest_ligated_run<'a>(plan: &GlyphPlan, raw_text: &'a str) -> LigatedRun<'a> {
  let groups = plan.group_offsets();
  match groups.len() {
    0 => return LigatedRun::new(&raw_text[..0]),
    1 => return LigatedRun::new(raw_text),
    _ => {},
  }

  let chars: Vec<char> = raw_text.chars().collect();
  let len = chars.len();
  let mut end = 0;
  for (i, &current) in groups.iter().enumerate() {
    let next = groups.get(i + 1).copied().unwrap_or(len).min(len);
    if next <= current || next <= end {
      break;
    }
    end = next;

    let joined_before = char_is_zwj(chars[next - 1]);
    // Nothing to look at past the end of the text: not joined.
    let joined_after = next < len && char_is_zwj(chars[next]);
    if !joined_before && !joined_after {
      break;
    }
  }

  LigatedRun::new(&raw_text[..char_to_byte_idx(raw_text, end)])
}

/// Plans `text` with the color font and returns its leading ligated unit.
pub fn join<'a>(
  shaper: &dyn TextShaper,
  capability: &ColorGlyphCapability,
  text: &'a str,
) -> LigatedRun<'a> {
  let plan = shaper.plan_glyphs(capability, text);
  longest_ligated_run(&plan, text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shaper::PlannedGlyph;

  const ZWJ: char = '\u{200D}';

  /// One glyph per codepoint, the way a font without ligatures plans text.
  fn per_char_plan(text: &str) -> GlyphPlan {
    GlyphPlan::new(
      (0..text.chars().count())
        .map(|input_offset| PlannedGlyph {
          input_offset,
          glyph_id: 1,
          advance: 1000.0,
          offset_x: 0.0,
          offset_y: 0.0,
        })
        .collect(),
    )
  }

  fn run_of(text: &str) -> &str {
    longest_ligated_run(&per_char_plan(text), text).text
  }

  #[test]
  fn zwj_joins_across_boundaries() {
    assert_eq!(run_of("A\u{200D}B"), "A\u{200D}B");
  }

  #[test]
  fn no_zwj_splits_into_units() {
    assert_eq!(run_of("AB"), "A");
    assert_eq!(run_of("B"), "B");
  }

  #[test]
  fn join_stops_at_first_unjoined_boundary() {
    let family = "👨\u{200D}👩\u{200D}👧";
    let text = format!("{family}😀 tail");
    assert_eq!(run_of(&text), family);
  }

  #[test]
  fn trailing_zwj_at_end_of_text_stays_in_unit() {
    assert_eq!(run_of("A\u{200D}"), "A\u{200D}");
  }

  #[test]
  fn single_group_consumes_whole_match() {
    let flag = "🇺🇸";
    let plan = GlyphPlan::new(vec![PlannedGlyph {
      input_offset: 0,
      glyph_id: 42,
      advance: 2048.0,
      offset_x: 0.0,
      offset_y: 0.0,
    }]);
    let run = longest_ligated_run(&plan, flag);
    assert_eq!(run.text, flag);
    assert_eq!(run.visual_columns, 1);
    assert_eq!(run.char_len(), 2);
  }

  #[test]
  fn empty_plan_consumes_nothing() {
    let run = longest_ligated_run(&GlyphPlan::default(), "😀");
    assert!(run.is_empty());
    assert_eq!(run.visual_columns, 0);
  }

  quickcheck::quickcheck! {
    fn rejoining_a_cluster_is_stable(picks: Vec<u8>) -> bool {
      let text: String = picks
        .iter()
        .map(|pick| match pick % 3 {
          0 => 'A',
          1 => 'B',
          _ => ZWJ,
        })
        .collect();
      let first = run_of(&text);
      run_of(first) == first
    }
  }
}
