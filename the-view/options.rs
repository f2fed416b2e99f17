use serde::Deserialize;
use the_core::{
  chars::char_is_line_ending,
  line_ending::Delimiter,
};

use crate::{
  document::DocumentLine,
  error::OptionsError,
};

/// Marker drawn for a single-char delimiter that is not CR or LF.
pub const UNRECOGNIZED_DELIMITER_TEXT: &str = "?";

/// View options consumed while building and running lines.
///
/// ```toml
/// show-end-of-line = true
/// end-of-line-lf-text = "↴"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextViewOptions {
  pub show_end_of_line:      bool,
  pub show_end_of_file:      bool,
  pub end_of_line_crlf_text: String,
  pub end_of_line_cr_text:   String,
  pub end_of_line_lf_text:   String,
  pub end_of_file_text:      String,
}

impl Default for TextViewOptions {
  fn default() -> Self {
    Self {
      show_end_of_line:      false,
      show_end_of_file:      false,
      end_of_line_crlf_text: "¶".to_string(),
      end_of_line_cr_text:   "\\r".to_string(),
      end_of_line_lf_text:   "\\n".to_string(),
      end_of_file_text:      "¤".to_string(),
    }
  }
}

impl TextViewOptions {
  pub fn from_toml(source: &str) -> Result<Self, OptionsError> {
    let options: Self = toml::from_str(source)?;
    options.validate()?;
    Ok(options)
  }

  /// Markers are drawn inline, so none of them may break the line.
  pub fn validate(&self) -> Result<(), OptionsError> {
    let markers = [
      ("end-of-line-crlf-text", &self.end_of_line_crlf_text),
      ("end-of-line-cr-text", &self.end_of_line_cr_text),
      ("end-of-line-lf-text", &self.end_of_line_lf_text),
      ("end-of-file-text", &self.end_of_file_text),
    ];
    for (option, text) in markers {
      if text.chars().any(char_is_line_ending) {
        return Err(OptionsError::LineBreakInMarker { option });
      }
    }
    Ok(())
  }

  /// Whether `line` gets a visible terminator marker.
  pub fn shows_delimiter(&self, line: &DocumentLine) -> bool {
    if line.delimiter_length > 0 {
      self.show_end_of_line
    } else {
      self.show_end_of_file
    }
  }

  pub fn delimiter_text(&self, delimiter: Delimiter) -> &str {
    match delimiter {
      Delimiter::CrLf => &self.end_of_line_crlf_text,
      Delimiter::Cr => &self.end_of_line_cr_text,
      Delimiter::Lf => &self.end_of_line_lf_text,
      Delimiter::Unrecognized(_) => UNRECOGNIZED_DELIMITER_TEXT,
      Delimiter::EndOfFile => &self.end_of_file_text,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_gives_defaults() {
    assert_eq!(
      TextViewOptions::from_toml("").unwrap(),
      TextViewOptions::default()
    );
  }

  #[test]
  fn kebab_case_keys_override_defaults() {
    let options = TextViewOptions::from_toml(
      r#"
      show-end-of-line = true
      end-of-line-lf-text = "↴"
      "#,
    )
    .unwrap();
    assert!(options.show_end_of_line);
    assert!(!options.show_end_of_file);
    assert_eq!(options.end_of_line_lf_text, "↴");
    assert_eq!(options.end_of_line_crlf_text, "¶");
  }

  #[test]
  fn markers_with_line_breaks_are_rejected() {
    let err = TextViewOptions::from_toml(r#"end-of-file-text = "a\nb""#).unwrap_err();
    assert!(matches!(
      err,
      OptionsError::LineBreakInMarker {
        option: "end-of-file-text"
      }
    ));
  }

  #[test]
  fn malformed_toml_is_a_parse_error() {
    let err = TextViewOptions::from_toml("show-end-of-line = ").unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));
  }

  #[test]
  fn delimiter_markers() {
    let options = TextViewOptions::default();
    assert_eq!(options.delimiter_text(Delimiter::CrLf), "¶");
    assert_eq!(options.delimiter_text(Delimiter::Cr), "\\r");
    assert_eq!(options.delimiter_text(Delimiter::Lf), "\\n");
    assert_eq!(options.delimiter_text(Delimiter::EndOfFile), "¤");
    assert_eq!(
      options.delimiter_text(Delimiter::Unrecognized('\u{2028}')),
      "?"
    );
  }

  #[test]
  fn delimiter_visibility_depends_on_line_kind() {
    let options = TextViewOptions {
      show_end_of_file: true,
      ..TextViewOptions::default()
    };
    let middle = DocumentLine {
      number:           0,
      start:            0,
      end:              3,
      delimiter_length: 1,
    };
    let last = DocumentLine {
      number:           1,
      start:            4,
      end:              4,
      delimiter_length: 0,
    };
    assert!(!options.shows_delimiter(&middle));
    assert!(options.shows_delimiter(&last));
  }
}
