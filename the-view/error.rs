use thiserror::Error;

/// A generator or element broke the layout contract.
///
/// These are programming errors in the offending generator or element, never
/// recoverable conditions: continuing would corrupt offset arithmetic
/// downstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
  #[error("{element} returned an empty text run at column {column}")]
  EmptyRun {
    element: &'static str,
    column:  usize,
  },
  #[error(
    "{element} returned a text run of length {run_length} at relative column {relative_column}, \
     past its visual length {visual_length}"
  )]
  RunTooLong {
    element:         &'static str,
    relative_column: usize,
    run_length:      usize,
    visual_length:   usize,
  },
  #[error(
    "{element} returned {span_length} chars of preceding text, more than the {relative_column} \
     columns before the limit"
  )]
  PrecedingTextTooLong {
    element:         &'static str,
    relative_column: usize,
    span_length:     usize,
  },
  #[error("{generator} reported interest at {reported}, before the scan start {start}")]
  InterestBeforeStart {
    generator: &'static str,
    start:     usize,
    reported:  usize,
  },
  #[error("{generator} constructed {element} with zero visual length at {offset}")]
  ZeroVisualLength {
    generator: &'static str,
    element:   &'static str,
    offset:    usize,
  },
  #[error("{generator} constructed {element} spanning {offset}..{end}, past the line end {line_end}")]
  PastLineEnd {
    generator: &'static str,
    element:   &'static str,
    offset:    usize,
    end:       usize,
    line_end:  usize,
  },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Error)]
pub enum OptionsError {
  #[error("invalid view options: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("`{option}` must not contain a line break")]
  LineBreakInMarker { option: &'static str },
}
