//! Process-wide memo of which physical fonts carry color glyphs.
//!
//! Inspecting a font means opening and parsing the whole file, so every
//! outcome is cached, including "no color tables" and "could not read it".
//! One lock covers both the lookup and the first population of an entry:
//! concurrent layout passes querying the same font wait for the first
//! inspection instead of repeating it.

use std::{
  collections::HashMap,
  fmt,
  io::{
    self,
    Read,
  },
  sync::{
    Arc,
    OnceLock,
  },
};

use parking_lot::Mutex;
use rustybuzz::ttf_parser::{
  self,
  RawFace,
  Tag,
};
use thiserror::Error;
use tracing::{
  debug,
  trace,
};

use crate::font::{
  FontHandle,
  FontId,
};

static GLOBAL_CACHE: OnceLock<Arc<FontShapeCache>> = OnceLock::new();

/// Proof that a font carries color glyph data, plus what planning needs.
pub struct ColorGlyphCapability {
  font:         FontHandle,
  data:         Arc<[u8]>,
  units_per_em: u16,
}

impl ColorGlyphCapability {
  pub fn new(font: FontHandle, data: impl Into<Arc<[u8]>>, units_per_em: u16) -> Self {
    Self {
      font,
      data: data.into(),
      units_per_em,
    }
  }

  pub fn font(&self) -> &FontHandle {
    &self.font
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn units_per_em(&self) -> u16 {
    self.units_per_em
  }

  /// Factor converting font units to pixels at `font_size`.
  pub fn scale(&self, font_size: f32) -> f32 {
    if self.units_per_em == 0 {
      return 0.0;
    }
    font_size / f32::from(self.units_per_em)
  }
}

impl fmt::Debug for ColorGlyphCapability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ColorGlyphCapability")
      .field("font", &self.font.id())
      .field("units_per_em", &self.units_per_em)
      .finish_non_exhaustive()
  }
}

#[derive(Debug, Error)]
pub enum InspectError {
  #[error("failed to open font stream: {0}")]
  Open(#[source] io::Error),
  #[error("failed to read font stream: {0}")]
  Read(#[source] io::Error),
  #[error("malformed font: {0}")]
  Parse(ttf_parser::FaceParsingError),
}

/// Decides whether a font carries color glyphs. Called at most once per font
/// by [`FontShapeCache`].
pub trait FontInspector: Send + Sync {
  fn inspect(&self, font: &FontHandle) -> Result<Option<ColorGlyphCapability>, InspectError>;
}

/// Reads the font file and looks for the `COLR`/`CPAL` table pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenTypeInspector;

impl FontInspector for OpenTypeInspector {
  fn inspect(&self, font: &FontHandle) -> Result<Option<ColorGlyphCapability>, InspectError> {
    let data = {
      let mut stream = font.open_stream().map_err(InspectError::Open)?;
      let mut data = Vec::new();
      stream
        .read_to_end(&mut data)
        .map_err(InspectError::Read)?;
      data
    };

    let raw = RawFace::parse(&data, font.face_index()).map_err(InspectError::Parse)?;
    if !has_color_tables(&raw) {
      return Ok(None);
    }
    let units_per_em = ttf_parser::Face::parse(&data, font.face_index())
      .map_err(InspectError::Parse)?
      .units_per_em();

    Ok(Some(ColorGlyphCapability::new(
      font.clone(),
      data,
      units_per_em,
    )))
  }
}

pub(crate) fn has_color_tables(raw: &RawFace<'_>) -> bool {
  raw.table(Tag::from_bytes(b"COLR")).is_some() && raw.table(Tag::from_bytes(b"CPAL")).is_some()
}

pub struct FontShapeCache {
  inspector: Box<dyn FontInspector>,
  entries:   Mutex<HashMap<FontId, Option<Arc<ColorGlyphCapability>>>>,
}

impl FontShapeCache {
  pub fn new() -> Self {
    Self::with_inspector(OpenTypeInspector)
  }

  pub fn with_inspector(inspector: impl FontInspector + 'static) -> Self {
    Self {
      inspector: Box::new(inspector),
      entries:   Mutex::new(HashMap::new()),
    }
  }

  /// The cache shared by every view in the process.
  pub fn global() -> Arc<FontShapeCache> {
    GLOBAL_CACHE
      .get_or_init(|| Arc::new(FontShapeCache::new()))
      .clone()
  }

  /// Returns the color capability of `font`, inspecting it on first use.
  pub fn capability_for(&self, font: &FontHandle) -> Option<Arc<ColorGlyphCapability>> {
    let mut entries = self.entries.lock();
    if let Some(entry) = entries.get(&font.id()) {
      trace!(font = font.id().get(), color = entry.is_some(), "font capability cache hit");
      return entry.clone();
    }

    let capability = match self.inspector.inspect(font) {
      Ok(Some(capability)) => Some(Arc::new(capability)),
      Ok(None) => {
        debug!(font = font.id().get(), "font has no color glyph tables");
        None
      },
      Err(err) => {
        debug!(font = font.id().get(), %err, "font inspection failed, treating as colorless");
        None
      },
    };
    entries.insert(font.id(), capability.clone());
    capability
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Forgets every inspection result, for when font files are reloaded.
  pub fn clear(&self) {
    self.entries.lock().clear();
  }
}

impl Default for FontShapeCache {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for FontShapeCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FontShapeCache")
      .field("entries", &self.len())
      .finish_non_exhaustive()
  }
}
