//! Prepared text for non-printable markers (visible line terminators).
//!
//! A view draws the same handful of marker strings on almost every line, so
//! each one is prepared once per formatting and kept for the view's lifetime.

use std::{
  collections::HashMap,
  fmt,
  sync::{
    Arc,
    atomic::{
      AtomicUsize,
      Ordering,
    },
  },
};

use parking_lot::Mutex;
use the_shape::{
  PreparedLine,
  TextRunProperties,
  TextShaper,
};
use tracing::trace;

use crate::run::RunMetrics;

pub struct MarkerCache {
  shaper:   Arc<dyn TextShaper>,
  entries:  Mutex<HashMap<String, (TextRunProperties, Arc<PreparedLine>)>>,
  prepares: AtomicUsize,
}

impl MarkerCache {
  pub fn new(shaper: Arc<dyn TextShaper>) -> Self {
    Self {
      shaper,
      entries: Mutex::new(HashMap::new()),
      prepares: AtomicUsize::new(0),
    }
  }

  /// The prepared marker, re-prepared when `properties` changed since the
  /// last request for the same text.
  pub fn prepared(&self, text: &str, properties: &TextRunProperties) -> Arc<PreparedLine> {
    let mut entries = self.entries.lock();
    if let Some((cached, line)) = entries.get(text)
      && cached == properties
    {
      trace!(marker = text, "marker cache hit");
      return line.clone();
    }
    let line = Arc::new(self.shaper.prepare_line(text, properties));
    self.prepares.fetch_add(1, Ordering::Relaxed);
    entries.insert(text.to_string(), (properties.clone(), line.clone()));
    line
  }

  /// Metrics of a marker run: the marker's own height and baseline, no
  /// horizontal space.
  pub fn metrics(&self, text: &str, properties: &TextRunProperties) -> RunMetrics {
    let line = self.prepared(text, properties);
    RunMetrics {
      width:    0.0,
      height:   line.height,
      baseline: line.baseline,
    }
  }

  /// How many times a marker had to be prepared rather than reused.
  pub fn prepares(&self) -> usize {
    self.prepares.load(Ordering::Relaxed)
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }
}

impl fmt::Debug for MarkerCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MarkerCache")
      .field("entries", &self.len())
      .finish_non_exhaustive()
  }
}
