//! Physical font identity and scoped access to the font bytes.

use std::{
  fmt,
  fs::File,
  hash::{
    DefaultHasher,
    Hash,
    Hasher,
  },
  io::{
    self,
    BufReader,
    Cursor,
    Read,
  },
  path::{
    Path,
    PathBuf,
  },
  sync::Arc,
};

/// Identity of one physical face. Two handles to the same file and face index
/// share an id, so the capability cache inspects each face once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u64);

impl FontId {
  pub const fn new(id: u64) -> Self {
    Self(id)
  }

  pub const fn get(self) -> u64 {
    self.0
  }
}

#[derive(Clone)]
pub enum FontSource {
  File { path: PathBuf },
  Memory { data: Arc<[u8]> },
}

impl fmt::Debug for FontSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FontSource::File { path } => f.debug_struct("File").field("path", path).finish(),
      FontSource::Memory { data } => {
        f.debug_struct("Memory")
          .field("data_len", &data.len())
          .finish()
      },
    }
  }
}

#[derive(Debug, Clone)]
pub struct FontHandle {
  id:         FontId,
  source:     FontSource,
  face_index: u32,
}

impl FontHandle {
  pub fn from_file(path: impl Into<PathBuf>, face_index: u32) -> Self {
    let path = path.into();
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    face_index.hash(&mut hasher);
    Self {
      id: FontId(hasher.finish()),
      source: FontSource::File { path },
      face_index,
    }
  }

  /// Wraps in-memory font bytes (embedded fonts, test fixtures).
  pub fn from_memory(id: FontId, data: impl Into<Arc<[u8]>>, face_index: u32) -> Self {
    Self {
      id,
      source: FontSource::Memory { data: data.into() },
      face_index,
    }
  }

  pub fn id(&self) -> FontId {
    self.id
  }

  pub fn face_index(&self) -> u32 {
    self.face_index
  }

  pub fn source(&self) -> &FontSource {
    &self.source
  }

  pub fn path(&self) -> Option<&Path> {
    match &self.source {
      FontSource::File { path } => Some(path),
      FontSource::Memory { .. } => None,
    }
  }

  /// Opens the font bytes for reading. The stream is closed when dropped.
  pub fn open_stream(&self) -> io::Result<FontStream> {
    let inner = match &self.source {
      FontSource::File { path } => StreamInner::File(BufReader::new(File::open(path)?)),
      FontSource::Memory { data } => StreamInner::Memory(Cursor::new(data.clone())),
    };
    Ok(FontStream { inner })
  }
}

impl PartialEq for FontHandle {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for FontHandle {}

impl Hash for FontHandle {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

/// A readable font file or buffer.
pub struct FontStream {
  inner: StreamInner,
}

enum StreamInner {
  File(BufReader<File>),
  Memory(Cursor<Arc<[u8]>>),
}

impl Read for FontStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    match &mut self.inner {
      StreamInner::File(reader) => reader.read(buf),
      StreamInner::Memory(cursor) => cursor.read(buf),
    }
  }
}

impl fmt::Debug for FontStream {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.inner {
      StreamInner::File(_) => "file",
      StreamInner::Memory(_) => "memory",
    };
    f.debug_struct("FontStream").field("kind", &kind).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_file_and_index_share_identity() {
    let a = FontHandle::from_file("/fonts/emoji.ttf", 0);
    let b = FontHandle::from_file("/fonts/emoji.ttf", 0);
    let c = FontHandle::from_file("/fonts/emoji.ttf", 1);
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
    assert_eq!(a, b);
  }

  #[test]
  fn memory_stream_reads_all_bytes() {
    let font = FontHandle::from_memory(FontId::new(7), vec![1u8, 2, 3], 0);
    let mut stream = font.open_stream().unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    assert_eq!(out, vec![1, 2, 3]);
    assert!(font.path().is_none());
  }

  #[test]
  fn missing_file_fails_to_open() {
    let font = FontHandle::from_file("/definitely/not/here.ttf", 0);
    assert!(font.open_stream().is_err());
  }
}
