//! In-memory stream over a file node.

use super::contract::FileMode;
use super::{file_at, StubCore};
use crate::error::VfsError;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use tracing::warn;

/// Read/write view over a copy of a file's bytes
///
/// Writes stay in the stream until `flush()` or drop, which store the buffer
/// back into the file at the path the stream was opened with.
pub struct FileNodeStream {
    core: StubCore,
    path: String,
    segments: Vec<String>,
    cursor: Cursor<Vec<u8>>,
    dirty: bool,
}

impl FileNodeStream {
    pub(crate) fn new(
        core: StubCore,
        path: impl Into<String>,
        segments: Vec<String>,
        contents: Vec<u8>,
        mode: FileMode,
    ) -> Self {
        let (data, position, dirty) = match mode {
            FileMode::Open | FileMode::OpenOrCreate => (contents, 0, false),
            FileMode::Append => {
                let end = contents.len() as u64;
                (contents, end, false)
            }
            FileMode::Create | FileMode::CreateNew | FileMode::Truncate => (Vec::new(), 0, true),
        };
        let mut cursor = Cursor::new(data);
        cursor.set_position(position);
        Self {
            core,
            path: path.into(),
            segments,
            cursor,
            dirty,
        }
    }

    /// Path the stream was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn store(&self) -> crate::error::Result<()> {
        self.core.mutate(|tree| {
            let id = file_at(tree, &self.segments)
                .ok_or_else(|| VfsError::could_not_find_file(&self.path))?;
            let node = &mut tree.arena[id];
            if let Some(contents) = node.contents_mut() {
                contents.clone_from(self.cursor.get_ref());
            }
            node.touch();
            Ok(())
        })
    }
}

impl Read for FileNodeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Write for FileNodeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.dirty = true;
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.dirty {
            self.store()?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl Seek for FileNodeStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Drop for FileNodeStream {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(path = %self.path, "Failed to store stream contents on drop: {}", e);
        }
    }
}

impl std::fmt::Debug for FileNodeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileNodeStream")
            .field("path", &self.path)
            .field("position", &self.cursor.position())
            .field("len", &self.cursor.get_ref().len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
