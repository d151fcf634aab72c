//! File buffers
//!
//! [`LineBuffer`] is a read-only, line-indexed copy of a file taken when it is
//! opened. Lines are numbered from 1 at the public boundary. Editing
//! operations are part of the [`Buffer`] contract but are not implemented
//! yet; they fail with [`BufferError::NotImplemented`] rather than silently
//! doing nothing.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error type for buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Line {index} not found (buffer has {count} lines)")]
    LineNotFound { index: usize, count: usize },

    #[error("Buffer operation not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// A range of buffer content, 1-based lines and 0-based columns
///
/// A point when start and end coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferCursor {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl BufferCursor {
    pub fn point(line: usize, column: usize) -> Self {
        Self {
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn range(start: (usize, usize), end: (usize, usize)) -> Self {
        Self {
            start_line: start.0,
            start_column: start.1,
            end_line: end.0,
            end_column: end.1,
        }
    }

    pub fn is_point(&self) -> bool {
        self.start_line == self.end_line && self.start_column == self.end_column
    }
}

/// Content addressed by line, as seen by the editing subsystem
pub trait Buffer {
    /// Display name
    fn name(&self) -> &str;

    /// File the buffer was loaded from
    fn path(&self) -> &Path;

    /// Number of lines
    fn line_count(&self) -> usize;

    /// Line `index` (1-based) without its terminator
    fn line(&self, index: usize) -> BufferResult<&[u8]>;

    /// Content covered by `range`
    fn get(&self, range: BufferCursor) -> BufferResult<Vec<u8>>;

    /// Insert `content` at `range`
    fn insert(&mut self, range: BufferCursor, content: &[u8]) -> BufferResult<()>;

    /// Remove the content covered by `range`
    fn delete(&mut self, range: BufferCursor) -> BufferResult<()>;
}

/// A file loaded line by line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    path: PathBuf,
    name: String,
    lines: Vec<Vec<u8>>,
}

impl LineBuffer {
    /// Read the whole file at `path`
    ///
    /// A final terminator does not start an extra line, so `"a\nb\n"` and
    /// `"a\nb"` both have two lines. `\r\n` terminators are stripped whole.
    pub fn open(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BufferError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let lines = read_lines(BufReader::new(file)).map_err(|source| BufferError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), lines = lines.len(), "buffer loaded");
        Ok(Self::from_lines(path, lines))
    }

    /// Build a buffer from already split lines
    pub fn from_lines(path: impl Into<PathBuf>, lines: Vec<Vec<u8>>) -> Self {
        let path = path.into();
        Self {
            name: path.to_string_lossy().into_owned(),
            path,
            lines,
        }
    }

    /// All lines, in order
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }
}

impl Buffer for LineBuffer {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> BufferResult<&[u8]> {
        index
            .checked_sub(1)
            .and_then(|slot| self.lines.get(slot))
            .map(Vec::as_slice)
            .ok_or(BufferError::LineNotFound {
                index,
                count: self.lines.len(),
            })
    }

    fn get(&self, _range: BufferCursor) -> BufferResult<Vec<u8>> {
        Err(BufferError::NotImplemented("get"))
    }

    fn insert(&mut self, _range: BufferCursor, _content: &[u8]) -> BufferResult<()> {
        Err(BufferError::NotImplemented("insert"))
    }

    fn delete(&mut self, _range: BufferCursor) -> BufferResult<()> {
        Err(BufferError::NotImplemented("delete"))
    }
}

fn read_lines<R: BufRead>(mut reader: R) -> io::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        lines.push(line);
    }
    Ok(lines)
}
