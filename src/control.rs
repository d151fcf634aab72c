//! Control hand-off for external collaborators
//!
//! Other threads (a remote-control endpoint, a file watcher) never touch the
//! session directly. They hold a [`ControlHandle`], which queues a
//! [`ControlRequest`] on a channel; the session drains the queue on its own
//! thread between key reads and answers on a per-request reply channel.
//!
//! The request vocabulary mirrors a two-endpoint control surface:
//! - "current buffer": the path of the active buffer
//! - "open": `"<path>[:<line>]"`, open the file and jump to the line

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::session::SessionError;

/// Error type for control requests
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("Empty open request")]
    Empty,

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Invalid line number: {0:?}")]
    InvalidLine(String),

    #[error("Editor session is no longer running")]
    Disconnected,

    #[error("Request rejected: {0}")]
    Rejected(#[source] SessionError),
}

/// Result type for control requests
pub type ControlResult<T> = Result<T, ControlError>;

/// A file to open and the line to put the cursor on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
}

impl OpenRequest {
    pub fn new(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Parse `"<path>[:<line>]"`
    ///
    /// Only the first line of `body` is considered. The line defaults to 1.
    /// The path must exist.
    pub fn parse(body: &str) -> ControlResult<Self> {
        let first = body.lines().next().unwrap_or("").trim_end_matches('\r');
        let mut chunks = first.split(':');

        let path = chunks.next().unwrap_or("");
        if path.is_empty() {
            return Err(ControlError::Empty);
        }

        let line = match chunks.next() {
            None => 1,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ControlError::InvalidLine(raw.to_string())),
            },
        };

        if !Path::new(path).exists() {
            return Err(ControlError::PathNotFound(PathBuf::from(path)));
        }

        Ok(Self::new(path, line))
    }
}

/// Work queued for the session thread
#[derive(Debug)]
pub enum ControlRequest {
    /// Report the active buffer's path
    CurrentPath { reply: Sender<Option<PathBuf>> },
    /// Open a buffer and move the cursor to a line
    Open {
        request: OpenRequest,
        reply: Sender<Result<(), SessionError>>,
    },
}

/// Sending side of the control queue; cheap to clone and `Send`
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: Sender<ControlRequest>,
}

impl ControlHandle {
    /// Path of the active buffer, `None` if nothing is open
    ///
    /// Blocks until the session picks the request up.
    pub fn current_path(&self) -> ControlResult<Option<PathBuf>> {
        let (reply, rx) = mpsc::channel();
        self.send(ControlRequest::CurrentPath { reply })?;
        rx.recv().map_err(|_| ControlError::Disconnected)
    }

    /// Open a buffer and jump to a line
    ///
    /// Blocks until the session has handled the request.
    pub fn open(&self, request: OpenRequest) -> ControlResult<()> {
        let (reply, rx) = mpsc::channel();
        self.send(ControlRequest::Open { request, reply })?;
        rx.recv()
            .map_err(|_| ControlError::Disconnected)?
            .map_err(ControlError::Rejected)
    }

    /// Parse an `"<path>[:<line>]"` body and open it
    pub fn open_from_body(&self, body: &str) -> ControlResult<()> {
        self.open(OpenRequest::parse(body)?)
    }

    fn send(&self, request: ControlRequest) -> ControlResult<()> {
        self.tx.send(request).map_err(|_| ControlError::Disconnected)
    }
}

/// Create a control queue
pub fn channel() -> (ControlHandle, Receiver<ControlRequest>) {
    let (tx, rx) = mpsc::channel();
    (ControlHandle { tx }, rx)
}
