//! Terminal Mode Controller
//!
//! Owns the controlling terminal for the lifetime of an editor session:
//! captures the original attributes, switches to raw mode, queries the window
//! size and restores the original attributes on every exit path.
//!
//! Platform details sit behind [`TerminalDriver`]. The Unix driver talks to
//! the real tty through termios; [`fake::FakeTerminal`] is an in-memory
//! driver used by the tests.

pub mod fake;
mod probe;
#[cfg(unix)]
mod unix;

pub use probe::parse_cursor_report;
#[cfg(unix)]
pub use unix::UnixTerminal;

use std::fmt;

use tracing::{debug, error, warn};

use crate::core::Viewport;
use crate::input::ByteSource;
use crate::renderer::ansi;

/// Error type for terminal operations
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Failed to read terminal attributes: {0}")]
    Query(#[source] nix::Error),

    #[error("Failed to apply terminal attributes: {0}")]
    Mode(#[source] nix::Error),

    #[error("Window size query failed: {0}")]
    Geometry(#[source] nix::Error),

    #[error("Terminal reported an empty window ({rows}x{cols})")]
    EmptyGeometry { rows: usize, cols: usize },

    #[error("Cursor position probe failed: {0}")]
    GeometryProbe(String),

    #[error("Failed to read from terminal: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] std::io::Error),
}

/// Result type for terminal operations
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Read behaviour of the terminal in raw mode (VMIN / VTIME)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTiming {
    /// Minimum bytes before a read returns
    pub min_bytes: u8,
    /// Read timeout in tenths of a second
    pub timeout_deciseconds: u8,
}

impl ReadTiming {
    pub fn with_timeout(timeout_deciseconds: u8) -> Self {
        Self {
            min_bytes: 0,
            timeout_deciseconds,
        }
    }
}

impl Default for ReadTiming {
    fn default() -> Self {
        Self::with_timeout(1)
    }
}

/// Platform interface to a terminal
pub trait TerminalDriver {
    /// Snapshot of the terminal attributes
    type State: Clone + fmt::Debug;

    /// Read the current attributes
    fn capture_state(&mut self) -> TerminalResult<Self::State>;

    /// Derive the raw-mode attribute set from `original`
    ///
    /// Disables flow control, CR to NL translation, output post-processing,
    /// echo, canonical mode, extended input processing and signal keys, and
    /// selects 8-bit characters.
    fn make_raw(&self, original: &Self::State, timing: ReadTiming) -> Self::State;

    /// Apply an attribute set
    fn apply_state(&mut self, state: &Self::State) -> TerminalResult<()>;

    /// Ask the platform for the window size directly
    fn query_geometry(&mut self) -> TerminalResult<Viewport>;

    /// Read one byte, `None` on timeout
    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>>;

    /// Write all bytes and flush
    fn write_bytes(&mut self, bytes: &[u8]) -> TerminalResult<()>;
}

/// Longest cursor position reply we are willing to buffer
const MAX_REPORT_LEN: usize = 32;

/// A terminal in raw mode
///
/// Dropping it restores the attributes captured when it was created, so any
/// early return or panic unwind still hands the user back a sane shell.
pub struct Terminal<D: TerminalDriver> {
    driver: D,
    original: D::State,
    restored: bool,
}

impl<D: TerminalDriver> Terminal<D> {
    /// Capture the current attributes and switch the terminal to raw mode
    pub fn enable_raw_mode(mut driver: D, timing: ReadTiming) -> TerminalResult<Self> {
        let original = driver.capture_state()?;
        let raw = driver.make_raw(&original, timing);

        if let Err(e) = driver.apply_state(&raw) {
            // tcsetattr may have applied part of the change
            let _ = driver.apply_state(&original);
            return Err(e);
        }

        debug!(?timing, "raw mode enabled");
        Ok(Self {
            driver,
            original,
            restored: false,
        })
    }

    /// The attributes captured before raw mode was entered
    pub fn original_state(&self) -> &D::State {
        &self.original
    }

    /// Whether the original attributes have been put back
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Put the original attributes back
    ///
    /// Once it has succeeded, later calls do nothing. A failed restore is
    /// tried again on the next call or on drop.
    pub fn restore(&mut self) -> TerminalResult<()> {
        if self.restored {
            return Ok(());
        }
        self.driver.apply_state(&self.original)?;
        self.restored = true;
        debug!("terminal attributes restored");
        Ok(())
    }

    /// Write bytes to the terminal
    pub fn write_all(&mut self, bytes: &[u8]) -> TerminalResult<()> {
        self.driver.write_bytes(bytes)
    }

    /// Query the window size, falling back to the cursor position probe
    pub fn window_size(&mut self) -> TerminalResult<Viewport> {
        match self.driver.query_geometry() {
            Ok(viewport) => Ok(viewport),
            Err(e) => {
                warn!("window size query failed ({}), probing cursor position", e);
                self.probe_window_size()
            }
        }
    }

    /// Find the window size by parking the cursor in the bottom-right corner
    /// and asking the terminal where it ended up
    pub fn probe_window_size(&mut self) -> TerminalResult<Viewport> {
        self.driver.write_bytes(ansi::CURSOR_FAR_CORNER)?;
        self.driver.write_bytes(ansi::CURSOR_POSITION_QUERY)?;

        let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
        while reply.len() < MAX_REPORT_LEN {
            match self.driver.try_read_byte()? {
                Some(b'R') | None => break,
                Some(byte) => reply.push(byte),
            }
        }

        let viewport = parse_cursor_report(&reply)?;
        debug!(rows = viewport.rows(), cols = viewport.cols(), "probed window size");
        Ok(viewport)
    }
}

impl<D: TerminalDriver> ByteSource for Terminal<D> {
    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>> {
        self.driver.try_read_byte()
    }
}

impl<D: TerminalDriver> Drop for Terminal<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("failed to restore terminal attributes: {}", e);
        }
    }
}

impl<D: TerminalDriver> fmt::Debug for Terminal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("original", &self.original)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}
