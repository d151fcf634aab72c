//! Screen Renderer
//!
//! Builds a whole frame in memory and hands it to the terminal in a single
//! write, so the user never sees a half-drawn screen. The frame is:
//!
//! 1. hide cursor, cursor home
//! 2. one filler marker per row, each followed by clear-to-end-of-line
//! 3. cursor placed at the current position, show cursor

pub mod ansi;

use crate::core::{CursorPosition, Viewport};
use crate::terminal::{Terminal, TerminalDriver, TerminalError};

/// Error type for rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write frame: {0}")]
    Io(#[from] TerminalError),
}

/// Frame composer with a reusable output buffer
#[derive(Debug)]
pub struct Renderer {
    frame: Vec<u8>,
    filler: u8,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(b'~')
    }
}

impl Renderer {
    /// Create a renderer that marks empty rows with `filler`
    pub fn new(filler: u8) -> Self {
        Self {
            frame: Vec::with_capacity(4096),
            filler,
        }
    }

    /// Compose a frame into the internal buffer and return it
    pub fn compose(&mut self, viewport: Viewport, cursor: CursorPosition) -> &[u8] {
        self.frame.clear();
        self.frame.extend_from_slice(ansi::HIDE_CURSOR);
        self.frame.extend_from_slice(ansi::CURSOR_HOME);

        for row in 0..viewport.rows() {
            self.frame.push(self.filler);
            self.frame.extend_from_slice(ansi::CLEAR_LINE);
            // No newline after the last row, or the terminal would scroll
            if row < viewport.last_row() {
                self.frame.extend_from_slice(ansi::CRLF);
            }
        }

        ansi::cursor_to(&mut self.frame, cursor.clamped(viewport));
        self.frame.extend_from_slice(ansi::SHOW_CURSOR);
        &self.frame
    }

    /// Compose a frame and write it to the terminal in one operation
    ///
    /// The buffer is cleared afterwards whether or not the write succeeded.
    pub fn render<D: TerminalDriver>(
        &mut self,
        terminal: &mut Terminal<D>,
        viewport: Viewport,
        cursor: CursorPosition,
    ) -> Result<(), RenderError> {
        self.compose(viewport, cursor);
        let result = terminal.write_all(&self.frame);
        self.frame.clear();
        result.map_err(RenderError::from)
    }

    /// Blank the screen and park the cursor at the origin
    pub fn clear_screen<D: TerminalDriver>(
        &mut self,
        terminal: &mut Terminal<D>,
    ) -> Result<(), RenderError> {
        self.frame.clear();
        self.frame.extend_from_slice(ansi::CLEAR_SCREEN);
        self.frame.extend_from_slice(ansi::CURSOR_HOME);
        let result = terminal.write_all(&self.frame);
        self.frame.clear();
        result.map_err(RenderError::from)
    }
}
