//! Editor Session
//!
//! One owned structure holding everything an editor run needs: the raw-mode
//! terminal, the viewport, the cursor, the active buffer and the control
//! queue. The main loop is single-threaded:
//!
//! ```text
//! drain control queue -> render frame -> block for key -> dispatch -> repeat
//! ```
//!
//! Dropping the session drops the [`Terminal`], which restores the original
//! terminal attributes, so every exit path (including `?` on a fatal error)
//! leaves the user's shell usable.

use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, info, warn};

use crate::app::Config;
use crate::control::{self, ControlHandle, ControlRequest, OpenRequest};
use crate::core::{Buffer, BufferError, CursorPosition, LineBuffer, Viewport};
use crate::input::{ctrl_key, KeyDecoder, KeyEvent};
use crate::renderer::{RenderError, Renderer};
use crate::terminal::{ReadTiming, Terminal, TerminalDriver, TerminalError};

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("No buffer is open")]
    NoActiveBuffer,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// What the main loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Receiver for keys that belong to the editing subsystem
pub trait EditHandler {
    fn handle_edit(&mut self, key: KeyEvent, cursor: CursorPosition, buffer: Option<&LineBuffer>);
}

/// Logs editing keys and otherwise ignores them
#[derive(Debug, Default)]
pub struct LogEdits;

impl EditHandler for LogEdits {
    fn handle_edit(&mut self, key: KeyEvent, cursor: CursorPosition, _buffer: Option<&LineBuffer>) {
        debug!(?key, x = cursor.x, y = cursor.y, "editing key");
    }
}

impl<F> EditHandler for F
where
    F: FnMut(KeyEvent, CursorPosition, Option<&LineBuffer>),
{
    fn handle_edit(&mut self, key: KeyEvent, cursor: CursorPosition, buffer: Option<&LineBuffer>) {
        self(key, cursor, buffer)
    }
}

/// Session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub timing: ReadTiming,
    /// Byte that ends the session
    pub exit_byte: u8,
    /// Marker drawn on each row
    pub filler: u8,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timing: ReadTiming::default(),
            exit_byte: ctrl_key(b'q'),
            filler: b'~',
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            timing: ReadTiming::with_timeout(config.read_timeout_deciseconds),
            exit_byte: ctrl_key(config.exit_key as u8),
            filler: config.filler as u8,
        }
    }
}

/// A running editor
pub struct EditorSession<D: TerminalDriver> {
    terminal: Terminal<D>,
    decoder: KeyDecoder,
    renderer: Renderer,
    viewport: Viewport,
    cursor: CursorPosition,
    buffer: Option<LineBuffer>,
    edit_handler: Box<dyn EditHandler>,
    control_handle: ControlHandle,
    control_rx: Receiver<ControlRequest>,
}

impl<D: TerminalDriver> std::fmt::Debug for EditorSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("terminal", &self.terminal)
            .field("viewport", &self.viewport)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<D: TerminalDriver> EditorSession<D> {
    /// Put the terminal in raw mode and measure it
    pub fn new(driver: D, options: SessionOptions) -> SessionResult<Self> {
        let mut terminal = Terminal::enable_raw_mode(driver, options.timing)?;
        // On failure `terminal` is dropped here and restores the tty
        let viewport = terminal.window_size()?;
        let (control_handle, control_rx) = control::channel();

        info!(
            rows = viewport.rows(),
            cols = viewport.cols(),
            "editor session started"
        );

        Ok(Self {
            terminal,
            decoder: KeyDecoder::new(options.exit_byte),
            renderer: Renderer::new(options.filler),
            viewport,
            cursor: CursorPosition::default(),
            buffer: None,
            edit_handler: Box::new(LogEdits),
            control_handle,
            control_rx,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn active_buffer(&self) -> Option<&LineBuffer> {
        self.buffer.as_ref()
    }

    pub fn terminal(&self) -> &Terminal<D> {
        &self.terminal
    }

    /// A handle other threads can use to reach this session
    pub fn control_handle(&self) -> ControlHandle {
        self.control_handle.clone()
    }

    /// Replace the receiver of editing keys
    pub fn set_edit_handler(&mut self, handler: impl EditHandler + 'static) {
        self.edit_handler = Box::new(handler);
    }

    /// Load `path` and make it the active buffer
    ///
    /// On failure the active buffer is left as it was.
    pub fn open_buffer_from_path(&mut self, path: impl AsRef<Path>) -> SessionResult<&LineBuffer> {
        let buffer = LineBuffer::open(path)?;
        Ok(self.install_buffer(buffer))
    }

    fn install_buffer(&mut self, buffer: LineBuffer) -> &LineBuffer {
        info!(path = %buffer.path().display(), lines = buffer.line_count(), "opened buffer");
        self.buffer.insert(buffer)
    }

    /// Put the cursor at the start of `line` (1-based) of the active buffer
    ///
    /// The row is clamped to the viewport.
    pub fn move_cursor_to_line(&mut self, line: usize) -> SessionResult<()> {
        let buffer = self.buffer.as_ref().ok_or(SessionError::NoActiveBuffer)?;
        buffer.line(line)?;

        self.cursor = CursorPosition::new(0, line - 1).clamped(self.viewport);
        debug!(line, y = self.cursor.y, "cursor moved to line");
        Ok(())
    }

    /// Draw the current frame
    pub fn refresh_screen(&mut self) -> Result<(), RenderError> {
        self.renderer
            .render(&mut self.terminal, self.viewport, self.cursor)
    }

    /// Wait for one key and act on it
    ///
    /// Returns [`Flow::Continue`] when the read timed out without a key.
    pub fn process_key(&mut self) -> SessionResult<Flow> {
        match self.decoder.read_key(&mut self.terminal)? {
            Some(key) => Ok(self.dispatch(key)),
            None => Ok(Flow::Continue),
        }
    }

    /// Act on a decoded key
    pub fn dispatch(&mut self, key: KeyEvent) -> Flow {
        debug!(?key, "dispatch");

        match key {
            KeyEvent::Exit => {
                self.clear_before_exit();
                Flow::Exit
            }
            key if key.is_movement() => {
                self.cursor = self.cursor.moved(key, self.viewport);
                Flow::Continue
            }
            key => {
                self.edit_handler
                    .handle_edit(key, self.cursor, self.buffer.as_ref());
                Flow::Continue
            }
        }
    }

    /// Run every queued control request
    pub fn handle_control_requests(&mut self) {
        loop {
            match self.control_rx.try_recv() {
                Ok(request) => self.handle_control_request(request),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn handle_control_request(&mut self, request: ControlRequest) {
        match request {
            ControlRequest::CurrentPath { reply } => {
                let path = self.buffer.as_ref().map(|b| b.path().to_path_buf());
                let _ = reply.send(path);
            }
            ControlRequest::Open { request, reply } => {
                let result = self.open_at(&request);
                if let Err(e) = &result {
                    warn!(path = %request.path.display(), "control open failed: {}", e);
                }
                let _ = reply.send(result);
            }
        }
    }

    /// Both the file and the line are checked before the active buffer changes
    fn open_at(&mut self, request: &OpenRequest) -> SessionResult<()> {
        let buffer = LineBuffer::open(&request.path)?;
        buffer.line(request.line)?;
        self.install_buffer(buffer);
        self.move_cursor_to_line(request.line)
    }

    /// The main loop; returns when the exit key is pressed
    ///
    /// Render failures are logged and the next frame is attempted. Read
    /// failures clear the screen and end the loop with an error.
    pub fn run(&mut self) -> SessionResult<()> {
        loop {
            self.handle_control_requests();

            if let Err(e) = self.refresh_screen() {
                warn!("render failed: {}", e);
            }

            match self.process_key() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    info!("exit key pressed");
                    return Ok(());
                }
                Err(e) => {
                    self.clear_before_exit();
                    return Err(e);
                }
            }
        }
    }

    fn clear_before_exit(&mut self) {
        if let Err(e) = self.renderer.clear_screen(&mut self.terminal) {
            warn!("failed to clear screen on exit: {}", e);
        }
    }

    /// Restore the terminal, reporting failure instead of only logging it
    pub fn finish(mut self) -> SessionResult<()> {
        self.terminal.restore()?;
        Ok(())
    }
}
