//! Editor Core Module
//!
//! Platform-independent editor state. This module contains:
//! - Viewport bounds and the screen cursor
//! - File buffers addressed by line
//!
//! Nothing in here touches the terminal: cursor transitions are pure
//! functions of (position, key, viewport).

mod buffer;
mod cursor;

pub use buffer::{Buffer, BufferCursor, BufferError, BufferResult, LineBuffer};
pub use cursor::{CursorPosition, Viewport};
