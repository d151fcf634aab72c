//! Keyboard Input Module
//!
//! Turns the raw byte stream coming from a raw-mode terminal into logical
//! key events. Terminals multiplex special keys onto short escape sequences
//! with shared prefixes, so decoding is done by a small state machine that
//! reads a bounded number of bytes ahead (see [`KeyDecoder`]).
//!
//! # Byte sources
//!
//! The decoder never talks to a terminal directly. It pulls bytes from a
//! [`ByteSource`], whose only contract is `try_read_byte`: `Ok(Some(b))` for a
//! byte, `Ok(None)` when the read timed out with nothing available. That keeps
//! the decoding rules independent of the timeout policy of the driver.

mod decoder;

pub use decoder::{DecodeState, KeyDecoder, Step};

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::terminal::TerminalResult;

/// The escape byte (0x1B)
pub const ESC: u8 = 0x1b;

/// Logical key events produced by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEvent {
    /// A byte that is not a control code
    PrintableChar(u8),
    /// A C0 control code (0x00-0x1F) or DEL
    ControlChar(u8),

    // Cursor keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Navigation
    PageUp,
    PageDown,
    Home,
    End,
    Delete,

    /// A bare or unrecognized escape sequence
    Escape,
    /// The configured quit chord
    Exit,
}

impl KeyEvent {
    /// Check if this key moves the cursor
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            KeyEvent::ArrowUp
                | KeyEvent::ArrowDown
                | KeyEvent::ArrowLeft
                | KeyEvent::ArrowRight
                | KeyEvent::PageUp
                | KeyEvent::PageDown
                | KeyEvent::Home
                | KeyEvent::End
        )
    }

    /// Check if this key belongs to the editing subsystem
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            KeyEvent::PrintableChar(_)
                | KeyEvent::ControlChar(_)
                | KeyEvent::Delete
                | KeyEvent::Escape
        )
    }
}

/// Map a letter to the byte its Ctrl chord produces (`'q'` -> 0x11)
pub const fn ctrl_key(c: u8) -> u8 {
    c & 0x1f
}

/// A source of single bytes with a bounded wait
pub trait ByteSource {
    /// Read one byte, or `None` if nothing arrived before the read timeout
    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>>;
}

/// Scripted byte source; running dry behaves like a read timeout
impl ByteSource for VecDeque<u8> {
    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>> {
        Ok(self.pop_front())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>> {
        (**self).try_read_byte()
    }
}
