//! Key Decoder State Machine
//!
//! Decodes raw terminal input into [`KeyEvent`]s. Sequences handled:
//!
//! - `ESC [ A/B/C/D` cursor keys, `ESC [ H/F` home/end
//! - `ESC [ n ~` with n in {1,3,4,5,6,7,8}: home, delete, end, page up/down
//! - `ESC O H/F` home/end (application cursor mode)
//!
//! States:
//! - Ground: waiting for the first byte of a key
//! - Escape: after ESC
//! - Csi: after `ESC [`
//! - CsiNumber: after `ESC [ <digit>`, waiting for `~`
//! - Ss3: after `ESC O`
//!
//! A timeout (`None` input) in any state past Ground resolves to
//! [`KeyEvent::Escape`], as does any byte that does not fit the table. A bare
//! escape is a valid key, never an error.

use super::{ctrl_key, ByteSource, KeyEvent, ESC};
use crate::terminal::TerminalResult;

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Ground,
    Escape,
    Csi,
    CsiNumber(u8),
    Ss3,
}

/// Result of feeding one input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing read in Ground; no key yet
    Idle,
    /// Keep reading in the given state
    Next(DecodeState),
    /// A complete key
    Emit(KeyEvent),
}

/// Turns bytes into keys
#[derive(Debug, Clone, Copy)]
pub struct KeyDecoder {
    exit_byte: u8,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new(ctrl_key(b'q'))
    }
}

impl KeyDecoder {
    /// Create a decoder that reports `exit_byte` as [`KeyEvent::Exit`]
    pub fn new(exit_byte: u8) -> Self {
        Self { exit_byte }
    }

    /// The byte decoded as [`KeyEvent::Exit`]
    pub fn exit_byte(&self) -> u8 {
        self.exit_byte
    }

    /// The transition table
    ///
    /// `input` is `None` when the read timed out.
    pub fn transition(&self, state: DecodeState, input: Option<u8>) -> Step {
        use DecodeState::*;

        match (state, input) {
            (Ground, None) => Step::Idle,
            (Ground, Some(ESC)) => Step::Next(Escape),
            (Ground, Some(byte)) => Step::Emit(self.classify(byte)),

            (Escape, Some(b'[')) => Step::Next(Csi),
            (Escape, Some(b'O')) => Step::Next(Ss3),

            (Csi, Some(digit @ b'0'..=b'9')) => Step::Next(CsiNumber(digit)),
            (Csi, Some(b'A')) => Step::Emit(KeyEvent::ArrowUp),
            (Csi, Some(b'B')) => Step::Emit(KeyEvent::ArrowDown),
            (Csi, Some(b'C')) => Step::Emit(KeyEvent::ArrowRight),
            (Csi, Some(b'D')) => Step::Emit(KeyEvent::ArrowLeft),
            (Csi, Some(b'H')) => Step::Emit(KeyEvent::Home),
            (Csi, Some(b'F')) => Step::Emit(KeyEvent::End),

            (CsiNumber(digit), Some(b'~')) => Step::Emit(tilde_key(digit)),

            (Ss3, Some(b'H')) => Step::Emit(KeyEvent::Home),
            (Ss3, Some(b'F')) => Step::Emit(KeyEvent::End),

            _ => Step::Emit(KeyEvent::Escape),
        }
    }

    /// Block for the next key
    ///
    /// Returns `Ok(None)` when the first read times out; callers loop. Read
    /// errors from the source are returned as-is and are fatal.
    pub fn read_key<S: ByteSource>(&self, mut src: S) -> TerminalResult<Option<KeyEvent>> {
        let mut state = DecodeState::Ground;
        loop {
            let input = src.try_read_byte()?;
            match self.transition(state, input) {
                Step::Idle => return Ok(None),
                Step::Next(next) => state = next,
                Step::Emit(key) => {
                    tracing::trace!(?key, "decoded key");
                    return Ok(Some(key));
                }
            }
        }
    }

    /// Decode a complete byte slice; the end of the slice acts as a timeout
    pub fn decode_all(&self, bytes: &[u8]) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        let mut state = DecodeState::Ground;
        let mut input = bytes.iter().copied();

        loop {
            match self.transition(state, input.next()) {
                Step::Idle => break,
                Step::Next(next) => state = next,
                Step::Emit(key) => {
                    keys.push(key);
                    state = DecodeState::Ground;
                }
            }
        }

        keys
    }

    fn classify(&self, byte: u8) -> KeyEvent {
        if byte == self.exit_byte {
            KeyEvent::Exit
        } else if byte.is_ascii_control() {
            KeyEvent::ControlChar(byte)
        } else {
            KeyEvent::PrintableChar(byte)
        }
    }
}

/// Keys of the form `ESC [ n ~`
fn tilde_key(digit: u8) -> KeyEvent {
    match digit {
        b'1' | b'7' => KeyEvent::Home,
        b'3' => KeyEvent::Delete,
        b'4' | b'8' => KeyEvent::End,
        b'5' => KeyEvent::PageUp,
        b'6' => KeyEvent::PageDown,
        _ => KeyEvent::Escape,
    }
}
