//! In-memory terminal driver
//!
//! Models the terminal attributes as plain booleans, keeps every byte written
//! and serves scripted input. Clones share the same underlying terminal, so a
//! test can hand one clone to the code under test and inspect the other after
//! the first has been dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use nix::errno::Errno;

use super::{ReadTiming, TerminalDriver, TerminalError, TerminalResult};
use crate::core::Viewport;
use crate::renderer::ansi;

/// Terminal attributes, one flag per termios bit the raw mode touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAttrs {
    pub echo: bool,
    pub canonical: bool,
    pub signals: bool,
    pub extended_input: bool,
    pub flow_control: bool,
    pub cr_to_nl: bool,
    pub post_processing: bool,
    pub eight_bit: bool,
    pub min_bytes: u8,
    pub timeout_deciseconds: u8,
}

/// A cooked-mode terminal
impl Default for FakeAttrs {
    fn default() -> Self {
        Self {
            echo: true,
            canonical: true,
            signals: true,
            extended_input: true,
            flow_control: true,
            cr_to_nl: true,
            post_processing: true,
            eight_bit: false,
            min_bytes: 1,
            timeout_deciseconds: 0,
        }
    }
}

#[derive(Debug)]
struct FakeTty {
    attrs: FakeAttrs,
    applied: Vec<FakeAttrs>,
    input: VecDeque<u8>,
    output: Vec<u8>,
    geometry: Option<Viewport>,
    probe_reply: Option<Vec<u8>>,
    fail_capture: bool,
    fail_apply: bool,
    fail_read: bool,
    fail_write: bool,
}

/// Shared handle to an in-memory terminal
#[derive(Debug, Clone)]
pub struct FakeTerminal {
    tty: Rc<RefCell<FakeTty>>,
}

impl Default for FakeTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTerminal {
    /// A cooked 24x80 terminal with no pending input
    pub fn new() -> Self {
        Self {
            tty: Rc::new(RefCell::new(FakeTty {
                attrs: FakeAttrs::default(),
                applied: Vec::new(),
                input: VecDeque::new(),
                output: Vec::new(),
                geometry: Viewport::new(24, 80),
                probe_reply: None,
                fail_capture: false,
                fail_apply: false,
                fail_read: false,
                fail_write: false,
            })),
        }
    }

    /// Queue bytes as if the user typed them
    pub fn push_input(&self, bytes: &[u8]) {
        self.tty.borrow_mut().input.extend(bytes.iter().copied());
    }

    /// Bytes still waiting to be read
    pub fn pending_input(&self) -> usize {
        self.tty.borrow().input.len()
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.tty.borrow().output.clone()
    }

    /// Everything written so far, clearing the record
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.tty.borrow_mut().output)
    }

    /// Current attributes
    pub fn attrs(&self) -> FakeAttrs {
        self.tty.borrow().attrs.clone()
    }

    /// Every attribute set applied, in order
    pub fn applied(&self) -> Vec<FakeAttrs> {
        self.tty.borrow().applied.clone()
    }

    /// Size reported by the geometry query; `None` makes the query fail
    pub fn set_geometry(&self, geometry: Option<Viewport>) {
        self.tty.borrow_mut().geometry = geometry;
    }

    /// Bytes the terminal answers with when it sees a cursor position query
    pub fn set_probe_reply(&self, reply: Option<Vec<u8>>) {
        self.tty.borrow_mut().probe_reply = reply;
    }

    pub fn fail_capture(&self, fail: bool) {
        self.tty.borrow_mut().fail_capture = fail;
    }

    pub fn fail_apply(&self, fail: bool) {
        self.tty.borrow_mut().fail_apply = fail;
    }

    pub fn fail_read(&self, fail: bool) {
        self.tty.borrow_mut().fail_read = fail;
    }

    pub fn fail_write(&self, fail: bool) {
        self.tty.borrow_mut().fail_write = fail;
    }
}

impl TerminalDriver for FakeTerminal {
    type State = FakeAttrs;

    fn capture_state(&mut self) -> TerminalResult<FakeAttrs> {
        let tty = self.tty.borrow();
        if tty.fail_capture {
            return Err(TerminalError::Query(Errno::ENOTTY));
        }
        Ok(tty.attrs.clone())
    }

    fn make_raw(&self, original: &FakeAttrs, timing: ReadTiming) -> FakeAttrs {
        let mut raw = original.clone();
        raw.echo = false;
        raw.canonical = false;
        raw.signals = false;
        raw.extended_input = false;
        raw.flow_control = false;
        raw.cr_to_nl = false;
        raw.post_processing = false;
        raw.eight_bit = true;
        raw.min_bytes = timing.min_bytes;
        raw.timeout_deciseconds = timing.timeout_deciseconds;
        raw
    }

    fn apply_state(&mut self, state: &FakeAttrs) -> TerminalResult<()> {
        let mut tty = self.tty.borrow_mut();
        if tty.fail_apply {
            return Err(TerminalError::Mode(Errno::EIO));
        }
        tty.attrs = state.clone();
        tty.applied.push(state.clone());
        Ok(())
    }

    fn query_geometry(&mut self) -> TerminalResult<Viewport> {
        self.tty
            .borrow()
            .geometry
            .ok_or(TerminalError::Geometry(Errno::ENOTTY))
    }

    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>> {
        let mut tty = self.tty.borrow_mut();
        if tty.fail_read {
            return Err(TerminalError::Read(io::Error::other("fake read failure")));
        }
        Ok(tty.input.pop_front())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> TerminalResult<()> {
        let mut tty = self.tty.borrow_mut();
        if tty.fail_write {
            return Err(TerminalError::Write(io::Error::other("fake write failure")));
        }
        tty.output.extend_from_slice(bytes);

        if bytes == ansi::CURSOR_POSITION_QUERY {
            if let Some(reply) = tty.probe_reply.clone() {
                tty.input.extend(reply);
            }
        }
        Ok(())
    }
}
