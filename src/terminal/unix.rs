//! Unix terminal driver
//!
//! Raw mode through termios, window size through `TIOCGWINSZ`, byte I/O on
//! stdin/stdout.

use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;

use nix::errno::Errno;
use nix::libc;
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};

use super::{ReadTiming, TerminalDriver, TerminalError, TerminalResult};
use crate::core::Viewport;

/// The controlling terminal of this process
pub struct UnixTerminal {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl UnixTerminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for UnixTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDriver for UnixTerminal {
    type State = Termios;

    fn capture_state(&mut self) -> TerminalResult<Termios> {
        termios::tcgetattr(&self.stdin).map_err(TerminalError::Query)
    }

    fn make_raw(&self, original: &Termios, timing: ReadTiming) -> Termios {
        let mut raw = original.clone();

        // BRKINT/INPCK/ISTRIP are legacy, IXON is ^S/^Q, ICRNL maps ^M to ^J
        raw.input_flags.remove(
            InputFlags::BRKINT
                | InputFlags::ICRNL
                | InputFlags::INPCK
                | InputFlags::ISTRIP
                | InputFlags::IXON,
        );
        // No "\n" to "\r\n" translation on output
        raw.output_flags.remove(OutputFlags::OPOST);
        raw.control_flags.insert(ControlFlags::CS8);
        // IEXTEN is ^V, ISIG is ^C/^Z
        raw.local_flags.remove(
            LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG,
        );

        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = timing.min_bytes;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = timing.timeout_deciseconds;

        raw
    }

    fn apply_state(&mut self, state: &Termios) -> TerminalResult<()> {
        termios::tcsetattr(&self.stdin, SetArg::TCSAFLUSH, state).map_err(TerminalError::Mode)
    }

    fn query_geometry(&mut self) -> TerminalResult<Viewport> {
        let mut ws = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: TIOCGWINSZ fills in the winsize struct we pass
        let result = unsafe { libc::ioctl(self.stdout.as_raw_fd(), libc::TIOCGWINSZ, &mut ws) };
        if result < 0 {
            return Err(TerminalError::Geometry(Errno::last()));
        }

        let (rows, cols) = (ws.ws_row as usize, ws.ws_col as usize);
        Viewport::new(rows, cols).ok_or(TerminalError::EmptyGeometry { rows, cols })
    }

    fn try_read_byte(&mut self) -> TerminalResult<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.stdin.lock().read(&mut byte) {
            // VMIN=0 / VTIME expired
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(TerminalError::Read(e)),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> TerminalResult<()> {
        let mut out = self.stdout.lock();
        out.write_all(bytes).map_err(TerminalError::Write)?;
        out.flush().map_err(TerminalError::Write)
    }
}
