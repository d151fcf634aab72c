//! VT100/ANSI sequences written to the terminal

use crate::core::CursorPosition;

/// Hide the cursor while a frame is drawn
pub const HIDE_CURSOR: &[u8] = b"\x1b[?25l";

/// Show the cursor again
pub const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// Move the cursor to the top-left corner
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Erase from the cursor to the end of the line
pub const CLEAR_LINE: &[u8] = b"\x1b[K";

/// Erase the whole screen
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// Device status report: ask for the cursor position
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";

/// Move 999 columns right and 999 rows down; the terminal clamps this to
/// its bottom-right cell
pub const CURSOR_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";

/// Line break in raw mode (no output post-processing)
pub const CRLF: &[u8] = b"\r\n";

/// Append a cursor placement (1-indexed on the wire)
pub fn cursor_to(buf: &mut Vec<u8>, pos: CursorPosition) {
    buf.extend_from_slice(format!("\x1b[{};{}H", pos.y + 1, pos.x + 1).as_bytes());
}
