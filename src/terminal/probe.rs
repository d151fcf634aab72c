//! Cursor position report parsing (`ESC [ rows ; cols R`)

use super::{TerminalError, TerminalResult};
use crate::core::Viewport;

/// Parse a cursor position report with the terminating `R` already stripped
pub fn parse_cursor_report(reply: &[u8]) -> TerminalResult<Viewport> {
    let body = reply
        .strip_prefix(b"\x1b[")
        .ok_or_else(|| probe_error(format!("reply does not start with ESC [: {:?}", reply)))?;

    let body = std::str::from_utf8(body)
        .map_err(|_| probe_error(format!("reply is not ASCII: {:?}", reply)))?;

    let fields: Vec<&str> = body.split(';').collect();
    if fields.len() != 2 {
        return Err(probe_error(format!(
            "expected 2 fields in reply, got {}",
            fields.len()
        )));
    }

    let rows = parse_field(fields[0])?;
    let cols = parse_field(fields[1])?;

    Viewport::new(rows, cols).ok_or(TerminalError::EmptyGeometry { rows, cols })
}

fn parse_field(field: &str) -> TerminalResult<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(probe_error(format!("not a number: {:?}", field)));
    }
    field
        .parse()
        .map_err(|e| probe_error(format!("bad number {:?}: {}", field, e)))
}

fn probe_error(msg: String) -> TerminalError {
    TerminalError::GeometryProbe(msg)
}
