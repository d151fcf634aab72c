//! Integration tests for the editor session
//!
//! These tests drive a full `EditorSession` over the in-memory terminal
//! driver: raw mode round-trip, frame output, key handling and the control
//! hand-off from other threads.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tilde::control::{ControlError, OpenRequest};
use tilde::core::{Buffer, BufferCursor, BufferError, CursorPosition, Viewport};
use tilde::input::ctrl_key;
use tilde::session::{EditorSession, SessionError, SessionOptions};
use tilde::terminal::fake::{FakeAttrs, FakeTerminal};
use tilde::terminal::{ReadTiming, TerminalError};

/// Helper to build a session over a fake terminal of the given size
fn start(rows: usize, cols: usize) -> (FakeTerminal, EditorSession<FakeTerminal>) {
    let fake = FakeTerminal::new();
    fake.set_geometry(Viewport::new(rows, cols));
    let session = EditorSession::new(fake.clone(), SessionOptions::default())
        .expect("Failed to start session");
    fake.take_output();
    (fake, session)
}

/// Helper to write a temporary file
fn file_with(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

// ============================================================================
// Terminal Mode Tests
// ============================================================================

#[test]
fn test_attributes_restored_after_exit() {
    let (fake, mut session) = start(24, 80);
    assert!(!fake.attrs().echo);
    assert!(!fake.attrs().canonical);

    fake.push_input(&[ctrl_key(b'q')]);
    session.run().unwrap();
    drop(session);

    assert_eq!(fake.attrs(), FakeAttrs::default());
}

#[test]
fn test_attributes_restored_after_read_error() {
    let (fake, mut session) = start(24, 80);
    fake.fail_read(true);

    let err = session.run().unwrap_err();
    assert!(matches!(err, SessionError::Terminal(TerminalError::Read(_))));
    // The last frame is wiped before the error is reported
    assert!(fake.output().ends_with(b"\x1b[2J\x1b[H"));
    drop(session);

    assert_eq!(fake.attrs(), FakeAttrs::default());
}

#[test]
fn test_custom_read_timeout() {
    let fake = FakeTerminal::new();
    let options = SessionOptions {
        timing: ReadTiming::with_timeout(5),
        ..SessionOptions::default()
    };
    let _session = EditorSession::new(fake.clone(), options).unwrap();

    assert_eq!(fake.attrs().min_bytes, 0);
    assert_eq!(fake.attrs().timeout_deciseconds, 5);
}

#[test]
fn test_window_size_from_probe() {
    let fake = FakeTerminal::new();
    fake.set_geometry(None);
    fake.set_probe_reply(Some(b"\x1b[12;40R".to_vec()));

    let session = EditorSession::new(fake.clone(), SessionOptions::default()).unwrap();
    assert_eq!(session.viewport(), Viewport::new(12, 40).unwrap());
}

#[test]
fn test_unmeasurable_terminal_is_fatal() {
    let fake = FakeTerminal::new();
    fake.set_geometry(None);

    let err = EditorSession::new(fake.clone(), SessionOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Terminal(TerminalError::GeometryProbe(_))
    ));
    assert_eq!(fake.attrs(), FakeAttrs::default());
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_first_frame() {
    let (fake, mut session) = start(3, 20);
    session.refresh_screen().unwrap();

    assert_eq!(
        fake.output(),
        b"\x1b[?25l\x1b[H~\x1b[K\r\n~\x1b[K\r\n~\x1b[K\x1b[1;1H\x1b[?25h".to_vec()
    );
}

#[test]
fn test_frame_tracks_cursor() {
    let (fake, mut session) = start(10, 20);
    fake.push_input(b"\x1b[B\x1b[B\x1b[C\x11");
    session.run().unwrap();

    let output = String::from_utf8(fake.output()).unwrap();
    // Last frame before exit shows the cursor at row 3, column 2
    assert!(output.contains("\x1b[3;2H\x1b[?25h"));
    assert!(output.ends_with("\x1b[2J\x1b[H"));
}

#[test]
fn test_render_failure_does_not_stop_loop() {
    let (fake, mut session) = start(4, 10);
    fake.fail_write(true);
    fake.push_input(b"\x1b[B\x11");

    session.run().unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(0, 1));
}

// ============================================================================
// Key Handling Tests
// ============================================================================

#[test]
fn test_navigation_keys_clamp_to_viewport() {
    let (fake, mut session) = start(5, 8);
    // End, PageDown, Right, Down, then exit
    fake.push_input(b"\x1b[F\x1b[6~\x1b[C\x1b[B\x11");
    session.run().unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(7, 4));

    // Home and PageUp via alternate encodings
    fake.push_input(b"\x1b[1~\x1b[5~\x11");
    session.run().unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(0, 0));
}

#[test]
fn test_editing_keys_leave_cursor_alone() {
    let (fake, mut session) = start(5, 8);
    fake.push_input(b"\x1b[Cabc\x1b[3~\x7f\x1bx\x11");
    session.run().unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(1, 0));
}

#[test]
fn test_custom_exit_key() {
    let fake = FakeTerminal::new();
    let options = SessionOptions {
        exit_byte: ctrl_key(b'x'),
        ..SessionOptions::default()
    };
    let mut session = EditorSession::new(fake.clone(), options).unwrap();

    // Ctrl-Q is an ordinary control byte now
    fake.push_input(&[ctrl_key(b'q'), b'\x1b', b'[', b'B', ctrl_key(b'x')]);
    session.run().unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(0, 1));
}

// ============================================================================
// Buffer Tests
// ============================================================================

#[test]
fn test_open_and_jump_to_line() {
    let (_fake, mut session) = start(24, 80);
    let file = file_with("first\nsecond\nthird\n");

    let buffer = session.open_buffer_from_path(file.path()).unwrap();
    assert_eq!(buffer.line_count(), 3);
    assert_eq!(buffer.line(2).unwrap(), b"second");

    session.move_cursor_to_line(3).unwrap();
    assert_eq!(session.cursor(), CursorPosition::new(0, 2));
}

#[test]
fn test_open_missing_file() {
    let (_fake, mut session) = start(24, 80);
    let err = session
        .open_buffer_from_path("/definitely/not/here.txt")
        .unwrap_err();
    assert!(matches!(err, SessionError::Buffer(BufferError::Open { .. })));
    assert!(session.active_buffer().is_none());
}

#[test]
fn test_range_access_is_not_implemented() {
    let (_fake, mut session) = start(24, 80);
    let file = file_with("text\n");
    session.open_buffer_from_path(file.path()).unwrap();

    let buffer = session.active_buffer().unwrap();
    assert!(matches!(
        buffer.get(BufferCursor::point(1, 0)),
        Err(BufferError::NotImplemented(_))
    ));
}

// ============================================================================
// Control Hand-off Tests
// ============================================================================

#[test]
fn test_control_open_from_other_thread() {
    let (fake, mut session) = start(24, 80);
    let file = file_with("a\nb\nc\nd\n");
    let body = format!("{}:4", file.path().display());
    let handle = session.control_handle();

    let worker = std::thread::spawn(move || handle.open_from_body(&body));

    // The worker blocks until the loop drains the queue
    while !worker.is_finished() {
        session.handle_control_requests();
        std::thread::yield_now();
    }
    worker.join().unwrap().unwrap();

    assert_eq!(session.active_buffer().unwrap().path(), file.path());
    assert_eq!(session.cursor(), CursorPosition::new(0, 3));

    // The next frame reflects the new cursor
    session.refresh_screen().unwrap();
    let output = String::from_utf8(fake.output()).unwrap();
    assert!(output.contains("\x1b[4;1H"));
}

#[test]
fn test_control_open_rejected_line() {
    let (_fake, mut session) = start(24, 80);
    let current = file_with("one\ntwo\nthree\n");
    session.open_buffer_from_path(current.path()).unwrap();
    session.move_cursor_to_line(2).unwrap();

    let file = file_with("only\n");
    let handle = session.control_handle();
    let path: PathBuf = file.path().to_path_buf();

    let worker = std::thread::spawn(move || handle.open(OpenRequest::new(path, 7)));
    while !worker.is_finished() {
        session.handle_control_requests();
        std::thread::yield_now();
    }

    let err = worker.join().unwrap().unwrap_err();
    assert!(matches!(
        err,
        ControlError::Rejected(SessionError::Buffer(BufferError::LineNotFound {
            index: 7,
            count: 1
        }))
    ));

    // The buffer that was open before the request is still active
    assert_eq!(session.active_buffer().unwrap().path(), current.path());
    assert_eq!(session.cursor(), CursorPosition::new(0, 1));
}

#[test]
fn test_control_after_session_ends() {
    let (_fake, session) = start(24, 80);
    let handle = session.control_handle();
    drop(session);

    assert!(matches!(
        handle.current_path(),
        Err(ControlError::Disconnected)
    ));
}
