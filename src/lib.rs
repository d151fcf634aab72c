//! Tilde Editor Library
//!
//! The terminal I/O core of a small text editor. It puts the controlling
//! terminal into raw mode, decodes keys, tracks a cursor inside the window
//! and draws the screen with VT100 escape sequences:
//!
//! - `terminal`: raw mode, window size, guaranteed restore
//! - `input`: key events and the escape sequence decoder
//! - `core`: viewport, cursor and line buffers
//! - `renderer`: frame composition
//! - `session`: the editor loop tying everything together
//! - `control`: thread-safe requests from outside the editor loop
//! - `app`: configuration and command line

pub mod app;
pub mod control;
pub mod core;
pub mod input;
pub mod renderer;
pub mod session;
pub mod terminal;
