//! Cursor position and viewport bounds
//!
//! The cursor is screen-relative and 0-indexed. Every transition clamps to
//! the viewport: moving past an edge leaves the cursor on the edge, it never
//! wraps.

use serde::{Deserialize, Serialize};

use crate::input::KeyEvent;

/// Visible terminal area, never empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    rows: usize,
    cols: usize,
}

impl Viewport {
    /// Create a viewport, `None` if either dimension is zero
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn last_row(&self) -> usize {
        self.rows - 1
    }

    pub fn last_col(&self) -> usize {
        self.cols - 1
    }

    /// Check if a position lies inside the viewport
    pub fn contains(&self, pos: CursorPosition) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }
}

/// Cursor position (0-indexed column `x`, row `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: usize,
    pub y: usize,
}

impl CursorPosition {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Pull the position back inside `viewport`
    pub fn clamped(self, viewport: Viewport) -> Self {
        Self {
            x: self.x.min(viewport.last_col()),
            y: self.y.min(viewport.last_row()),
        }
    }

    /// Apply a movement key
    ///
    /// Page motions replay the single-row motion once per visible row. Keys
    /// that do not move the cursor leave it where it is.
    pub fn moved(self, key: KeyEvent, viewport: Viewport) -> Self {
        let pos = self.clamped(viewport);

        match key {
            KeyEvent::ArrowLeft => Self {
                x: pos.x.saturating_sub(1),
                ..pos
            },
            KeyEvent::ArrowRight => Self {
                x: (pos.x + 1).min(viewport.last_col()),
                ..pos
            },
            KeyEvent::ArrowUp => Self {
                y: pos.y.saturating_sub(1),
                ..pos
            },
            KeyEvent::ArrowDown => Self {
                y: (pos.y + 1).min(viewport.last_row()),
                ..pos
            },
            KeyEvent::PageUp => pos.repeat(KeyEvent::ArrowUp, viewport.rows(), viewport),
            KeyEvent::PageDown => pos.repeat(KeyEvent::ArrowDown, viewport.rows(), viewport),
            KeyEvent::Home => Self { x: 0, ..pos },
            KeyEvent::End => Self {
                x: viewport.last_col(),
                ..pos
            },
            _ => pos,
        }
    }

    fn repeat(self, key: KeyEvent, times: usize, viewport: Viewport) -> Self {
        (0..times).fold(self, |pos, _| pos.moved(key, viewport))
    }
}
