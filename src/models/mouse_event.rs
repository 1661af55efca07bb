//! Pointer event captured when a key or mouse binding queued a batch

use serde::{Deserialize, Serialize};

/// Snapshot of the mouse event that triggered a command batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MouseEvent {
    /// False when no event is attached
    pub valid: bool,
    pub x: u32,
    pub y: u32,
    pub last_x: u32,
    pub last_y: u32,
    pub button: u32,
    /// Pane the event landed in, if known
    pub pane_id: Option<u32>,
}

impl MouseEvent {
    pub fn new(x: u32, y: u32, button: u32) -> Self {
        Self {
            valid: true,
            x,
            y,
            last_x: x,
            last_y: y,
            button,
            pane_id: None,
        }
    }

    pub fn with_pane(mut self, pane_id: u32) -> Self {
        self.pane_id = Some(pane_id);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
