//! Queue item: one command list waiting in (or at the head of) a queue

use crate::models::{CommandList, MouseEvent};

/// A command list plus the mouse event that was current when it was queued
#[derive(Debug, Clone)]
pub struct QueueItem {
    list: CommandList,
    mouse: MouseEvent,
}

impl QueueItem {
    /// Take a reference on `list` and snapshot `mouse`
    pub fn new(list: &CommandList, mouse: Option<&MouseEvent>) -> Self {
        Self {
            list: list.clone(),
            mouse: mouse.copied().unwrap_or_default(),
        }
    }

    pub fn list(&self) -> &CommandList {
        &self.list
    }

    /// Mouse event visible to the commands in this item, if one was captured
    pub fn mouse(&self) -> Option<&MouseEvent> {
        self.mouse.is_valid().then_some(&self.mouse)
    }
}
