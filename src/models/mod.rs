//! Core data models for MosaicMux
//!
//! Commands and command lists consumed by the queue, plus the collaborators
//! the queue talks to: clients, sessions with their panes, and targets.

pub mod client;
pub mod command;
pub mod mouse_event;
pub mod session;
pub mod target;

// Re-exports for convenience
pub use client::{Client, ClientFlags, ClientHandle};
pub use command::{Command, CommandEntry, CommandExec, CommandFlags, CommandList};
pub use mouse_event::MouseEvent;
pub use session::{Pane, PaneMode, Session, SessionHandle, Window};
pub use target::FindState;
