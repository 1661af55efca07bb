//! MosaicMux - command queues for a terminal multiplexer
//!
//! This library provides the scheduler that runs multiplexer commands on
//! behalf of clients, configuration loading and hooks.
//!
//! ## Features
//!
//! - **Per-client FIFO:** Command lists run strictly in submission order
//! - **Cooperative waits:** A command can suspend its queue and be resumed later
//! - **Output routing:** Messages go to stdout/stderr, a pane overlay, the
//!   status line or a cause list depending on the client
//! - **Control guards:** `%begin` / `%end` / `%error` lines for control clients
//! - **Hooks:** `after-<command>` lists run on child queues
//!
//! ## Module Organization
//!
//! ### Core Functionality
//!
//! - [`queue`] - The command queue state machine and output routing
//! - [`models`] - Commands, clients, sessions and targets
//! - [`hooks`] - Hook tables and the hook wait protocol
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Collaborators
//!
//! - [`parse`] - Command table and command-line parser
//! - [`commands`] - Built-in commands
//! - [`cfg`] - Sourcing command files and collecting load errors
//! - [`config`] - Runtime configuration (TOML/JSON)
//!
//! ## Quick Start
//!
//! ```
//! use mosaicmux::{builtin_table, CauseSink, CmdQueue, QueueStatus};
//! use mosaicmux::models::{Client, ClientFlags};
//!
//! let client = Client::new("ctl").with_flags(ClientFlags::CONTROL).into_handle();
//! let cmdq = CmdQueue::new(Some(client.clone()), CauseSink::new());
//! let list = builtin_table().parse("display-message hello", None, 0).unwrap();
//!
//! assert_eq!(cmdq.run(&list, None), Some(QueueStatus::Empty));
//! assert!(client.borrow().stdout().contains("hello"));
//! ```
//!
//! ## Architecture
//!
//! Everything runs on one thread. Queues, clients and sessions are shared
//! through `Rc` handles with interior mutability, and commands are allowed
//! to call back into the queue that is running them.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod cfg;
pub mod commands;
pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod parse;
pub mod queue;

// Re-exports for core functionality
pub use cfg::{source_file, source_str, Cause, CauseSink};
pub use commands::{builtin_table, register_builtins};
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use error::{Error, Result};
pub use hooks::{HookWait, HookWaiter, Hooks, NoHooks};
pub use parse::CommandTable;
pub use queue::{CmdQueue, CmdRetval, QueueStatus, ReleaseStatus};

// Version information
/// The current version of MosaicMux from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration, falling back to defaults when loading fails
///
/// An explicit `path` must load; the default search locations are allowed
/// to be missing or broken.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    if let Some(path) = path {
        let config = ConfigLoader::load_from_file(path)?;
        info!("Configuration loaded from {}", path.display());
        return Ok(config);
    }

    match ConfigLoader::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults", e);
            Ok(Config::default())
        }
    }
}
