//! Test Utilities
//!
//! Shared clients, sessions and command tables for the integration suites.

#![allow(dead_code)]


// Re-exports for convenience
pub use fixtures::{
    attached_client, control_client, detached_client, guard_lines, recording_table, GuardLine,
    Recorder,
};
