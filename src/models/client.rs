//! Client Model
//!
//! The queue's view of a connected client: its protocol flags, the session it
//! is attached to, outbound stdout/stderr buffers with explicit flush
//! requests, a return value and the status-line message.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::models::SessionHandle;

/// Shared handle to a client
pub type ClientHandle = Rc<RefCell<Client>>;

bitflags! {
    /// Client capability and state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClientFlags: u32 {
        /// Client speaks the control protocol
        const CONTROL = 0x1;
        /// Client terminal can display UTF-8
        const UTF8    = 0x2;
        /// Client should exit
        const EXIT    = 0x4;
    }
}

impl ClientFlags {
    pub const NONE: Self = Self::empty();
}

/// A connected client
#[derive(Debug, Default)]
pub struct Client {
    pub name: String,
    pub flags: ClientFlags,
    /// Exit status reported back to the client process
    pub retval: i32,
    session: Option<SessionHandle>,
    stdout_data: String,
    stderr_data: String,
    stdout_pushes: usize,
    stderr_pushes: usize,
    message: Option<String>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: ClientFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn into_handle(self) -> ClientHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn attach(&mut self, session: SessionHandle) {
        self.session = Some(session);
    }

    pub fn detach(&mut self) -> Option<SessionHandle> {
        self.session.take()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn is_control(&self) -> bool {
        self.flags.contains(ClientFlags::CONTROL)
    }

    pub fn has_utf8(&self) -> bool {
        self.flags.contains(ClientFlags::UTF8)
    }

    pub fn should_exit(&self) -> bool {
        self.flags.contains(ClientFlags::EXIT)
    }

    /// Append to the outbound stdout buffer
    pub fn write_stdout(&mut self, data: &str) {
        self.stdout_data.push_str(data);
    }

    /// Append to the outbound stderr buffer
    pub fn write_stderr(&mut self, data: &str) {
        self.stderr_data.push_str(data);
    }

    /// Request that buffered stdout be sent to the client
    pub fn push_stdout(&mut self) {
        self.stdout_pushes += 1;
    }

    /// Request that buffered stderr be sent to the client
    pub fn push_stderr(&mut self) {
        self.stderr_pushes += 1;
    }

    pub fn stdout(&self) -> &str {
        &self.stdout_data
    }

    pub fn stderr(&self) -> &str {
        &self.stderr_data
    }

    /// Number of flush requests made for stdout
    pub fn stdout_pushes(&self) -> usize {
        self.stdout_pushes
    }

    /// Number of flush requests made for stderr
    pub fn stderr_pushes(&self) -> usize {
        self.stderr_pushes
    }

    /// Drain the stdout buffer
    pub fn take_stdout(&mut self) -> String {
        std::mem::take(&mut self.stdout_data)
    }

    /// Drain the stderr buffer
    pub fn take_stderr(&mut self) -> String {
        std::mem::take(&mut self.stderr_data)
    }

    /// Show a transient message on the status line
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}
