//! Command Model
//!
//! A [`Command`] is one parsed step of a [`CommandList`]: the registered
//! [`CommandEntry`] it invokes, its arguments, per-invocation flags and the
//! file/line it was read from. Command lists are immutable once built and
//! shared by reference count between every queue item that holds them.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::models::FindState;
use crate::queue::{CmdQueue, CmdRetval};

bitflags! {
    /// Behavioural flags on a command entry or a single invocation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u32 {
        /// Invocation came from a control-protocol client
        const CONTROL    = 0x1;
        /// Fire `after-<name>` hooks once the command has run without error
        const AFTER_HOOK = 0x2;
    }
}

impl CommandFlags {
    /// No flags set
    pub const NONE: Self = Self::empty();
}

/// Execution capability of a command entry
pub trait CommandExec {
    /// Run the command against the queue executing it
    fn exec(&self, cmd: &Command, cmdq: &CmdQueue) -> CmdRetval;
}

impl<F> CommandExec for F
where
    F: Fn(&Command, &CmdQueue) -> CmdRetval,
{
    fn exec(&self, cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
        self(cmd, cmdq)
    }
}

/// A registered command: name, usage and the code that runs it
pub struct CommandEntry {
    /// Full command name (e.g. `display-message`)
    pub name: String,
    /// Optional short alias (e.g. `display`)
    pub alias: Option<String>,
    /// One-line usage string
    pub usage: String,
    /// Entry-level flags such as [`CommandFlags::AFTER_HOOK`]
    pub flags: CommandFlags,
    exec: Box<dyn CommandExec>,
}

impl CommandEntry {
    /// Create a new entry with no alias, usage or flags
    pub fn new(name: impl Into<String>, exec: impl CommandExec + 'static) -> Self {
        Self {
            name: name.into(),
            alias: None,
            usage: String::new(),
            flags: CommandFlags::NONE,
            exec: Box::new(exec),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Invoke the entry's execution capability
    pub fn exec(&self, cmd: &Command, cmdq: &CmdQueue) -> CmdRetval {
        self.exec.exec(cmd, cmdq)
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// One parsed command invocation
#[derive(Clone)]
pub struct Command {
    entry: Rc<CommandEntry>,
    /// Arguments after the command name
    pub args: Vec<String>,
    /// Per-invocation flags
    pub flags: CommandFlags,
    /// Explicit target, if the invocation named one
    pub target: Option<FindState>,
    /// File the command was read from
    pub file: Option<String>,
    /// Line within `file`
    pub line: u32,
}

impl Command {
    pub fn new(entry: Rc<CommandEntry>, args: Vec<String>) -> Self {
        Self {
            entry,
            args,
            flags: CommandFlags::NONE,
            target: None,
            file: None,
            line: 0,
        }
    }

    pub fn with_source(mut self, file: Option<&str>, line: u32) -> Self {
        self.file = file.map(str::to_string);
        self.line = line;
        self
    }

    pub fn with_target(mut self, target: FindState) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn entry(&self) -> &CommandEntry {
        &self.entry
    }

    /// Whether the invocation came from a control-protocol client
    pub fn is_control(&self) -> bool {
        self.flags.contains(CommandFlags::CONTROL)
    }

    /// Whether a run that did not fail should fire `after-<name>` hooks
    pub fn fires_after_hook(&self) -> bool {
        self.entry.flags.contains(CommandFlags::AFTER_HOOK)
    }

    /// Flags value written on guard lines
    pub fn guard_flags(&self) -> i32 {
        i32::from(self.is_control())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry.name)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains(';') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.entry.name)
            .field("args", &self.args)
            .field("flags", &self.flags)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish()
    }
}

/// Ordered, immutable batch of commands shared by reference count
#[derive(Clone)]
pub struct CommandList {
    commands: Rc<[Command]>,
}

impl CommandList {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands: Rc::from(commands),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Number of live holders of this list
    pub fn references(&self) -> usize {
        Rc::strong_count(&self.commands)
    }

    /// Whether two handles refer to the same list
    pub fn ptr_eq(&self, other: &CommandList) -> bool {
        Rc::ptr_eq(&self.commands, &other.commands)
    }
}

impl fmt::Display for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " ; ")?;
            }
            write!(f, "{}", cmd)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.commands.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
