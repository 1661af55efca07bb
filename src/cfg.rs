//! Configuration command loading
//!
//! Commands read from configuration run on a queue with no client, so their
//! errors have nowhere to be shown. They are collected in a [`CauseSink`]
//! instead and reported by whoever did the loading once it is finished.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::parse::CommandTable;
use crate::queue::CmdQueue;

/// One recorded configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    pub file: Option<String>,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}: {}", file, self.line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Shared, append-only collector of configuration errors
#[derive(Debug, Clone, Default)]
pub struct CauseSink {
    causes: Rc<RefCell<Vec<Cause>>>,
}

impl CauseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cause(&self, file: Option<&str>, line: u32, message: &str) {
        let cause = Cause {
            file: file.map(str::to_string),
            line,
            message: message.to_string(),
        };
        debug!("cfg cause: {}", cause);
        self.causes.borrow_mut().push(cause);
    }

    /// Snapshot of the recorded causes
    pub fn causes(&self) -> Vec<Cause> {
        self.causes.borrow().clone()
    }

    /// Remove and return every recorded cause
    pub fn take(&self) -> Vec<Cause> {
        std::mem::take(&mut *self.causes.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.causes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.borrow().is_empty()
    }
}

/// Parse a command file and append each line to `cmdq`. Lines that fail to
/// parse are recorded as causes on the queue's sink. Returns the number of
/// command lists queued.
pub fn source_file(path: &Path, table: &CommandTable, cmdq: &CmdQueue) -> Result<usize> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let name = path.display().to_string();
    debug!("loading {}", name);
    Ok(source_str(&content, Some(&name), table, cmdq))
}

/// Parse command text line by line and append each line to `cmdq`
pub fn source_str(content: &str, file: Option<&str>, table: &CommandTable, cmdq: &CmdQueue) -> usize {
    let mut queued = 0;

    for (index, raw) in content.lines().enumerate() {
        let line = index as u32 + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        match table.parse(text, file, line) {
            Ok(list) => {
                cmdq.append(&list, None);
                queued += 1;
            }
            Err(Error::ParseFailed { reason, .. }) => {
                cmdq.causes().add_cause(file, line, &reason);
            }
            Err(e) => {
                cmdq.causes().add_cause(file, line, &e.to_string());
            }
        }
    }

    queued
}
