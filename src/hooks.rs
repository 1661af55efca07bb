//! Hooks: command lists run after other commands
//!
//! The queue only needs one thing from a hook scope: "run the hooks called
//! `name` for this target and tell me whether I must wait for them". That is
//! the [`HookWaiter`] trait. [`Hooks`] is the table-backed implementation
//! sessions use; [`NoHooks`] never has anything to run.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::models::{CommandList, FindState};
use crate::queue::{CmdQueue, QueueStatus, ReleaseStatus};

/// Whether a hook finished before `wait` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookWait {
    /// Nothing to wait for
    Done,
    /// The hook is still running and will resume the waiting queue itself
    Pending,
}

/// A scope that can run named hooks on behalf of a queue
pub trait HookWaiter {
    fn wait(&self, cmdq: &CmdQueue, target: &FindState, name: &str) -> HookWait;
}

/// Hook scope with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl HookWaiter for NoHooks {
    fn wait(&self, _cmdq: &CmdQueue, _target: &FindState, _name: &str) -> HookWait {
        HookWait::Done
    }
}

/// Table of hook command lists keyed by hook name
#[derive(Debug, Default)]
pub struct Hooks {
    table: RefCell<BTreeMap<String, CommandList>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, list: CommandList) {
        self.table.borrow_mut().insert(name.into(), list);
    }

    pub fn remove(&self, name: &str) -> Option<CommandList> {
        self.table.borrow_mut().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<CommandList> {
        self.table.borrow().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.table.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

impl HookWaiter for Hooks {
    /// Run hook `name` on a child queue. If it finishes straight away the
    /// caller carries on; otherwise the child resumes the caller when it drains.
    fn wait(&self, cmdq: &CmdQueue, target: &FindState, name: &str) -> HookWait {
        if cmdq.hooks_disabled() {
            return HookWait::Done;
        }
        let Some(list) = self.get(name) else {
            return HookWait::Done;
        };
        debug!(cmdq = %cmdq.id(), hook = name, "running hook: {}", list);

        let hook_queue = CmdQueue::new(None, cmdq.causes().clone());
        hook_queue.disable_hooks();
        hook_queue.set_parent(cmdq.clone());
        hook_queue.set_current(target.clone());

        let returned = Rc::new(Cell::new(false));
        let waiting = cmdq.clone();
        let resume = Rc::clone(&returned);
        cmdq.retain();
        hook_queue.set_empty_callback(move |hook_queue| {
            let status = waiting.release();
            if resume.get() && status == ReleaseStatus::Referenced {
                waiting.continue_processing();
            }
            hook_queue.release();
        });

        let status = hook_queue.run(&list, None);
        returned.set(true);

        match status {
            Some(QueueStatus::Empty) => HookWait::Done,
            _ => HookWait::Pending,
        }
    }
}
