//! Command Queue
//!
//! A [`CmdQueue`] owns a FIFO of command lists submitted by one client (or by
//! configuration loading and hooks, which have no client) and runs them one
//! command at a time. Each command's [`CmdRetval`] decides what happens next:
//!
//! - [`CmdRetval::Normal`]: move on to the next command
//! - [`CmdRetval::Error`]: skip the rest of this command list
//! - [`CmdRetval::Wait`]: stop here; a later [`CmdQueue::continue_processing`]
//!   resumes at the following command
//! - [`CmdRetval::Stop`]: discard everything left in the queue
//!
//! Queues are reference counted twice over. The [`CmdQueue`] handle is an `Rc`
//! so the storage lives as long as anybody holds a handle, and on top of that a
//! logical count ([`CmdQueue::retain`] / [`CmdQueue::release`]) decides when
//! the queue is destroyed (flushed and disconnected). `continue_processing`
//! holds a logical reference for its whole duration, so a command releasing
//! the queue it is running on cannot destroy it mid-call.
//!
//! All state lives behind `RefCell`s and no borrow is held while a command
//! executes, so commands may freely print, append or flush their own queue.

mod item;
mod output;

pub use item::QueueItem;
pub use output::utf8_sanitize;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use uuid::Uuid;

use crate::cfg::CauseSink;
use crate::error::{Error, Result};
use crate::hooks::HookWait;
use crate::models::{ClientFlags, ClientHandle, Command, CommandList, FindState, MouseEvent};

/// Outcome of executing a single command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdRetval {
    /// Proceed to the next command
    Normal,
    /// Abandon the rest of the current command list
    Error,
    /// Suspend until resumed from outside
    Wait,
    /// Discard the whole queue
    Stop,
}

/// Result of a [`CmdQueue::continue_processing`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Everything queued has been processed
    Empty,
    /// A command is waiting; the queue still holds work
    Waiting,
}

/// Result of a [`CmdQueue::release`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    /// Last reference dropped; the queue has been flushed and destroyed
    Destroyed,
    /// References remain but the queue is marked dead; do not use it further
    StillBusy,
    /// References remain
    Referenced,
}

type EmptyCallback = Box<dyn FnOnce(&CmdQueue)>;

struct QueueState {
    items: VecDeque<QueueItem>,
    /// Index of the current command in the head item; `None` when idle
    cursor: Option<usize>,
    /// Inherited target of the queue
    current: FindState,
    /// Target bound for the command being executed
    target: FindState,
    time: i64,
    number: u32,
}

struct QueueInner {
    id: Uuid,
    client: Option<ClientHandle>,
    causes: CauseSink,
    references: Cell<u32>,
    dead: Cell<bool>,
    destroyed: Cell<bool>,
    no_hooks: Cell<bool>,
    client_exit: Cell<bool>,
    parent: RefCell<Option<CmdQueue>>,
    empty_fn: RefCell<Option<EmptyCallback>>,
    state: RefCell<QueueState>,
}

/// Shared handle to a command queue
#[derive(Clone)]
pub struct CmdQueue {
    inner: Rc<QueueInner>,
}

/// Logical reference held for the duration of a scope
struct QueueRef<'a> {
    cmdq: &'a CmdQueue,
}

impl<'a> QueueRef<'a> {
    fn acquire(cmdq: &'a CmdQueue) -> Self {
        cmdq.retain();
        Self { cmdq }
    }
}

impl Drop for QueueRef<'_> {
    fn drop(&mut self) {
        self.cmdq.release();
    }
}

impl CmdQueue {
    /// Create a queue with one logical reference owned by the caller
    pub fn new(client: Option<ClientHandle>, causes: CauseSink) -> Self {
        let id = Uuid::new_v4();
        let client_name = client.as_ref().map(|c| c.borrow().name.clone());
        debug!(cmdq = %id, client = ?client_name, "new cmdq");
        Self {
            inner: Rc::new(QueueInner {
                id,
                client,
                causes,
                references: Cell::new(1),
                dead: Cell::new(false),
                destroyed: Cell::new(false),
                no_hooks: Cell::new(false),
                client_exit: Cell::new(false),
                parent: RefCell::new(None),
                empty_fn: RefCell::new(None),
                state: RefCell::new(QueueState {
                    items: VecDeque::new(),
                    cursor: None,
                    current: FindState::default(),
                    target: FindState::default(),
                    time: 0,
                    number: 0,
                }),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn client(&self) -> Option<&ClientHandle> {
        self.inner.client.as_ref()
    }

    pub fn causes(&self) -> &CauseSink {
        &self.inner.causes
    }

    pub fn ptr_eq(&self, other: &CmdQueue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn state(&self) -> Ref<'_, QueueState> {
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, QueueState> {
        self.inner.state.borrow_mut()
    }

    // === Lifetime ===

    /// Take a logical reference
    pub fn retain(&self) {
        self.inner.references.set(self.inner.references.get() + 1);
    }

    /// Drop a logical reference, destroying the queue when none remain
    pub fn release(&self) -> ReleaseStatus {
        let references = self.inner.references.get().saturating_sub(1);
        self.inner.references.set(references);
        debug!(cmdq = %self.inner.id, references, "cmdq free");

        if references != 0 {
            if self.inner.dead.get() {
                return ReleaseStatus::StillBusy;
            }
            return ReleaseStatus::Referenced;
        }

        self.destroy();
        ReleaseStatus::Destroyed
    }

    fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.flush();
        // Drop outside the borrows: captured handles may be the last ones.
        let empty_fn = self.inner.empty_fn.borrow_mut().take();
        let parent = self.inner.parent.borrow_mut().take();
        drop(empty_fn);
        drop(parent);
        debug!(cmdq = %self.inner.id, "cmdq destroyed");
    }

    pub fn references(&self) -> u32 {
        self.inner.references.get()
    }

    /// Mark the queue for destruction once its remaining holders release it
    pub fn mark_dead(&self) {
        self.inner.dead.set(true);
    }

    pub fn is_dead(&self) -> bool {
        self.inner.dead.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    // === Configuration ===

    /// Set the callback run when the queue next drains
    pub fn set_empty_callback(&self, callback: impl FnOnce(&CmdQueue) + 'static) {
        *self.inner.empty_fn.borrow_mut() = Some(Box::new(callback));
    }

    /// Set the queue whose target is consulted when this one has none
    pub fn set_parent(&self, parent: CmdQueue) {
        *self.inner.parent.borrow_mut() = Some(parent);
    }

    pub fn parent(&self) -> Option<CmdQueue> {
        self.inner.parent.borrow().clone()
    }

    /// Stop commands on this queue from firing hooks
    pub fn disable_hooks(&self) {
        self.inner.no_hooks.set(true);
    }

    pub fn hooks_disabled(&self) -> bool {
        self.inner.no_hooks.get()
    }

    /// Ask for the client to exit once the queue drains
    pub fn request_client_exit(&self) {
        self.inner.client_exit.set(true);
    }

    pub fn client_exit_requested(&self) -> bool {
        self.inner.client_exit.get()
    }

    /// Set the inherited target for commands on this queue
    pub fn set_current(&self, current: FindState) {
        self.state_mut().current = current;
    }

    pub fn current(&self) -> FindState {
        self.state().current.clone()
    }

    /// Set the target of the running command, typically from its exec
    pub fn set_target(&self, target: FindState) {
        self.state_mut().target = target;
    }

    /// Target bound for the running command
    pub fn target(&self) -> FindState {
        self.state().target.clone()
    }

    // === Inspection ===

    /// Number of command lists waiting, including the one being executed
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// True when no command list is being executed
    pub fn is_idle(&self) -> bool {
        self.state().cursor.is_none()
    }

    /// Sequence number of the most recently started command
    pub fn number(&self) -> u32 {
        self.state().number
    }

    /// Unix time the most recently started command began
    pub fn time(&self) -> i64 {
        self.state().time
    }

    /// Command at the cursor
    pub fn current_command(&self) -> Option<Command> {
        self.cursor_command().and_then(|(list, index)| list.get(index).cloned())
    }

    /// Mouse event attached to the command list being executed
    pub fn mouse_event(&self) -> Option<MouseEvent> {
        let state = self.state();
        state.cursor?;
        state.items.front().and_then(|item| item.mouse().copied())
    }

    fn cursor_command(&self) -> Option<(CommandList, usize)> {
        let state = self.state();
        let index = state.cursor?;
        let item = state.items.front()?;
        (index < item.list().len()).then(|| (item.list().clone(), index))
    }

    // === Queueing ===

    /// Add a command list to the tail of the queue without running it
    pub fn append(&self, list: &CommandList, mouse: Option<&MouseEvent>) {
        if self.is_destroyed() {
            warn!(cmdq = %self.inner.id, commands = list.len(), "append to destroyed cmdq");
            return;
        }
        self.state_mut().items.push_back(QueueItem::new(list, mouse));
        trace!(cmdq = %self.inner.id, commands = list.len(), "cmdq append");
    }

    /// Append a command list and start processing if nothing is running.
    /// Returns `None` when the list was queued behind running work.
    pub fn run(&self, list: &CommandList, mouse: Option<&MouseEvent>) -> Option<QueueStatus> {
        self.append(list, mouse);
        if self.is_idle() {
            Some(self.continue_processing())
        } else {
            None
        }
    }

    /// Discard every queued command list
    pub fn flush(&self) {
        let items = {
            let mut state = self.state_mut();
            state.cursor = None;
            std::mem::take(&mut state.items)
        };
        if !items.is_empty() {
            debug!(cmdq = %self.inner.id, discarded = items.len(), "cmdq flush");
        }
        drop(items);
    }

    /// Run queued commands until the queue drains or a command waits
    pub fn continue_processing(&self) -> QueueStatus {
        let _reference = QueueRef::acquire(self);
        debug!(
            cmdq = %self.inner.id,
            references = self.references(),
            dead = self.is_dead(),
            "continuing cmdq"
        );

        if self.is_destroyed() {
            warn!(cmdq = %self.inner.id, "continuing destroyed cmdq");
            return QueueStatus::Empty;
        }

        {
            let mut state = self.state_mut();
            if state.items.is_empty() {
                drop(state);
                return self.finish_empty();
            }
            state.cursor = Some(state.cursor.map_or(0, |index| index + 1));
        }

        loop {
            while let Some((list, index)) = self.cursor_command() {
                match self.execute_one(&list, index) {
                    CmdRetval::Normal => self.advance(),
                    CmdRetval::Error => break,
                    CmdRetval::Wait => return QueueStatus::Waiting,
                    CmdRetval::Stop => {
                        self.flush();
                        return self.finish_empty();
                    }
                }
            }

            let (finished, more) = {
                let mut state = self.state_mut();
                // A command may have flushed the queue, leaving nothing current.
                let finished = match state.cursor {
                    Some(_) => state.items.pop_front(),
                    None => None,
                };
                let more = !state.items.is_empty();
                state.cursor = more.then_some(0);
                (finished, more)
            };
            // Release the finished list outside the state borrow.
            drop(finished);
            if !more {
                break;
            }
        }

        self.finish_empty()
    }

    fn advance(&self) {
        let mut state = self.state_mut();
        if let Some(index) = state.cursor {
            state.cursor = Some(index + 1);
        }
    }

    fn finish_empty(&self) -> QueueStatus {
        debug!(cmdq = %self.inner.id, "cmdq empty");

        if self.inner.client_exit.get() {
            if let Some(client) = &self.inner.client {
                client.borrow_mut().flags.insert(ClientFlags::EXIT);
            }
        }

        let empty_fn = self.inner.empty_fn.borrow_mut().take();
        if let Some(callback) = empty_fn {
            callback(self);
        }
        QueueStatus::Empty
    }

    /// Execute the command at `index` of `list`. The caller's clone of the
    /// list keeps it alive even if the command flushes this queue.
    fn execute_one(&self, list: &CommandList, index: usize) -> CmdRetval {
        let Some(cmd) = list.get(index) else {
            return CmdRetval::Normal;
        };
        let flags = cmd.guard_flags();
        debug!(cmdq = %self.inner.id, "cmdq: {}", cmd);

        {
            let mut state = self.state_mut();
            state.time = Utc::now().timestamp();
            state.number += 1;
        }

        self.guard("begin", flags);

        if self.prepare_state(cmd).is_err() {
            self.guard("error", flags);
            return CmdRetval::Error;
        }

        let mut retval = cmd.entry().exec(cmd, self);
        if retval == CmdRetval::Error {
            self.guard("error", flags);
            return CmdRetval::Error;
        }

        if retval != CmdRetval::Error && cmd.fires_after_hook() {
            if let HookWait::Pending = self.run_after_hook(cmd) {
                retval = CmdRetval::Wait;
            }
        }

        self.guard("end", flags);
        retval
    }

    /// Bind the command's explicit target, if any, for its execution
    fn prepare_state(&self, cmd: &Command) -> Result<()> {
        let invalid = {
            let mut state = self.state_mut();
            state.target.clear();
            match &cmd.target {
                None => false,
                Some(target) if target.is_valid() => {
                    state.target = target.clone();
                    false
                }
                Some(_) => true,
            }
        };

        if invalid {
            self.error("can't find session");
            return Err(Error::MissingTarget {
                command: cmd.name().to_string(),
            });
        }
        Ok(())
    }

    fn run_after_hook(&self, cmd: &Command) -> HookWait {
        let target = self.target();
        let target = if target.is_valid() {
            target
        } else {
            match self.find_current() {
                Some(current) => current,
                None => {
                    trace!(cmdq = %self.inner.id, command = cmd.name(), "no target for after hook");
                    return HookWait::Done;
                }
            }
        };

        let Some(hooks) = target.hooks() else {
            return HookWait::Done;
        };
        let name = format!("after-{}", cmd.name());
        hooks.wait(self, &target, &name)
    }

    /// Resolve the current target: this queue's, then its parent's, then the
    /// session the client is attached to
    pub fn find_current(&self) -> Option<FindState> {
        let current = self.current();
        if current.is_valid() {
            return Some(current);
        }

        if let Some(parent) = self.parent() {
            if let Some(found) = parent.find_current() {
                return Some(found);
            }
        }

        let client = self.inner.client.as_ref()?;
        let session = client.borrow().session().cloned()?;
        let found = FindState::from_session(&session);
        found.is_valid().then_some(found)
    }
}

impl fmt::Debug for CmdQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.try_borrow();
        let mut s = f.debug_struct("CmdQueue");
        s.field("id", &self.inner.id)
            .field("references", &self.inner.references.get())
            .field("dead", &self.inner.dead.get());
        if let Ok(state) = state {
            s.field("items", &state.items.len())
                .field("cursor", &state.cursor)
                .field("number", &state.number);
        }
        s.finish_non_exhaustive()
    }
}
