//! Session, window and pane models
//!
//! Only the parts the command queue needs: an active pane per window that can
//! switch into an output overlay receiving streamed text, and the per-session
//! hook scope consulted for after-hooks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::hooks::{HookWaiter, NoHooks};

/// Shared handle to a session
pub type SessionHandle = Rc<RefCell<Session>>;

/// Display mode of a pane
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneMode {
    /// Normal pane contents
    #[default]
    Normal,
    /// Scrollback overlay showing lines printed by commands
    CopyOutput(Vec<String>),
}

/// A single pane
#[derive(Debug, Clone)]
pub struct Pane {
    pub id: u32,
    mode: PaneMode,
}

impl Pane {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            mode: PaneMode::Normal,
        }
    }

    pub fn mode(&self) -> &PaneMode {
        &self.mode
    }

    /// Leave whatever mode the pane is in
    pub fn reset_mode(&mut self) {
        self.mode = PaneMode::Normal;
    }

    /// Install an empty output overlay
    pub fn enter_output_mode(&mut self) {
        self.mode = PaneMode::CopyOutput(Vec::new());
    }

    pub fn is_output_mode(&self) -> bool {
        matches!(self.mode, PaneMode::CopyOutput(_))
    }

    /// Append a line to the output overlay. Returns false if no overlay is installed.
    pub fn add_output(&mut self, line: &str) -> bool {
        match &mut self.mode {
            PaneMode::CopyOutput(lines) => {
                lines.push(line.to_string());
                true
            }
            PaneMode::Normal => false,
        }
    }

    /// Lines shown in the output overlay
    pub fn output_lines(&self) -> &[String] {
        match &self.mode {
            PaneMode::CopyOutput(lines) => lines,
            PaneMode::Normal => &[],
        }
    }
}

/// A window holding one or more panes
#[derive(Debug, Clone)]
pub struct Window {
    pub id: u32,
    pub name: String,
    panes: Vec<Pane>,
    active: usize,
}

impl Window {
    pub fn new(id: u32, name: impl Into<String>, first_pane: Pane) -> Self {
        Self {
            id,
            name: name.into(),
            panes: vec![first_pane],
            active: 0,
        }
    }

    pub fn add_pane(&mut self, pane: Pane) -> usize {
        self.panes.push(pane);
        self.panes.len() - 1
    }

    pub fn pane(&self, index: usize) -> Option<&Pane> {
        self.panes.get(index)
    }

    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_pane(&self) -> &Pane {
        &self.panes[self.active]
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        &mut self.panes[self.active]
    }

    pub fn select_pane(&mut self, index: usize) -> bool {
        if index < self.panes.len() {
            self.active = index;
            true
        } else {
            false
        }
    }
}

/// A session: windows plus the hook scope for commands targeting it
pub struct Session {
    pub id: u32,
    pub name: String,
    windows: Vec<Window>,
    current: usize,
    next_id: u32,
    hooks: Rc<dyn HookWaiter>,
}

impl Session {
    /// Create a session with a single window holding a single pane
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            windows: vec![Window::new(0, "0", Pane::new(0))],
            current: 0,
            next_id: 1,
            hooks: Rc::new(NoHooks),
        }
    }

    pub fn into_handle(self) -> SessionHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn hooks(&self) -> Rc<dyn HookWaiter> {
        Rc::clone(&self.hooks)
    }

    pub fn set_hooks(&mut self, hooks: Rc<dyn HookWaiter>) {
        self.hooks = hooks;
    }

    /// Add a window and return its index
    pub fn add_window(&mut self, name: impl Into<String>) -> usize {
        let window_id = self.allocate_id();
        let pane_id = self.allocate_id();
        self.windows
            .push(Window::new(window_id, name, Pane::new(pane_id)));
        self.windows.len() - 1
    }

    /// Split the window at `index`, returning the new pane's index
    pub fn split_window(&mut self, index: usize) -> Option<usize> {
        let pane_id = self.allocate_id();
        self.windows
            .get_mut(index)
            .map(|window| window.add_pane(Pane::new(pane_id)))
    }

    pub fn window(&self, index: usize) -> Option<&Window> {
        self.windows.get(index)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_window(&self) -> &Window {
        &self.windows[self.current]
    }

    pub fn current_window_mut(&mut self) -> &mut Window {
        &mut self.windows[self.current]
    }

    pub fn select_window(&mut self, index: usize) -> bool {
        if index < self.windows.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn active_pane(&self) -> &Pane {
        self.current_window().active_pane()
    }

    pub fn active_pane_mut(&mut self) -> &mut Pane {
        self.current_window_mut().active_pane_mut()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("windows", &self.windows)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
