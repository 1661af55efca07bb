//! Target state: the session, window and pane a command applies to

use std::fmt;
use std::rc::Rc;

use crate::hooks::HookWaiter;
use crate::models::SessionHandle;

/// Resolved target of a command
#[derive(Clone, Default)]
pub struct FindState {
    pub session: Option<SessionHandle>,
    pub window: Option<usize>,
    pub pane: Option<usize>,
}

impl FindState {
    /// Target the session's current window and its active pane
    pub fn from_session(session: &SessionHandle) -> Self {
        let (window, pane) = {
            let s = session.borrow();
            (s.current_index(), s.current_window().active_index())
        };
        Self {
            session: Some(Rc::clone(session)),
            window: Some(window),
            pane: Some(pane),
        }
    }

    /// Target an explicit window and pane of a session
    pub fn new(session: &SessionHandle, window: usize, pane: usize) -> Self {
        Self {
            session: Some(Rc::clone(session)),
            window: Some(window),
            pane: Some(pane),
        }
    }

    pub fn clear(&mut self) {
        self.session = None;
        self.window = None;
        self.pane = None;
    }

    /// A state is valid when its session exists and the window and pane it
    /// names are still present in that session
    pub fn is_valid(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let (Some(window), Some(pane)) = (self.window, self.pane) else {
            return false;
        };
        let s = session.borrow();
        s.window(window)
            .map(|w| w.pane(pane).is_some())
            .unwrap_or(false)
    }

    /// Hook scope of the target session
    pub fn hooks(&self) -> Option<Rc<dyn HookWaiter>> {
        self.session.as_ref().map(|s| s.borrow().hooks())
    }

    pub fn same_session(&self, other: &FindState) -> bool {
        match (&self.session, &other.session) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for FindState {
    fn eq(&self, other: &Self) -> bool {
        let sessions_match = match (&self.session, &other.session) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        sessions_match && self.window == other.window && self.pane == other.pane
    }
}

impl fmt::Debug for FindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self
            .session
            .as_ref()
            .and_then(|s| s.try_borrow().ok().map(|s| s.name.clone()));
        f.debug_struct("FindState")
            .field("session", &session)
            .field("window", &self.window)
            .field("pane", &self.pane)
            .finish()
    }
}
