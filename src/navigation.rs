use crate::session::{ProgramId, SessionId};

/// Every place the TUI can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Programs,
    Program(ProgramId),
    Unassigned,
    Session(SessionId),
    Workout(SessionId),
    History,
}

/// Back stack of routes; the root is never popped
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(root: Route) -> Self {
        Self { stack: vec![root] }
    }

    pub fn current(&self) -> Route {
        self.stack[self.stack.len() - 1]
    }

    /// Pushing the current route again is a no-op. Pushing a workout that is
    /// already further down the stack unwinds back to it.
    pub fn push(&mut self, route: Route) {
        if self.current() == route {
            return;
        }
        if let Route::Workout(_) = route {
            if let Some(pos) = self.stack.iter().position(|r| *r == route) {
                self.stack.truncate(pos + 1);
                return;
            }
        }
        self.stack.push(route);
    }

    /// Returns false when already at the root
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Programs)
    }
}
