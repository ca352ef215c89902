//! Navigation between form states.

use crate::models::NavigationTarget;

use parking_lot::RwLock;

/// Transitions the application to another state.
pub trait Navigator: Send + Sync {
    /// Go to `target`. Fire-and-forget.
    fn go(&self, target: &NavigationTarget);
}

/// In-process router that remembers where it has been.
#[derive(Debug, Default)]
pub struct StateRouter {
    history: RwLock<Vec<NavigationTarget>>,
}

impl StateRouter {
    pub fn new() -> Self {
        Self { history: RwLock::new(Vec::new()) }
    }

    /// The state most recently navigated to.
    pub fn current(&self) -> Option<NavigationTarget> {
        self.history.read().last().cloned()
    }

    /// Every transition so far, oldest first.
    pub fn history(&self) -> Vec<NavigationTarget> {
        self.history.read().clone()
    }

    /// Number of transitions so far.
    pub fn transitions(&self) -> usize {
        self.history.read().len()
    }
}

impl Navigator for StateRouter {
    fn go(&self, target: &NavigationTarget) {
        tracing::debug!(state = target.state_name(), params = ?target.params(), "Navigating");
        self.history.write().push(target.clone());
    }
}
