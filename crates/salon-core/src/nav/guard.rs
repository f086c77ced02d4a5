use tracing::debug;

use super::route::{normalize_path, Route};
use crate::auth::SessionStore;
use crate::storage::KeyValueStore;

/// Outcome of a guarded navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Route),
}

/// Gatekeeper run before every view transition.
///
/// Public paths are always allowed; anything else needs a logged-in session
/// and is redirected to the login route otherwise. Unknown paths get no
/// special treatment here.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    public_paths: Vec<&'static str>,
    login: Route,
}

impl NavigationGuard {
    pub fn new() -> Self {
        let public_paths = Route::ALL
            .into_iter()
            .filter(Route::is_public)
            .map(|r| r.path())
            .collect();
        Self {
            public_paths,
            login: Route::Login,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.public_paths.iter().any(|p| *p == path)
    }

    pub fn check<S: KeyValueStore>(&self, path: &str, session: &SessionStore<S>) -> Decision {
        let decision = if self.is_public(path) || session.is_logged_in() {
            Decision::Allow
        } else {
            Decision::Redirect(self.login)
        };
        debug!(path, ?decision, "Navigation guard evaluated");
        decision
    }
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new()
    }
}
