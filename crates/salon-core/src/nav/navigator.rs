use tracing::info;

use super::guard::{Decision, NavigationGuard};
use super::route::{normalize_path, resolve_redirect, Route};
use crate::auth::SessionStore;
use crate::storage::KeyValueStore;

/// Result of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Path as requested by the caller
    pub requested: String,
    /// Path after static redirects and normalization
    pub resolved: String,
    pub decision: Decision,
}

impl Navigation {
    /// Where the navigation ended up.
    pub fn destination(&self) -> &str {
        match self.decision {
            Decision::Allow => &self.resolved,
            Decision::Redirect(route) => route.path(),
        }
    }

    pub fn was_redirected(&self) -> bool {
        matches!(self.decision, Decision::Redirect(_))
    }
}

/// Tracks the current location and runs the guard on every transition.
pub struct Navigator {
    guard: NavigationGuard,
    current: String,
}

impl Navigator {
    /// Rehydrate `session` from storage, then evaluate the initial navigation.
    ///
    /// This is the only constructor, so no guarded navigation can run against
    /// a session that has not been rehydrated yet.
    pub fn boot<S: KeyValueStore>(
        guard: NavigationGuard,
        session: &mut SessionStore<S>,
        initial_path: &str,
    ) -> (Self, Navigation) {
        session.initialize_from_storage();
        info!(logged_in = session.is_logged_in(), "Session ready, starting navigation");

        let mut navigator = Self {
            guard,
            current: Route::Login.path().to_string(),
        };
        let navigation = navigator.navigate(initial_path, session);
        (navigator, navigation)
    }

    pub fn navigate<S: KeyValueStore>(&mut self, path: &str, session: &SessionStore<S>) -> Navigation {
        let resolved = resolve_redirect(normalize_path(path)).to_string();
        let decision = self.guard.check(&resolved, session);
        let navigation = Navigation {
            requested: path.to_string(),
            resolved,
            decision,
        };

        if navigation.was_redirected() {
            info!(requested = path, to = navigation.destination(), "Navigation redirected");
        }
        self.current = navigation.destination().to_string();
        navigation
    }

    /// Re-run the guard on the current location, e.g. after logout.
    pub fn revalidate<S: KeyValueStore>(&mut self, session: &SessionStore<S>) -> Navigation {
        let current = self.current.clone();
        self.navigate(&current, session)
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn current_route(&self) -> Option<Route> {
        Route::from_path(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PrivilegedUsername, SessionStore, UserData};
    use crate::storage::MemoryStore;

    fn fresh() -> SessionStore<MemoryStore> {
        SessionStore::new(MemoryStore::new(), PrivilegedUsername::new("danil"))
    }

    /// Storage left behind by a previous run that logged in.
    fn persisted() -> MemoryStore {
        let mut store = fresh();
        store.set_user(UserData::new(3, "alice", "tok"));
        store.into_storage()
    }

    #[test]
    fn test_boot_rehydrates_before_first_navigation() {
        let mut session = SessionStore::new(persisted(), PrivilegedUsername::new("danil"));
        assert!(!session.is_logged_in());

        let (navigator, first) = Navigator::boot(NavigationGuard::new(), &mut session, "/appointments");
        assert!(session.is_logged_in());
        assert_eq!(first.decision, Decision::Allow);
        assert_eq!(navigator.current(), "/appointments");
        assert_eq!(navigator.current_route(), Some(Route::Appointments));
    }

    #[test]
    fn test_boot_without_session_lands_on_login() {
        let mut session = fresh();
        let (navigator, first) = Navigator::boot(NavigationGuard::new(), &mut session, "/clients");
        assert_eq!(first.decision, Decision::Redirect(Route::Login));
        assert_eq!(navigator.current(), "/login");
    }

    #[test]
    fn test_root_redirects_to_clients() {
        let mut session = SessionStore::new(persisted(), PrivilegedUsername::new("danil"));
        let (_, first) = Navigator::boot(NavigationGuard::new(), &mut session, "/");
        assert_eq!(first.requested, "/");
        assert_eq!(first.resolved, "/clients");
        assert_eq!(first.destination(), "/clients");

        let mut logged_out = fresh();
        let (_, first) = Navigator::boot(NavigationGuard::new(), &mut logged_out, "/");
        assert_eq!(first.destination(), "/login");
    }

    #[test]
    fn test_navigate_strips_query() {
        let mut session = fresh();
        let (mut navigator, _) = Navigator::boot(NavigationGuard::new(), &mut session, "/login");
        session.set_user(UserData::new(3, "alice", "tok"));

        let nav = navigator.navigate("/reviews?page=2", &session);
        assert_eq!(nav.resolved, "/reviews");
        assert_eq!(navigator.current(), "/reviews");
    }

    #[test]
    fn test_revalidate_after_logout() {
        let mut session = SessionStore::new(persisted(), PrivilegedUsername::new("danil"));
        let (mut navigator, _) = Navigator::boot(NavigationGuard::new(), &mut session, "/profile");
        assert_eq!(navigator.current(), "/profile");

        session.clear_user();
        let nav = navigator.revalidate(&session);
        assert!(nav.was_redirected());
        assert_eq!(navigator.current(), "/login");
    }

    #[test]
    fn test_login_then_navigate() {
        let mut session = fresh();
        let (mut navigator, _) = Navigator::boot(NavigationGuard::new(), &mut session, "/masters");
        assert_eq!(navigator.current(), "/login");

        session.set_user(UserData::new(9, "bob", "tok-bob"));
        let nav = navigator.navigate("/masters", &session);
        assert_eq!(nav.decision, Decision::Allow);
        assert_eq!(navigator.current_route(), Some(Route::Masters));
    }
}
