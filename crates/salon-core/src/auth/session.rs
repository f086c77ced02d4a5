use tracing::{debug, info, warn};

use super::{AdminPolicy, CurrentUser, Token, UserData, UserId};
use crate::storage::KeyValueStore;

/// Durable key holding the raw token
pub const TOKEN_KEY: &str = "token";

/// Durable key holding the username
pub const USERNAME_KEY: &str = "username";

/// Durable key holding the string form of the user id
pub const USER_ID_KEY: &str = "userId";

/// Durable key holding `"true"` or `"false"`
pub const IS_ADMIN_KEY: &str = "isAdmin";

/// Every key this module owns in durable storage.
pub const DURABLE_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, USER_ID_KEY, IS_ADMIN_KEY];

/// In-memory session state.
///
/// When `is_authenticated` is true the id, username and token are all set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<UserId>,
    username: Option<String>,
    token: Option<Token>,
    is_authenticated: bool,
    otp_verified: bool,
    is_admin: bool,
}

impl Session {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn otp_verified(&self) -> bool {
        self.otp_verified
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Owns the session and mirrors its identity fields into durable storage.
///
/// `set_user`, `clear_user`, `set_otp_verified` and `initialize_from_storage`
/// are the only mutators. Storage failures never fail an operation: they are
/// logged and the in-memory state is updated regardless.
pub struct SessionStore<S> {
    storage: S,
    policy: Box<dyn AdminPolicy>,
    session: Session,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create an empty session over `storage`. Call `initialize_from_storage`
    /// to resume a persisted session.
    pub fn new(storage: S, policy: impl AdminPolicy + 'static) -> Self {
        Self {
            storage,
            policy: Box::new(policy),
            session: Session::default(),
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Record a successful login and persist it. Leaves the OTP flag alone.
    pub fn set_user(&mut self, user: UserData) {
        let is_admin = self.policy.is_admin(&user);
        info!(user_id = %user.id, username = %user.username, is_admin, "Setting user data");

        self.persist(TOKEN_KEY, user.token.expose());
        self.persist(USERNAME_KEY, &user.username);
        self.persist(USER_ID_KEY, user.id.as_str());
        self.persist(IS_ADMIN_KEY, if is_admin { "true" } else { "false" });

        self.session.user_id = Some(user.id);
        self.session.username = Some(user.username);
        self.session.token = Some(user.token);
        self.session.is_authenticated = true;
        self.session.is_admin = is_admin;
    }

    /// Reset every field and delete the durable keys. Safe to call repeatedly.
    pub fn clear_user(&mut self) {
        debug!(was_authenticated = self.session.is_authenticated, "Clearing user data");
        self.session = Session::default();

        for key in DURABLE_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session key from storage");
            }
        }
    }

    /// Set the OTP flag. Allowed even without a session.
    pub fn set_otp_verified(&mut self, status: bool) {
        debug!(status, "Setting OTP verification");
        self.session.otp_verified = status;
    }

    /// Resume a persisted session.
    ///
    /// Needs token, username and user id all present and non-empty; otherwise
    /// the session is left as it was. The admin flag is true only for the
    /// exact string `"true"`. The OTP flag is never restored.
    pub fn initialize_from_storage(&mut self) {
        let token = self.read(TOKEN_KEY);
        let username = self.read(USERNAME_KEY);
        let user_id = self.read(USER_ID_KEY);
        let is_admin = self.read(IS_ADMIN_KEY).as_deref() == Some("true");

        match (token, username, user_id) {
            (Some(token), Some(username), Some(user_id)) => {
                info!(user_id = %user_id, username = %username, is_admin, "Session restored from storage");
                self.session.user_id = Some(UserId::from(user_id));
                self.session.username = Some(username);
                self.session.token = Some(Token::from(token));
                self.session.is_authenticated = true;
                self.session.is_admin = is_admin;
            }
            _ => debug!("No persisted session found"),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated
    }

    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.session.user_id.clone(),
            username: self.session.username.clone(),
        }
    }

    /// Get the token for outgoing requests
    pub fn token(&self) -> Option<&Token> {
        debug!(present = self.session.token.is_some(), "Token requested");
        self.session.token.as_ref()
    }

    pub fn is_otp_verified(&self) -> bool {
        self.session.otp_verified
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Drop the in-memory state and hand back the storage, as a process exit would.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "Failed to persist session key, keeping in-memory state");
        }
    }

    /// Read a durable key; empty values and read errors count as absent.
    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session key from storage");
                None
            }
        }
    }
}
