use super::UserData;

/// Decides whether a freshly set user gets the admin flag.
///
/// Evaluated once, when `SessionStore::set_user` runs. Rehydrated sessions
/// reuse the persisted flag instead.
pub trait AdminPolicy {
    fn is_admin(&self, user: &UserData) -> bool;
}

/// Admin iff the username equals a configured name (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegedUsername(String);

impl PrivilegedUsername {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn username(&self) -> &str {
        &self.0
    }
}

impl AdminPolicy for PrivilegedUsername {
    fn is_admin(&self, user: &UserData) -> bool {
        user.username == self.0
    }
}

/// Admin iff the authentication exchange said so. No claim means no admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleClaim;

impl AdminPolicy for RoleClaim {
    fn is_admin(&self, user: &UserData) -> bool {
        user.is_admin.unwrap_or(false)
    }
}

impl AdminPolicy for Box<dyn AdminPolicy> {
    fn is_admin(&self, user: &UserData) -> bool {
        (**self).is_admin(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_username_is_case_sensitive() {
        let policy = PrivilegedUsername::new("danil");
        assert!(policy.is_admin(&UserData::new(1, "danil", "t")));
        assert!(!policy.is_admin(&UserData::new(1, "Danil", "t")));
        assert!(!policy.is_admin(&UserData::new(1, "alice", "t")));
    }

    #[test]
    fn test_privileged_username_ignores_claim() {
        let policy = PrivilegedUsername::new("danil");
        let user = UserData::new(1, "alice", "t").with_admin_claim(true);
        assert!(!policy.is_admin(&user));
    }

    #[test]
    fn test_role_claim() {
        assert!(!RoleClaim.is_admin(&UserData::new(1, "danil", "t")));
        assert!(RoleClaim.is_admin(&UserData::new(1, "alice", "t").with_admin_claim(true)));
        assert!(!RoleClaim.is_admin(&UserData::new(1, "alice", "t").with_admin_claim(false)));
    }

    #[test]
    fn test_boxed_policy_delegates() {
        let boxed: Box<dyn AdminPolicy> = Box::new(PrivilegedUsername::new("kate"));
        assert!(boxed.is_admin(&UserData::new(1, "kate", "t")));
        assert!(!boxed.is_admin(&UserData::new(2, "danil", "t")));
    }
}
