//! Authentication module for the client-side session.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for who is logged in,
//!   mirrored into a durable `KeyValueStore` for session resumption
//! - `AdminPolicy`: decides the admin flag when a user is set
//! - `UserData`, `UserId`, `Token`: identity values handed over by the API
//!
//! The OTP flag lives only in memory and resets on every start.

pub mod policy;
pub mod session;
pub mod user;

pub use policy::{AdminPolicy, PrivilegedUsername, RoleClaim};
pub use session::{Session, SessionStore, DURABLE_KEYS, IS_ADMIN_KEY, TOKEN_KEY, USERNAME_KEY, USER_ID_KEY};
pub use user::{CurrentUser, Token, UserData, UserId};
