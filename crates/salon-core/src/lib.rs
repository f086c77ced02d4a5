//! Core library for the salon shell.
//!
//! The session subsystem is the heart of it: `auth::SessionStore` holds who is
//! logged in and mirrors that into durable storage, and `nav::Navigator`
//! runs the `NavigationGuard` before every view transition. Around it sit the
//! storage backends, the HTTP client that produces login responses, and the
//! configuration layer.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AdminPolicy, CurrentUser, PrivilegedUsername, RoleClaim, SessionStore, Token, UserData, UserId};
pub use config::{Config, StorageBackend};
pub use nav::{Decision, Navigation, NavigationGuard, Navigator, Route};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StorageError};
