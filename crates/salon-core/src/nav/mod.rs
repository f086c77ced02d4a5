//! Navigation: the named destinations, the access guard, and the navigator
//! that applies the guard to every transition.
//!
//! A `Navigator` can only be built through `Navigator::boot`, which rehydrates
//! the session before the first guarded navigation is evaluated.

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{Decision, NavigationGuard};
pub use navigator::{Navigation, Navigator};
pub use route::{normalize_path, resolve_redirect, Route, ROOT_PATH};
