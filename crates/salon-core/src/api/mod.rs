//! REST API client for the salon backend.
//!
//! This module provides the `ApiClient`, the channel that supplies login
//! responses to the session store and carries the session token on
//! authenticated requests (`Authorization: Token <key>`).

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
