//! REST client module for the auth backend.
//!
//! This module provides the `AuthClient` for exchanging credentials,
//! verifying and refreshing tokens, and reading or updating the signed-in
//! user's profile.
//!
//! The backend uses opaque bearer tokens issued by the
//! `/api/core/token` endpoint.

pub mod client;
pub mod error;

pub use client::{AuthClient, TokenPair};
pub use error::AuthError;
