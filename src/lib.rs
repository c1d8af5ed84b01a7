//! Client-side session management for the Onion RSV 360 admin console.
//!
//! The console talks to its auth backend over REST; this crate owns the
//! credential lifecycle on the client side: exchanging an email/password
//! pair for tokens, persisting the pair across restarts, verifying and
//! rehydrating the signed-in identity at startup, renewing the access token
//! in the background before it expires, and tearing the session down at
//! logout. Two reserved demo identities work with no backend at all.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{AuthClient, AuthError};
pub use auth::{SessionManager, SessionSnapshot, TokenStore};
pub use config::Config;
pub use models::{User, UserUpdate};
