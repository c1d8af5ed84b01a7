//! Session and credential lifecycle for the admin console.
//!
//! This module provides:
//! - `TokenStore`: durable custody of the access/refresh token pair
//! - `BypassProfile`: the reserved backend-independent demo identities
//! - `SessionManager`: the session state machine and background renewal
//!
//! Tokens are persisted to disk and backed sessions are renewed in the
//! background shortly before the 30-minute token lifetime elapses.

pub mod bypass;
mod scheduler;
pub mod session;
pub mod store;

pub use bypass::BypassProfile;
pub use session::{SessionManager, SessionSnapshot, SessionTokens};
pub use store::{StoredTokens, TokenStore};
