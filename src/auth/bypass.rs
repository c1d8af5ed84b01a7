//! Reserved demonstration identities.
//!
//! Two fixed credential pairs activate a local identity without a live
//! backend: one plain demo account and one administrator. These are not a
//! security boundary - the token values are well-known constants, and a
//! session running on them never talks to the backend at all.

use chrono::Utc;

use crate::models::User;

pub const DEMO_EMAIL: &str = "demo@onionrsv.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_ACCESS_TOKEN: &str = "demo-token";
pub const DEMO_REFRESH_TOKEN: &str = "demo-refresh";

pub const ADMIN_EMAIL: &str = "admin@onionrsv.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_ACCESS_TOKEN: &str = "admin-token";
pub const ADMIN_REFRESH_TOKEN: &str = "admin-refresh";

/// One of the reserved backend-independent identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassProfile {
    Demo,
    Admin,
}

impl BypassProfile {
    /// Resolve a login attempt against the reserved credential pairs.
    pub fn from_credentials(email: &str, password: &str) -> Option<Self> {
        match (email, password) {
            (DEMO_EMAIL, DEMO_PASSWORD) => Some(BypassProfile::Demo),
            (ADMIN_EMAIL, ADMIN_PASSWORD) => Some(BypassProfile::Admin),
            _ => None,
        }
    }

    /// Resolve a stored or issued access token against the reserved values.
    pub fn from_access_token(token: &str) -> Option<Self> {
        match token {
            DEMO_ACCESS_TOKEN => Some(BypassProfile::Demo),
            ADMIN_ACCESS_TOKEN => Some(BypassProfile::Admin),
            _ => None,
        }
    }

    pub fn access_token(self) -> &'static str {
        match self {
            BypassProfile::Demo => DEMO_ACCESS_TOKEN,
            BypassProfile::Admin => ADMIN_ACCESS_TOKEN,
        }
    }

    pub fn refresh_token(self) -> &'static str {
        match self {
            BypassProfile::Demo => DEMO_REFRESH_TOKEN,
            BypassProfile::Admin => ADMIN_REFRESH_TOKEN,
        }
    }

    pub fn email(self) -> &'static str {
        match self {
            BypassProfile::Demo => DEMO_EMAIL,
            BypassProfile::Admin => ADMIN_EMAIL,
        }
    }

    /// Synthesize the fixed identity for this profile.
    pub fn identity(self) -> User {
        match self {
            BypassProfile::Demo => User {
                id: "demo-user".to_string(),
                email: DEMO_EMAIL.to_string(),
                full_name: "Demo User".to_string(),
                first_name: Some("Demo".to_string()),
                last_name: Some("User".to_string()),
                role: Some("user".to_string()),
                is_active: true,
                permissions: Vec::new(),
                created_at: Utc::now(),
                last_login: None,
            },
            BypassProfile::Admin => User {
                id: "admin-user".to_string(),
                email: ADMIN_EMAIL.to_string(),
                full_name: "Admin User".to_string(),
                first_name: Some("Admin".to_string()),
                last_name: Some("User".to_string()),
                role: Some("admin".to_string()),
                is_active: true,
                permissions: vec!["admin".to_string()],
                created_at: Utc::now(),
                last_login: None,
            },
        }
    }
}
