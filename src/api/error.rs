use thiserror::Error;

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failures reported by the auth backend client.
///
/// The client classifies each non-success response by the operation it was
/// performing; recovery policy (retry, forced logout, user messaging) is the
/// session manager's responsibility, never handled here.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token refresh rejected: {0}")]
    RefreshFailed(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("profile update failed: {0}")]
    ProfileUpdateFailed(String),

    #[error("password change failed: {0}")]
    PasswordChangeFailed(String),

    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    /// Truncate a response body to avoid carrying excessive data around
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }
}
