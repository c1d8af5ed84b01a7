//! HTTP client for the Onion RSV 360 auth backend.
//!
//! This module provides the `AuthClient` struct for the credential, token,
//! and profile endpoints. It performs no retries and keeps no local state
//! beyond the connection pool; error classification and recovery belong to
//! the session manager.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{User, UserUpdate};

use super::AuthError;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordBody<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    full_name: &'a str,
    password: &'a str,
}

/// Client for the auth backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// Create a client against the given backend with a per-request timeout.
    /// A timed-out request surfaces as a network error for whichever
    /// operation was in flight.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange an email/password pair for fresh tokens.
    pub async fn exchange_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(self.url("/api/core/token"))
            .json(&CredentialsBody { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "credential exchange rejected");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(response.json().await?)
    }

    /// Check whether an access token is still accepted by the backend.
    /// Transport failures count as "not valid"; this never returns an error.
    pub async fn verify(&self, access_token: &str) -> bool {
        let result = self
            .client
            .get(self.url("/api/core/verify"))
            .bearer_auth(access_token)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "token verification unreachable");
                false
            }
        }
    }

    /// Mint a new token pair from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(self.url("/api/core/refresh"))
            .json(&RefreshBody { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::RefreshFailed(Self::failure_body(response).await));
        }

        Ok(response.json().await?)
    }

    /// Fetch the authenticated user's profile.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .get(self.url("/api/users/me"))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::ProfileFetchFailed(
                Self::failure_body(response).await,
            ));
        }

        Ok(response.json().await?)
    }

    /// Apply a partial profile update, returning the updated identity.
    pub async fn update_profile(
        &self,
        access_token: &str,
        update: &UserUpdate,
    ) -> Result<User, AuthError> {
        let response = self
            .client
            .put(self.url("/api/users/me"))
            .bearer_auth(access_token)
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::ProfileUpdateFailed(
                Self::failure_body(response).await,
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("/api/users/change-password"))
            .bearer_auth(access_token)
            .json(&ChangePasswordBody {
                current_password,
                new_password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::PasswordChangeFailed(
                Self::failure_body(response).await,
            ));
        }

        Ok(())
    }

    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.url("/api/users/"))
            .json(&RegisterBody {
                email,
                full_name,
                password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::RegistrationFailed(
                Self::failure_body(response).await,
            ));
        }

        Ok(())
    }

    /// Read a non-success response into a status-prefixed error detail.
    async fn failure_body(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        format!("{}: {}", status, AuthError::truncate_body(&body))
    }
}
