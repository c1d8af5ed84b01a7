//! Durable custody of the access/refresh token pair.
//!
//! Thin wrapper over a single JSON file in the application config directory.
//! The two tokens are written, read, and cleared together; a file holding
//! only half a pair is treated as absent so the session manager never sees a
//! partial credential state. No validation happens here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

/// Token file name in the store directory
const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store under the application config directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::token_dir()?))
    }

    /// Persist both tokens, replacing whatever was stored before.
    pub fn save(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let tokens = StoredTokens {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(&tokens)?;
        std::fs::write(self.tokens_path(), contents).context("Failed to write token file")?;
        Ok(())
    }

    /// Load the stored pair, if a complete one exists.
    ///
    /// An unreadable or incomplete token file counts as no stored session
    /// rather than an error; stale garbage on disk must not wedge startup.
    pub fn load(&self) -> Result<Option<StoredTokens>> {
        let path = self.tokens_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read token file")?;

        match serde_json::from_str::<StoredTokens>(&contents) {
            Ok(tokens) if !tokens.access_token.is_empty() && !tokens.refresh_token.is_empty() => {
                Ok(Some(tokens))
            }
            Ok(_) => {
                debug!("token file incomplete, treating as absent");
                Ok(None)
            }
            Err(e) => {
                debug!(error = %e, "token file unparsable, treating as absent");
                Ok(None)
            }
        }
    }

    /// Remove the stored pair. Idempotent.
    pub fn clear(&self) -> Result<()> {
        let path = self.tokens_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    fn tokens_path(&self) -> PathBuf {
        self.dir.join(TOKENS_FILE)
    }
}
