//! Configuration for the bookmark sync engine.
//!
//! # Example
//!
//! ```
//! use remark_sync::SyncConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SyncConfig::default();
//! assert_eq!(config.structural_file, "bookmarks.json");
//! assert!(config.allow_list().is_empty());
//!
//! // Selective import of one folder
//! let config = SyncConfig {
//!     allowed_paths: vec!["Bookmarks Bar###Work".into()],
//!     conflict_retries: 2,
//!     ..Default::default()
//! };
//! assert_eq!(config.allow_list().prefixes().len(), 1);
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::filter::AllowList;
use crate::merge::DuplicateScope;
use crate::resilience::retry::RetryConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("Invalid remote API base '{url}': {reason}")]
    InvalidApiBase { url: String, reason: String },
}

/// Configuration for the sync engine.
///
/// All fields have sensible defaults; an empty `allowed_paths` imports everything.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Remote API root (e.g. "https://api.github.com" or a GitHub Enterprise "/api/v3" URL)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Remote artifact names (siblings in one remote namespace)
    #[serde(default = "default_structural_file")]
    pub structural_file: String,
    #[serde(default = "default_exchange_file")]
    pub exchange_file: String,
    #[serde(default = "default_readme_file")]
    pub readme_file: String,

    /// Folder paths to import from the remote, each a `###`-joined title chain
    #[serde(default)]
    pub allowed_paths: Vec<String>,

    /// What counts as "already present" during merge
    #[serde(default)]
    pub duplicate_scope: DuplicateScope,

    /// Commit message prefix; the date is appended ("Sync 2026-01-31")
    #[serde(default = "default_commit_message_prefix")]
    pub commit_message_prefix: String,

    /// Whole-cycle re-runs after a write conflict (0 = surface the conflict)
    #[serde(default)]
    pub conflict_retries: usize,

    /// Backoff between conflict re-runs
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

fn default_api_base() -> String { "https://api.github.com".to_string() }
fn default_structural_file() -> String { "bookmarks.json".to_string() }
fn default_exchange_file() -> String { "bookmarks.html".to_string() }
fn default_readme_file() -> String { "README.md".to_string() }
fn default_commit_message_prefix() -> String { "Sync".to_string() }
fn default_retry_initial_delay_ms() -> u64 { 200 }
fn default_retry_max_delay_ms() -> u64 { 2000 }

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            structural_file: default_structural_file(),
            exchange_file: default_exchange_file(),
            readme_file: default_readme_file(),
            allowed_paths: Vec::new(),
            duplicate_scope: DuplicateScope::default(),
            commit_message_prefix: default_commit_message_prefix(),
            conflict_retries: 0,
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn allow_list(&self) -> AllowList {
        AllowList::from_joined(&self.allowed_paths)
    }

    /// Retry policy for conflict re-runs. One attempt when `conflict_retries` is 0.
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: Some(self.conflict_retries + 1),
            initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            factor: 2.0,
        }
    }
}

/// Credentials for the remote content store.
///
/// Opaque to the engine; handed to the remote store at construction.
#[derive(Clone, Deserialize)]
pub struct SyncCredentials {
    /// Account (repository owner)
    pub account: String,
    /// Repository name
    pub repository: String,
    /// Bearer token
    pub token: String,
}

impl SyncCredentials {
    pub fn new(
        account: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            repository: repository.into(),
            token: token.into(),
        }
    }

    /// Fail fast on blank fields, before any network call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingCredential("token"));
        }
        if self.account.trim().is_empty() {
            return Err(ConfigError::MissingCredential("account"));
        }
        if self.repository.trim().is_empty() {
            return Err(ConfigError::MissingCredential("repository"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SyncCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCredentials")
            .field("account", &self.account)
            .field("repository", &self.repository)
            .field("token", &"<redacted>")
            .finish()
    }
}
