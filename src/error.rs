//! Error types for the catalog browser core.
//!
//! Only [`FetchError`] ever reaches the user. [`StorageError`] is produced by the
//! preference layer, logged, and then swallowed by [`crate::prefs::Preferences`].

use thiserror::Error;

/// Loading the remote catalog failed.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Transport-level failure (connection refused, DNS, TLS, body read).
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered with a non-2xx status.
  #[error("unexpected response status {0}")]
  Status(reqwest::StatusCode),

  /// The body was not a JSON array of catalog entries.
  #[error("malformed catalog: {0}")]
  Decode(#[from] serde_json::Error),
}

/// Reading or writing persisted preferences failed.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("failed to read {path}: {source}")]
  Read { path: String, source: std::io::Error },

  #[error("failed to write {path}: {source}")]
  Write { path: String, source: std::io::Error },

  #[error("stored value is corrupt: {0}")]
  Decode(#[from] serde_json::Error),
}
