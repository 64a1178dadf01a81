use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between a user action and the backend reply.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("{0}")]
  Network(String),

  #[error("request timed out after {0} ms")]
  Timeout(u64),

  #[error("Server responded with status: {status}")]
  Http { status: u16 },

  #[error("invalid response body: {0}")]
  Decode(String),

  #[error("cannot read {}: {reason}", .path.display())]
  File { path: PathBuf, reason: String },
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      ClientError::Decode(err.to_string())
    } else {
      ClientError::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    ClientError::Decode(err.to_string())
  }
}
