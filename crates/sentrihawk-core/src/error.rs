//! Error types for `sentrihawk-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("visitor not found: {0}")]
  VisitorNotFound(Uuid),

  #[error("package not found: {0}")]
  PackageNotFound(Uuid),

  #[error("visitor {0} already exists")]
  DuplicateVisitor(Uuid),

  /// Entry refused by screening. The store must not have been touched.
  #[error("access denied: {reason}")]
  AccessDenied { reason: String },

  /// A tenant-scoped query was attempted without a tenant identity.
  #[error("tenant identity missing; refusing unscoped query")]
  IsolationViolation,

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("unknown visitor status: {0:?}")]
  UnknownStatus(String),

  #[error("package {0} has already been collected")]
  AlreadyCollected(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::VisitorNotFound(_) | Self::PackageNotFound(_))
  }

  pub fn is_access_denied(&self) -> bool {
    matches!(self, Self::AccessDenied { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject a blank required text field.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} is required")));
  }
  Ok(())
}
