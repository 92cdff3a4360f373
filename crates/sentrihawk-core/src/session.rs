//! The caller's session, supplied by whatever identity provider sits in
//! front of the ledger. The core only consumes it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// The console role a session acts under.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
  #[default]
  Guard,
  Tenant,
  #[serde(alias = "hos")]
  #[strum(to_string = "head_of_security", serialize = "hos")]
  HeadOfSecurity,
}

/// Explicit per-caller context passed into every tenant-scoped query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub role:      Role,
  /// The isolation key for tenant dashboards.
  pub tenant_id: Option<String>,
}

impl Session {
  pub fn guard() -> Self { Self { role: Role::Guard, tenant_id: None } }

  pub fn tenant(tenant_id: impl Into<String>) -> Self {
    Self { role: Role::Tenant, tenant_id: Some(tenant_id.into()) }
  }

  /// The tenant identity to scope queries by. Fails closed when it is unset
  /// or blank.
  pub fn tenant_scope(&self) -> Result<&str> {
    self
      .tenant_id
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .ok_or(Error::IsolationViolation)
  }
}
